//! 诊断输出
//!
//! 把检查结果渲染成人看的文本或机器读的 JSON
//!
//! # 模块结构
//!
//! - [`check`] - 多文件检查（`tinfer check` 的实现）
//! - [`emitter`] - 文本与 JSON 渲染器

pub mod check;
pub mod emitter;

pub use check::{check_file, check_paths, collect_source_files, FileReport};
pub use emitter::{EmitterConfig, JsonEmitter, TextEmitter};
