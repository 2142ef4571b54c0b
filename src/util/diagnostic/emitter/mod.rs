//! 诊断渲染器

pub mod json;
pub mod text;

pub use json::JsonEmitter;
pub use text::{EmitterConfig, TextEmitter};
