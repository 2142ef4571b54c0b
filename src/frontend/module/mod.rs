//! 模块系统
//!
//! `require("./x")` 通过加载器取得被导入程序，对它单独做一次推断，
//! 取 `module.exports` 的类型作为 `require` 调用的结果。
//!
//! # 模块结构
//!
//! - [`resolver`] - 相对路径解析
//! - [`loader`] - 文件系统加载器和内存加载器
//!
//! 推断结果按模块标识缓存；正在加载的模块再次被导入时报告循环依赖。

pub mod loader;
pub mod resolver;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::frontend::ast::Program;
use crate::frontend::core::type_system::Type;
use crate::frontend::typecheck::{default_bindings, infer_program, TypeError, TypeResult};
use crate::util::config::CheckConfig;
use crate::util::span::Span;

pub use loader::{FsModuleLoader, MemoryModuleLoader};
pub use resolver::ModuleResolver;

/// 加载好的模块
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// 模块标识（文件路径或内存中的名字），用于缓存和相对解析
    pub key: String,
    pub program: Program,
}

/// 模块加载器
pub trait ModuleLoader {
    /// 加载 `specifier`；`importer` 是导入方的模块标识
    fn load(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> Result<LoadedModule, ModuleError>;
}

/// 模块系统错误
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// 模块未找到
    #[error("module not found: '{path}' (searched {})", .searched_paths.join(", "))]
    NotFound {
        path: String,
        searched_paths: Vec<String>,
    },

    /// 不是相对路径
    #[error("invalid module path: '{path}' (only relative paths are supported)")]
    InvalidPath { path: String },

    /// 读取失败
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 不是合法的 ESTree JSON
    #[error("cannot parse {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 加载状态（用于循环依赖检测）
#[derive(Debug, Clone)]
enum LoadState {
    /// 正在加载
    Loading,
    /// 加载完成，保存导出类型
    Loaded(Type),
}

/// 推断过程与模块加载器之间的桥
#[derive(Default)]
pub struct ModuleBridge {
    loader: Option<Box<dyn ModuleLoader>>,
    states: HashMap<String, LoadState>,
    /// 当前加载栈（用于报告循环路径）
    load_stack: Vec<String>,
}

impl ModuleBridge {
    /// 没有加载器：所有 require 都是 InvalidImport
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            loader: Some(loader),
            ..Self::default()
        }
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// 导入模块，返回它的导出类型
    pub fn import(
        &mut self,
        specifier: &str,
        importer: Option<&str>,
        config: &CheckConfig,
        span: Span,
    ) -> TypeResult<Type> {
        let invalid = |reason: String| TypeError::InvalidImport {
            specifier: specifier.to_string(),
            reason,
            span,
        };
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| invalid("no module loader configured".to_string()))?;
        let module = loader
            .load(specifier, importer)
            .map_err(|err| invalid(err.to_string()))?;

        match self.states.get(&module.key) {
            Some(LoadState::Loaded(exports)) => return Ok(exports.clone()),
            Some(LoadState::Loading) => {
                return Err(invalid(format!(
                    "cyclic dependency: {}",
                    self.format_cycle(&module.key)
                )))
            }
            None => {}
        }

        tracing::debug!("importing {} as {}", specifier, module.key);
        self.states.insert(module.key.clone(), LoadState::Loading);
        self.load_stack.push(module.key.clone());
        let result = infer_program(
            &module.program,
            default_bindings(),
            config,
            self,
            Some(&module.key),
        );
        self.load_stack.pop();
        self.states.remove(&module.key);

        let inference = result.map_err(|err| invalid(format!("{}: {}", module.key, err)))?;
        if let Some(first) = inference.errors.first() {
            return Err(invalid(format!(
                "{} has {} type error(s), first: {}",
                module.key,
                inference.errors.len(),
                first
            )));
        }
        let exports = inference
            .exports()
            .cloned()
            .ok_or_else(|| invalid(format!("{} has no module.exports", module.key)))?;
        self.states
            .insert(module.key, LoadState::Loaded(exports.clone()));
        Ok(exports)
    }

    /// 格式化循环路径 `a -> b -> a`
    fn format_cycle(
        &self,
        key: &str,
    ) -> String {
        let start = self
            .load_stack
            .iter()
            .position(|k| k == key)
            .unwrap_or(0);
        let mut cycle: Vec<&str> = self.load_stack[start..].iter().map(String::as_str).collect();
        cycle.push(key);
        cycle.join(" -> ")
    }
}
