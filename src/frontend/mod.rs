//! Frontend type checking pipeline
//!
//! ESTree JSON is deserialised by [`ast`], inferred by [`typecheck`] over the
//! type model in [`core::type_system`]; `require` calls go through [`module`].

use indexmap::IndexMap;
use tracing::debug;

pub mod ast;
pub mod core;
pub mod module;
pub mod typecheck;

use self::ast::Program;
use self::core::type_system::Type;
use self::module::{ModuleBridge, ModuleLoader};
use self::typecheck::{default_bindings, infer_program, Inference, TypeResult};
use crate::util::config::CheckConfig;

/// Checker context
///
/// 一个 `Checker` 可以检查多个程序；导入模块的推断结果在检查之间共享。
pub struct Checker {
    config: CheckConfig,
    modules: ModuleBridge,
    globals: IndexMap<String, Type>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new(CheckConfig::default())
    }
}

impl Checker {
    /// Create a checker without a module loader
    pub fn new(config: CheckConfig) -> Self {
        Self {
            config,
            modules: ModuleBridge::new(),
            globals: default_bindings(),
        }
    }

    /// Resolve `require` through `loader`
    pub fn with_loader(
        mut self,
        loader: impl ModuleLoader + 'static,
    ) -> Self {
        self.modules = ModuleBridge::with_loader(Box::new(loader));
        self
    }

    /// Add a global binding (replaces a default of the same name)
    pub fn with_binding(
        mut self,
        name: impl Into<String>,
        ty: Type,
    ) -> Self {
        self.globals.insert(name.into(), ty);
        self
    }

    pub fn with_bindings(
        mut self,
        bindings: impl IntoIterator<Item = (String, Type)>,
    ) -> Self {
        self.globals.extend(bindings);
        self
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check a program that is not a module (relative requires resolve from the loader root)
    pub fn check(
        &mut self,
        program: &Program,
    ) -> TypeResult<Inference> {
        self.run(program, None)
    }

    /// Check a program identified by `key` (file path or in-memory module name)
    pub fn check_unit(
        &mut self,
        program: &Program,
        key: &str,
    ) -> TypeResult<Inference> {
        self.run(program, Some(key))
    }

    fn run(
        &mut self,
        program: &Program,
        unit: Option<&str>,
    ) -> TypeResult<Inference> {
        debug!("Starting type checking...");
        let result = infer_program(
            program,
            self.globals.clone(),
            &self.config,
            &mut self.modules,
            unit,
        );
        match &result {
            Ok(inference) => debug!(
                "Type checking finished with {} error(s)",
                inference.errors.len()
            ),
            Err(err) => debug!("Type checking stopped: {}", err),
        }
        result
    }
}

/// 用默认配置推断一个程序
///
/// `initial_bindings` 覆盖同名的默认绑定。遇错即停模式的错误也放进结果的错误列表。
pub fn infer(
    program: &Program,
    initial_bindings: IndexMap<String, Type>,
) -> Inference {
    let mut checker = Checker::default().with_bindings(initial_bindings);
    checker.check(program).unwrap_or_else(Inference::from_error)
}
