//! 类型检查器模块
//!
//! 为 ESTree 程序推断结构化类型，支持：
//! - 基于合一的局部推断（开放变量按使用收窄）
//! - 调用点按实参重新实例化函数体
//! - 注释中的类型标注与别名
//! - 收集模式与遇错即停模式

use indexmap::IndexMap;

pub mod ascription;
pub mod errors;
pub mod inference;
pub mod scope;

#[cfg(test)]
mod tests;

pub use errors::{ErrorCollector, ErrorReport, TypeError, TypeResult};
pub use inference::{infer_program, Inference, Inferrer};
pub use scope::Scope;

use crate::frontend::core::type_system::{FunctionType, Type};

/// 每次检查都会放进最外层帧的绑定
///
/// - `module`：开放对象，`exports` 字段是模块的导出
/// - `require`：`Function([String], a)`，字面量参数会走模块加载
/// - `undefined`、`NaN`、`Infinity`
pub fn default_bindings() -> IndexMap<String, Type> {
    let mut bindings = IndexMap::new();
    bindings.insert(
        "module".to_string(),
        Type::open_object([("exports", Type::open_object(Vec::<(String, Type)>::new()))]),
    );
    bindings.insert(
        "require".to_string(),
        Type::Function(FunctionType::signature(vec![Type::string()], Type::var(0))),
    );
    bindings.insert("undefined".to_string(), Type::undefined());
    bindings.insert("NaN".to_string(), Type::number());
    bindings.insert("Infinity".to_string(), Type::number());
    bindings
}
