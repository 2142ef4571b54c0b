//! 类型系统子模块
//!
//! - var: 类型变量定义
//! - mono: 类型定义
//! - printer: 类型打印
//! - unify: 结构化合一

pub mod mono;
pub mod printer;
pub mod unify;
pub mod var;

// 重新导出主要类型
pub use mono::{
    Aliases, Closure, ClosureMemo, FunctionType, LiteralValue, ObjectType, PrimitiveKind, Type,
};
pub use printer::print_type;
pub use unify::{unify, Unifier};
pub use var::{TypeVar, VarGen};

#[cfg(test)]
mod tests;
