//! 错误收集和报告
//!
//! 定义类型推断过程中的所有错误类型

use serde::Serialize;
use thiserror::Error;

use crate::util::span::Span;

/// 类型错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    /// 引用了任何作用域都没有的名字
    #[error("Undefined identifier: {name}")]
    UndefinedIdentifier { name: String, span: Span },

    /// 访问封闭对象上不存在的字段
    #[error("Undefined field: {field} on {object}")]
    UndefinedField {
        field: String,
        object: String,
        span: Span,
    },

    /// 调用不可调用的值
    #[error("Not callable: {ty}")]
    NotCallable { ty: String, span: Span },

    /// 参数数量不匹配
    #[error("Arity mismatch: expected {expected} arguments, found {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },

    /// 运算符不接受的操作数
    #[error("Invalid operand for '{operator}': {operand}")]
    InvalidOperand {
        operator: String,
        operand: String,
        span: Span,
    },

    /// 类型不匹配
    #[error("Type mismatch: expected {expected}, found {found}{}", note_suffix(.note))]
    TypeMismatch {
        expected: String,
        found: String,
        note: Option<String>,
        span: Span,
    },

    /// 模块无法解析或导入
    #[error("Invalid import '{specifier}': {reason}")]
    InvalidImport {
        specifier: String,
        reason: String,
        span: Span,
    },

    /// 类型声明注释语法错误
    #[error("Syntax error in type annotation: {message}")]
    SyntaxError { message: String, span: Span },

    /// 调用点重新实例化嵌套过深
    #[error("Recursion limit of {limit} nested calls exceeded")]
    RecursionLimit { limit: usize, span: Span },
}

fn note_suffix(note: &Option<String>) -> String {
    match note {
        Some(note) => format!(" ({})", note),
        None => String::new(),
    }
}

impl TypeError {
    /// 获取错误的位置
    pub fn span(&self) -> Span {
        match self {
            TypeError::UndefinedIdentifier { span, .. } => *span,
            TypeError::UndefinedField { span, .. } => *span,
            TypeError::NotCallable { span, .. } => *span,
            TypeError::ArityMismatch { span, .. } => *span,
            TypeError::InvalidOperand { span, .. } => *span,
            TypeError::TypeMismatch { span, .. } => *span,
            TypeError::InvalidImport { span, .. } => *span,
            TypeError::SyntaxError { span, .. } => *span,
            TypeError::RecursionLimit { span, .. } => *span,
        }
    }

    /// 错误种类名
    pub fn kind(&self) -> &'static str {
        match self {
            TypeError::UndefinedIdentifier { .. } => "UndefinedIdentifier",
            TypeError::UndefinedField { .. } => "UndefinedField",
            TypeError::NotCallable { .. } => "NotCallable",
            TypeError::ArityMismatch { .. } => "ArityMismatch",
            TypeError::InvalidOperand { .. } => "InvalidOperand",
            TypeError::TypeMismatch { .. } => "TypeMismatch",
            TypeError::InvalidImport { .. } => "InvalidImport",
            TypeError::SyntaxError { .. } => "SyntaxError",
            TypeError::RecursionLimit { .. } => "RecursionLimit",
        }
    }

    /// 致命错误会终止整个检查，即使在收集模式下
    pub fn is_fatal(&self) -> bool {
        matches!(self, TypeError::RecursionLimit { .. })
    }

    /// 没有位置信息时补上位置
    pub fn or_span(
        mut self,
        fallback: Span,
    ) -> Self {
        if self.span().is_dummy() {
            match &mut self {
                TypeError::UndefinedIdentifier { span, .. }
                | TypeError::UndefinedField { span, .. }
                | TypeError::NotCallable { span, .. }
                | TypeError::ArityMismatch { span, .. }
                | TypeError::InvalidOperand { span, .. }
                | TypeError::TypeMismatch { span, .. }
                | TypeError::InvalidImport { span, .. }
                | TypeError::SyntaxError { span, .. }
                | TypeError::RecursionLimit { span, .. } => *span = fallback,
            }
        }
        self
    }

    /// 机器可读的报告条目
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            span: self.span(),
        }
    }
}

/// 序列化用的错误条目
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    pub span: Span,
}

/// 类型检查结果
pub type TypeResult<T> = Result<T, TypeError>;

/// 错误收集器
#[derive(Debug, Default, Clone)]
pub struct ErrorCollector {
    errors: Vec<TypeError>,
}

impl ErrorCollector {
    /// 创建新的错误收集器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(
        &mut self,
        error: TypeError,
    ) {
        self.errors.push(error);
    }

    /// 检查是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 获取所有错误
    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    /// 错误数量
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 取出所有错误
    pub fn into_errors(self) -> Vec<TypeError> {
        self.errors
    }
}
