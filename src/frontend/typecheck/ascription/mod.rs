//! 注释中的类型声明
//!
//! 以 `type ` 开头的注释行是类型声明：
//!
//! ```text
//! // type Human = Object({name: String, age: Number})
//! // type bob : Human
//! /*
//!  * type add : Function([Number, Number], Number)
//!  */
//! ```
//!
//! 声明作用于注释之后、同一语句列表中的第一条语句之前。

pub mod lexer;
pub mod parser;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::frontend::ast::{Comment, CommentKind};
use crate::frontend::core::type_system::{Aliases, Type};
use crate::frontend::typecheck::errors::{TypeError, TypeResult};
use crate::util::span::Span;

pub use parser::{parse_declaration, parse_type_expr, resolve, Declaration, ParseError, TypeExpr};

/// 注释行上的类型声明标记
static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\*?\s*type\s+(\S.*?)\s*$").expect("marker pattern is valid"));

/// 一条来自注释的类型声明
#[derive(Debug, Clone, PartialEq)]
pub struct Ascription {
    pub declaration: Declaration,
    /// 所在注释的位置
    pub span: Span,
}

impl Ascription {
    /// 注释起始偏移
    pub fn offset(&self) -> usize {
        self.span.start.offset
    }
}

/// 一个程序的全部类型声明，按位置排序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    items: Vec<Ascription>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从注释中提取声明；语法错误单独返回
    pub fn from_comments(comments: &[Comment]) -> (Self, Vec<TypeError>) {
        let mut items = Vec::new();
        let mut errors = Vec::new();
        for comment in comments {
            for text in comment_lines(comment) {
                let Some(captures) = MARKER.captures(text) else {
                    continue;
                };
                let source = captures.get(1).map_or("", |m| m.as_str());
                match parse_declaration(source) {
                    Ok(declaration) => {
                        tracing::trace!("annotation '{}' at {}", source, comment.span);
                        items.push(Ascription {
                            declaration,
                            span: comment.span,
                        });
                    }
                    Err(err) => errors.push(TypeError::SyntaxError {
                        message: format!("'{}': {}", source, err),
                        span: comment.span,
                    }),
                }
            }
        }
        items.sort_by_key(Ascription::offset);
        (Self { items }, errors)
    }

    /// 起始偏移位于 `[start, end)` 的声明
    pub fn between(
        &self,
        start: usize,
        end: usize,
    ) -> &[Ascription] {
        if start >= end {
            return &[];
        }
        let lo = self.items.partition_point(|a| a.offset() < start);
        let hi = self.items.partition_point(|a| a.offset() < end);
        &self.items[lo..hi]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ascription> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Ascription> for Annotations {
    fn from_iter<I: IntoIterator<Item = Ascription>>(iter: I) -> Self {
        let mut items: Vec<_> = iter.into_iter().collect();
        items.sort_by_key(Ascription::offset);
        Self { items }
    }
}

/// 行注释是一行；块注释逐行检查
fn comment_lines(comment: &Comment) -> Vec<&str> {
    match comment.kind {
        CommentKind::Line => vec![comment.value.as_str()],
        CommentKind::Block => comment.value.lines().collect(),
    }
}

/// 解析一段类型文本（用于命令行和测试）
pub fn parse_type(
    source: &str,
    aliases: &Aliases,
) -> TypeResult<Type> {
    let expr = parse_type_expr(source).map_err(|err| TypeError::SyntaxError {
        message: format!("'{}': {}", source, err),
        span: Span::dummy(),
    })?;
    resolve(&expr, aliases).map_err(|message| TypeError::SyntaxError {
        message,
        span: Span::dummy(),
    })
}
