//! 类型声明注释的语法分析
//!
//! ```text
//! declaration := IDENT ':' type          名字标注
//!              | IDENT '=' type          类型别名
//! type        := IDENT [ '(' type { ',' type } ')' ]
//!              | '[' [ type { ',' type } ] ']'
//!              | '{' [ field { ',' field } ] '}'
//!              | NUMBER | '-' NUMBER | STRING
//! field       := (IDENT | STRING) ':' type
//! ```

use indexmap::IndexMap;

use super::lexer::{tokenize, LexError, Token, TokenKind};
use crate::frontend::core::type_system::{
    Aliases, FunctionType, LiteralValue, ObjectType, PrimitiveKind, Type, TypeVar,
};

/// 类型表达式语法树（解析别名之前）
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `Number`、`a`、`Human`
    Name(String),
    /// `Function([a], a)`、`Object({...})`
    Apply { name: String, args: Vec<TypeExpr> },
    /// `[a, b]`
    List(Vec<TypeExpr>),
    /// `{x: Number}`
    Record(Vec<(String, TypeExpr)>),
    Number(f64),
    Str(String),
}

/// 一条类型声明
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// `name : Type`
    Ascribe { name: String, ty: TypeExpr },
    /// `Name = Type`
    Alias { name: String, ty: TypeExpr },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Ascribe { name, .. } | Declaration::Alias { name, .. } => name,
        }
    }
}

/// 语法错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at column {}", .offset + 1)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            message: err.message,
            offset: err.offset,
        }
    }
}

/// 解析一条声明
pub fn parse_declaration(source: &str) -> Result<Declaration, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    let name = parser.expect_identifier()?;
    let decl = match parser.advance().kind {
        TokenKind::Colon => Declaration::Ascribe {
            name,
            ty: parser.parse_type()?,
        },
        TokenKind::Eq => Declaration::Alias {
            name,
            ty: parser.parse_type()?,
        },
        other => return Err(parser.unexpected(&other, "':' or '='")),
    };
    parser.expect_eof()?;
    Ok(decl)
}

/// 解析单独的类型表达式
pub fn parse_type_expr(source: &str) -> Result<TypeExpr, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    let ty = parser.parse_type()?;
    parser.expect_eof()?;
    Ok(ty)
}

/// 类型表达式解析器
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        // tokenize 保证最后一个是 Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(
        &self,
        kind: &TokenKind,
    ) -> bool {
        &self.current().kind == kind
    }

    fn eat(
        &mut self,
        kind: &TokenKind,
    ) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(
        &self,
        found: &TokenKind,
        expected: &str,
    ) -> ParseError {
        ParseError {
            message: format!("expected {}, found {}", expected, found.describe()),
            offset: self.tokens[self.pos.saturating_sub(1)].offset,
        }
    }

    fn expect(
        &mut self,
        kind: TokenKind,
    ) -> Result<(), ParseError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(())
        } else {
            Err(self.unexpected(&token.kind, &kind.describe()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.advance().kind {
            TokenKind::Identifier(name) => Ok(name),
            other => Err(self.unexpected(&other, "identifier")),
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        match self.advance().kind {
            TokenKind::Eof => Ok(()),
            other => Err(self.unexpected(&other, "end of annotation")),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        match self.advance().kind {
            TokenKind::Identifier(name) => {
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_sequence(TokenKind::RParen, Self::parse_type)?;
                    Ok(TypeExpr::Apply { name, args })
                } else {
                    Ok(TypeExpr::Name(name))
                }
            }
            TokenKind::LBracket => Ok(TypeExpr::List(
                self.parse_sequence(TokenKind::RBracket, Self::parse_type)?,
            )),
            TokenKind::LBrace => Ok(TypeExpr::Record(
                self.parse_sequence(TokenKind::RBrace, Self::parse_field)?,
            )),
            TokenKind::Number(n) => Ok(TypeExpr::Number(n)),
            TokenKind::Minus => match self.advance().kind {
                TokenKind::Number(n) => Ok(TypeExpr::Number(-n)),
                other => Err(self.unexpected(&other, "number")),
            },
            TokenKind::Str(s) => Ok(TypeExpr::Str(s)),
            other => Err(self.unexpected(&other, "type")),
        }
    }

    fn parse_field(&mut self) -> Result<(String, TypeExpr), ParseError> {
        let name = match self.advance().kind {
            TokenKind::Identifier(name) | TokenKind::Str(name) => name,
            other => return Err(self.unexpected(&other, "field name")),
        };
        self.expect(TokenKind::Colon)?;
        Ok((name, self.parse_type()?))
    }

    /// 逗号分隔、以 `close` 结束的序列（允许为空，允许尾随逗号）
    fn parse_sequence<T>(
        &mut self,
        close: TokenKind,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        while !self.eat(&close) {
            items.push(item(self)?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(close.clone())?;
                break;
            }
        }
        Ok(items)
    }
}

/// 把类型表达式解析为类型
///
/// 基本类型名不区分大小写；别名按名字精确查找；
/// `a`、`b1` 这样的小写名是类型变量。
pub fn resolve(
    expr: &TypeExpr,
    aliases: &Aliases,
) -> Result<Type, String> {
    match expr {
        TypeExpr::Name(name) => resolve_name(name, aliases),
        TypeExpr::Apply { name, args } => resolve_apply(name, args, aliases),
        TypeExpr::List(items) => Ok(Type::Array(resolve_all(items, aliases)?)),
        TypeExpr::Record(fields) => resolve_record(fields, aliases),
        TypeExpr::Number(n) => Ok(Type::Value(LiteralValue::Number(*n))),
        TypeExpr::Str(s) => Ok(Type::Value(LiteralValue::String(s.clone()))),
    }
}

fn resolve_all(
    items: &[TypeExpr],
    aliases: &Aliases,
) -> Result<Vec<Type>, String> {
    items.iter().map(|item| resolve(item, aliases)).collect()
}

fn resolve_name(
    name: &str,
    aliases: &Aliases,
) -> Result<Type, String> {
    if let Some(ty) = aliases.get(name) {
        return Ok(ty.clone());
    }
    if let Some(kind) = PrimitiveKind::from_name(name) {
        return Ok(Type::Primitive(kind));
    }
    if let Some(var) = TypeVar::from_name(name) {
        return Ok(Type::Var(var));
    }
    Err(format!("unknown type '{}'", name))
}

fn resolve_record(
    fields: &[(String, TypeExpr)],
    aliases: &Aliases,
) -> Result<Type, String> {
    let mut resolved = IndexMap::with_capacity(fields.len());
    for (name, ty) in fields {
        if resolved.insert(name.clone(), resolve(ty, aliases)?).is_some() {
            return Err(format!("duplicate field '{}'", name));
        }
    }
    Ok(Type::Object(ObjectType::closed(resolved)))
}

fn resolve_apply(
    name: &str,
    args: &[TypeExpr],
    aliases: &Aliases,
) -> Result<Type, String> {
    match (name, args) {
        ("Function", [TypeExpr::List(params), output]) => Ok(Type::Function(
            FunctionType::signature(resolve_all(params, aliases)?, resolve(output, aliases)?),
        )),
        ("Object", [record @ TypeExpr::Record(_)]) => resolve(record, aliases),
        ("Array", [list @ TypeExpr::List(_)]) => resolve(list, aliases),
        ("Any", [TypeExpr::List(items)]) => {
            let alternatives = resolve_all(items, aliases)?;
            if alternatives.is_empty() {
                return Err("Any([...]) needs at least one alternative".to_string());
            }
            Ok(Type::union(alternatives))
        }
        ("Value", [value]) => resolve_literal(value).map(Type::Value),
        ("Function", _) => Err("expected Function([params...], output)".to_string()),
        ("Object", _) => Err("expected Object({field: Type, ...})".to_string()),
        ("Array", _) | ("Any", _) => Err(format!("expected {}([Type, ...])", name)),
        ("Value", _) => Err("expected Value(literal)".to_string()),
        _ => Err(format!("unknown type constructor '{}'", name)),
    }
}

fn resolve_literal(expr: &TypeExpr) -> Result<LiteralValue, String> {
    match expr {
        TypeExpr::Number(n) => Ok(LiteralValue::Number(*n)),
        TypeExpr::Str(s) => Ok(LiteralValue::String(s.clone())),
        TypeExpr::Name(name) => match name.as_str() {
            "true" => Ok(LiteralValue::Boolean(true)),
            "false" => Ok(LiteralValue::Boolean(false)),
            "null" => Ok(LiteralValue::Null),
            "undefined" => Ok(LiteralValue::Undefined),
            other => Err(format!("'{}' is not a literal", other)),
        },
        _ => Err("expected a literal inside Value(...)".to_string()),
    }
}
