//! 类型打印
//!
//! 打印格式同时也是注释声明的输入语法：
//!
//! ```text
//! Number  a  Object({x: Number})  Array([Number])
//! Function([a], a)  Any([Number, String])  Value("BTree")
//! ```

use std::fmt;

use super::mono::{LiteralValue, Type};

/// 打印类型
pub fn print_type(ty: &Type) -> String {
    ty.to_string()
}

impl fmt::Display for Type {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{}", kind.name()),
            Type::Var(var) => write!(f, "{}", var),
            Type::Object(obj) => {
                write!(f, "Object({{")?;
                for (i, (name, ty)) in obj.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_key(f, name)?;
                    write!(f, ": {}", ty)?;
                }
                write!(f, "}})")
            }
            Type::Array(items) => {
                write!(f, "Array(")?;
                write_list(f, items)?;
                write!(f, ")")
            }
            Type::Function(func) => {
                write!(f, "Function(")?;
                write_list(f, &func.params)?;
                write!(f, ", {})", func.output)
            }
            Type::Union(alternatives) => {
                write!(f, "Any(")?;
                write_list(f, alternatives)?;
                write!(f, ")")
            }
            Type::Value(lit) => write!(f, "Value({})", lit),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::String(s) => write_quoted(f, s),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Null => write!(f, "null"),
            LiteralValue::Undefined => write!(f, "undefined"),
        }
    }
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    items: &[Type],
) -> fmt::Result {
    write!(f, "[")?;
    for (i, ty) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    write!(f, "]")
}

/// 标识符形式的字段名原样输出，其余加引号
fn write_key(
    f: &mut fmt::Formatter<'_>,
    name: &str,
) -> fmt::Result {
    if is_identifier(name) {
        write!(f, "{}", name)
    } else {
        write_quoted(f, name)
    }
}

fn write_quoted(
    f: &mut fmt::Formatter<'_>,
    s: &str,
) -> fmt::Result {
    match serde_json::to_string(s) {
        Ok(quoted) => write!(f, "{}", quoted),
        Err(_) => write!(f, "{:?}", s),
    }
}

/// 合法的类型声明标识符
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if unicode_ident::is_xid_start(c) || c == '_' || c == '$' => {
            chars.all(|c| unicode_ident::is_xid_continue(c) || c == '$')
        }
        _ => false,
    }
}
