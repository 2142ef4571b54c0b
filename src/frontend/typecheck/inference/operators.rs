//! 运算符类型推断
//!
//! - `+`：任一侧为 String 得 String，两侧为 Number 得 Number，有开放变量时结果未定
//! - 其他算术与位运算：要求 Number，开放变量收窄为 Number
//! - 比较、`in`、`instanceof`：Boolean

use super::{FunctionState, Inferrer};
use crate::frontend::ast::{BinaryExpression, Expr, UnaryExpression, UpdateExpression};
use crate::frontend::core::type_system::Type;
use crate::frontend::typecheck::errors::{TypeError, TypeResult};
use crate::util::span::Span;

/// 要求 Number 操作数的二元运算符
const NUMERIC_OPERATORS: &[&str] = &[
    "-", "*", "/", "%", "**", "|", "&", "^", "<<", ">>", ">>>",
];

/// 结果为 Boolean 的二元运算符
const COMPARISON_OPERATORS: &[&str] = &[
    "==", "!=", "===", "!==", "<", "<=", ">", ">=", "in", "instanceof",
];

impl Inferrer<'_> {
    pub(crate) fn visit_binary(
        &mut self,
        state: &mut FunctionState,
        binary: &BinaryExpression,
    ) -> TypeResult<Type> {
        let left = self.visit_expr(state, &binary.left)?;
        let right = self.visit_expr(state, &binary.right)?;
        let operator = binary.operator.as_str();
        match operator {
            "+" => plus_type(state, &left, &right, binary.span),
            op if NUMERIC_OPERATORS.contains(&op) => {
                require_number(state, op, &left, binary.span)?;
                require_number(state, op, &right, binary.span)?;
                Ok(Type::number())
            }
            op if COMPARISON_OPERATORS.contains(&op) => Ok(Type::boolean()),
            op => Err(TypeError::InvalidOperand {
                operator: op.to_string(),
                operand: format!("{} and {}", left, right),
                span: binary.span,
            }),
        }
    }

    pub(crate) fn visit_unary(
        &mut self,
        state: &mut FunctionState,
        unary: &UnaryExpression,
    ) -> TypeResult<Type> {
        // typeof 允许未声明的名字
        if unary.operator == "typeof" {
            if let Expr::Identifier(id) = unary.argument.as_ref() {
                if !state.env.scope.contains(&id.name) {
                    return Ok(Type::string());
                }
            }
        }
        let argument = self.visit_expr(state, &unary.argument)?;
        match unary.operator.as_str() {
            "-" | "~" => {
                require_number(state, &unary.operator, &argument, unary.span)?;
                Ok(Type::number())
            }
            // 一元加号是数值转换
            "+" => Ok(Type::number()),
            "!" | "delete" => Ok(Type::boolean()),
            "typeof" => Ok(Type::string()),
            "void" => Ok(Type::undefined()),
            op => Err(TypeError::InvalidOperand {
                operator: op.to_string(),
                operand: argument.to_string(),
                span: unary.span,
            }),
        }
    }

    /// `++` / `--`
    pub(crate) fn visit_update(
        &mut self,
        state: &mut FunctionState,
        update: &UpdateExpression,
    ) -> TypeResult<Type> {
        let argument = self.visit_expr(state, &update.argument)?;
        require_number(state, &update.operator, &argument, update.span)?;
        Ok(Type::number())
    }

    /// 复合赋值 `x op= y` 的结果类型
    pub(crate) fn compound_assign_type(
        &mut self,
        state: &mut FunctionState,
        operator: &str,
        left: &Type,
        right: &Type,
        span: Span,
    ) -> TypeResult<Type> {
        let binary = operator.strip_suffix('=').unwrap_or(operator);
        match binary {
            "+" if left.is_number() && right.is_number() => Ok(Type::number()),
            "+" => Ok(Type::string()),
            op if NUMERIC_OPERATORS.contains(&op) => {
                require_number(state, operator, left, span)?;
                require_number(state, operator, right, span)?;
                Ok(Type::number())
            }
            // 逻辑赋值 `&&=`、`||=`、`??=`
            _ => Ok(super::widen(left, right, span)),
        }
    }
}

/// `+` 的结果类型
fn plus_type(
    state: &mut FunctionState,
    left: &Type,
    right: &Type,
    span: Span,
) -> TypeResult<Type> {
    if left.is_string() || right.is_string() {
        Ok(Type::string())
    } else if left.is_var() || right.is_var() {
        Ok(state.fresh())
    } else if left.is_number() && right.is_number() {
        Ok(Type::number())
    } else {
        Err(TypeError::InvalidOperand {
            operator: "+".to_string(),
            operand: format!("{} and {}", left, right),
            span,
        })
    }
}

/// 要求操作数为 Number；开放变量收窄为 Number
fn require_number(
    state: &mut FunctionState,
    operator: &str,
    operand: &Type,
    span: Span,
) -> TypeResult<()> {
    match operand {
        Type::Var(var) => {
            state.narrow(*var, Type::number());
            Ok(())
        }
        ty if ty.is_number() => Ok(()),
        ty => Err(TypeError::InvalidOperand {
            operator: operator.to_string(),
            operand: ty.to_string(),
            span,
        }),
    }
}
