//! 表达式类型推断

use indexmap::IndexMap;

use super::{widen, FunctionState, Inferrer};
use crate::frontend::ast::{
    AssignmentExpression, Expr, Literal, MemberExpression, ObjectExpression, ObjectMember,
};
use crate::frontend::core::type_system::{unify, ObjectType, Type};
use crate::frontend::typecheck::errors::{TypeError, TypeResult};
use crate::util::span::Span;

impl Inferrer<'_> {
    /// 推断表达式类型
    pub(crate) fn visit_expr(
        &mut self,
        state: &mut FunctionState,
        expr: &Expr,
    ) -> TypeResult<Type> {
        tracing::trace!("visit {}", expr.kind());
        match expr {
            Expr::Identifier(id) => state
                .env
                .scope
                .lookup(&id.name)
                .cloned()
                .ok_or_else(|| TypeError::UndefinedIdentifier {
                    name: id.name.clone(),
                    span: id.span,
                }),
            Expr::Literal(lit) => Ok(literal_type(lit, state)),
            Expr::TemplateLiteral(template) => {
                for e in &template.expressions {
                    self.visit_expr(state, e)?;
                }
                Ok(Type::string())
            }
            Expr::FunctionExpression(func) | Expr::ArrowFunctionExpression(func) => {
                self.infer_function(state, func, None)
            }
            Expr::CallExpression(call) => self.visit_call(state, call),
            Expr::UnaryExpression(unary) => self.visit_unary(state, unary),
            Expr::UpdateExpression(update) => self.visit_update(state, update),
            Expr::BinaryExpression(binary) => self.visit_binary(state, binary),
            Expr::LogicalExpression(logical) => {
                let left = self.visit_expr(state, &logical.left)?;
                let right = self.visit_expr(state, &logical.right)?;
                unify(&left, &right, logical.span)
            }
            Expr::ConditionalExpression(cond) => {
                self.visit_expr(state, &cond.test)?;
                let consequent = self.visit_expr(state, &cond.consequent)?;
                let alternate = self.visit_expr(state, &cond.alternate)?;
                unify(&consequent, &alternate, cond.span)
            }
            Expr::AssignmentExpression(assign) => self.visit_assign(state, assign),
            Expr::ArrayExpression(array) => {
                let mut items = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    items.push(match element {
                        Some(e) => self.visit_expr(state, e)?,
                        None => Type::undefined(),
                    });
                }
                Ok(Type::Array(items))
            }
            Expr::ObjectExpression(object) => self.visit_object(state, object),
            Expr::MemberExpression(member) => self.visit_member(state, member),
            Expr::SequenceExpression(seq) => {
                let mut last = Type::undefined();
                for e in &seq.expressions {
                    last = self.visit_expr(state, e)?;
                }
                Ok(last)
            }
            Expr::Unsupported => {
                tracing::warn!("unsupported expression typed as an open variable");
                Ok(state.fresh())
            }
        }
    }

    /// 带期望类型推断：函数字面量的参数由标注确定
    pub(crate) fn visit_expr_expecting(
        &mut self,
        state: &mut FunctionState,
        expr: &Expr,
        expected: Option<&Type>,
    ) -> TypeResult<Type> {
        match (expr, expected) {
            (Expr::FunctionExpression(func) | Expr::ArrowFunctionExpression(func), Some(_)) => {
                self.infer_function(state, func, expected)
            }
            _ => self.visit_expr(state, expr),
        }
    }

    fn visit_object(
        &mut self,
        state: &mut FunctionState,
        object: &ObjectExpression,
    ) -> TypeResult<Type> {
        let mut fields = IndexMap::new();
        for member in &object.properties {
            let ObjectMember::Property(property) = member else {
                continue;
            };
            let ty = self.visit_expr(state, &property.value)?;
            match property.static_name() {
                Some(name) => {
                    fields.insert(name, ty);
                }
                None => {
                    self.visit_expr(state, &property.key)?;
                }
            }
        }
        Ok(Type::Object(ObjectType::closed(fields)))
    }

    fn visit_member(
        &mut self,
        state: &mut FunctionState,
        member: &MemberExpression,
    ) -> TypeResult<Type> {
        let object = self.visit_expr(state, &member.object)?;
        match member.static_name() {
            Some(name) => self.member_type(state, &member.object, object, &name, member.span),
            None => {
                self.visit_expr(state, &member.property)?;
                Ok(match object {
                    Type::Array(items) if !items.is_empty() => Type::union(items),
                    Type::Object(obj) if !obj.fields.is_empty() => {
                        Type::union(obj.fields.into_values().collect())
                    }
                    ty if ty.is_string() => Type::string(),
                    _ => state.fresh(),
                })
            }
        }
    }

    /// 静态字段访问
    ///
    /// 开放对象缺少字段时长出新字段；开放变量收窄为只有该字段的开放对象。
    fn member_type(
        &mut self,
        state: &mut FunctionState,
        object_expr: &Expr,
        object: Type,
        name: &str,
        span: Span,
    ) -> TypeResult<Type> {
        match object {
            Type::Object(obj) => match obj.get(name) {
                Some(field) => Ok(field.clone()),
                None if obj.open => {
                    let field = state.fresh();
                    let grown = obj.with_field(name, field.clone());
                    self.refine(state, object_expr, Type::Object(grown));
                    Ok(field)
                }
                None => Err(TypeError::UndefinedField {
                    field: name.to_string(),
                    object: Type::Object(obj).to_string(),
                    span,
                }),
            },
            Type::Var(var) => {
                let field = state.fresh();
                state.narrow(var, Type::open_object([(name, field.clone())]));
                Ok(field)
            }
            Type::Array(items) => match name.parse::<usize>() {
                Ok(index) => Ok(items.get(index).cloned().unwrap_or_else(Type::undefined)),
                Err(_) if name == "length" => Ok(Type::number()),
                Err(_) => Err(no_such_field(name, &Type::Array(items), span)),
            },
            ty if ty.is_string() && name == "length" => Ok(Type::number()),
            ty => Err(no_such_field(name, &ty, span)),
        }
    }

    fn visit_assign(
        &mut self,
        state: &mut FunctionState,
        assign: &AssignmentExpression,
    ) -> TypeResult<Type> {
        let ty = match assign.operator.as_str() {
            "=" => {
                let expected = match assign.left.as_ref() {
                    Expr::Identifier(id) => state.declared_type(&id.name).cloned(),
                    _ => None,
                };
                self.visit_expr_expecting(state, &assign.right, expected.as_ref())?
            }
            operator => {
                let left = self.visit_expr(state, &assign.left)?;
                let right = self.visit_expr(state, &assign.right)?;
                self.compound_assign_type(state, operator, &left, &right, assign.span)?
            }
        };
        self.store(state, &assign.left, ty.clone(), assign.span)?;
        Ok(ty)
    }

    /// 写入赋值目标
    ///
    /// 标识符：有标注时与标注合一，否则按重新赋值放宽；
    /// 成员：直接设置对象字段。
    pub(crate) fn store(
        &mut self,
        state: &mut FunctionState,
        target: &Expr,
        ty: Type,
        span: Span,
    ) -> TypeResult<()> {
        match target {
            Expr::Identifier(id) => {
                let Some(existing) = state.env.scope.lookup(&id.name) else {
                    return Err(TypeError::UndefinedIdentifier {
                        name: id.name.clone(),
                        span: id.span,
                    });
                };
                let stored = match state.declared_type(&id.name) {
                    Some(declared) => unify(declared, &ty, span)?,
                    None => widen(existing, &ty, span),
                };
                state.env.scope.assign(&id.name, stored);
                Ok(())
            }
            Expr::MemberExpression(member) => {
                let object = self.visit_expr(state, &member.object)?;
                let Some(name) = member.static_name() else {
                    self.visit_expr(state, &member.property)?;
                    return Ok(());
                };
                match object {
                    Type::Object(obj) => {
                        self.refine(state, &member.object, Type::Object(obj.with_field(name, ty)));
                    }
                    Type::Var(var) => state.narrow(var, Type::open_object([(name, ty)])),
                    Type::Array(mut items) => {
                        let Ok(index) = name.parse::<usize>() else {
                            return Err(no_such_field(&name, &Type::Array(items), member.span));
                        };
                        if index < items.len() {
                            items[index] = ty;
                        } else if index == items.len() {
                            items.push(ty);
                        }
                        self.refine(state, &member.object, Type::Array(items));
                    }
                    other => return Err(no_such_field(&name, &other, member.span)),
                }
                Ok(())
            }
            other => self.visit_expr(state, other).map(|_| ()),
        }
    }

    /// 把新的类型写回标识符或成员路径（`a`、`a.b.c`）
    pub(crate) fn refine(
        &mut self,
        state: &mut FunctionState,
        target: &Expr,
        ty: Type,
    ) {
        match target {
            Expr::Identifier(id) => {
                state.env.scope.assign(&id.name, ty);
            }
            Expr::MemberExpression(member) => {
                let Some(name) = member.static_name() else {
                    return;
                };
                match peek_path(state, &member.object) {
                    Some(Type::Object(parent)) => {
                        self.refine(state, &member.object, Type::Object(parent.with_field(name, ty)));
                    }
                    Some(Type::Array(mut items)) => {
                        if let Some(slot) = name.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                            *slot = ty;
                            self.refine(state, &member.object, Type::Array(items));
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

/// 对非对象类型访问字段
fn no_such_field(
    name: &str,
    object: &Type,
    span: Span,
) -> TypeError {
    TypeError::UndefinedField {
        field: name.to_string(),
        object: object.to_string(),
        span,
    }
}

/// 不求值地读取标识符或成员路径的当前类型
fn peek_path(
    state: &FunctionState,
    expr: &Expr,
) -> Option<Type> {
    match expr {
        Expr::Identifier(id) => state.env.scope.lookup(&id.name).cloned(),
        Expr::MemberExpression(member) => {
            let name = member.static_name()?;
            match peek_path(state, &member.object)? {
                Type::Object(obj) => obj.get(&name).cloned(),
                Type::Array(items) => items.get(name.parse::<usize>().ok()?).cloned(),
                _ => None,
            }
        }
        _ => None,
    }
}

/// 字面量的类型
fn literal_type(
    lit: &Literal,
    state: &mut FunctionState,
) -> Type {
    if lit.regex.is_some() {
        return Type::object([("source", Type::string()), ("flags", Type::string())]);
    }
    match &lit.value {
        serde_json::Value::Number(_) => Type::number(),
        serde_json::Value::String(_) => Type::string(),
        serde_json::Value::Bool(_) => Type::boolean(),
        serde_json::Value::Null => Type::null(),
        _ => state.fresh(),
    }
}
