//! 结构化合一
//!
//! 左边是期望类型，右边是实际类型。一次合一（例如一次调用的所有参数）
//! 共享同一个 `Unifier`，类型变量的绑定在参数之间传递。

use indexmap::IndexMap;
use std::collections::HashMap;
use std::ops::Range;

use super::mono::{FunctionType, ObjectType, Type};
use super::var::TypeVar;
use crate::frontend::typecheck::errors::{TypeError, TypeResult};
use crate::util::span::Span;

/// 合一器
#[derive(Debug, Default, Clone)]
pub struct Unifier {
    bindings: HashMap<TypeVar, Type>,
}

/// 合一一对类型（一次性绑定）
pub fn unify(
    expected: &Type,
    actual: &Type,
    span: Span,
) -> TypeResult<Type> {
    Unifier::new().unify(expected, actual, span)
}

impl Unifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合一 `expected` 与 `actual`，返回细化后的类型
    pub fn unify(
        &mut self,
        expected: &Type,
        actual: &Type,
        span: Span,
    ) -> TypeResult<Type> {
        match self.unify_inner(expected, actual) {
            Ok(refined) => Ok(self.apply(&refined)),
            Err(conflict) => Err(conflict.into_error(expected, actual, span)),
        }
    }

    /// 变量当前的绑定
    pub fn binding(
        &self,
        var: TypeVar,
    ) -> Option<&Type> {
        self.bindings.get(&var)
    }

    /// 把已绑定的变量代入类型
    pub fn apply(
        &self,
        ty: &Type,
    ) -> Type {
        self.apply_outside(ty, &mut Vec::new())
    }

    /// 只代入不属于外围函数签名的变量
    fn apply_outside(
        &self,
        ty: &Type,
        owned: &mut Vec<Range<u32>>,
    ) -> Type {
        match ty {
            Type::Var(v) if !owned.iter().any(|r| r.contains(&v.index())) => {
                match self.bindings.get(v) {
                    Some(bound) => self.apply_outside(bound, owned),
                    None => ty.clone(),
                }
            }
            Type::Object(obj) => Type::Object(ObjectType {
                fields: obj
                    .fields
                    .iter()
                    .map(|(k, t)| (k.clone(), self.apply_outside(t, owned)))
                    .collect(),
                open: obj.open,
            }),
            Type::Array(items) => {
                Type::Array(items.iter().map(|t| self.apply_outside(t, owned)).collect())
            }
            Type::Union(items) => {
                Type::union(items.iter().map(|t| self.apply_outside(t, owned)).collect())
            }
            Type::Function(f) => {
                owned.push(f.owned.clone());
                let params = f.params.iter().map(|t| self.apply_outside(t, owned)).collect();
                let output = self.apply_outside(&f.output, owned);
                owned.pop();
                Type::Function(FunctionType {
                    params,
                    output: Box::new(output),
                    owned: f.owned.clone(),
                    closure: f.closure.clone(),
                })
            }
            other => other.clone(),
        }
    }

    fn unify_inner(
        &mut self,
        a: &Type,
        b: &Type,
    ) -> Result<Type, Conflict> {
        let a = &self.shallow(a);
        let b = &self.shallow(b);
        match (a, b) {
            (Type::Var(x), Type::Var(y)) if x == y => Ok(a.clone()),
            // 两个开放变量：左边链接到右边
            (Type::Var(x), Type::Var(_)) => {
                self.bindings.insert(*x, b.clone());
                Ok(b.clone())
            }
            (Type::Var(x), _) => self.bind(*x, b),
            (_, Type::Var(y)) => self.bind(*y, a),

            (Type::Primitive(p), Type::Primitive(q)) if p == q => Ok(a.clone()),
            (Type::Value(v), Type::Value(w)) if v == w => Ok(a.clone()),
            (Type::Value(v), Type::Primitive(k)) if v.kind() == *k => Ok(a.clone()),
            (Type::Primitive(k), Type::Value(v)) if v.kind() == *k => Ok(a.clone()),

            (Type::Object(l), Type::Object(r)) => self.unify_objects(l, r),
            (Type::Array(l), Type::Array(r)) => self.unify_arrays(l, r),
            (Type::Function(l), Type::Function(r)) => self.unify_functions(l, r),

            (Type::Union(l), Type::Union(r)) => {
                let mut alternatives = l.clone();
                for alt in r {
                    let matched = (0..alternatives.len())
                        .find_map(|i| self.attempt(&alternatives[i], alt).map(|t| (i, t)));
                    match matched {
                        Some((i, refined)) => alternatives[i] = refined,
                        None => return Err(Conflict::mismatch(a, b)),
                    }
                }
                Ok(Type::union(alternatives))
            }
            (Type::Union(l), _) => {
                for (i, alt) in l.iter().enumerate() {
                    if let Some(refined) = self.attempt(alt, b) {
                        let mut alternatives = l.clone();
                        alternatives[i] = refined;
                        return Ok(Type::union(alternatives));
                    }
                }
                Err(Conflict::mismatch(a, b))
            }

            _ => Err(Conflict::mismatch(a, b)),
        }
    }

    /// 试探合一，失败时撤销这次产生的绑定
    fn attempt(
        &mut self,
        a: &Type,
        b: &Type,
    ) -> Option<Type> {
        let snapshot = self.bindings.clone();
        match self.unify_inner(a, b) {
            Ok(t) => Some(t),
            Err(_) => {
                self.bindings = snapshot;
                None
            }
        }
    }

    /// 沿变量绑定链找到代表类型
    fn shallow(
        &self,
        ty: &Type,
    ) -> Type {
        let mut current = ty.clone();
        while let Type::Var(v) = &current {
            match self.bindings.get(v) {
                Some(bound) => current = bound.clone(),
                None => break,
            }
        }
        current
    }

    fn bind(
        &mut self,
        var: TypeVar,
        ty: &Type,
    ) -> Result<Type, Conflict> {
        self.check_occurs(var, ty)?;
        self.bindings.insert(var, ty.clone());
        Ok(ty.clone())
    }

    fn check_occurs(
        &self,
        var: TypeVar,
        ty: &Type,
    ) -> Result<(), Conflict> {
        let applied = self.apply(ty);
        if applied.occurs(var) {
            return Err(Conflict::new(ConflictKind::Infinite {
                var: var.to_string(),
                ty: applied.to_string(),
            }));
        }
        Ok(())
    }

    fn unify_objects(
        &mut self,
        l: &ObjectType,
        r: &ObjectType,
    ) -> Result<Type, Conflict> {
        let mut fields = IndexMap::with_capacity(l.fields.len());
        for (name, expected) in &l.fields {
            let refined = match r.fields.get(name) {
                Some(actual) => self
                    .unify_inner(expected, actual)
                    .map_err(|c| c.at(format!(".{}", name)))?,
                // 开放对象的形状还没有完全确定
                None if r.open => expected.clone(),
                None => return Err(Conflict::new(ConflictKind::MissingField(name.clone()))),
            };
            fields.insert(name.clone(), refined);
        }
        Ok(Type::Object(ObjectType {
            fields,
            open: r.open,
        }))
    }

    fn unify_arrays(
        &mut self,
        l: &[Type],
        r: &[Type],
    ) -> Result<Type, Conflict> {
        // 只合一两边都有的位置，多出的元素丢弃
        let mut items = Vec::with_capacity(l.len().min(r.len()));
        for (i, (x, y)) in l.iter().zip(r).enumerate() {
            items.push(self.unify_inner(x, y).map_err(|c| c.at(format!("[{}]", i)))?);
        }
        Ok(Type::Array(items))
    }

    fn unify_functions(
        &mut self,
        l: &FunctionType,
        r: &FunctionType,
    ) -> Result<Type, Conflict> {
        if l.arity() != r.arity() {
            return Err(Conflict::new(ConflictKind::Arity {
                expected: l.arity(),
                found: r.arity(),
            }));
        }
        let mut params = Vec::with_capacity(l.arity());
        for (i, (x, y)) in l.params.iter().zip(&r.params).enumerate() {
            params.push(
                self.unify_inner(x, y)
                    .map_err(|c| c.at(format!("(parameter {})", i + 1)))?,
            );
        }
        let output = self
            .unify_inner(&l.output, &r.output)
            .map_err(|c| c.at("(return)".to_string()))?;
        let source = if r.closure.is_some() { r } else { l };
        Ok(Type::Function(FunctionType {
            params,
            output: Box::new(output),
            owned: source.owned.clone(),
            closure: source.closure.clone(),
        }))
    }
}

/// 合一失败的原因和发生位置
#[derive(Debug)]
struct Conflict {
    /// 从外到内的路径，例如 `.name`、`[0]`
    path: Vec<String>,
    kind: ConflictKind,
}

#[derive(Debug)]
enum ConflictKind {
    Mismatch { expected: String, found: String },
    MissingField(String),
    Arity { expected: usize, found: usize },
    Infinite { var: String, ty: String },
}

impl Conflict {
    fn new(kind: ConflictKind) -> Self {
        Self {
            path: Vec::new(),
            kind,
        }
    }

    fn mismatch(
        expected: &Type,
        found: &Type,
    ) -> Self {
        Self::new(ConflictKind::Mismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }

    /// 在路径前加一段（错误向外传播时调用）
    fn at(
        mut self,
        segment: String,
    ) -> Self {
        self.path.insert(0, segment);
        self
    }

    fn into_error(
        self,
        expected: &Type,
        actual: &Type,
        span: Span,
    ) -> TypeError {
        let detail = match self.kind {
            ConflictKind::Arity { expected, found } if self.path.is_empty() => {
                return TypeError::ArityMismatch {
                    expected,
                    found,
                    span,
                };
            }
            ConflictKind::Mismatch { expected, found } if self.path.is_empty() => {
                return TypeError::TypeMismatch {
                    expected,
                    found,
                    note: None,
                    span,
                };
            }
            ConflictKind::Mismatch { expected, found } => {
                format!("expected {}, found {}", expected, found)
            }
            ConflictKind::MissingField(name) => format!("missing field '{}'", name),
            ConflictKind::Arity { expected, found } => {
                format!("expected {} parameters, found {}", expected, found)
            }
            ConflictKind::Infinite { var, ty } => format!("infinite type {} = {}", var, ty),
        };
        let note = if self.path.is_empty() {
            detail
        } else {
            format!("at {}: {}", self.path.concat(), detail)
        };
        TypeError::TypeMismatch {
            expected: expected.to_string(),
            found: actual.to_string(),
            note: Some(note),
            span,
        }
    }
}
