//! 类型定义
//!
//! 实现结构化类型：
//! - Type: 推断结果的统一表示
//! - ObjectType: 对象类型（字段有序，可开放）
//! - FunctionType: 函数类型（可携带闭包）
//! - LiteralValue: 字面量类型的取值

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use super::var::TypeVar;
use crate::frontend::ast;
use crate::frontend::typecheck::inference::Environment;

/// 类型别名表（注释中 `Name = Type` 声明的别名）
pub type Aliases = IndexMap<String, Type>;

/// 基本类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Number => "Number",
            PrimitiveKind::String => "String",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Null => "Null",
            PrimitiveKind::Undefined => "Undefined",
        }
    }

    /// 按名字查找（不区分大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "number" => Some(PrimitiveKind::Number),
            "string" => Some(PrimitiveKind::String),
            "boolean" => Some(PrimitiveKind::Boolean),
            "null" => Some(PrimitiveKind::Null),
            "undefined" => Some(PrimitiveKind::Undefined),
            _ => None,
        }
    }
}

/// 字面量类型的取值
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

impl LiteralValue {
    /// 字面量所属的基本类型
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            LiteralValue::Number(_) => PrimitiveKind::Number,
            LiteralValue::String(_) => PrimitiveKind::String,
            LiteralValue::Boolean(_) => PrimitiveKind::Boolean,
            LiteralValue::Null => PrimitiveKind::Null,
            LiteralValue::Undefined => PrimitiveKind::Undefined,
        }
    }
}

/// 对象类型
///
/// 字段按插入顺序保存。开放对象（由成员访问推出的形状）访问未知字段时
/// 会长出新字段；封闭对象（字面量、注释声明）访问未知字段是错误。
#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    pub fields: IndexMap<String, Type>,
    pub open: bool,
}

impl ObjectType {
    pub fn closed(fields: IndexMap<String, Type>) -> Self {
        Self {
            fields,
            open: false,
        }
    }

    pub fn open(fields: IndexMap<String, Type>) -> Self {
        Self { fields, open: true }
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Type> {
        self.fields.get(name)
    }

    /// 设置字段（已有字段保持原位置）
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        ty: Type,
    ) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }
}

/// 字段集合相同即相等，开放标记不参与比较
impl PartialEq for ObjectType {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.fields == other.fields
    }
}

/// 函数声明点捕获的环境
#[derive(Clone)]
pub struct Closure {
    /// 声明点的作用域快照、别名和注释
    pub env: Environment,
    /// 函数节点
    pub function: Rc<ast::Function>,
    /// 环境中自由出现的类型变量，升序
    free: Vec<TypeVar>,
}

/// 一次代入中已经重建过的闭包（同一个闭包可能从多条路径到达）
pub type ClosureMemo = HashMap<*const Closure, Rc<Closure>>;

impl Closure {
    pub fn new(
        env: Environment,
        function: Rc<ast::Function>,
    ) -> Self {
        let mut free = Vec::new();
        for ty in env.scope.types() {
            ty.collect_free_vars(&mut free);
        }
        free.sort_unstable();
        free.dedup();
        Self {
            env,
            function,
            free,
        }
    }

    /// 捕获的环境中自由出现的变量
    pub fn free_vars(&self) -> &[TypeVar] {
        &self.free
    }

    pub fn mentions(
        &self,
        var: TypeVar,
    ) -> bool {
        self.free.binary_search(&var).is_ok()
    }

    /// 在捕获的环境中代入；环境里没有 `var` 时共享原闭包
    fn substitute_in(
        self: &Rc<Self>,
        var: TypeVar,
        replacement: &Type,
        memo: &mut ClosureMemo,
    ) -> Rc<Self> {
        if !self.mentions(var) {
            return Rc::clone(self);
        }
        let key = Rc::as_ptr(self);
        if let Some(done) = memo.get(&key) {
            return Rc::clone(done);
        }
        let mut env = self.env.clone();
        env.scope.substitute_in(var, replacement, memo);
        let rebuilt = Rc::new(Closure::new(env, Rc::clone(&self.function)));
        memo.insert(key, Rc::clone(&rebuilt));
        rebuilt
    }
}

impl fmt::Debug for Closure {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Closure")
            .field("function", &self.function.name().unwrap_or("<anonymous>"))
            .field("span", &self.function.span)
            .finish()
    }
}

/// 函数类型
///
/// 编号落在 `owned` 区间内的类型变量属于这个签名本身，
/// 区间外的是从外层捕获（或在外层收窄时带进来）的变量。
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub output: Box<Type>,
    pub owned: Range<u32>,
    pub closure: Option<Rc<Closure>>,
}

impl FunctionType {
    /// 没有闭包的签名（注释声明、内置绑定）
    pub fn signature(
        params: Vec<Type>,
        output: Type,
    ) -> Self {
        Self {
            params,
            output: Box::new(output),
            owned: 0..TypeVar::RESERVED,
            closure: None,
        }
    }

    /// 不拥有任何变量的签名（收窄开放变量时构造）
    pub fn borrowed(
        params: Vec<Type>,
        output: Type,
    ) -> Self {
        Self {
            params,
            output: Box::new(output),
            owned: 0..0,
            closure: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// 去掉闭包，只保留签名
    pub fn without_closure(&self) -> Self {
        Self {
            closure: None,
            ..self.clone()
        }
    }

    /// 变量是否属于这个签名本身
    pub fn owns(
        &self,
        var: TypeVar,
    ) -> bool {
        self.owned.contains(&var.index())
    }
}

/// 参数和返回类型相同即相等，闭包不参与比较
impl PartialEq for FunctionType {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.params == other.params && self.output == other.output
    }
}

/// 类型
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// 基本类型
    Primitive(PrimitiveKind),
    /// 类型变量（尚未确定）
    Var(TypeVar),
    /// 对象
    Object(ObjectType),
    /// 按位置记录元素类型的数组
    Array(Vec<Type>),
    /// 函数
    Function(FunctionType),
    /// 联合类型，打印为 `Any([...])`
    Union(Vec<Type>),
    /// 字面量类型
    Value(LiteralValue),
}

impl Type {
    pub fn number() -> Self {
        Type::Primitive(PrimitiveKind::Number)
    }

    pub fn string() -> Self {
        Type::Primitive(PrimitiveKind::String)
    }

    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveKind::Boolean)
    }

    pub fn null() -> Self {
        Type::Primitive(PrimitiveKind::Null)
    }

    pub fn undefined() -> Self {
        Type::Primitive(PrimitiveKind::Undefined)
    }

    pub fn var(index: u32) -> Self {
        Type::Var(TypeVar::new(index))
    }

    /// 封闭对象
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Object(ObjectType::closed(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// 开放对象
    pub fn open_object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Object(ObjectType::open(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn array(elements: Vec<Type>) -> Self {
        Type::Array(elements)
    }

    pub fn function(
        params: Vec<Type>,
        output: Type,
    ) -> Self {
        Type::Function(FunctionType::signature(params, output))
    }

    /// 合并为联合类型：展开嵌套联合、按首次出现去重，只剩一个时直接返回
    pub fn union(alternatives: Vec<Type>) -> Self {
        let mut flat: Vec<Type> = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            match alt {
                Type::Union(inner) => {
                    for t in inner {
                        if !flat.contains(&t) {
                            flat.push(t);
                        }
                    }
                }
                t => {
                    if !flat.contains(&t) {
                        flat.push(t);
                    }
                }
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Type::Union(flat)
        }
    }

    /// 两个类型的并
    pub fn union_of(
        first: Type,
        second: Type,
    ) -> Self {
        Self::union(vec![first, second])
    }

    pub fn value(lit: LiteralValue) -> Self {
        Type::Value(lit)
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    pub fn as_var(&self) -> Option<TypeVar> {
        match self {
            Type::Var(v) => Some(*v),
            _ => None,
        }
    }

    /// 基本类型或同类字面量
    pub fn is_kind(
        &self,
        kind: PrimitiveKind,
    ) -> bool {
        match self {
            Type::Primitive(k) => *k == kind,
            Type::Value(lit) => lit.kind() == kind,
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        self.is_kind(PrimitiveKind::Number)
    }

    pub fn is_string(&self) -> bool {
        self.is_kind(PrimitiveKind::String)
    }

    /// `var` 是否自由出现
    ///
    /// 不计函数签名自有的同号变量，计入闭包捕获的环境。
    pub fn mentions(
        &self,
        var: TypeVar,
    ) -> bool {
        match self {
            Type::Var(v) => *v == var,
            Type::Object(obj) => obj.fields.values().any(|t| t.mentions(var)),
            Type::Array(items) | Type::Union(items) => items.iter().any(|t| t.mentions(var)),
            Type::Function(f) => {
                !f.owns(var)
                    && (f.params.iter().any(|t| t.mentions(var))
                        || f.output.mentions(var)
                        || f.closure.as_ref().is_some_and(|c| c.mentions(var)))
            }
            Type::Primitive(_) | Type::Value(_) => false,
        }
    }

    /// 收集自由出现的变量（可能重复）
    pub fn collect_free_vars(
        &self,
        out: &mut Vec<TypeVar>,
    ) {
        match self {
            Type::Var(v) => out.push(*v),
            Type::Object(obj) => obj.fields.values().for_each(|t| t.collect_free_vars(out)),
            Type::Array(items) | Type::Union(items) => {
                items.iter().for_each(|t| t.collect_free_vars(out))
            }
            Type::Function(f) => {
                let mut inner = Vec::new();
                f.params.iter().for_each(|t| t.collect_free_vars(&mut inner));
                f.output.collect_free_vars(&mut inner);
                if let Some(closure) = &f.closure {
                    inner.extend_from_slice(closure.free_vars());
                }
                out.extend(inner.into_iter().filter(|v| !f.owns(*v)));
            }
            Type::Primitive(_) | Type::Value(_) => {}
        }
    }

    /// 自由变量编号的上界（不含），不计占位变量
    pub fn free_var_ceiling(&self) -> u32 {
        let mut free = Vec::new();
        self.collect_free_vars(&mut free);
        free.iter()
            .filter(|v| !v.is_placeholder())
            .map(|v| v.index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// 是否出现某个类型变量（包括函数签名自有的变量）
    pub fn occurs(
        &self,
        var: TypeVar,
    ) -> bool {
        match self {
            Type::Var(v) => *v == var,
            Type::Object(obj) => obj.fields.values().any(|t| t.occurs(var)),
            Type::Array(items) | Type::Union(items) => items.iter().any(|t| t.occurs(var)),
            Type::Function(f) => f.params.iter().any(|t| t.occurs(var)) || f.output.occurs(var),
            Type::Primitive(_) | Type::Value(_) => false,
        }
    }

    /// 把自由出现的 `var` 替换为 `replacement`
    ///
    /// 函数签名自有的同号变量是另一个变量，不替换。
    /// 闭包捕获的环境里的出现也一起替换。
    pub fn substitute(
        &self,
        var: TypeVar,
        replacement: &Type,
    ) -> Type {
        self.substitute_in(var, replacement, &mut ClosureMemo::new())
    }

    pub(crate) fn substitute_in(
        &self,
        var: TypeVar,
        replacement: &Type,
        memo: &mut ClosureMemo,
    ) -> Type {
        match self {
            Type::Var(v) if *v == var => replacement.clone(),
            Type::Object(obj) => Type::Object(ObjectType {
                fields: obj
                    .fields
                    .iter()
                    .map(|(k, t)| (k.clone(), t.substitute_in(var, replacement, memo)))
                    .collect(),
                open: obj.open,
            }),
            Type::Array(items) => Type::Array(
                items
                    .iter()
                    .map(|t| t.substitute_in(var, replacement, memo))
                    .collect(),
            ),
            Type::Union(items) => Type::union(
                items
                    .iter()
                    .map(|t| t.substitute_in(var, replacement, memo))
                    .collect(),
            ),
            Type::Function(f) if !f.owns(var) => Type::Function(FunctionType {
                params: f
                    .params
                    .iter()
                    .map(|t| t.substitute_in(var, replacement, memo))
                    .collect(),
                output: Box::new(f.output.substitute_in(var, replacement, memo)),
                owned: f.owned.clone(),
                closure: f
                    .closure
                    .as_ref()
                    .map(|c| c.substitute_in(var, replacement, memo)),
            }),
            other => other.clone(),
        }
    }

    /// 按映射替换所有变量（不区分归属）
    pub fn map_vars<F>(
        &self,
        f: &mut F,
    ) -> Type
    where
        F: FnMut(TypeVar) -> Type,
    {
        match self {
            Type::Var(v) => f(*v),
            Type::Object(obj) => Type::Object(ObjectType {
                fields: obj
                    .fields
                    .iter()
                    .map(|(k, t)| (k.clone(), t.map_vars(f)))
                    .collect(),
                open: obj.open,
            }),
            Type::Array(items) => Type::Array(items.iter().map(|t| t.map_vars(f)).collect()),
            Type::Union(items) => Type::union(items.iter().map(|t| t.map_vars(f)).collect()),
            Type::Function(func) => Type::Function(FunctionType {
                params: func.params.iter().map(|t| t.map_vars(f)).collect(),
                output: Box::new(func.output.map_vars(f)),
                owned: func.owned.clone(),
                closure: func.closure.clone(),
            }),
            other => other.clone(),
        }
    }

    /// 类型名称（用于错误信息）
    pub fn type_name(&self) -> String {
        self.to_string()
    }
}

impl From<PrimitiveKind> for Type {
    fn from(kind: PrimitiveKind) -> Self {
        Type::Primitive(kind)
    }
}

impl From<FunctionType> for Type {
    fn from(f: FunctionType) -> Self {
        Type::Function(f)
    }
}

impl From<ObjectType> for Type {
    fn from(obj: ObjectType) -> Self {
        Type::Object(obj)
    }
}
