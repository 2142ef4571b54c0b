//! 类型推断
//!
//! 按语法树遍历程序，为每个绑定推断结构化类型：
//! - statements: 语句与语句列表（注释声明在这里生效）
//! - expressions: 表达式
//! - operators: 运算符
//! - functions: 函数推断与调用点重新实例化

pub mod expressions;
pub mod functions;
pub mod operators;
pub mod statements;

use indexmap::IndexMap;
use std::rc::Rc;

use super::ascription::{resolve, Annotations, Ascription, Declaration};
use super::errors::{ErrorCollector, TypeError, TypeResult};
use super::scope::Scope;
use crate::frontend::ast::Program;
use crate::frontend::core::type_system::{unify, Aliases, Type, TypeVar, VarGen};
use crate::frontend::module::ModuleBridge;
use crate::util::config::CheckConfig;
use crate::util::span::Span;

/// 函数作用域中保存返回类型的保留名
pub const RETURN_SLOT: &str = "return";

/// 名字标注：声明时所在帧的深度和声明的类型
#[derive(Debug, Clone, PartialEq)]
pub struct Declared {
    pub depth: usize,
    pub ty: Type,
}

/// 推断环境；函数声明时整体快照进闭包
#[derive(Debug, Clone)]
pub struct Environment {
    pub scope: Scope,
    pub aliases: Aliases,
    pub declared: IndexMap<String, Declared>,
    pub annotations: Rc<Annotations>,
    /// 当前模块的标识（解析相对 require 用）
    pub unit: Option<Rc<str>>,
}

impl Environment {
    pub fn new(
        scope: Scope,
        annotations: Annotations,
        unit: Option<&str>,
    ) -> Self {
        Self {
            scope,
            aliases: Aliases::new(),
            declared: IndexMap::new(),
            annotations: Rc::new(annotations),
            unit: unit.map(Rc::from),
        }
    }
}

/// 一个函数体（或程序顶层）的推断状态
#[derive(Debug)]
pub struct FunctionState {
    pub env: Environment,
    pub vars: VarGen,
    /// 正在求值、还没写回作用域的类型占用的编号上界
    live: u32,
    /// 顶层没有返回槽
    in_function: bool,
}

impl FunctionState {
    /// 程序顶层
    pub fn top_level(env: Environment) -> Self {
        Self {
            env,
            vars: VarGen::default(),
            live: 0,
            in_function: false,
        }
    }

    /// 在 `env` 之上压入函数帧，变量编号从 `base` 开始
    pub fn enter(
        env: &Environment,
        base: u32,
    ) -> Self {
        let mut env = env.clone();
        env.scope.enter();
        Self {
            env,
            vars: VarGen::starting_at(base),
            live: 0,
            in_function: true,
        }
    }

    /// 在这里声明的函数从哪个编号开始：避开它能看到的所有自由变量
    pub fn child_base(&self) -> u32 {
        self.env.scope.free_var_ceiling().max(self.live)
    }

    /// 记下一个暂存的类型，之后声明的函数不与它的变量重号；返回原来的下界
    pub(crate) fn pin(
        &mut self,
        ty: &Type,
    ) -> u32 {
        let previous = self.live;
        self.live = self.live.max(ty.free_var_ceiling());
        previous
    }

    pub(crate) fn unpin(
        &mut self,
        previous: u32,
    ) {
        self.live = previous;
    }

    /// 新类型变量
    pub fn fresh(&mut self) -> Type {
        Type::Var(self.vars.fresh())
    }

    /// 把开放变量收窄为更具体的类型（作用域中所有出现都会更新）
    pub fn narrow(
        &mut self,
        var: TypeVar,
        ty: Type,
    ) {
        if ty.mentions(var) {
            return;
        }
        tracing::trace!("narrow {} := {}", var, ty);
        self.env.scope.substitute(var, &ty);
    }

    /// 对拥有该名字的帧仍然有效的标注
    pub fn declared_type(
        &self,
        name: &str,
    ) -> Option<&Type> {
        let declared = self.env.declared.get(name)?;
        (self.env.scope.depth_of(name) == Some(declared.depth)).then_some(&declared.ty)
    }

    /// 合并一个 return 的类型
    pub fn record_return(
        &mut self,
        ty: Type,
        span: Span,
    ) {
        if !self.in_function {
            return;
        }
        let merged = match self.env.scope.lookup_local(RETURN_SLOT) {
            Some(previous) => widen(previous, &ty, span),
            None => ty,
        };
        self.env.scope.bind(RETURN_SLOT, merged);
    }

    /// 函数的返回类型；没有 return 时为 Undefined
    pub fn return_type(&self) -> Type {
        self.env
            .scope
            .lookup_local(RETURN_SLOT)
            .cloned()
            .unwrap_or_else(Type::undefined)
    }
}

/// 重新赋值的类型：能合一就取合一结果，否则并入联合类型
pub fn widen(
    existing: &Type,
    new: &Type,
    span: Span,
) -> Type {
    match unify(new, existing, span) {
        Ok(refined) => refined,
        Err(_) => Type::union_of(existing.clone(), new.clone()),
    }
}

/// 推断结果
#[derive(Debug, Clone)]
pub struct Inference {
    scope: Scope,
    pub errors: Vec<TypeError>,
}

impl Inference {
    /// 只有一个错误、没有绑定的结果
    pub fn from_error(error: TypeError) -> Self {
        Self {
            scope: Scope::new(),
            errors: vec![error],
        }
    }

    /// 查找绑定
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Type> {
        self.scope.lookup(name)
    }

    /// 所有可见绑定（包括全局绑定）
    pub fn bindings(&self) -> IndexMap<String, Type> {
        self.scope.visible_bindings()
    }

    /// 程序本身声明的绑定
    pub fn program_bindings(&self) -> &IndexMap<String, Type> {
        self.scope.local_bindings()
    }

    /// `module.exports` 的类型
    pub fn exports(&self) -> Option<&Type> {
        match self.scope.lookup("module")? {
            Type::Object(module) => module.get("exports"),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// 推断器：一次检查中跨函数共享的部分
pub struct Inferrer<'m> {
    config: &'m CheckConfig,
    modules: &'m mut ModuleBridge,
    errors: ErrorCollector,
    /// 当前调用点重新实例化的嵌套深度
    depth: usize,
}

impl<'m> Inferrer<'m> {
    pub fn new(
        config: &'m CheckConfig,
        modules: &'m mut ModuleBridge,
    ) -> Self {
        Self {
            config,
            modules,
            errors: ErrorCollector::new(),
            depth: 0,
        }
    }

    /// 处理一条语句的结果：收集模式下记录错误并继续
    pub(crate) fn settle(
        &mut self,
        result: TypeResult<()>,
    ) -> TypeResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if self.config.fail_fast || err.is_fatal() => Err(err),
            Err(err) => {
                tracing::debug!("{} at {}", err, err.span());
                self.errors.add_error(err);
                Ok(())
            }
        }
    }

    /// 让一条注释声明生效
    pub(crate) fn apply_ascription(
        &mut self,
        state: &mut FunctionState,
        ascription: &Ascription,
    ) -> TypeResult<()> {
        let syntax_error = |message: String| TypeError::SyntaxError {
            message,
            span: ascription.span,
        };
        match &ascription.declaration {
            Declaration::Alias { name, ty } => {
                let resolved = resolve(ty, &state.env.aliases).map_err(syntax_error)?;
                tracing::debug!("alias {} = {}", name, resolved);
                state.env.aliases.insert(name.clone(), resolved);
            }
            Declaration::Ascribe { name, ty } => {
                let resolved = resolve(ty, &state.env.aliases).map_err(syntax_error)?;
                tracing::debug!("ascribe {} : {}", name, resolved);
                state.env.scope.bind(name.clone(), resolved.clone());
                let depth = state.env.scope.depth();
                state.env.declared.insert(
                    name.clone(),
                    Declared {
                        depth,
                        ty: resolved,
                    },
                );
            }
        }
        Ok(())
    }

    pub fn into_errors(self) -> Vec<TypeError> {
        self.errors.into_errors()
    }
}

/// 推断一个程序
///
/// 收集模式下总是返回 `Ok`，错误放在结果里；遇错即停模式下返回第一个错误。
pub fn infer_program(
    program: &Program,
    globals: IndexMap<String, Type>,
    config: &CheckConfig,
    modules: &mut ModuleBridge,
    unit: Option<&str>,
) -> TypeResult<Inference> {
    let (annotations, syntax_errors) = Annotations::from_comments(&program.comments);
    tracing::debug!(
        "inferring {} ({} statements, {} annotations)",
        unit.unwrap_or("<program>"),
        program.body.len(),
        annotations.len()
    );

    let mut inferrer = Inferrer::new(config, modules);
    for err in syntax_errors {
        inferrer.settle(Err(err))?;
    }

    let scope = Scope::with_bindings(globals).child(std::iter::empty());
    let mut state = FunctionState::top_level(Environment::new(scope, annotations, unit));
    let outcome =
        inferrer.visit_statements(&mut state, &program.body, program.span.start.offset);
    match outcome {
        Ok(()) => {}
        Err(err) if !config.fail_fast => inferrer.errors.add_error(err),
        Err(err) => return Err(err),
    }

    Ok(Inference {
        scope: state.env.scope,
        errors: inferrer.into_errors(),
    })
}
