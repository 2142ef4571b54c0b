//! 函数推断与调用
//!
//! 声明点：参数绑定为新变量推断函数体，得到带闭包的函数类型。
//! 调用点：参数与实参合一；有闭包时用合一后的参数类型在捕获的作用域中
//! 重新推断函数体，得到这次调用的返回类型。

use std::collections::HashMap;
use std::rc::Rc;

use super::{FunctionState, Inferrer};
use crate::frontend::ast::{CallExpression, Expr, Function, FunctionBody, Pattern};
use crate::frontend::core::type_system::{
    unify, Closure, FunctionType, Type, TypeVar, Unifier,
};
use crate::frontend::typecheck::errors::{TypeError, TypeResult};
use crate::util::span::Span;

impl Inferrer<'_> {
    /// 声明点推断函数
    ///
    /// `expected` 是标注的签名：参数类型从标注取，结果再与标注合一。
    /// 函数体出错时结果是一个新变量。
    pub(crate) fn infer_function(
        &mut self,
        state: &mut FunctionState,
        func: &Rc<Function>,
        expected: Option<&Type>,
    ) -> TypeResult<Type> {
        let signature = match expected {
            Some(Type::Function(f)) => {
                if f.arity() != func.params.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: f.arity(),
                        found: func.params.len(),
                        span: func.span,
                    });
                }
                Some(f)
            }
            _ => None,
        };

        let base = state.child_base();
        let mut child = FunctionState::enter(&state.env, base);
        tracing::debug!(
            "infer function {} (vars from {})",
            func.name().unwrap_or("<anonymous>"),
            TypeVar::new(base)
        );

        for (i, param) in func.params.iter().enumerate() {
            let seed = signature.map(|f| f.params[i].clone());
            let ty = match param {
                Pattern::AssignmentPattern(p) => {
                    let default = self.visit_expr(&mut child, &p.right)?;
                    match seed {
                        Some(seed) => unify(&seed, &default, p.span)?,
                        None => default,
                    }
                }
                _ => seed.unwrap_or_else(|| child.fresh()),
            };
            if let Some(name) = param.name() {
                child.env.scope.bind(name, ty);
            }
        }

        // 递归引用自身：标注的签名，或者一个不占编号的占位变量
        let recursion = TypeVar::placeholder(child.env.scope.depth());
        if let Some(name) = func.name() {
            let own = expected.cloned().unwrap_or(Type::Var(recursion));
            child.env.scope.bind(name, own);
        }

        let before = self.errors.len();
        let body = self.visit_body(&mut child, func);
        state.vars.advance_to(child.vars.peek());
        body?;
        if self.errors.len() > before {
            tracing::debug!("function body failed, typed as an open variable");
            return Ok(state.fresh());
        }

        let mut params: Vec<Type> = Vec::with_capacity(func.params.len());
        for param in &func.params {
            let ty = param
                .name()
                .and_then(|name| child.env.scope.lookup_local(name).cloned());
            params.push(ty.unwrap_or_else(|| child.fresh()));
        }
        let mut output = child.return_type();
        if output.mentions(recursion) || params.iter().any(|p| p.mentions(recursion)) {
            let open = child.fresh();
            output = output.substitute(recursion, &open);
            params = params.iter().map(|p| p.substitute(recursion, &open)).collect();
        }
        let end = child.vars.peek();
        state.vars.advance_to(end);

        let inferred = Type::Function(FunctionType {
            params,
            output: Box::new(output),
            owned: base..end,
            closure: Some(Rc::new(Closure::new(state.env.clone(), Rc::clone(func)))),
        });
        match expected {
            Some(expected) => unify(expected, &inferred, func.span),
            None => Ok(inferred),
        }
    }

    /// 推断函数体；表达式体的值就是返回值
    fn visit_body(
        &mut self,
        child: &mut FunctionState,
        func: &Function,
    ) -> TypeResult<()> {
        match &func.body {
            FunctionBody::BlockStatement(block) => {
                self.visit_statements(child, &block.body, block.span.start.offset)
            }
            FunctionBody::Expression(expr) => {
                let result = self
                    .visit_expr(child, expr)
                    .map(|ty| child.record_return(ty, expr.span()));
                self.settle(result)
            }
        }
    }

    pub(crate) fn visit_call(
        &mut self,
        state: &mut FunctionState,
        call: &CallExpression,
    ) -> TypeResult<Type> {
        if calls_builtin_require(state, call) {
            let Some(specifier) = require_specifier(call) else {
                return Err(TypeError::InvalidImport {
                    specifier: "<dynamic>".to_string(),
                    reason: "require takes a single string literal".to_string(),
                    span: call.span,
                });
            };
            return self.visit_require(state, &specifier, call.span);
        }

        let callee = self.visit_expr(state, &call.callee)?;
        let pinned = state.pin(&callee);
        let args = self.visit_arguments(state, &call.arguments);
        state.unpin(pinned);
        let args = args?;

        match callee {
            Type::Function(f) => self.apply_function(state, &f, &call.arguments, args, call.span),
            Type::Var(var) => {
                // 调用开放变量：它一定是接受这些参数的函数
                let output = state.fresh();
                let narrowed = FunctionType::borrowed(args, output.clone());
                state.narrow(var, Type::Function(narrowed));
                Ok(output)
            }
            other => Err(TypeError::NotCallable {
                ty: other.to_string(),
                span: call.callee.span(),
            }),
        }
    }

    /// 按顺序推断实参；已经推断出的实参在后面的函数字面量推断时保持占用
    fn visit_arguments(
        &mut self,
        state: &mut FunctionState,
        arguments: &[Expr],
    ) -> TypeResult<Vec<Type>> {
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let ty = self.visit_expr(state, argument)?;
            state.pin(&ty);
            args.push(ty);
        }
        Ok(args)
    }

    /// 用实参调用函数类型
    fn apply_function(
        &mut self,
        state: &mut FunctionState,
        f: &FunctionType,
        arg_exprs: &[Expr],
        args: Vec<Type>,
        span: Span,
    ) -> TypeResult<Type> {
        if f.arity() != args.len() {
            return Err(TypeError::ArityMismatch {
                expected: f.arity(),
                found: args.len(),
                span,
            });
        }

        let (params, output) = instantiate(state, f);
        let mut unifier = Unifier::new();
        let mut refined = Vec::with_capacity(args.len());
        for ((param, arg), expr) in params.iter().zip(&args).zip(arg_exprs) {
            let arg_span = if expr.span().is_dummy() { span } else { expr.span() };
            refined.push(unifier.unify(param, arg, arg_span)?);
        }
        let refined: Vec<Type> = refined.iter().map(|t| unifier.apply(t)).collect();

        // 作为实参传入的开放变量按参数类型收窄
        for (arg, ty) in args.iter().zip(&refined) {
            if let Type::Var(var) = arg {
                state.narrow(*var, ty.clone());
            }
        }

        match &f.closure {
            None => Ok(unifier.apply(&output)),
            Some(closure) => {
                if self.depth >= self.config.max_call_depth {
                    return Err(TypeError::RecursionLimit {
                        limit: self.config.max_call_depth,
                        span,
                    });
                }
                self.depth += 1;
                let result = self.reinstantiate(state, f, closure, refined, span);
                self.depth -= 1;
                result
            }
        }
    }

    /// 在闭包捕获的作用域中用具体参数类型重新推断函数体
    fn reinstantiate(
        &mut self,
        state: &mut FunctionState,
        f: &FunctionType,
        closure: &Closure,
        params: Vec<Type>,
        span: Span,
    ) -> TypeResult<Type> {
        let func = &closure.function;
        tracing::debug!(
            "instantiate {} at {} (depth {})",
            func.name().unwrap_or("<anonymous>"),
            span,
            self.depth
        );

        let base = params
            .iter()
            .map(Type::free_var_ceiling)
            .chain([state.vars.peek(), closure.env.scope.free_var_ceiling()])
            .max()
            .unwrap_or(0);
        let mut child = FunctionState::enter(&closure.env, base);
        if let Some(name) = func.name() {
            child
                .env
                .scope
                .bind(name, Type::Function(f.without_closure()));
        }
        for (param, ty) in func.params.iter().zip(params) {
            if let Some(name) = param.name() {
                child.env.scope.bind(name, ty);
            }
        }

        let before = self.errors.len();
        let body = self.visit_body(&mut child, func);
        state.vars.advance_to(child.vars.peek());
        body?;
        if self.errors.len() > before {
            return Ok(state.fresh());
        }
        Ok(child.return_type())
    }

    /// `require("...")`
    fn visit_require(
        &mut self,
        state: &mut FunctionState,
        specifier: &str,
        span: Span,
    ) -> TypeResult<Type> {
        let config = self.config;
        let unit = state.env.unit.clone();
        self.modules
            .import(specifier, unit.as_deref(), config, span)
    }
}

/// 把签名自有的变量换成调用方的新变量
fn instantiate(
    state: &mut FunctionState,
    f: &FunctionType,
) -> (Vec<Type>, Type) {
    let mut renamed: HashMap<TypeVar, Type> = HashMap::new();
    let mut rename = |var: TypeVar| {
        if f.owns(var) {
            renamed.entry(var).or_insert_with(|| state.fresh()).clone()
        } else {
            Type::Var(var)
        }
    };
    let params = f.params.iter().map(|p| p.map_vars(&mut rename)).collect();
    let output = f.output.map_vars(&mut rename);
    (params, output)
}

/// `require` 的字面量参数
fn require_specifier(call: &CallExpression) -> Option<String> {
    match call.arguments.as_slice() {
        [Expr::Literal(lit)] if lit.regex.is_none() => lit.value.as_str().map(str::to_string),
        _ => None,
    }
}

/// 调用的是内置 `require`（没有被程序遮蔽）
fn calls_builtin_require(
    state: &FunctionState,
    call: &CallExpression,
) -> bool {
    let Expr::Identifier(callee) = call.callee.as_ref() else {
        return false;
    };
    callee.name == "require"
        && matches!(state.env.scope.depth_of("require"), None | Some(1))
}
