//! 语句类型推断

use std::rc::Rc;

use super::{widen, FunctionState, Inferrer};
use crate::frontend::ast::{
    ForEachStatement, ForInit, Pattern, ReturnStatement, Stmt, TryStatement, VariableDeclaration,
};
use crate::frontend::core::type_system::{unify, Type};
use crate::frontend::typecheck::errors::TypeResult;
use crate::util::span::Span;

impl Inferrer<'_> {
    /// 推断语句列表
    ///
    /// `start` 是列表所在块的起始偏移。位于上一条语句结束（或块开始）
    /// 与当前语句开始之间的注释声明，在当前语句之前生效。
    pub(crate) fn visit_statements(
        &mut self,
        state: &mut FunctionState,
        body: &[Stmt],
        start: usize,
    ) -> TypeResult<()> {
        let annotations = Rc::clone(&state.env.annotations);
        let mut cursor = start;
        for stmt in body {
            let span = stmt.span();
            for ascription in annotations.between(cursor, span.start.offset) {
                let result = self.apply_ascription(state, ascription);
                self.settle(result)?;
            }
            let result = self.visit_stmt(state, stmt);
            self.settle(result)?;
            cursor = cursor.max(span.end.offset);
        }
        Ok(())
    }

    /// 推断单条语句
    pub(crate) fn visit_stmt(
        &mut self,
        state: &mut FunctionState,
        stmt: &Stmt,
    ) -> TypeResult<()> {
        match stmt {
            Stmt::ExpressionStatement(s) => {
                self.visit_expr(state, &s.expression)?;
            }
            Stmt::VariableDeclaration(decl) => self.visit_var_decl(state, decl)?,
            Stmt::FunctionDeclaration(func) => {
                let name = func.name().map(str::to_string);
                let expected = name
                    .as_deref()
                    .and_then(|n| state.declared_type(n))
                    .cloned();
                let ty = self.infer_function(state, func, expected.as_ref())?;
                if let Some(name) = name {
                    state.env.scope.bind(name, ty);
                }
            }
            Stmt::ReturnStatement(ret) => self.visit_return(state, ret)?,
            Stmt::BlockStatement(block) => {
                self.visit_statements(state, &block.body, block.span.start.offset)?
            }
            Stmt::IfStatement(s) => {
                self.visit_expr(state, &s.test)?;
                self.visit_nested(state, &s.consequent)?;
                if let Some(alternate) = &s.alternate {
                    self.visit_nested(state, alternate)?;
                }
            }
            Stmt::ForStatement(s) => {
                if let Some(init) = &s.init {
                    self.visit_for_init(state, init)?;
                }
                if let Some(test) = &s.test {
                    self.visit_expr(state, test)?;
                }
                if let Some(update) = &s.update {
                    self.visit_expr(state, update)?;
                }
                self.visit_nested(state, &s.body)?;
            }
            Stmt::ForInStatement(s) => {
                self.visit_expr(state, &s.right)?;
                self.bind_loop_target(state, s, Type::string())?;
                self.visit_nested(state, &s.body)?;
            }
            Stmt::ForOfStatement(s) => {
                let iterated = self.visit_expr(state, &s.right)?;
                let element = match iterated {
                    Type::Array(items) if !items.is_empty() => Type::union(items),
                    ty if ty.is_string() => Type::string(),
                    _ => state.fresh(),
                };
                self.bind_loop_target(state, s, element)?;
                self.visit_nested(state, &s.body)?;
            }
            Stmt::WhileStatement(s) | Stmt::DoWhileStatement(s) => {
                self.visit_expr(state, &s.test)?;
                self.visit_nested(state, &s.body)?;
            }
            Stmt::TryStatement(s) => self.visit_try(state, s)?,
            Stmt::ThrowStatement(s) => {
                self.visit_expr(state, &s.argument)?;
            }
            Stmt::EmptyStatement(_) | Stmt::BreakStatement(_) | Stmt::ContinueStatement(_) => {}
            Stmt::Unsupported => tracing::warn!("skipping unsupported statement"),
        }
        Ok(())
    }

    /// 分支、循环体：块按语句列表处理
    fn visit_nested(
        &mut self,
        state: &mut FunctionState,
        stmt: &Stmt,
    ) -> TypeResult<()> {
        match stmt {
            Stmt::BlockStatement(block) => {
                self.visit_statements(state, &block.body, block.span.start.offset)
            }
            other => self.visit_stmt(state, other),
        }
    }

    fn visit_var_decl(
        &mut self,
        state: &mut FunctionState,
        decl: &VariableDeclaration,
    ) -> TypeResult<()> {
        for declarator in &decl.declarations {
            let Some(name) = declarator.id.name() else {
                // 解构模式：只推断初始值
                if let Some(init) = &declarator.init {
                    self.visit_expr(state, init)?;
                }
                continue;
            };
            let expected = state.declared_type(name).cloned();
            let ty = match (&declarator.init, &expected) {
                (Some(init), _) => self.visit_expr_expecting(state, init, expected.as_ref())?,
                (None, Some(declared)) => declared.clone(),
                (None, None) => state.fresh(),
            };
            self.declare(state, name, ty, declarator.span)?;
        }
        Ok(())
    }

    /// 在当前帧声明名字
    ///
    /// 有标注时先与标注合一；同一帧内重复声明按重新赋值处理。
    pub(crate) fn declare(
        &mut self,
        state: &mut FunctionState,
        name: &str,
        ty: Type,
        span: Span,
    ) -> TypeResult<()> {
        let bound = if let Some(declared) = state.declared_type(name) {
            unify(declared, &ty, span)?
        } else if let Some(existing) = state.env.scope.lookup_local(name) {
            widen(existing, &ty, span)
        } else {
            ty
        };
        state.env.scope.bind(name, bound);
        Ok(())
    }

    fn visit_for_init(
        &mut self,
        state: &mut FunctionState,
        init: &ForInit,
    ) -> TypeResult<()> {
        match init {
            ForInit::VariableDeclaration(decl) => self.visit_var_decl(state, decl),
            ForInit::Expression(expr) => self.visit_expr(state, expr).map(|_| ()),
        }
    }

    /// for-in / for-of 的循环变量
    fn bind_loop_target(
        &mut self,
        state: &mut FunctionState,
        stmt: &ForEachStatement,
        element: Type,
    ) -> TypeResult<()> {
        match &stmt.left {
            ForInit::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    if let Some(name) = declarator.id.name() {
                        self.declare(state, name, element.clone(), declarator.span)?;
                    }
                }
                Ok(())
            }
            ForInit::Expression(target) => self.store(state, target, element, stmt.span),
        }
    }

    fn visit_return(
        &mut self,
        state: &mut FunctionState,
        ret: &ReturnStatement,
    ) -> TypeResult<()> {
        let ty = match &ret.argument {
            Some(argument) => self.visit_expr(state, argument)?,
            None => Type::undefined(),
        };
        state.record_return(ty, ret.span);
        Ok(())
    }

    fn visit_try(
        &mut self,
        state: &mut FunctionState,
        stmt: &TryStatement,
    ) -> TypeResult<()> {
        self.visit_statements(state, &stmt.block.body, stmt.block.span.start.offset)?;
        if let Some(handler) = &stmt.handler {
            if let Some(Pattern::Identifier(param)) = &handler.param {
                let error = state.fresh();
                state.env.scope.bind(param.name.clone(), error);
            }
            self.visit_statements(state, &handler.body.body, handler.body.span.start.offset)?;
        }
        if let Some(finalizer) = &stmt.finalizer {
            self.visit_statements(state, &finalizer.body, finalizer.span.start.offset)?;
        }
        Ok(())
    }
}
