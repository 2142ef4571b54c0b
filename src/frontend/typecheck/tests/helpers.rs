//! 测试用的语法树构造函数
//!
//! 位置默认为空；需要注释声明的测试用 [`at`] 给语句补上偏移。

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::json;

use crate::frontend::ast::*;
use crate::frontend::core::type_system::Type;
use crate::frontend::typecheck::{default_bindings, infer_program, Inference, TypeResult};
use crate::frontend::module::ModuleBridge;
use crate::util::config::CheckConfig;
use crate::util::span::Span;

pub fn identifier(name: &str) -> Identifier {
    Identifier {
        name: name.to_string(),
        span: Span::dummy(),
    }
}

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(identifier(name))
}

fn literal(value: serde_json::Value) -> Expr {
    Expr::Literal(Literal {
        value,
        regex: None,
        span: Span::dummy(),
    })
}

pub fn num(n: i64) -> Expr {
    literal(json!(n))
}

pub fn string(s: &str) -> Expr {
    literal(json!(s))
}

pub fn boolean(b: bool) -> Expr {
    literal(json!(b))
}

pub fn null() -> Expr {
    literal(serde_json::Value::Null)
}

pub fn regex(pattern: &str) -> Expr {
    Expr::Literal(Literal {
        value: json!({}),
        regex: Some(json!({"pattern": pattern, "flags": ""})),
        span: Span::dummy(),
    })
}

pub fn binary(
    operator: &str,
    left: Expr,
    right: Expr,
) -> Expr {
    Expr::BinaryExpression(BinaryExpression {
        operator: operator.to_string(),
        left: Box::new(left),
        right: Box::new(right),
        span: Span::dummy(),
    })
}

pub fn logical(
    operator: &str,
    left: Expr,
    right: Expr,
) -> Expr {
    Expr::LogicalExpression(BinaryExpression {
        operator: operator.to_string(),
        left: Box::new(left),
        right: Box::new(right),
        span: Span::dummy(),
    })
}

pub fn unary(
    operator: &str,
    argument: Expr,
) -> Expr {
    Expr::UnaryExpression(UnaryExpression {
        operator: operator.to_string(),
        argument: Box::new(argument),
        span: Span::dummy(),
    })
}

pub fn update(
    operator: &str,
    argument: Expr,
) -> Expr {
    Expr::UpdateExpression(UpdateExpression {
        operator: operator.to_string(),
        argument: Box::new(argument),
        prefix: false,
        span: Span::dummy(),
    })
}

pub fn conditional(
    test: Expr,
    consequent: Expr,
    alternate: Expr,
) -> Expr {
    Expr::ConditionalExpression(ConditionalExpression {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
        span: Span::dummy(),
    })
}

pub fn assign(
    operator: &str,
    target: Expr,
    value: Expr,
) -> Expr {
    Expr::AssignmentExpression(AssignmentExpression {
        operator: operator.to_string(),
        left: Box::new(target),
        right: Box::new(value),
        span: Span::dummy(),
    })
}

/// `object.name`
pub fn member(
    object: Expr,
    name: &str,
) -> Expr {
    Expr::MemberExpression(MemberExpression {
        object: Box::new(object),
        property: Box::new(ident(name)),
        computed: false,
        span: Span::dummy(),
    })
}

/// `object[property]`
pub fn index(
    object: Expr,
    property: Expr,
) -> Expr {
    Expr::MemberExpression(MemberExpression {
        object: Box::new(object),
        property: Box::new(property),
        computed: true,
        span: Span::dummy(),
    })
}

pub fn call(
    callee: Expr,
    arguments: Vec<Expr>,
) -> Expr {
    Expr::CallExpression(CallExpression {
        callee: Box::new(callee),
        arguments,
        span: Span::dummy(),
    })
}

pub fn array(elements: Vec<Expr>) -> Expr {
    Expr::ArrayExpression(ArrayExpression {
        elements: elements.into_iter().map(Some).collect(),
        span: Span::dummy(),
    })
}

pub fn object(fields: Vec<(&str, Expr)>) -> Expr {
    Expr::ObjectExpression(ObjectExpression {
        properties: fields
            .into_iter()
            .map(|(name, value)| {
                ObjectMember::Property(Property {
                    key: ident(name),
                    value,
                    computed: false,
                    span: Span::dummy(),
                })
            })
            .collect(),
        span: Span::dummy(),
    })
}

pub fn template(expressions: Vec<Expr>) -> Expr {
    Expr::TemplateLiteral(TemplateLiteral {
        expressions,
        span: Span::dummy(),
    })
}

fn function(
    name: Option<&str>,
    params: &[&str],
    body: FunctionBody,
) -> Rc<Function> {
    Rc::new(Function {
        id: name.map(identifier),
        params: params
            .iter()
            .map(|p| Pattern::Identifier(identifier(p)))
            .collect(),
        body,
        span: Span::dummy(),
    })
}

fn block_body(body: Vec<Stmt>) -> FunctionBody {
    FunctionBody::BlockStatement(Block {
        body,
        span: Span::dummy(),
    })
}

/// `function (params) { body }`
pub fn function_expr(
    params: &[&str],
    body: Vec<Stmt>,
) -> Expr {
    Expr::FunctionExpression(function(None, params, block_body(body)))
}

/// `(params) => body`
pub fn arrow(
    params: &[&str],
    body: Expr,
) -> Expr {
    Expr::ArrowFunctionExpression(function(
        None,
        params,
        FunctionBody::Expression(Box::new(body)),
    ))
}

/// `function name(params) { body }`
pub fn function_decl(
    name: &str,
    params: &[&str],
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::FunctionDeclaration(function(Some(name), params, block_body(body)))
}

/// `function name(param = default) { body }`
pub fn function_with_default(
    name: &str,
    param: &str,
    default: Expr,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::FunctionDeclaration(Rc::new(Function {
        id: Some(identifier(name)),
        params: vec![Pattern::AssignmentPattern(AssignmentPattern {
            left: identifier(param),
            right: Box::new(default),
            span: Span::dummy(),
        })],
        body: block_body(body),
        span: Span::dummy(),
    }))
}

pub fn expr_stmt(expression: Expr) -> Stmt {
    Stmt::ExpressionStatement(ExpressionStatement {
        expression,
        span: Span::dummy(),
    })
}

fn declaration(
    kind: &str,
    name: &str,
    init: Option<Expr>,
) -> VariableDeclaration {
    VariableDeclaration {
        declarations: vec![VariableDeclarator {
            id: Pattern::Identifier(identifier(name)),
            init,
            span: Span::dummy(),
        }],
        kind: kind.to_string(),
        span: Span::dummy(),
    }
}

/// `var name = init`
pub fn var(
    name: &str,
    init: Expr,
) -> Stmt {
    Stmt::VariableDeclaration(declaration("var", name, Some(init)))
}

/// `var name;`
pub fn var_uninit(name: &str) -> Stmt {
    Stmt::VariableDeclaration(declaration("var", name, None))
}

pub fn ret(argument: Expr) -> Stmt {
    Stmt::ReturnStatement(ReturnStatement {
        argument: Some(argument),
        span: Span::dummy(),
    })
}

pub fn block(body: Vec<Stmt>) -> Stmt {
    Stmt::BlockStatement(Block {
        body,
        span: Span::dummy(),
    })
}

pub fn if_stmt(
    test: Expr,
    consequent: Vec<Stmt>,
    alternate: Option<Vec<Stmt>>,
) -> Stmt {
    Stmt::IfStatement(IfStatement {
        test,
        consequent: Box::new(block(consequent)),
        alternate: alternate.map(|body| Box::new(block(body))),
        span: Span::dummy(),
    })
}

pub fn while_stmt(
    test: Expr,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::WhileStatement(WhileStatement {
        test,
        body: Box::new(block(body)),
        span: Span::dummy(),
    })
}

fn for_each(
    name: &str,
    right: Expr,
    body: Vec<Stmt>,
) -> ForEachStatement {
    ForEachStatement {
        left: ForInit::VariableDeclaration(declaration("var", name, None)),
        right,
        body: Box::new(block(body)),
        span: Span::dummy(),
    }
}

/// `for (var name of right) { body }`
pub fn for_of(
    name: &str,
    right: Expr,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::ForOfStatement(for_each(name, right, body))
}

/// `for (var name in right) { body }`
pub fn for_in(
    name: &str,
    right: Expr,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::ForInStatement(for_each(name, right, body))
}

/// `try { block } catch (param) { handler }`
pub fn try_catch(
    body: Vec<Stmt>,
    param: &str,
    handler: Vec<Stmt>,
) -> Stmt {
    Stmt::TryStatement(TryStatement {
        block: Block {
            body,
            span: Span::dummy(),
        },
        handler: Some(CatchClause {
            param: Some(Pattern::Identifier(identifier(param))),
            body: Block {
                body: handler,
                span: Span::dummy(),
            },
            span: Span::dummy(),
        }),
        finalizer: None,
        span: Span::dummy(),
    })
}

/// 给语句设置源码位置
pub fn at(
    stmt: Stmt,
    start: usize,
    end: usize,
) -> Stmt {
    let span = Span::from_offsets(start, end);
    match stmt {
        Stmt::ExpressionStatement(mut s) => {
            s.span = span;
            Stmt::ExpressionStatement(s)
        }
        Stmt::VariableDeclaration(mut s) => {
            s.span = span;
            Stmt::VariableDeclaration(s)
        }
        Stmt::FunctionDeclaration(mut f) => {
            Rc::make_mut(&mut f).span = span;
            Stmt::FunctionDeclaration(f)
        }
        Stmt::ReturnStatement(mut s) => {
            s.span = span;
            Stmt::ReturnStatement(s)
        }
        Stmt::BlockStatement(mut b) => {
            b.span = span;
            Stmt::BlockStatement(b)
        }
        other => other,
    }
}

/// `// <text>` 注释
pub fn line_comment(
    text: &str,
    start: usize,
    end: usize,
) -> Comment {
    Comment {
        kind: CommentKind::Line,
        value: text.to_string(),
        span: Span::from_offsets(start, end),
    }
}

/// `/* <text> */` 注释
pub fn block_comment(
    text: &str,
    start: usize,
    end: usize,
) -> Comment {
    Comment {
        kind: CommentKind::Block,
        value: text.to_string(),
        span: Span::from_offsets(start, end),
    }
}

pub fn program(body: Vec<Stmt>) -> Program {
    Program::new(body)
}

pub fn program_with_comments(
    body: Vec<Stmt>,
    comments: Vec<Comment>,
    end: usize,
) -> Program {
    Program {
        body,
        comments,
        span: Span::from_offsets(0, end),
    }
}

/// 收集模式、默认绑定、没有模块加载器
pub fn check(program: &Program) -> Inference {
    crate::frontend::infer(program, IndexMap::new())
}

/// 指定配置检查
pub fn check_with(
    program: &Program,
    config: &CheckConfig,
) -> TypeResult<Inference> {
    let mut modules = ModuleBridge::new();
    infer_program(program, default_bindings(), config, &mut modules, None)
}

/// 打印绑定的类型
pub fn type_of(
    inference: &Inference,
    name: &str,
) -> String {
    inference
        .get(name)
        .map(Type::to_string)
        .unwrap_or_else(|| panic!("no binding for '{}'", name))
}

/// 错误种类列表
pub fn error_kinds(inference: &Inference) -> Vec<&'static str> {
    inference.errors.iter().map(|e| e.kind()).collect()
}
