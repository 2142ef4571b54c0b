//! ESTree 抽象语法树
//!
//! 类型推断的输入是外部解析器（acorn、esprima 等）产出的 ESTree JSON。
//! 这里只定义推断需要的节点子集；未知的语句和表达式会落入 `Unsupported`。
//!
//! 函数节点使用 `Rc` 共享：闭包类型只持有引用，调用点重新推断时不复制 AST。

use serde::Deserialize;
use std::rc::Rc;

use crate::util::span::Span;

/// 解析 ESTree JSON 文本
pub fn parse_program(json: &str) -> Result<Program, serde_json::Error> {
    serde_json::from_str(json)
}

/// 程序根节点
#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
    /// 解析器收集的注释（类型声明从这里提取）
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(flatten)]
    pub span: Span,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self {
            body,
            comments: Vec::new(),
            span: Span::dummy(),
        }
    }
}

/// 注释种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CommentKind {
    Line,
    Block,
}

/// 源码注释
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
    #[serde(flatten)]
    pub span: Span,
}

/// 语句
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    ExpressionStatement(ExpressionStatement),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(Rc<Function>),
    ReturnStatement(ReturnStatement),
    BlockStatement(Block),
    IfStatement(IfStatement),
    ForStatement(ForStatement),
    ForInStatement(ForEachStatement),
    ForOfStatement(ForEachStatement),
    WhileStatement(WhileStatement),
    DoWhileStatement(WhileStatement),
    TryStatement(TryStatement),
    ThrowStatement(ThrowStatement),
    EmptyStatement(Marker),
    BreakStatement(Marker),
    ContinueStatement(Marker),
    #[serde(other)]
    Unsupported,
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::ExpressionStatement(s) => s.span,
            Stmt::VariableDeclaration(s) => s.span,
            Stmt::FunctionDeclaration(f) => f.span,
            Stmt::ReturnStatement(s) => s.span,
            Stmt::BlockStatement(b) => b.span,
            Stmt::IfStatement(s) => s.span,
            Stmt::ForStatement(s) => s.span,
            Stmt::ForInStatement(s) | Stmt::ForOfStatement(s) => s.span,
            Stmt::WhileStatement(s) | Stmt::DoWhileStatement(s) => s.span,
            Stmt::TryStatement(s) => s.span,
            Stmt::ThrowStatement(s) => s.span,
            Stmt::EmptyStatement(m) | Stmt::BreakStatement(m) | Stmt::ContinueStatement(m) => {
                m.span
            }
            Stmt::Unsupported => Span::dummy(),
        }
    }
}

/// 没有需要推断的子节点的语句（empty/break/continue）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Marker {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expr,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclaration {
    pub declarations: Vec<VariableDeclarator>,
    /// var / let / const
    #[serde(default)]
    pub kind: String,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclarator {
    pub id: Pattern,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnStatement {
    #[serde(default)]
    pub argument: Option<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub body: Vec<Stmt>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IfStatement {
    pub test: Expr,
    pub consequent: Box<Stmt>,
    #[serde(default)]
    pub alternate: Option<Box<Stmt>>,
    #[serde(flatten)]
    pub span: Span,
}

/// for 循环的初始化部分：变量声明或表达式
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ForInit {
    VariableDeclaration(VariableDeclaration),
    Expression(Expr),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForStatement {
    #[serde(default)]
    pub init: Option<ForInit>,
    #[serde(default)]
    pub test: Option<Expr>,
    #[serde(default)]
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
    #[serde(flatten)]
    pub span: Span,
}

/// for-in / for-of
#[derive(Debug, Clone, Deserialize)]
pub struct ForEachStatement {
    pub left: ForInit,
    pub right: Expr,
    pub body: Box<Stmt>,
    #[serde(flatten)]
    pub span: Span,
}

/// while / do-while
#[derive(Debug, Clone, Deserialize)]
pub struct WhileStatement {
    pub test: Expr,
    pub body: Box<Stmt>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TryStatement {
    pub block: Block,
    #[serde(default)]
    pub handler: Option<CatchClause>,
    #[serde(default)]
    pub finalizer: Option<Block>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatchClause {
    #[serde(default)]
    pub param: Option<Pattern>,
    pub body: Block,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrowStatement {
    pub argument: Expr,
    #[serde(flatten)]
    pub span: Span,
}

/// 函数声明、函数表达式和箭头函数共用的节点
#[derive(Debug, Clone, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub id: Option<Identifier>,
    pub params: Vec<Pattern>,
    pub body: FunctionBody,
    #[serde(flatten)]
    pub span: Span,
}

impl Function {
    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.name.as_str())
    }
}

/// 函数体：块，或箭头函数的表达式体
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FunctionBody {
    BlockStatement(Block),
    Expression(Box<Expr>),
}

/// 绑定目标（参数、声明）
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Identifier(Identifier),
    /// 带默认值的参数 `x = 1`
    AssignmentPattern(AssignmentPattern),
    #[serde(other)]
    Unsupported,
}

impl Pattern {
    /// 简单标识符名（解构模式返回 None）
    pub fn name(&self) -> Option<&str> {
        match self {
            Pattern::Identifier(id) => Some(&id.name),
            Pattern::AssignmentPattern(p) => Some(&p.left.name),
            Pattern::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentPattern {
    pub left: Identifier,
    pub right: Box<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identifier {
    pub name: String,
    #[serde(flatten)]
    pub span: Span,
}

/// 表达式
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    Identifier(Identifier),
    Literal(Literal),
    TemplateLiteral(TemplateLiteral),
    FunctionExpression(Rc<Function>),
    ArrowFunctionExpression(Rc<Function>),
    CallExpression(CallExpression),
    UnaryExpression(UnaryExpression),
    UpdateExpression(UpdateExpression),
    BinaryExpression(BinaryExpression),
    LogicalExpression(BinaryExpression),
    ConditionalExpression(ConditionalExpression),
    AssignmentExpression(AssignmentExpression),
    ArrayExpression(ArrayExpression),
    ObjectExpression(ObjectExpression),
    MemberExpression(MemberExpression),
    SequenceExpression(SequenceExpression),
    #[serde(other)]
    Unsupported,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::TemplateLiteral(e) => e.span,
            Expr::FunctionExpression(f) | Expr::ArrowFunctionExpression(f) => f.span,
            Expr::CallExpression(e) => e.span,
            Expr::UnaryExpression(e) => e.span,
            Expr::UpdateExpression(e) => e.span,
            Expr::BinaryExpression(e) | Expr::LogicalExpression(e) => e.span,
            Expr::ConditionalExpression(e) => e.span,
            Expr::AssignmentExpression(e) => e.span,
            Expr::ArrayExpression(e) => e.span,
            Expr::ObjectExpression(e) => e.span,
            Expr::MemberExpression(e) => e.span,
            Expr::SequenceExpression(e) => e.span,
            Expr::Unsupported => Span::dummy(),
        }
    }

    /// ESTree 节点类型名，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "Identifier",
            Expr::Literal(_) => "Literal",
            Expr::TemplateLiteral(_) => "TemplateLiteral",
            Expr::FunctionExpression(_) => "FunctionExpression",
            Expr::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            Expr::CallExpression(_) => "CallExpression",
            Expr::UnaryExpression(_) => "UnaryExpression",
            Expr::UpdateExpression(_) => "UpdateExpression",
            Expr::BinaryExpression(_) => "BinaryExpression",
            Expr::LogicalExpression(_) => "LogicalExpression",
            Expr::ConditionalExpression(_) => "ConditionalExpression",
            Expr::AssignmentExpression(_) => "AssignmentExpression",
            Expr::ArrayExpression(_) => "ArrayExpression",
            Expr::ObjectExpression(_) => "ObjectExpression",
            Expr::MemberExpression(_) => "MemberExpression",
            Expr::SequenceExpression(_) => "SequenceExpression",
            Expr::Unsupported => "Unsupported",
        }
    }
}

/// 字面量；`value` 保留原始 JSON 值
#[derive(Debug, Clone, Deserialize)]
pub struct Literal {
    #[serde(default)]
    pub value: serde_json::Value,
    /// 正则字面量的 `{pattern, flags}`
    #[serde(default)]
    pub regex: Option<serde_json::Value>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateLiteral {
    #[serde(default)]
    pub expressions: Vec<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallExpression {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnaryExpression {
    pub operator: String,
    pub argument: Box<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExpression {
    pub operator: String,
    pub argument: Box<Expr>,
    #[serde(default)]
    pub prefix: bool,
    #[serde(flatten)]
    pub span: Span,
}

/// 二元表达式与逻辑表达式
#[derive(Debug, Clone, Deserialize)]
pub struct BinaryExpression {
    pub operator: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalExpression {
    pub test: Box<Expr>,
    pub consequent: Box<Expr>,
    pub alternate: Box<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentExpression {
    pub operator: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArrayExpression {
    /// `None` 表示空位 `[1, , 3]`
    pub elements: Vec<Option<Expr>>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectMember>,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property(Property),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub key: Expr,
    pub value: Expr,
    #[serde(default)]
    pub computed: bool,
    #[serde(flatten)]
    pub span: Span,
}

impl Property {
    /// 静态属性名：标识符键、字符串或数字字面量键
    pub fn static_name(&self) -> Option<String> {
        if self.computed {
            return literal_key(&self.key);
        }
        match &self.key {
            Expr::Identifier(id) => Some(id.name.clone()),
            other => literal_key(other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberExpression {
    pub object: Box<Expr>,
    pub property: Box<Expr>,
    #[serde(default)]
    pub computed: bool,
    #[serde(flatten)]
    pub span: Span,
}

impl MemberExpression {
    /// `a.b` 与 `a["b"]` 的静态字段名
    pub fn static_name(&self) -> Option<String> {
        if self.computed {
            return literal_key(&self.property);
        }
        match self.property.as_ref() {
            Expr::Identifier(id) => Some(id.name.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SequenceExpression {
    pub expressions: Vec<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

/// 字面量作为属性键时的名字
fn literal_key(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Literal(lit) => match &lit.value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        },
        _ => None,
    }
}
