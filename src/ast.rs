//! Syntax tree produced by the parser and walked by the interpreter.
//!
//! Every node records the span of the token that introduced it so runtime
//! diagnostics can point at the construct that failed. Function bodies are
//! reference counted: runtime function values share them with the tree
//! instead of cloning statements.

use std::rc::Rc;

use crate::token::Span;

#[derive(Debug, PartialEq, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionKind {
    Number(f64),
    String(String),
    Variable(String),
    List(Vec<Expression>),
    This,
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Assign {
        name: String,
        value: Box<Expression>,
    },
    GetProperty {
        object: Box<Expression>,
        name: String,
    },
    SetProperty {
        object: Box<Expression>,
        name: String,
        value: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    New {
        class_name: String,
        args: Vec<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Less,
    Greater,
    Equal,
    NotEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    Expr(Expression),
    Block(Vec<Statement>),
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        /// Either another `If` (for `else if`) or a `Block`.
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    For {
        variable: String,
        iterable: Expression,
        body: Vec<Statement>,
    },
    Return(Option<Expression>),
    FunctionDef(Rc<FunctionDecl>),
    ClassDef {
        name: String,
        methods: Vec<Rc<FunctionDecl>>,
    },
    Try {
        body: Vec<Statement>,
        catch_name: String,
        catch_body: Vec<Statement>,
    },
}

/// A named function or method: parameter names plus the body block.
#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }
}
