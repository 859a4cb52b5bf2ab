//! Syntax tree produced by the parser.

use std::rc::Rc;

use crate::token::{Literal, Token};

/// Identity of a variable reference, used to key resolved scope distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Literal(Literal),
    Grouping(Box<Expr>),
    Unary(Token, Box<Expr>),
    Binary(Box<Expr>, Token, Box<Expr>),
    /// `and` / `or`, which only evaluate their right operand when needed.
    Logical(Box<Expr>, Token, Box<Expr>),
    Variable(ExprId, Token),
    Assign(ExprId, Token, Box<Expr>),
    /// Callee, arguments and the closing parenthesis (for error lines).
    Call(Box<Expr>, Vec<Expr>, Token),
}

/// Shared between the tree and the function values created from it.
#[derive(Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Var(Token, Option<Expr>),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Function(Rc<FunctionDecl>),
    /// The `return` keyword is kept for error reporting.
    Return(Token, Option<Expr>),
}
