//! Static scope resolution.
//!
//! Computes, for every variable reference that denotes a local, how many environments the
//! evaluator must walk up to find its binding.  The walk opens a scope exactly where the
//! evaluator creates an environment (blocks and function calls); anything else would make
//! the two disagree.

use std::collections::HashMap;

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::diag::SyntaxError;
use crate::interner::Symbol;
use crate::token::Token;

/// Scope distance of each resolved variable reference.  Absent references are globals.
pub type Locals = HashMap<ExprId, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
}

#[derive(Debug)]
pub struct Resolver {
    /// Innermost last.  `false` while a variable's initializer is being resolved.
    scopes: Vec<HashMap<Symbol, bool>>,
    locals: Locals,
    current_function: FunctionKind,
    errors: Vec<SyntaxError>,
}

impl Resolver {
    pub fn new() -> Resolver {
        Resolver {
            scopes: vec![],
            locals: Locals::new(),
            current_function: FunctionKind::None,
            errors: vec![],
        }
    }

    pub fn resolve_program(mut self, stmts: &[Stmt]) -> Result<Locals, Vec<SyntaxError>> {
        self.resolve_stmts(stmts);
        debug_assert!(self.scopes.is_empty());
        tracing::trace!(
            locals = self.locals.len(),
            errors = self.errors.len(),
            "resolved"
        );
        if self.errors.is_empty() {
            Ok(self.locals)
        } else {
            Err(self.errors)
        }
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(e) | Stmt::Print(e) => self.resolve_expr(e),
            Stmt::Var(name, init) => {
                self.declare(name);
                if let Some(init) = init {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Block(stmts) => {
                self.begin_scope();
                self.resolve_stmts(stmts);
                self.end_scope();
            }
            Stmt::If(cond, then_branch, else_branch) => {
                self.resolve_expr(cond);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While(cond, body) => {
                self.resolve_expr(cond);
                self.resolve_stmt(body);
            }
            Stmt::Function(decl) => {
                // Defined before the body so that the function can call itself.
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl);
            }
            Stmt::Return(keyword, value) => {
                if self.current_function == FunctionKind::None {
                    self.errors.push(SyntaxError::at_token(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
        }
    }

    /// Parameters and body share the single scope a call creates.
    fn resolve_function(&mut self, decl: &FunctionDecl) {
        let enclosing = std::mem::replace(&mut self.current_function, FunctionKind::Function);
        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();
        self.current_function = enclosing;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => (),
            Expr::Grouping(inner) | Expr::Unary(_, inner) => self.resolve_expr(inner),
            Expr::Binary(lhs, _, rhs) | Expr::Logical(lhs, _, rhs) => {
                self.resolve_expr(lhs);
                self.resolve_expr(rhs);
            }
            Expr::Variable(id, name) => {
                let in_own_initializer = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&name.lexeme))
                    == Some(&false);
                if in_own_initializer {
                    self.errors.push(SyntaxError::at_token(
                        name,
                        "Can't read local variable in its own initializer.",
                    ));
                }
                self.resolve_local(*id, name);
            }
            Expr::Assign(id, name, value) => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Call(callee, args, _) => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        let found = self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains_key(&name.lexeme));
        if let Some(depth) = found {
            self.locals.insert(id, depth);
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Top-level names are globals and are not tracked.
    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
