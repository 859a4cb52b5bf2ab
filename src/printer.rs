//! Render a syntax tree back to source text.
//!
//! Every operator expression is parenthesized so that parsing the output rebuilds a tree
//! that evaluates exactly like the original one.  Printing is stable: parsing the output and
//! printing it again yields the same text.

use crate::ast::{Expr, Stmt};
use crate::token::Literal;

const INDENT: &str = "    ";

fn is_operator(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Unary(..) | Expr::Binary(..) | Expr::Logical(..) | Expr::Assign(..)
    )
}

/// Render a whole program, one top-level statement per line.
pub fn print_program(stmts: &[Stmt]) -> String {
    let mut printer = Printer::default();
    for stmt in stmts {
        printer.stmt(stmt);
        printer.out.push('\n');
    }
    printer.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr);
    printer.out
}

#[derive(Debug, Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(e) => {
                self.expr(e);
                self.out.push(';');
            }
            Stmt::Print(e) => {
                self.out.push_str("print ");
                self.expr(e);
                self.out.push(';');
            }
            Stmt::Var(name, init) => {
                self.out.push_str("var ");
                self.out.push_str(name.lexeme.as_str());
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push(';');
            }
            Stmt::Block(stmts) => self.block(stmts),
            Stmt::If(cond, then_branch, else_branch) => {
                self.out.push_str("if (");
                self.expr(cond);
                self.out.push_str(") ");
                match else_branch {
                    Some(else_branch) => {
                        // Braces keep our `else` from attaching to a nested `if`.
                        if let Stmt::If(_, _, None) = **then_branch {
                            self.block(std::slice::from_ref(&**then_branch));
                        } else {
                            self.stmt(then_branch);
                        }
                        self.out.push_str(" else ");
                        self.stmt(else_branch);
                    }
                    None => self.stmt(then_branch),
                }
            }
            Stmt::While(cond, body) => {
                self.out.push_str("while (");
                self.expr(cond);
                self.out.push_str(") ");
                self.stmt(body);
            }
            Stmt::Function(decl) => {
                self.out.push_str("fun ");
                self.out.push_str(decl.name.lexeme.as_str());
                self.out.push('(');
                for (i, param) in decl.params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(param.lexeme.as_str());
                }
                self.out.push_str(") ");
                self.block(&decl.body);
            }
            Stmt::Return(_, value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value);
                }
                self.out.push(';');
            }
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        self.out.push('{');
        if stmts.is_empty() {
            self.out.push('}');
            return;
        }
        self.depth += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.depth -= 1;
        self.newline();
        self.out.push('}');
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.literal(lit),
            // Operator expressions bring their own parentheses.
            Expr::Grouping(inner) if is_operator(inner) => self.expr(inner),
            Expr::Grouping(inner) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
            Expr::Unary(op, operand) => {
                self.out.push('(');
                self.out.push_str(op.lexeme.as_str());
                self.expr(operand);
                self.out.push(')');
            }
            Expr::Binary(lhs, op, rhs) | Expr::Logical(lhs, op, rhs) => {
                self.out.push('(');
                self.expr(lhs);
                self.out.push(' ');
                self.out.push_str(op.lexeme.as_str());
                self.out.push(' ');
                self.expr(rhs);
                self.out.push(')');
            }
            Expr::Variable(_, name) => self.out.push_str(name.lexeme.as_str()),
            Expr::Assign(_, name, value) => {
                self.out.push('(');
                self.out.push_str(name.lexeme.as_str());
                self.out.push_str(" = ");
                self.expr(value);
                self.out.push(')');
            }
            Expr::Call(callee, args, _) => {
                self.expr(callee);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(arg);
                }
                self.out.push(')');
            }
        }
    }

    fn literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Nil => self.out.push_str("nil"),
            Literal::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            // Digits overflowing to infinity when scanned again.
            Literal::Number(n) if n.is_infinite() => {
                self.out.push('1');
                self.out.push_str(&"0".repeat(309));
            }
            Literal::Number(n) => self.out.push_str(&n.to_string()),
            Literal::Str(s) => {
                self.out.push('"');
                self.out.push_str(s);
                self.out.push('"');
            }
        }
    }
}
