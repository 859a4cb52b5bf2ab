//! Tree-walking evaluator.

use std::io::prelude::*;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::ctx::Context;
use crate::diag::{RuntimeError, RuntimeErrorKind};
use crate::env::Environment;
use crate::resolver::Locals;
use crate::token::{Token, TokenKind};
use crate::value::{Function, FunctionBody, NativeFn, Value};

/// How a statement finished.
#[derive(Debug)]
enum Flow {
    Normal,
    /// A `return` is unwinding to the innermost call.
    Return(Value),
}

#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    globals: Rc<Environment>,
    locals: Locals,
}

impl<'t, W: Write> Evaluator<'t, W> {
    pub fn new(output: &'t mut W, ctx: &Context) -> Evaluator<'t, W> {
        let globals = Environment::new();
        for (name, arity, func) in BUILTINS {
            let sym = ctx.symbol(name);
            globals.define(&sym, Value::Function(Rc::new(Function::native(sym.clone(), arity, func))));
        }
        Evaluator {
            output,
            globals,
            locals: Locals::new(),
        }
    }

    /// Record scope distances computed by the resolver.
    ///
    /// Tables accumulate so that functions declared by earlier programs keep working.
    pub fn add_locals(&mut self, locals: Locals) {
        self.locals.extend(locals);
    }

    /// Execute statements in the global environment.
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        let globals = Rc::clone(&self.globals);
        for stmt in stmts {
            // The resolver rejects top-level `return`.
            self.execute(stmt, &globals)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt, env: &Rc<Environment>) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate(e, env)?;
            }
            Stmt::Print(e) => {
                let v = self.evaluate(e, env)?;
                writeln!(self.output, "{}", v)?;
            }
            Stmt::Var(name, init) => {
                let value = match init {
                    Some(init) => self.evaluate(init, env)?,
                    None => Value::Nil,
                };
                env.define(&name.lexeme, value);
            }
            Stmt::Block(stmts) => {
                return self.execute_block(stmts, Environment::with_enclosing(Rc::clone(env)));
            }
            Stmt::If(cond, then_branch, else_branch) => {
                if self.evaluate(cond, env)?.is_truthy() {
                    return self.execute(then_branch, env);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch, env);
                }
            }
            Stmt::While(cond, body) => {
                while self.evaluate(cond, env)?.is_truthy() {
                    if let Flow::Return(v) = self.execute(body, env)? {
                        return Ok(Flow::Return(v));
                    }
                }
            }
            Stmt::Function(decl) => {
                let func = Function::user(Rc::clone(decl), Rc::clone(env));
                env.define(&decl.name.lexeme, Value::Function(Rc::new(func)));
            }
            Stmt::Return(_, value) => {
                let value = match value {
                    Some(value) => self.evaluate(value, env)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(value));
            }
        };
        Ok(Flow::Normal)
    }

    /// Run `stmts` in `env`.  The caller's environment is untouched whatever the outcome.
    fn execute_block(&mut self, stmts: &[Stmt], env: Rc<Environment>) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            if let Flow::Return(v) = self.execute(stmt, &env)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(Value::from(lit)),
            Expr::Grouping(e) => self.evaluate(e, env),
            Expr::Unary(op, operand) => {
                let v = self.evaluate(operand, env)?;
                match (op.kind, v) {
                    (TokenKind::Bang, v) => Ok(Value::Bool(!v.is_truthy())),
                    (TokenKind::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
                    _ => Err(RuntimeError::new(op.line, RuntimeErrorKind::NumberOperand)),
                }
            }
            Expr::Binary(lhs, op, rhs) => {
                let l = self.evaluate(lhs, env)?;
                let r = self.evaluate(rhs, env)?;
                binary(op, l, r)
            }
            Expr::Logical(lhs, op, rhs) => {
                let l = self.evaluate(lhs, env)?;
                let short_circuit = match op.kind {
                    TokenKind::Or => l.is_truthy(),
                    _ => !l.is_truthy(),
                };
                if short_circuit {
                    Ok(l)
                } else {
                    self.evaluate(rhs, env)
                }
            }
            Expr::Variable(id, name) => self.look_up_variable(*id, name, env),
            Expr::Assign(id, name, value) => {
                let value = self.evaluate(value, env)?;
                match self.locals.get(id) {
                    Some(&distance) => env.assign_at(distance, name, value.clone())?,
                    None => self.globals.assign(name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Call(callee, args, paren) => {
                let callee = self.evaluate(callee, env)?;
                let args = args
                    .iter()
                    .map(|a| self.evaluate(a, env))
                    .collect::<Result<Vec<Value>, RuntimeError>>()?;
                match callee {
                    Value::Function(f) => self.call(&f, args, paren),
                    _ => Err(RuntimeError::new(paren.line, RuntimeErrorKind::NotCallable)),
                }
            }
        }
    }

    fn look_up_variable(
        &self,
        id: ExprId,
        name: &Token,
        env: &Rc<Environment>,
    ) -> Result<Value, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => env.get_at(distance, name),
            None => self.globals.get(name),
        }
    }

    fn call(&mut self, f: &Function, args: Vec<Value>, paren: &Token) -> Result<Value, RuntimeError> {
        if args.len() != f.arity() {
            return Err(RuntimeError::new(
                paren.line,
                RuntimeErrorKind::Arity {
                    expected: f.arity(),
                    got: args.len(),
                },
            ));
        }
        tracing::trace!(function = %f.name(), args = args.len(), "call");
        match f.body() {
            FunctionBody::Native { func, .. } => {
                func(&args).map_err(|kind| RuntimeError::new(paren.line, kind))
            }
            FunctionBody::User { decl, closure } => self.call_user(decl, closure, args),
        }
    }

    fn call_user(
        &mut self,
        decl: &FunctionDecl,
        closure: &Rc<Environment>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let env = Environment::with_enclosing(Rc::clone(closure));
        for (param, arg) in decl.params.iter().zip(args) {
            env.define(&param.lexeme, arg);
        }
        match self.execute_block(&decl.body, env)? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

fn binary(op: &Token, l: Value, r: Value) -> Result<Value, RuntimeError> {
    let error = |kind| Err(RuntimeError::new(op.line, kind));
    match op.kind {
        TokenKind::EqualEqual => return Ok(Value::Bool(l == r)),
        TokenKind::BangEqual => return Ok(Value::Bool(l != r)),
        TokenKind::Plus => {
            return match (l, r) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{}{}", l, r).into())),
                (Value::Str(l), Value::Number(r)) => Ok(Value::Str(format!("{}{}", l, r).into())),
                // The number always ends up after the string.
                (Value::Number(l), Value::Str(r)) => Ok(Value::Str(format!("{}{}", r, l).into())),
                _ => error(RuntimeErrorKind::AddOperands),
            };
        }
        _ => (),
    }

    let (l, r) = match (l, r) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        _ => return error(RuntimeErrorKind::NumberOperands),
    };
    match op.kind {
        TokenKind::Minus => Ok(Value::Number(l - r)),
        TokenKind::Star => Ok(Value::Number(l * r)),
        TokenKind::Slash if r == 0.0 => error(RuntimeErrorKind::DivByZero),
        TokenKind::Slash => Ok(Value::Number(l / r)),
        TokenKind::Greater => Ok(Value::Bool(l > r)),
        TokenKind::GreaterEqual => Ok(Value::Bool(l >= r)),
        TokenKind::Less => Ok(Value::Bool(l < r)),
        TokenKind::LessEqual => Ok(Value::Bool(l <= r)),
        // The parser builds binary nodes from the operators above only.
        _ => error(RuntimeErrorKind::NumberOperands),
    }
}

const BUILTINS: [(&str, usize, NativeFn); 2] = [("clock", 0, builtin_clock), ("sqrt", 1, builtin_sqrt)];

fn builtin_clock(_args: &[Value]) -> Result<Value, RuntimeErrorKind> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| Value::Number(d.as_secs_f64()))
        .map_err(|e| RuntimeErrorKind::Native(format!("clock error: {}", e)))
}

fn builtin_sqrt(args: &[Value]) -> Result<Value, RuntimeErrorKind> {
    match args {
        [Value::Number(n)] => Ok(Value::Number(n.sqrt())),
        _ => Err(RuntimeErrorKind::NumberOperand),
    }
}
