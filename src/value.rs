//! Runtime values.

use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::diag::RuntimeErrorKind;
use crate::env::Environment;
use crate::interner::Symbol;
use crate::token::Literal;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Function(Rc<Function>),
}

impl Value {
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Value {
        match lit {
            Literal::Nil => Value::Nil,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            // Integral values print without a fractional part.
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Function(func) => write!(f, "{}", func),
        }
    }
}

pub type NativeFn = fn(&[Value]) -> Result<Value, RuntimeErrorKind>;

/// Callable value.
pub struct Function {
    name: Symbol,
    body: FunctionBody,
}

pub(crate) enum FunctionBody {
    Native {
        arity: usize,
        func: NativeFn,
    },
    User {
        decl: Rc<FunctionDecl>,
        /// Environment active where the function was declared.
        closure: Rc<Environment>,
    },
}

impl Function {
    pub fn native(name: Symbol, arity: usize, func: NativeFn) -> Function {
        Function {
            name,
            body: FunctionBody::Native { arity, func },
        }
    }

    pub(crate) fn user(decl: Rc<FunctionDecl>, closure: Rc<Environment>) -> Function {
        Function {
            name: decl.name.lexeme.clone(),
            body: FunctionBody::User { decl, closure },
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn arity(&self) -> usize {
        match &self.body {
            FunctionBody::Native { arity, .. } => *arity,
            FunctionBody::User { decl, .. } => decl.params.len(),
        }
    }

    pub(crate) fn body(&self) -> &FunctionBody {
        &self.body
    }
}

// The closure is left out: it may contain this very function.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body {
            FunctionBody::Native { .. } => write!(f, "<native fn>"),
            FunctionBody::User { .. } => write!(f, "<fn {}>", self.name),
        }
    }
}
