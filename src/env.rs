use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diag::{RuntimeError, RuntimeErrorKind};
use crate::interner::Symbol;
use crate::token::Token;
use crate::value::Value;

/// One lexical scope of variable bindings.
///
/// Environments are shared: a function value keeps the environment it was declared in alive
/// after the declaring block has finished.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<Rc<Environment>>,
    bindings: RefCell<HashMap<Symbol, Value>>,
}

impl Environment {
    /// Create a global environment.
    pub fn new() -> Rc<Environment> {
        Rc::new(Environment::default())
    }

    pub fn with_enclosing(enclosing: Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            enclosing: Some(enclosing),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Bind `name` in this environment, replacing any previous binding.
    pub fn define(&self, name: &Symbol, value: Value) {
        self.bindings.borrow_mut().insert(name.clone(), value);
    }

    /// Read `name` from this environment only.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.bindings
            .borrow()
            .get(&name.lexeme)
            .cloned()
            .ok_or_else(|| undefined(name))
    }

    /// Overwrite an existing binding of this environment only.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        match self.bindings.borrow_mut().get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }

    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        self.ancestor(distance)
            .ok_or_else(|| undefined(name))?
            .get(name)
    }

    pub fn assign_at(&self, distance: usize, name: &Token, value: Value) -> Result<(), RuntimeError> {
        self.ancestor(distance)
            .ok_or_else(|| undefined(name))?
            .assign(name, value)
    }

    /// The environment `distance` links up the chain.
    fn ancestor(&self, distance: usize) -> Option<&Environment> {
        let mut env = self;
        for _ in 0..distance {
            env = env.enclosing.as_deref()?;
        }
        Some(env)
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(
        name.line,
        RuntimeErrorKind::UndefinedVariable(name.lexeme.to_string()),
    )
}
