//! API to control the interpreter.

use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::Stmt;
use crate::ctx::Context;
use crate::diag::{RuntimeError, SyntaxError};
use crate::eval::Evaluator;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Tree-walk interpreter.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function then additional times to call this
/// function:
///
/// ```
/// # use treelox::interpreter::{Interpreter, LoxError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let func_def = r#"
///     fun max(x, y) {
///         if (x > y) {
///             return x;
///         } else {
///             return y;
///         }
///     }
/// "#;
/// interp.run(func_def)?;
///
/// interp.run("print max(10, 20);")?;
/// interp.run("print max(5, 4);")?;
/// assert!(!interp.had_error());
///
/// assert_eq!(output, b"20\n5\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    evaluator: Evaluator<'t, W>,
    had_error: bool,
    had_runtime_error: bool,
}

/// Errors the interpreter can raise.
#[derive(Debug, Error)]
pub enum LoxError {
    /// Errors found by lexical, syntactic or scope analysis.  Nothing was executed.
    #[error("{}", join_lines(.0))]
    Compile(Vec<SyntaxError>),

    /// Error occurring during evaluation.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn join_lines(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'t, W: Write> Interpreter<'t, W> {
    /// Create an interpreter whose `print` statements write to `output`.
    pub fn new(output: &'t mut W) -> Interpreter<'t, W> {
        let ctx = Context::new();
        let evaluator = Evaluator::new(output, &ctx);
        Interpreter {
            ctx,
            evaluator,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Scan and parse `source` without running it.
    ///
    /// Scanner errors are listed before parser errors.
    pub fn parse(&self, source: &str) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
        let (tokens, mut errors) = Scanner::new(source, self.ctx.clone()).scan_tokens();
        match Parser::new(tokens, self.ctx.clone()).parse_program() {
            Ok(prg) if errors.is_empty() => Ok(prg),
            Ok(_) => Err(errors),
            Err(parse_errors) => {
                errors.extend(parse_errors);
                Err(errors)
            }
        }
    }

    /// Run `source` in the global environment left by previous runs.
    ///
    /// Any compile error prevents execution.  A runtime error aborts this run only.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let prg = self
            .parse(source)
            .and_then(|prg| Resolver::new().resolve_program(&prg).map(|locals| (prg, locals)));
        let (prg, locals) = match prg {
            Ok(resolved) => resolved,
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "compile errors");
                self.had_error = true;
                return Err(LoxError::Compile(errors));
            }
        };

        self.evaluator.add_locals(locals);
        self.evaluator.interpret(&prg).map_err(|e| {
            tracing::debug!(error = %e, "runtime error");
            self.had_runtime_error = true;
            LoxError::from(e)
        })
    }

    /// Whether some run reported a scan, parse or resolution error.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Whether some run aborted on a runtime error.
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset_errors(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
