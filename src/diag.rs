//! Diagnostics raised by the front end and the evaluator.
//!
//! The rendering of both error families is part of the command-line contract and must not
//! change.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Line number (starting at one).
pub type Position = u32;

/// Where on its line a syntax error was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Scanner errors only know their line.
    Line,
    /// The end-of-input token.
    End,
    /// Any other token.
    Lexeme(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line => Ok(()),
            Location::End => write!(f, " at end"),
            Location::Lexeme(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// Compile-time error reported by the scanner, the parser or the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    pub line: Position,
    pub location: Location,
    pub message: &'static str,
}

impl SyntaxError {
    pub fn at_line(line: Position, message: &'static str) -> SyntaxError {
        SyntaxError {
            line,
            location: Location::Line,
            message,
        }
    }

    pub fn at_token(token: &Token, message: &'static str) -> SyntaxError {
        let location = if token.kind == TokenKind::Eof {
            Location::End
        } else {
            Location::Lexeme(token.lexeme.to_string())
        };
        SyntaxError {
            line: token.line,
            location,
            message,
        }
    }
}

/// Error aborting the evaluation of a program.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{kind}\n[line {line}]")]
    Lox {
        line: Position,
        kind: RuntimeErrorKind,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl RuntimeError {
    pub fn new(line: Position, kind: RuntimeErrorKind) -> RuntimeError {
        RuntimeError::Lox { line, kind }
    }

    /// Language-level cause of the error, `None` for host I/O failures.
    pub fn kind(&self) -> Option<&RuntimeErrorKind> {
        match self {
            RuntimeError::Lox { kind, .. } => Some(kind),
            RuntimeError::Io(_) => None,
        }
    }

    pub fn line(&self) -> Option<Position> {
        match self {
            RuntimeError::Lox { line, .. } => Some(*line),
            RuntimeError::Io(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("Oprand must be a number.")]
    NumberOperand,

    #[error("Oprands must be numbers.")]
    NumberOperands,

    #[error("Operands must be two numbers or two strings.")]
    AddOperands,

    #[error("Right oprand must not be zero.")]
    DivByZero,

    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),

    #[error("Can only call functions.")]
    NotCallable,

    #[error("Expected {expected} arguments but got {got}.")]
    Arity { expected: usize, got: usize },

    #[error("{0}")]
    Native(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Context;

    #[test]
    fn scanner_error_has_no_location() {
        let e = SyntaxError::at_line(3, "Unexpected character.");
        assert_eq!(e.to_string(), "[line 3] Error: Unexpected character.");
    }

    #[test]
    fn error_at_token() {
        let ctx = Context::new();
        let token = Token::new(TokenKind::Identifier, ctx.symbol("foo"), None, 7);
        assert_eq!(
            SyntaxError::at_token(&token, "Expect ';' after value.").to_string(),
            "[line 7] Error at 'foo': Expect ';' after value."
        );
    }

    #[test]
    fn error_at_end() {
        let ctx = Context::new();
        let token = Token::new(TokenKind::Eof, ctx.symbol(""), None, 2);
        assert_eq!(
            SyntaxError::at_token(&token, "Expect expression.").to_string(),
            "[line 2] Error at end: Expect expression."
        );
    }

    #[test]
    fn runtime_error_rendering() {
        let e = RuntimeError::new(4, RuntimeErrorKind::DivByZero);
        assert_eq!(e.to_string(), "Right oprand must not be zero.\n[line 4]");
        assert_eq!(e.line(), Some(4));
    }
}
