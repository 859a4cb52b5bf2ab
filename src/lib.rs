//! A tree-walking interpreter for the Lox language.
//!
//! See [Crafting Interpreters](https://craftinginterpreters.com/).
//!
//! Source text goes through four stages: the scanner turns it into tokens, the parser builds
//! statements, the resolver computes the scope distance of every local variable reference and
//! the evaluator executes the statements.  Any error in the first three stages prevents
//! execution.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - `class`, `this` and `super` are reserved words but classes are not implemented.
//! - Environments captured by closures are reference counted, so reference cycles between a
//! function and its own environment are never reclaimed.
//! - The scope distances computed for each run are kept for the whole session, so that functions
//! declared by earlier runs keep working.  A long interactive session only ever grows this table.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod ast;
pub mod diag;
pub mod interner;
pub mod interpreter;
pub mod printer;
pub mod token;
pub mod value;

mod ctx;
mod env;
mod eval;
mod parser;
mod resolver;
mod scanner;
