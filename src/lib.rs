//! Front end for a small expression language of integers, booleans and
//! `if … then … else …`.
//!
//! The pipeline is `tokenize` → `parse` → `evaluate`; each stage is a pure
//! function with its own error type. [`run`] chains them and wraps any
//! failure in [`Error`].

pub mod ast;
pub mod eval;
pub mod lex;
pub mod mode;
pub mod parse;

use miette::{Diagnostic, NamedSource, Report};
use thiserror::Error;

pub use ast::Expr;
pub use eval::{EvalError, Value, evaluate};
pub use lex::{LexError, Lexer, Token, TokenKind, tokenize};
pub use mode::{Mode, ModeError};
pub use parse::{Parser, SyntaxError, parse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntactic,
    Mode,
    Evaluation,
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Mode(#[from] ModeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lex(_) => ErrorKind::Lexical,
            Error::Syntax(_) => ErrorKind::Syntactic,
            Error::Mode(_) => ErrorKind::Mode,
            Error::Eval(_) => ErrorKind::Evaluation,
        }
    }

    /// Attaches the source text so the report can point into it.
    pub fn into_report(self, name: &str, source: &str) -> Report {
        Report::new(self).with_source_code(NamedSource::new(name, source.to_string()))
    }
}

/// Everything produced by a successful run, for callers that also want to
/// show the tokens or draw the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<'de> {
    pub tokens: Vec<Token<'de>>,
    pub ast: Expr<'de>,
    pub value: Value,
}

/// Tokenizes, optionally checks the mode, parses and evaluates `input`.
pub fn run(input: &str, mode: Option<Mode>) -> Result<Outcome<'_>, Error> {
    let tokens = tokenize(input)?;
    if let Some(mode) = mode {
        mode.check(&tokens)?;
    }
    let ast = parse(tokens.clone())?;
    let value = evaluate(&ast)?;
    Ok(Outcome { tokens, ast, value })
}
