//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! Two independent channels exist:
//!
//! * [`Diagnostic`]: a static (lexical, syntactic or binding) problem. These are
//!   accumulated across a whole scan/parse/resolve pass and reported together.
//! * [`RuntimeError`]: raised by exactly one failing operation during
//!   evaluation. It unwinds the current input unit only.
//!
//! `return` is *not* an error; see [`crate::interpreter::Flow`].
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::debug;

use crate::token::{Token, TokenType};

/// A static diagnostic with its source line and location description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct Diagnostic {
    /// 1‑based line where the problem was detected.
    pub line: usize,

    /// `" at end"`, `" at 'lexeme'"`, or empty for lexical errors.
    pub location: String,

    /// Human‑readable description.
    pub message: String,
}

impl Diagnostic {
    /// Helper constructor for the **scanner** (no token available yet).
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating lex diagnostic: line={}, msg={}", line, message);

        Diagnostic {
            line,
            location: String::new(),
            message,
        }
    }

    /// Diagnostic anchored on a token (parser and resolver).
    pub fn at<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        let location: String = if token.token_type == TokenType::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        debug!(
            "Creating diagnostic: line={}{}, msg={}",
            token.line, location, message
        );

        Diagnostic {
            line: token.line,
            location,
            message,
        }
    }
}

/// Runtime evaluation failure, anchored on the token of the failing operation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}\n[line {line}]", line = .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!(
            "Creating runtime error at '{}' (line {}): {}",
            token.lexeme, token.line, message
        );

        RuntimeError {
            token: token.clone(),
            message,
        }
    }
}

/// Canonical error type returned by the driver entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// One or more static diagnostics; the input unit was not executed.
    #[error("{}", render_all(.0))]
    Static(Vec<Diagnostic>),

    /// Uncaught runtime error; the input unit stopped at the failing statement.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Process exit code used by the CLI (sysexits: 65 data error, 70 software error).
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Static(_) => 65,
            LoxError::Runtime(_) => 70,
            LoxError::Io(_) | LoxError::Utf8(_) => 74,
        }
    }
}

impl From<Vec<Diagnostic>> for LoxError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        LoxError::Static(diagnostics)
    }
}

fn render_all(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
