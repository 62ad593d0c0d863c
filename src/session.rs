//! Front‑to‑back driver: scan → parse → resolve → interpret.
//!
//! A [`Session`] owns one interpreter and runs successive input units (a
//! whole file, or one REPL line) against it.  Static diagnostics stop a unit
//! before it executes; a runtime error stops it mid‑way.  Either way the
//! global environment keeps whatever earlier units defined.

use std::io::Write;

use log::{debug, info};

use crate::error::{Diagnostic, LoxError, Result};
use crate::expr::Expr;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::{Locals, Resolver};
use crate::scanner::scan_all;
use crate::stmt::Stmt;
use crate::token::Token;
use crate::value::Value;

/// Scans and parses one input unit.  Lexical and syntax diagnostics are
/// reported together, ordered by line.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>> {
    let (tokens, lex_errors) = scan_all(source.as_bytes());

    match (Parser::new(&tokens).parse(), lex_errors.is_empty()) {
        (Ok(statements), true) => Ok(statements),
        (Ok(_), false) => Err(LoxError::Static(lex_errors)),
        (Err(parse_errors), _) => Err(LoxError::Static(merge(lex_errors, parse_errors))),
    }
}

/// Scans and parses a single expression.
pub fn parse_expression(source: &str) -> Result<Expr> {
    let (tokens, lex_errors) = scan_all(source.as_bytes());

    match (Parser::new(&tokens).parse_expression(), lex_errors.is_empty()) {
        (Ok(expr), true) => Ok(expr),
        (Ok(_), false) => Err(LoxError::Static(lex_errors)),
        (Err(parse_errors), _) => Err(LoxError::Static(merge(lex_errors, parse_errors))),
    }
}

/// Scans a unit, keeping tokens even when some bytes were rejected.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    scan_all(source.as_bytes())
}

fn merge(mut first: Vec<Diagnostic>, second: Vec<Diagnostic>) -> Vec<Diagnostic> {
    first.extend(second);
    first.sort_by_key(|d| d.line); // stable: same‑line order is preserved
    first
}

pub struct Session {
    interpreter: Interpreter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session printing to stdout.
    pub fn new() -> Self {
        Session {
            interpreter: Interpreter::new(),
        }
    }

    /// A session whose `print` output goes to `output`.
    pub fn with_output<W: Write + 'static>(output: W) -> Self {
        Session {
            interpreter: Interpreter::with_output(output),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Runs one input unit.
    pub fn run(&mut self, source: &str) -> Result<()> {
        info!("Running unit of {} bytes", source.len());

        let statements: Vec<Stmt> = parse_program(source)?;
        let locals: Locals = Resolver::new().resolve(&statements)?;

        self.interpreter.resolve(locals);
        self.interpreter.interpret(&statements)?;

        debug!("Unit completed");
        Ok(())
    }

    /// Evaluates a single expression against the session's globals.
    pub fn evaluate(&mut self, source: &str) -> Result<Value> {
        let expr: Expr = parse_expression(source)?;
        let locals: Locals = Resolver::new().resolve_expression(&expr)?;

        self.interpreter.resolve(locals);
        Ok(self.interpreter.evaluate(&expr)?)
    }
}
