#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use loxwalk::error::{Diagnostic, LoxError, RuntimeError};
use loxwalk::session::Session;

/// `Write` sink whose contents stay readable after the session takes a clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("print output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A fresh session plus the buffer it prints into.
pub fn session() -> (Session, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (Session::with_output(buffer.clone()), buffer)
}

/// Runs `source` in a fresh session, returning printed output and the outcome.
pub fn run(source: &str) -> (String, Result<(), LoxError>) {
    let (mut session, buffer) = session();
    let result = session.run(source);
    (buffer.contents(), result)
}

/// Runs `source` and panics on any error.
pub fn run_ok(source: &str) -> String {
    let (output, result) = run(source);
    if let Err(e) = result {
        panic!("unexpected error: {}\noutput so far:\n{}", e, output);
    }
    output
}

/// Runs `source`, expecting a runtime error.
pub fn runtime_error(source: &str) -> (String, RuntimeError) {
    match run(source) {
        (output, Err(LoxError::Runtime(e))) => (output, e),
        (_, other) => panic!("expected a runtime error, got {:?}", other),
    }
}

/// Runs `source`, expecting static diagnostics (nothing may execute).
pub fn static_errors(source: &str) -> Vec<Diagnostic> {
    match run(source) {
        (output, Err(LoxError::Static(diagnostics))) => {
            assert_eq!(output, "", "statically invalid unit must not execute");
            diagnostics
        }
        (_, other) => panic!("expected static errors, got {:?}", other),
    }
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}
