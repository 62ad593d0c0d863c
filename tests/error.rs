mod common;

use std::io;

use loxwalk::error::{Diagnostic, LoxError};
use pretty_assertions::assert_eq;

#[test]
fn exit_codes_follow_sysexits() {
    let (_, runtime) = common::runtime_error("print nil * 2;");
    let unreadable = LoxError::from(io::Error::new(io::ErrorKind::NotFound, "missing.lox"));
    let not_utf8 = String::from_utf8(vec![0x66, 0xff])
        .map_err(LoxError::from)
        .unwrap_err();

    assert_eq!(LoxError::Static(vec![Diagnostic::lex(1, "x")]).exit_code(), 65);
    assert_eq!(LoxError::from(runtime).exit_code(), 70);
    assert_eq!(unreadable.exit_code(), 74);
    assert_eq!(not_utf8.exit_code(), 74);
}

#[test]
fn static_errors_render_one_diagnostic_per_line() {
    let errors = common::static_errors("print ;\nvar 1;");
    let rendered = LoxError::Static(errors).to_string();

    assert_eq!(
        rendered,
        "[line 1] Error at ';': Expect expression.\n\
         [line 2] Error at '1': Expect variable name."
    );
}
