mod common;

use loxwalk::error::Diagnostic;
use loxwalk::resolver::{Locals, Resolver};
use loxwalk::session::parse_program;
use pretty_assertions::assert_eq;

fn resolve(source: &str) -> Result<Locals, Vec<Diagnostic>> {
    let statements = parse_program(source).expect("source parses");
    Resolver::new().resolve(&statements)
}

fn distances(source: &str) -> Vec<usize> {
    let locals = resolve(source).expect("source resolves");
    let mut distances: Vec<usize> = locals.values().copied().collect();
    distances.sort_unstable();
    distances
}

#[test]
fn globals_are_left_out_of_the_table() {
    assert_eq!(distances("var g = 1; { print g; } g = 2;"), Vec::<usize>::new());
}

#[test]
fn block_locals_record_their_distance() {
    assert_eq!(distances("{ var a = 1; { { print a; } } }"), vec![2]);
    assert_eq!(distances("{ var a = 1; a = 2; }"), vec![0]);
}

#[test]
fn parameters_and_captured_locals() {
    assert_eq!(distances("fun f(x) { return x; }"), vec![0]);
    // `x` is one scope out from inner's call scope.
    assert_eq!(
        distances("fun outer() { var x = 1; fun inner() { return x; } }"),
        vec![1]
    );
    assert_eq!(
        distances("fun mk(n) { return fun (x) { return x + n; }; }"),
        vec![0, 1]
    );
}

#[test]
fn redeclaring_in_the_same_block_is_an_error() {
    let errors = resolve("{\n  var a = 1;\n  var a = 2;\n}").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 3] Error at 'a': Already a variable with this name in this scope."
    );
}

#[test]
fn redeclaring_a_global_is_allowed() {
    assert!(resolve("var a = 1; var a = 2; fun a() {}").is_ok());
}

#[test]
fn shadowing_in_a_nested_block_is_allowed() {
    assert!(resolve("{ var a = 1; { var a = 2; } }").is_ok());
}

#[test]
fn duplicate_parameters_are_an_error() {
    let errors = resolve("fun f(a, a) {}").unwrap_err();

    assert_eq!(
        common::messages(&errors),
        vec!["Already a variable with this name in this scope."]
    );
}

#[test]
fn reading_a_local_in_its_own_initializer() {
    let errors = resolve("{ var a = a; }").unwrap_err();

    assert_eq!(
        common::messages(&errors),
        vec!["Can't read local variable in its own initializer."]
    );

    // At global scope the read is dynamic and only fails at runtime.
    assert!(resolve("var a = a;").is_ok());
}

#[test]
fn return_outside_a_function() {
    let errors = resolve("return 1;").unwrap_err();

    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at 'return': Can't return from top-level code."
    );

    assert!(resolve("fun f() { return 1; }").is_ok());
    assert!(resolve("var f = fun () { return; };").is_ok());
}

#[test]
fn resolution_continues_after_an_error() {
    let errors = resolve("return 1;\n{ var b = 1; var b = 2; }\n{ var c = c; }").unwrap_err();

    assert_eq!(errors.iter().map(|d| d.line).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn static_errors_stop_execution() {
    let errors = common::static_errors("print \"before\";\n{ var x = 1; var x = 2; }");

    assert_eq!(errors.len(), 1);
}
