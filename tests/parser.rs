mod common;

use loxwalk::ast_printer::AstPrinter;
use loxwalk::error::{Diagnostic, LoxError};
use loxwalk::session::{parse_expression, parse_program};
use pretty_assertions::assert_eq;

fn ast(source: &str) -> String {
    match parse_program(source) {
        Ok(statements) => AstPrinter::print_program(&statements),
        Err(e) => panic!("unexpected parse failure: {}", e),
    }
}

fn parse_errors(source: &str) -> Vec<Diagnostic> {
    match parse_program(source) {
        Err(LoxError::Static(diagnostics)) => diagnostics,
        other => panic!("expected parse errors, got {:?}", other),
    }
}

#[test]
fn factor_binds_tighter_than_term() {
    assert_eq!(ast("1 + 2 * 3;"), "(; (+ 1.0 (* 2.0 3.0)))");
    assert_eq!(ast("(1 + 2) * 3;"), "(; (* (group (+ 1.0 2.0)) 3.0))");
}

#[test]
fn unary_and_left_associativity() {
    assert_eq!(ast("-a - b - c;"), "(; (- (- (- a) b) c))");
    assert_eq!(ast("!!true;"), "(; (! (! true)))");
}

#[test]
fn comparison_equality_and_logic_precedence() {
    assert_eq!(
        ast("a < b == c >= d;"),
        "(; (== (< a b) (>= c d)))"
    );
    assert_eq!(ast("x or y and z;"), "(; (or x (and y z)))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(ast("a = b = 3;"), "(; (= a (= b 3.0)))");
}

#[test]
fn ternary_nests_to_the_right() {
    assert_eq!(
        ast("c ? 1 : d ? 2 : 3;"),
        "(; (?: c 1.0 (?: d 2.0 3.0)))"
    );
    assert_eq!(ast("a = x or y ? 1 : 2;"), "(; (= a (?: (or x y) 1.0 2.0)))");
}

#[test]
fn chained_calls() {
    assert_eq!(ast("f()(1, 2);"), "(; (call (call f) 1.0 2.0))");
}

#[test]
fn function_declaration_and_lambda() {
    assert_eq!(
        ast("fun add(a, b) { return a + b; }"),
        "(fun add (a b) (return (+ a b)))"
    );
    assert_eq!(
        ast("var f = fun (a, b) { return a; };"),
        "(var f (fun (a b) (return a)))"
    );
    // `fun` not followed by a name starts an expression statement.
    assert_eq!(ast("fun () {};"), "(; (fun ()))");
}

#[test]
fn for_loop_is_lowered_to_while() {
    assert_eq!(
        ast("for (var i = 0; i < 3; i = i + 1) print i;"),
        "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
    );
    assert_eq!(ast("for (;;) print 1;"), "(while true (print 1.0))");
}

#[test]
fn if_else_and_blocks() {
    assert_eq!(
        ast("if (a) { print 1; } else print 2;"),
        "(if a (block (print 1.0)) (print 2.0))"
    );
}

#[test]
fn invalid_assignment_target() {
    let errors = parse_errors("1 = 2;");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at '=': Invalid assignment target."
    );
}

#[test]
fn missing_semicolon_at_end_of_file() {
    let errors = parse_errors("print 1");

    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at end: Expect ';' after value."
    );
}

#[test]
fn recovers_and_reports_every_independent_error() {
    let errors = parse_errors("var = 1;\nprint ;\nvar ok = 2;\nfun (;\nprint ok;");

    assert_eq!(
        common::messages(&errors),
        vec![
            "Expect variable name.",
            "Expect expression.",
            "Expect parameter name.",
        ]
    );
    assert_eq!(
        errors.iter().map(|d| d.line).collect::<Vec<_>>(),
        vec![1, 2, 4]
    );
}

#[test]
fn too_many_arguments_is_reported_once() {
    let arguments = vec!["0"; 256].join(", ");
    let errors = parse_errors(&format!("f({});", arguments));

    assert_eq!(
        common::messages(&errors),
        vec!["Can't have more than 255 arguments."]
    );

    let allowed = vec!["0"; 255].join(", ");
    assert!(parse_program(&format!("f({});", allowed)).is_ok());
}

#[test]
fn too_many_parameters_is_reported_once() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let errors = parse_errors(&format!("fun f({}) {{}}", params.join(", ")));

    assert_eq!(
        common::messages(&errors),
        vec!["Can't have more than 255 parameters."]
    );
}

#[test]
fn lexical_and_syntax_errors_are_reported_together() {
    let errors = parse_errors("var a = @;");

    assert_eq!(
        common::messages(&errors),
        vec!["Unexpected character: @", "Expect expression."]
    );
}

#[test]
fn single_expression_mode() {
    let expr = parse_expression("1 + 2").expect("expression parses");
    assert_eq!(AstPrinter::print(&expr), "(+ 1.0 2.0)");

    match parse_expression("1 + 2;") {
        Err(LoxError::Static(errors)) => {
            assert_eq!(
                errors[0].to_string(),
                "[line 1] Error at ';': Expect end of expression."
            )
        }
        other => panic!("expected a static error, got {:?}", other),
    }
}
