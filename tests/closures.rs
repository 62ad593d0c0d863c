mod common;

use common::run_ok;
use pretty_assertions::assert_eq;

#[test]
fn counter_keeps_its_state_between_calls() {
    let source = r#"
        fun makeCounter() {
          var i = 0;
          fun count() {
            i = i + 1;
            print i;
          }
          return count;
        }

        var counter = makeCounter();
        counter();
        counter();
    "#;

    assert_eq!(run_ok(source), "1\n2\n");
}

#[test]
fn closures_bind_statically_not_dynamically() {
    let source = r#"
        var a = "global";
        {
          fun showA() {
            print a;
          }

          showA();
          var a = "block";
          showA();
        }
    "#;

    assert_eq!(run_ok(source), "global\nglobal\n");
}

#[test]
fn sibling_closures_share_one_captured_scope() {
    let source = r#"
        var get;
        var set;
        fun pair() {
          var value = "initial";
          fun g() { return value; }
          fun s(v) { value = v; }
          get = g;
          set = s;
        }
        pair();
        print get();
        set("updated");
        print get();
    "#;

    assert_eq!(run_ok(source), "initial\nupdated\n");
}

#[test]
fn captured_variable_is_read_at_call_time() {
    let source = r#"
        fun outer() {
          var x = 1;
          fun show() { print x; }
          x = 2;
          return show;
        }
        outer()();
    "#;

    assert_eq!(run_ok(source), "2\n");
}

#[test]
fn each_call_creates_fresh_state() {
    let source = r#"
        fun makeCounter() {
          var i = 0;
          return fun () { i = i + 1; return i; };
        }
        var a = makeCounter();
        var b = makeCounter();
        print a();
        print a();
        print b();
    "#;

    assert_eq!(run_ok(source), "1\n2\n1\n");
}

#[test]
fn curried_lambdas() {
    let source = r#"
        fun adder(n) {
          return fun (x) { return x + n; };
        }
        print adder(2)(3);
    "#;

    assert_eq!(run_ok(source), "5\n");
}

#[test]
fn lambda_passed_as_an_argument() {
    let source = r#"
        fun apply(f, v) { return f(v); }
        print apply(fun (x) { return x * 2; }, 21);
    "#;

    assert_eq!(run_ok(source), "42\n");
}

#[test]
fn loop_closures_capture_the_single_loop_variable() {
    let source = r#"
        var first;
        var second;
        for (var i = 0; i < 2; i = i + 1) {
          fun show() { print i; }
          if (first == nil) first = show; else second = show;
        }
        first();
        second();
    "#;

    assert_eq!(run_ok(source), "2\n2\n");
}

#[test]
fn local_function_can_recurse() {
    let source = r#"
        {
          fun fact(n) {
            return n <= 1 ? 1 : n * fact(n - 1);
          }
          print fact(5);
        }
    "#;

    assert_eq!(run_ok(source), "120\n");
}

#[test]
fn closure_defined_in_one_unit_runs_in_a_later_one() {
    let (mut session, buffer) = common::session();

    session
        .run("fun makeCounter() { var i = 0; return fun () { i = i + 1; print i; }; }\nvar c = makeCounter();")
        .expect("first unit runs");
    session.run("c();").expect("second unit runs");
    session.run("{ var unrelated = 0; c(); }").expect("third unit runs");

    assert_eq!(buffer.contents(), "1\n2\n");
}
