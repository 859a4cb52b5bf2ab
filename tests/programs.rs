//! Whole programs run through the public interpreter API.

use pretty_assertions::assert_eq;

use treelox::interpreter::{Interpreter, LoxError};
use treelox::printer::print_program;

fn run(source: &str) -> (String, Result<(), LoxError>) {
    let mut output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut output);
    let result = interp.run(source);
    drop(interp);
    (String::from_utf8(output).expect("output is not utf-8"), result)
}

fn run_ok(source: &str) -> String {
    match run(source) {
        (out, Ok(())) => out,
        (_, Err(e)) => panic!("unexpected error:\n{}", e),
    }
}

#[test]
fn counter_closure() {
    let prg = r#"
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
        var other = makeCounter();
        other();
        counter();
    "#;
    assert_eq!(run_ok(prg), "1\n2\n1\n3\n");
}

#[test]
fn nested_shadowing() {
    let prg = r#"
        var a = "global a";
        var b = "global b";
        var c = "global c";
        {
            var a = "outer a";
            var b = "outer b";
            {
                var a = "inner a";
                print a;
                print b;
                print c;
            }
            print a;
            print b;
            print c;
        }
        print a;
        print b;
        print c;
    "#;
    assert_eq!(
        run_ok(prg),
        "inner a\nouter b\nglobal c\nouter a\nouter b\nglobal c\nglobal a\nglobal b\nglobal c\n"
    );
}

#[test]
fn number_rendering() {
    assert_eq!(run_ok("print 3; print 3.0; print 0.1 + 0.2 == 0.3; print 10 / 4;"), "3\n3\nfalse\n2.5\n");
}

#[test]
fn string_plus_number() {
    assert_eq!(run_ok("print \"value: \" + 1;"), "value: 1\n");
}

#[test]
fn every_parse_error_is_reported_and_nothing_runs() {
    let (out, result) = run("print \"before\";\nvar = 1;\nprint (1 + 2;\nprint \"after\";");
    assert_eq!(out, "");
    match result {
        Err(e @ LoxError::Compile(_)) => assert_eq!(
            e.to_string(),
            "[line 2] Error at '=': Expect variable name.\n\
             [line 3] Error at ';': Expect ')' after expression."
        ),
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn unterminated_string() {
    let (_, result) = run("\"never closed;\n");
    match result {
        Err(e @ LoxError::Compile(_)) => assert_eq!(e.to_string(), "[line 2] Error: Unterminated string."),
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn runtime_error_keeps_earlier_output() {
    let (out, result) = run("print \"start\";\nvar x = 1 / 0;\nprint \"unreachable\";");
    assert_eq!(out, "start\n");
    match result {
        Err(e @ LoxError::Runtime(_)) => {
            assert_eq!(e.to_string(), "Right oprand must not be zero.\n[line 2]")
        }
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn loops_that_never_run() {
    assert_eq!(run_ok("while (false) print 1; for (;false;) print 2; print 3;"), "3\n");
}

#[test]
fn function_values_print_their_name() {
    assert_eq!(run_ok("fun answer() { return 42; } print answer; print clock;"), "<fn answer>\n<native fn>\n");
}

#[test]
fn runs_are_deterministic() {
    let prg = r#"
        fun fib(n) { if (n <= 1) return n; return fib(n - 2) + fib(n - 1); }
        for (var i = 0; i < 10; i = i + 1) print fib(i);
    "#;
    let first = run_ok(prg);
    assert_eq!(first, "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
    assert_eq!(run_ok(prg), first);
}

#[test]
fn globals_persist_across_runs() -> Result<(), LoxError> {
    let mut output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut output);
    interp.run("var greeting = \"hi\";")?;
    interp.run("fun greet(name) { return greeting + \" \" + name; }")?;
    interp.run("greeting = \"hello\";")?;
    interp.run("print greet(\"lox\");")?;
    drop(interp);
    assert_eq!(output, b"hello lox\n");
    Ok(())
}

#[test]
fn printed_program_parses_back_to_the_same_text() {
    let source = r#"
        var a = 1 + 2 * 3 - -4;
        fun f(x, y) {
            if (x and !y or nil) return x; else if (y) print y;
            while (x < 10) x = x + 1;
            return;
        }
        if (a >= 2) if (a != 3) print "x"; else print "y";
        for (var i = 0; i < 2; i = i + 1) print f(i, (true));
    "#;

    let mut output: Vec<u8> = Vec::new();
    let interp = Interpreter::new(&mut output);
    let printed = print_program(&interp.parse(source).expect("parse error"));
    let reprinted = print_program(&interp.parse(&printed).expect("printed program does not parse"));
    assert_eq!(reprinted, printed);
}

#[test]
fn printed_program_behaves_like_the_original() {
    let source = r#"
        var total = 0;
        for (var i = 1; i <= 4; i = i + 1) {
            if (i == 2) total = total + 10; else total = total - i * 2;
        }
        print total;
        print 2 * (3 + 4) / 7;
        print 1 - (2 - 3);
    "#;
    let mut output: Vec<u8> = Vec::new();
    let interp = Interpreter::new(&mut output);
    let printed = print_program(&interp.parse(source).expect("parse error"));
    drop(interp);

    assert_eq!(run_ok(&printed), run_ok(source));
    assert_eq!(run_ok(source), "-6\n2\n2\n");
}
