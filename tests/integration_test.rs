use std::{cell::RefCell, path::PathBuf, process::Command, rc::Rc};

use pretty_assertions::assert_eq;
use treelox::{
    ast::Statement,
    format::format,
    parser::Parser,
    session::{LoxError, Session, Step},
    tree_walk_interpreter::Interpreter,
};

fn run_program(source: &str) -> (String, Vec<LoxError>) {
    let output = Rc::new(RefCell::new(Vec::<u8>::new()));
    let mut session = Session::from_source(source, Interpreter::new(output.clone()));
    let mut errors = Vec::new();
    loop {
        match session.step() {
            Ok(Step::Done) => break,
            Ok(Step::Executed(_)) => {}
            Err(e) => errors.push(e),
        }
    }
    let output = String::from_utf8(output.take()).expect("Output should be valid UTF-8");
    (output, errors)
}

fn test_valid_program(source: &str, expected_output: &str) {
    let (output, errors) = run_program(source);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(output, expected_output);
}

#[test]
fn test_fib() {
    let source = r#"
    fun fib(n) {
        if (n <= 1) return n;
        return fib(n - 1) + fib(n - 2);
    }

    for (var i = 0; i < 10; i = i + 1) {
        print fib(i);
    }
    "#;
    let expected_output = "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n";
    test_valid_program(source, expected_output);
}

#[test]
fn test_closure() {
    let source = r#"
    fun makeCounter() {
        var i = 0;
        fun count() {
            i = i + 1;
            return i;
        }
        return count;
    }

    var counter = makeCounter();
    print counter(); // 1
    print counter(); // 2
    "#;
    let expected_output = "1\n2\n";
    test_valid_program(source, expected_output);
}

#[test]
fn test_independent_closures() {
    let source = r#"
    fun makeCounter() {
        var i = 0;
        fun count() {
            i = i + 1;
            return i;
        }
        return count;
    }

    var first = makeCounter();
    var second = makeCounter();
    first();
    first();
    assert first() == 3;
    assert second() == 1;
    print "ok";
    "#;
    test_valid_program(source, "ok\n");
}

#[test]
fn test_functions_cant_break_scope() {
    let source = r#"
    var a = "global";
    {
        fun showA() {
            print a;
        }
        showA(); // global
        var a = "block";
        showA(); // global
    }
    "#;
    let expected_output = "global\nglobal\n";
    test_valid_program(source, expected_output);
}

#[test]
fn test_shadowing() {
    let source = r#"
    var x = 1;
    {
        var x = 2;
        assert x == 2;
        {
            var x = x + 1;
        }
    }
    assert x == 1;
    print x;
    "#;
    let (output, errors) = run_program(source);
    assert_eq!(output, "1\n");
    // `var x = x + 1` reads the inner x from its own initializer.
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "resolution error on line 7: cannot read local variable in its own initializer"
    );

    test_valid_program(
        "var x = 1; { var x = 2; assert x == 2; } assert x == 1; print x;",
        "1\n",
    );
}

#[test]
fn test_errors_are_reported_once_each() {
    let (output, errors) = run_program("1 = 2; print; print \"after\";");
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "syntax error on line 1: invalid assignment target",
            "syntax error on line 1: expected expression",
        ]
    );
    assert_eq!(output, "after\n");
}

/// Debug rendering with expression ids blanked, since every parse hands out fresh ones.
fn shape(statements: &[Statement]) -> String {
    let debug = format!("{statements:?}");
    let mut shape = String::new();
    let mut rest = debug.as_str();
    while let Some(at) = rest.find("ExprId(") {
        let (head, tail) = rest.split_at(at + "ExprId(".len());
        shape.push_str(head);
        rest = tail.trim_start_matches(|c: char| c.is_ascii_digit());
    }
    shape.push_str(rest);
    shape
}

#[test]
fn test_format_round_trip() {
    let source = r#"
    fun greet(name, times) {
        while (times > 0) {
            if (times == 1 and name != nil) print "hello " + name; else print "hi";
            times = times - 1;
        }
        return;
    }
    var count = -(1 + 2) * 3 / 4;
    greet("lox", 2);
    "#;

    let statements = |source: &str| {
        let mut parser = Parser::from_source(source);
        let mut statements = Vec::new();
        loop {
            match parser.next_statement().expect("source should parse") {
                Statement::End => return statements,
                statement => statements.push(statement),
            }
        }
    };

    let original = statements(source);
    let formatted: String = original.iter().map(|s| format!("{}\n", format(s))).collect();
    assert_eq!(shape(&statements(&formatted)), shape(&original));

    test_valid_program(&formatted, "hi\nhello lox\n");
}

fn script(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("treelox-{}-{name}.lox", std::process::id()));
    std::fs::write(&path, source).expect("should be able to write script");
    path
}

fn treelox(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_treelox"))
        .args(args)
        .output()
        .expect("should be able to run treelox")
}

#[test]
fn test_cli_run_success() {
    let path = script("ok", "print 1 + 2;");
    let output = treelox(&["run", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n");
}

#[test]
fn test_cli_static_errors_stop_execution() {
    let path = script("static", "print \"before\";\nprint ;\nprint \"after\";\nvar = 1;");
    let output = treelox(&["run", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(65));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "before\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("syntax error on line 2"), "{stderr}");
    assert!(stderr.contains("syntax error on line 4"), "{stderr}");
}

#[test]
fn test_cli_runtime_error() {
    let path = script("runtime", "print 1;\nprint nil + 1;\nprint 2;");
    let output = treelox(&["run", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(70));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("runtime error on line 2"));
}

#[test]
fn test_cli_missing_file_and_usage() {
    let output = treelox(&["run", "/nonexistent/treelox/script.lox"]);
    assert_eq!(output.status.code(), Some(74));

    let output = treelox(&["run"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn test_cli_fmt() {
    let path = script("fmt", "var a=1;{print a;}");
    let output = treelox(&["fmt", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "var a = 1;\n{\n\tprint a;\n}\n"
    );
}
