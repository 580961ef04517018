//! End-to-end programs: read with the reader, evaluate in one session, compare
//! printed results.

#![expect(clippy::unwrap_used)] // test code OK

use minischeme::config::Config;
use minischeme::evaluator::{Environment, create_global_env, create_global_env_with_config, eval};
use minischeme::scheme::parse_program;
use minischeme::{Error, ErrorKind};
use pretty_assertions::assert_eq;

/// Evaluate every expression of `source` in `env`, printing each outcome the
/// way the shell does.
fn run_in(env: &mut Environment, source: &str) -> Vec<String> {
    let program = parse_program(source, env.config().parse_config()).unwrap();
    program
        .iter()
        .map(|expr| match eval(expr, env) {
            Ok(value) => value.to_string(),
            Err(err) => format!("Error: {err}"),
        })
        .collect()
}

fn run(source: &str) -> Vec<String> {
    run_in(&mut create_global_env(), source)
}

#[test]
fn test_documented_examples() {
    let output = run(r"
        (cond (#f 1) (#t 2) (else 3))
        (cond (#f 1) (#f 2))
        (append '(1 2) '(3 4))
        (append '(1 2) 3)
        (define (square x) (* x x))
        (square 5)
        (and)
        (or)
        (and 1 #f 2)
        (or #f 1 2)
    ");

    assert_eq!(
        output,
        vec![
            "2",
            "()",
            "(1 2 3 4)",
            "(1 2 . 3)",
            "square",
            "25",
            "#t",
            "#f",
            "#f",
            "1",
        ]
    );
}

#[test]
fn test_list_processing_program() {
    let output = run(r"
        ; association list helpers
        (define table '((apple 3) (pear 5) (fig 7)))
        (define (lookup key) (cond ((assoc key table) (car (cdr (assoc key table)))) (else 0)))
        (lookup 'pear)
        (lookup 'kiwi)

        (define (sum l) (if (null? l) 0 (+ (car l) (sum (cdr l)))))
        (sum '(1 2 3 4 5))

        (define (reverse-onto l acc) (if (null? l) acc (reverse-onto (cdr l) (cons (car l) acc))))
        (reverse-onto '(1 2 3) '())

        (define (map1 f l) (if (null? l) '() (cons (f (car l)) (map1 f (cdr l)))))
        (map1 square '(1 2 3))
        (define (square x) (* x x))
        (map1 square '(1 2 3))
        (map1 (lambda (x) (list x x)) '(a b))
    ");

    assert_eq!(
        output,
        vec![
            "table",
            "lookup",
            "5",
            "0",
            "sum",
            "15",
            "reverse-onto",
            "(3 2 1)",
            "map1",
            "Error: ReferenceError: undefined symbol square",
            "square",
            "(1 4 9)",
            "((a a) (b b))",
        ]
    );
}

#[test]
fn test_session_recovers_after_errors() {
    let mut env = create_global_env();
    let output = run_in(
        &mut env,
        r"
        (define x 1)
        (car x)
        (undefined)
        ((lambda (a b) a) 1)
        (cond (else 1) (#t 2))
        (+ x 1)
    ",
    );

    assert_eq!(
        output,
        vec![
            "x",
            "Error: TypeError: car: expected cons cell, got integer",
            "Error: ReferenceError: undefined symbol undefined",
            "Error: ArityError: anonymous: expected 2 arguments, got 1",
            "Error: SyntaxError: cond: else must be the last clause",
            "2",
        ]
    );
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_failed_arithmetic_has_no_side_effects() {
    let mut env = create_global_env();
    let output = run_in(
        &mut env,
        r"
        (+ #t (define z 1))
        (+ #t undefined-var)
        (cond (#t 'first) (else 'second) (#t 'third))
    ",
    );

    assert_eq!(
        output,
        vec![
            "Error: TypeError: +: expected integer, got boolean",
            "Error: TypeError: +: expected integer, got boolean",
            "first",
        ]
    );
    assert!(env.lookup("z").is_none());
}

#[test]
fn test_error_kinds() {
    let cases = [
        ("(car 1)", ErrorKind::Type),
        ("(cons 1)", ErrorKind::Arity),
        ("nope", ErrorKind::Reference),
        ("(lambda (1) 1)", ErrorKind::Syntax),
        ("(* 9223372036854775807 9223372036854775807)", ErrorKind::Eval),
        ("(exit)", ErrorKind::Exit),
    ];

    for (input, kind) in cases {
        let mut env = create_global_env();
        let program = parse_program(input, env.config().parse_config()).unwrap();
        let err = eval(&program[0], &mut env).unwrap_err();
        assert_eq!(err.kind(), kind, "{input}");
    }
}

#[test]
fn test_exit_stops_remaining_program() {
    let mut env = create_global_env();
    let program = parse_program("(define a 1) (exit) (define b 2)", env.config().parse_config())
        .unwrap();

    let mut results = Vec::new();
    for expr in &program {
        match eval(expr, &mut env) {
            Ok(value) => results.push(value.to_string()),
            Err(Error::Exit) => break,
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    assert_eq!(results, vec!["a"]);
    assert!(env.lookup("b").is_none());
}

#[test]
fn test_depth_limit_recovers() {
    let mut env = create_global_env_with_config(Config::default().with_max_eval_depth(500));
    let output = run_in(
        &mut env,
        r"
        (define (count-down n) (if (= n 0) 'done (count-down (- n 1))))
        (count-down 10)
        (count-down 100000)
        (count-down 3)
    ",
    );

    assert_eq!(output[0], "count-down");
    assert_eq!(output[1], "done");
    assert!(output[2].starts_with("Error: EvaluationError: Evaluation depth limit exceeded"));
    assert_eq!(output[3], "done");
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_comments_can_be_disabled() {
    let mut env = create_global_env_with_config(Config::default().without_comments());
    let output = run_in(&mut env, "(define a;b 5) a;b");
    assert_eq!(output, vec!["a;b", "5"]);
}
