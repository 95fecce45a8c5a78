//! Integration tests for stack semantics, meta-actions and undo

#[path = "common/mod.rs"]
mod common;
#[allow(unused_imports)]
use common::{eval, eval_err, eval_lines, EvalError, Evaluator, Value};

#[test]
fn test_literals_push_in_order() {
    assert_eq!(eval("1 2 3").unwrap(), "[1, 2, 3]");
    assert_eq!(eval("0x10 0b11 0o7 1_000").unwrap(), "[16, 3, 7, 1000]");
    assert_eq!(eval("'a' \"b\" [1,'c',[]]").unwrap(), "['a', 'b', [1, 'c', []]]");
}

#[test]
fn test_collect() {
    assert_eq!(eval("1 2 3 3 collect").unwrap(), "[[3, 2, 1]]");
    assert_eq!(eval("1 2 3 3 collect sum").unwrap(), "[6]");
    assert_eq!(eval("1 2 3 True collect").unwrap(), "[1, 2, [3]]");
    assert_eq!(eval("5 -1 collect").unwrap(), "[5, []]");
}

#[test]
fn test_collect_underflow() {
    let err = eval_err("1 3 collect");
    assert_eq!(err, EvalError::StackUnderflow("collect".into()));
}

#[test]
fn test_dup() {
    assert_eq!(eval("7 dup").unwrap(), "[7, 7]");
    assert_eq!(eval("7 dup *").unwrap(), "[49]");
}

#[test]
fn test_dups_reverses_instead_of_duplicating() {
    // `n dups` pops n values and pushes them back in pop order
    assert_eq!(eval("1 2 3 2 dups").unwrap(), "[1, 3, 2]");
    assert_eq!(eval("1 2 3 3 dups").unwrap(), "[3, 2, 1]");
}

#[test]
fn test_callable_arity() {
    assert_eq!(eval("2 3 pow").unwrap(), "[9]");
    assert_eq!(eval("1 0 atan2").unwrap(), "[0.0]");
    assert_eq!(eval("7 2 divmod").unwrap(), "[[0, 2]]");
    assert_eq!(eval("16 sqrt").unwrap(), "[4.0]");
    assert_eq!(eval("2.5 round").unwrap(), "[2]");
}

#[test]
fn test_print_leaves_stack_unchanged() {
    let mut evaluator = Evaluator::new();
    evaluator.evaluate("1 'hi' print").unwrap();
    assert_eq!(evaluator.render_stack(), "[1, 'hi']");
    assert_eq!(evaluator.drain_output(), vec!["hi".to_string()]);
}

#[test]
fn test_unresolved_word_is_skipped() {
    let mut evaluator = Evaluator::new();
    evaluator.evaluate("1 nosuch 2 +").unwrap();
    assert_eq!(evaluator.render_stack(), "[3]");
    assert_eq!(
        evaluator.drain_diagnostics(),
        vec!["could not parse nosuch".to_string()]
    );
}

#[test]
fn test_underflow_is_reported_not_zero() {
    assert_eq!(eval_err("+"), EvalError::StackUnderflow("+".into()));
    assert_eq!(eval_err("5 +"), EvalError::StackUnderflow("+".into()));
    assert_eq!(eval_err("not"), EvalError::StackUnderflow("not".into()));
    assert_eq!(eval_err("pow"), EvalError::StackUnderflow("pow".into()));
}

#[test]
fn test_undo_restores_previous_line() {
    let mut evaluator = eval_lines(&["1 2", "3 +"]).unwrap();
    assert_eq!(evaluator.render_stack(), "[1, 5]");
    evaluator.undo();
    assert_eq!(evaluator.render_stack(), "[1, 2]");
    evaluator.undo();
    assert_eq!(evaluator.render_stack(), "[1, 2]");
}

#[test]
fn test_undo_after_failed_line() {
    let mut evaluator = eval_lines(&["1 2"]).unwrap();
    assert!(evaluator.evaluate("3 + + +").is_err());
    assert!(evaluator.stack().is_empty());
    evaluator.undo();
    assert_eq!(evaluator.stack(), &[Value::from(1), Value::from(2)]);
}

#[test]
fn test_clear_and_undo() {
    let mut evaluator = eval_lines(&["1 2 3"]).unwrap();
    evaluator.clear();
    assert_eq!(evaluator.render_stack(), "[]");
    evaluator.undo();
    assert_eq!(evaluator.render_stack(), "[1, 2, 3]");
    evaluator.undo();
    assert_eq!(evaluator.render_stack(), "[1, 2, 3]");
}

#[test]
fn test_syntax_error_leaves_stack() {
    let mut evaluator = eval_lines(&["4"]).unwrap();
    let err = evaluator.evaluate("5 'open").unwrap_err();
    assert!(matches!(err, EvalError::Syntax(_)));
    assert_eq!(evaluator.render_stack(), "[4]");
}

#[test]
fn test_library_eval_helper() {
    assert_eq!(
        rpn::eval("1 2 +").unwrap(),
        vec![Value::from(3)]
    );
}
