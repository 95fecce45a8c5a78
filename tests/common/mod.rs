//! Common test utilities for rpn integration tests

pub use rpn::{EvalError, Evaluator, Value};

/// Evaluate one line on a fresh stack and return the rendered stack
pub fn eval(input: &str) -> Result<String, String> {
    let mut evaluator = Evaluator::new();
    evaluator.evaluate(input).map_err(|e| e.to_string())?;
    Ok(evaluator.render_stack())
}

/// Evaluate several lines in sequence on one evaluator
#[allow(dead_code)]
pub fn eval_lines(lines: &[&str]) -> Result<Evaluator, EvalError> {
    let mut evaluator = Evaluator::new();
    for line in lines {
        evaluator.evaluate(line)?;
    }
    Ok(evaluator)
}

/// Evaluate and return the error
#[allow(dead_code)]
pub fn eval_err(input: &str) -> EvalError {
    let mut evaluator = Evaluator::new();
    match evaluator.evaluate(input) {
        Ok(()) => panic!("expected {:?} to fail, stack {}", input, evaluator.render_stack()),
        Err(e) => e,
    }
}
