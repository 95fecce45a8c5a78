//! rpn - reverse-Polish calculator engine
//!
//! # Overview
//!
//! Every whitespace-separated word of a line is resolved to a token and the
//! tokens are applied left to right against one shared stack.
//!
//! ```text
//! 1 2 3                # Stack: [1, 2, 3]
//! 1 2 +                # Stack: [3]
//! 2 3 pow              # pow(3, 2): the top of the stack is argument 0
//! 1 2 3 3 collect sum  # [3, 2, 1] summed: Stack: [6]
//! ```
//!
//! A word is one of:
//! - a literal: `42`, `-1.5e3`, `0xff`, `'text'`, `[1,2,pi]`
//! - a meta-action: `collect`, `dup`, `dups`
//! - an operator: `~ not` (unary), `+ - * / // % ** & | ^ << >> @ < <= == != >= > in is`
//! - a constant (`pi`, `e`, `tau`, `inf`, `nan`, `True`, `False`) or a callable
//!   (`sum`, `sqrt`, `print`, ...)
//!
//! Callables pop as many values as they have required parameters.
//!
//! # Example
//!
//! ```rust
//! use rpn::{Evaluator, Value};
//!
//! let mut eval = Evaluator::new();
//! eval.evaluate("1 2 3 3 collect sum").unwrap();
//! assert_eq!(eval.stack(), &[Value::from(6)]);
//!
//! eval.undo();
//! assert!(eval.stack().is_empty());
//! ```

pub mod builtins;
pub mod display;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod registry;
pub mod resolver;
pub mod value;

// Re-export commonly used items
pub use eval::{EvalError, Evaluator};
pub use lexer::{lex_literal, LexError, Literal};
pub use registry::{Builtin, Registry, Signature};
pub use resolver::{MetaAction, Resolver, Token};
pub use value::Value;

/// Convenience function to evaluate one line on a fresh stack
pub fn eval(input: &str) -> Result<Vec<Value>, EvalError> {
    let mut evaluator = Evaluator::new();
    evaluator.evaluate(input)?;
    Ok(evaluator.stack().to_vec())
}
