//! Evaluator for rpn - postfix evaluation against one shared stack
//!
//! A line is split on whitespace and every word is resolved to a
//! [`Token`](crate::resolver::Token) before anything runs. The tokens are
//! then dispatched in order:
//! - Literals push themselves
//! - Meta-actions pop a control value and transform the stack
//! - Unary operators pop one operand, binary operators pop two
//! - Callables pop as many values as their arity and push the result
//! - Unresolved words do nothing
//!
//! The stack as it was before the line is kept for a single level of undo.
//! An error stops the line where it happened; the stack is not rolled back.

mod history;
mod meta;
mod stack;

pub use history::History;
pub use stack::Stack;

use crate::display;
use crate::lexer::{is_identifier, LexError};
use crate::ops::{BinaryOp, UnaryOp};
use crate::registry::{Builtin, Registry};
use crate::resolver::{Resolver, Token, META_ACTIONS};
use crate::value::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Stack underflow: {0}")]
    StackUnderflow(String),
    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },
    #[error("Type error: {0}")]
    Unsupported(String),
    #[error("Division by zero: {0}")]
    ZeroDivision(String),
    #[error("Value error: {0}")]
    ValueError(String),
    #[error(transparent)]
    Syntax(#[from] LexError),
    #[error("Invalid name: {0}")]
    InvalidName(String),
}

/// The evaluator owns the stack, its undo history and the symbol table
pub struct Evaluator {
    /// The value stack
    pub(crate) stack: Stack,
    /// Stack before the last evaluated line
    pub(crate) history: History,
    /// Constants and callables
    pub(crate) registry: Registry,
    /// User bindings made with `exec`; these shadow the registry
    pub(crate) bindings: HashMap<String, Value>,
    /// Lines written by `print`, not yet shown
    pub(crate) output: Vec<String>,
    /// Resolver diagnostics, not yet shown
    pub(crate) diagnostics: Vec<String>,
    /// Print each token and the stack after it to stderr
    pub(crate) trace_mode: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator with the standard constants and builtins
    pub fn new() -> Self {
        Self::with_registry(Registry::with_builtins())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Evaluator {
            stack: Stack::new(),
            history: History::new(),
            registry,
            bindings: HashMap::new(),
            output: Vec::new(),
            diagnostics: Vec::new(),
            trace_mode: false,
        }
    }

    pub fn set_trace_mode(&mut self, enabled: bool) {
        self.trace_mode = enabled;
    }

    /// Evaluate one line of postfix words.
    ///
    /// The stack is recorded for `undo` first. Every word is resolved before
    /// any is dispatched, so a syntax error leaves the stack untouched.
    pub fn evaluate(&mut self, line: &str) -> Result<(), EvalError> {
        self.history.record(&self.stack);
        let tokens = self.resolve_line(line)?;
        for token in &tokens {
            tracing::debug!(token = %token, depth = self.stack.len(), "dispatch");
            self.dispatch(token)?;
            if self.trace_mode {
                self.print_trace(token);
            }
        }
        Ok(())
    }

    fn resolve_line(&mut self, line: &str) -> Result<Vec<Token>, EvalError> {
        let resolver = Resolver::new(&self.registry, &self.bindings);
        let mut tokens = Vec::new();
        for word in line.split_whitespace() {
            let token = resolver.resolve(word)?;
            if let Token::Unresolved(word) = &token {
                self.diagnostics.push(format!("could not parse {}", word));
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn dispatch(&mut self, token: &Token) -> Result<(), EvalError> {
        match token {
            Token::Literal(v) => self.stack.push(v.clone()),
            Token::MetaAction(action) => self.apply_meta(*action)?,
            Token::UnaryOp(op) => self.apply_unary(*op)?,
            Token::BinaryOp(op) => self.apply_binary(*op)?,
            Token::Callable(builtin) => self.apply_callable(*builtin)?,
            Token::Unresolved(_) => {}
        }
        Ok(())
    }

    fn apply_unary(&mut self, op: UnaryOp) -> Result<(), EvalError> {
        let operand = self.stack.pop(op.symbol)?;
        match (op.apply)(&operand)? {
            Some(result) => self.stack.push(result),
            None => self.stack.push(operand),
        }
        Ok(())
    }

    /// `a b op` computes `a op b`
    fn apply_binary(&mut self, op: BinaryOp) -> Result<(), EvalError> {
        let top1 = self.stack.pop(op.symbol)?;
        let top2 = self.stack.pop(op.symbol)?;
        match (op.apply)(&top2, &top1)? {
            Some(result) => self.stack.push(result),
            None => {
                self.stack.push(top2);
                self.stack.push(top1);
            }
        }
        Ok(())
    }

    /// Argument 0 is the value that was on top
    fn apply_callable(&mut self, builtin: Builtin) -> Result<(), EvalError> {
        let args = self.stack.pop_n(builtin.arity(), builtin.name)?;
        match builtin.call(&args, &mut self.output)? {
            Some(result) => self.stack.push(result),
            None => self.stack.extend(args.into_iter().rev()),
        }
        Ok(())
    }

    /// Empty the stack; `undo` brings it back
    pub fn clear(&mut self) {
        self.history.record(&self.stack);
        self.stack.clear();
    }

    /// Restore the stack from before the last line or `clear`
    pub fn undo(&mut self) {
        self.history.restore_into(&mut self.stack);
    }

    /// Empty both the stack and the undo slot
    pub fn reset(&mut self) {
        self.stack.clear();
        self.history.forget();
    }

    pub fn stack(&self) -> &[Value] {
        self.stack.as_slice()
    }

    /// The stack as a list: `[1, 'a', 2.5]`
    pub fn render_stack(&self) -> String {
        display::render_stack(self.stack.as_slice())
    }

    /// Take the lines written by `print` since the last call
    pub fn drain_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Take the resolver diagnostics since the last call
    pub fn drain_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bind a name to a value; the binding shadows constants and callables
    pub fn bind(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        if !is_identifier(name) || Resolver::is_symbol(name) {
            return Err(EvalError::InvalidName(name.to_string()));
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Every word a line can name: meta-actions, constants, callables, bindings
    pub fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = META_ACTIONS
            .iter()
            .chain(self.registry.constant_names().iter())
            .chain(self.registry.callable_names().iter())
            .map(|s| s.to_string())
            .chain(self.bindings.keys().cloned())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Evaluate `expr` on a scratch stack and bind `name` to the top value.
    ///
    /// The main stack and its undo slot are not touched.
    pub fn define(&mut self, name: &str, expr: &str) -> Result<Value, EvalError> {
        if !is_identifier(name) || Resolver::is_symbol(name) {
            return Err(EvalError::InvalidName(name.to_string()));
        }
        let mut scratch = Evaluator::with_registry(self.registry.clone());
        scratch.bindings = self.bindings.clone();
        let result = scratch.evaluate(expr);
        self.output.append(&mut scratch.output);
        self.diagnostics.append(&mut scratch.diagnostics);
        result?;

        let value = scratch
            .stack
            .peek()
            .cloned()
            .ok_or_else(|| EvalError::StackUnderflow(format!("exec {}", name)))?;
        self.bind(name, value.clone())?;
        Ok(value)
    }

    /// Print one trace line: the token and the stack after it
    pub(crate) fn print_trace(&self, token: &Token) {
        let stack_items: Vec<String> = self
            .stack
            .as_slice()
            .iter()
            .rev()
            .take(5)
            .map(|v| {
                let s = v.to_string();
                if s.chars().count() > 20 {
                    format!("{}...", s.chars().take(17).collect::<String>())
                } else {
                    s
                }
            })
            .collect();

        let stack_str = if stack_items.is_empty() {
            "(empty)".to_string()
        } else {
            stack_items.into_iter().rev().collect::<Vec<_>>().join(" ")
        };

        eprintln!("\x1b[90m>>> {} │ {}\x1b[0m", token, stack_str);
    }
}
