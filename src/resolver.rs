//! Word resolver: turns one whitespace-delimited word into a [`Token`]
//!
//! Resolution order:
//! 1. Meta-action names and operator symbols (symbols win over literals)
//! 2. The literal grammar (numbers, strings, lists)
//! 3. Names: user bindings, then constants, then callables
//!
//! Resolution never touches the stack.

use crate::eval::EvalError;
use crate::lexer::{lex_literal, signed_name, Literal};
use crate::ops::{self, BinaryOp, UnaryOp};
use crate::registry::{Builtin, Registry, Symbol};
use crate::value::Value;
use num_bigint::BigInt;
use std::collections::HashMap;
use std::fmt;

/// Names of the stack-transforming meta-actions
pub const META_ACTIONS: &[&str] = &["collect", "dup", "dups"];

/// A stack transform keyed by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaAction {
    /// `n collect`: pop n values into one list (top first)
    Collect,
    /// `x dup`: push x twice
    Dup,
    /// `n dups`: pop n values and push them back in pop order
    Dups,
}

impl MetaAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "collect" => Some(MetaAction::Collect),
            "dup" => Some(MetaAction::Dup),
            "dups" => Some(MetaAction::Dups),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MetaAction::Collect => "collect",
            MetaAction::Dup => "dup",
            MetaAction::Dups => "dups",
        }
    }
}

/// A resolved word
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Literal(Value),
    MetaAction(MetaAction),
    UnaryOp(UnaryOp),
    BinaryOp(BinaryOp),
    Callable(Builtin),
    /// The word could not be bound; dispatching it is a no-op
    Unresolved(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(v) => write!(f, "{}", v),
            Token::MetaAction(m) => f.write_str(m.name()),
            Token::UnaryOp(op) => f.write_str(op.symbol),
            Token::BinaryOp(op) => f.write_str(op.symbol),
            Token::Callable(b) => f.write_str(b.name),
            Token::Unresolved(word) => write!(f, "?{}", word),
        }
    }
}

/// Resolves words against the symbol table and user bindings
pub struct Resolver<'a> {
    registry: &'a Registry,
    bindings: &'a HashMap<String, Value>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry, bindings: &'a HashMap<String, Value>) -> Self {
        Resolver { registry, bindings }
    }

    /// Check if a word is a meta-action or operator symbol
    pub fn is_symbol(word: &str) -> bool {
        META_ACTIONS.contains(&word)
            || ops::lookup_unary(word).is_some()
            || ops::lookup_binary(word).is_some()
    }

    /// Resolve one word.
    ///
    /// Unknown names become [`Token::Unresolved`]; a word outside the
    /// literal grammar is a syntax error.
    pub fn resolve(&self, word: &str) -> Result<Token, EvalError> {
        if let Some(action) = MetaAction::from_name(word) {
            return Ok(Token::MetaAction(action));
        }
        if let Some(op) = ops::lookup_unary(word) {
            return Ok(Token::UnaryOp(op));
        }
        if let Some(op) = ops::lookup_binary(word) {
            return Ok(Token::BinaryOp(op));
        }

        // `-pi` negates a named number
        if let Some((negate, name)) = signed_name(word) {
            let token = match self.lookup_value(name) {
                Some(v) if negate => negate_value(&v).map(Token::Literal),
                Some(v) if v.is_numeric() => Some(Token::Literal(v)),
                _ => None,
            };
            return Ok(token.unwrap_or_else(|| self.unresolved(word)));
        }

        let token = match lex_literal(word)? {
            Literal::Name(name) => match self.lookup(&name) {
                Some(Symbol::Constant(v)) => Token::Literal(v),
                Some(Symbol::Callable(b)) => Token::Callable(b),
                None => self.unresolved(word),
            },
            literal => match self.literal_value(literal) {
                Some(v) => Token::Literal(v),
                None => self.unresolved(word),
            },
        };
        Ok(token)
    }

    /// Bindings shadow the registry
    fn lookup(&self, name: &str) -> Option<Symbol> {
        match self.bindings.get(name) {
            Some(v) => Some(Symbol::Constant(v.clone())),
            None => self.registry.lookup(name),
        }
    }

    fn lookup_value(&self, name: &str) -> Option<Value> {
        match self.lookup(name)? {
            Symbol::Constant(v) => Some(v),
            Symbol::Callable(_) => None,
        }
    }

    /// Convert a parsed literal; `None` if a name inside it is not a value
    fn literal_value(&self, literal: Literal) -> Option<Value> {
        match literal {
            Literal::Int(n) => Some(Value::Int(n)),
            Literal::Float(x) => Some(Value::Float(x)),
            Literal::Str(s) => Some(Value::Str(s)),
            Literal::Name(name) => self.lookup_value(&name),
            Literal::List(items) => items
                .into_iter()
                .map(|item| self.literal_value(item))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
        }
    }

    fn unresolved(&self, word: &str) -> Token {
        tracing::debug!(word = %word, "could not parse");
        Token::Unresolved(word.to_string())
    }
}

fn negate_value(v: &Value) -> Option<Value> {
    match v {
        Value::Int(n) => Some(Value::Int(-n)),
        Value::Float(x) => Some(Value::Float(-x)),
        Value::Bool(b) => Some(Value::Int(-BigInt::from(u8::from(*b)))),
        _ => None,
    }
}
