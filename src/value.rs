//! Values held on the calculator stack
//!
//! A value is a dynamically-typed scalar (integer, float, boolean, string)
//! or an ordered sequence of values. Tokens never reach the stack; only
//! values do.

use crate::display;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt;

/// A value that can be on the stack
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Arbitrary precision integer
    Int(BigInt),
    /// Double precision float
    Float(f64),
    /// A boolean (also usable as 0/1 in arithmetic)
    Bool(bool),
    /// A string
    Str(String),
    /// An ordered sequence of values
    List(Vec<Value>),
}

impl Value {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Zero, empty and false values are falsy; everything else is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => !n.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Integer view of the value (booleans count as 0/1)
    pub fn as_int(&self) -> Option<BigInt> {
        match self {
            Value::Int(n) => Some(n.clone()),
            Value::Bool(b) => Some(BigInt::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Float view of any numeric value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => n.to_f64(),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Is this an int, float or bool
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }

    /// The unquoted form written by `print`
    pub fn to_print_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Renders the quoted form (`'a'`, `[1, 2.0, True]`)
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => f.write_str(&display::format_float(*x)),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) => f.write_str(&display::quote_str(s)),
            Value::List(items) => f.write_str(&display::format_list(items)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(BigInt::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(BigInt::from(n))
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
