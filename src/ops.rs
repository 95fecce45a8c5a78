//! Operator tables
//!
//! Every operator symbol maps to an explicit implementation function. Binary
//! operators receive `(left, right)` where `left` is the operand that was
//! pushed earlier. An implementation returns `Ok(None)` when it produces no
//! result; the dispatcher then restores the operands.

use crate::eval::EvalError;
use crate::value::Value;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Result of applying an operator or callable
pub type OpResult = Result<Option<Value>, EvalError>;

pub type UnaryFn = fn(&Value) -> OpResult;
pub type BinaryFn = fn(&Value, &Value) -> OpResult;

/// A prefix operator applied to the top of the stack
#[derive(Clone, Copy)]
pub struct UnaryOp {
    pub symbol: &'static str,
    pub apply: UnaryFn,
}

/// An infix operator applied to the top two stack values
#[derive(Clone, Copy)]
pub struct BinaryOp {
    pub symbol: &'static str,
    pub apply: BinaryFn,
}

impl PartialEq for UnaryOp {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl PartialEq for BinaryOp {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl fmt::Debug for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnaryOp({})", self.symbol)
    }
}

impl fmt::Debug for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryOp({})", self.symbol)
    }
}

pub const UNARY_OPS: &[UnaryOp] = &[
    UnaryOp { symbol: "~", apply: invert },
    UnaryOp { symbol: "not", apply: not },
];

// `is not` is absent: a two-word symbol can never survive whitespace
// splitting. `a b is not` gives the same answer.
pub const BINARY_OPS: &[BinaryOp] = &[
    BinaryOp { symbol: "+", apply: add },
    BinaryOp { symbol: "in", apply: contains },
    BinaryOp { symbol: "/", apply: true_div },
    BinaryOp { symbol: "//", apply: floor_div },
    BinaryOp { symbol: "&", apply: bit_and },
    BinaryOp { symbol: "^", apply: bit_xor },
    BinaryOp { symbol: "|", apply: bit_or },
    BinaryOp { symbol: "**", apply: power },
    BinaryOp { symbol: "is", apply: identical },
    BinaryOp { symbol: "<<", apply: shift_left },
    BinaryOp { symbol: "%", apply: modulo },
    BinaryOp { symbol: "*", apply: mul },
    BinaryOp { symbol: "@", apply: mat_mul },
    BinaryOp { symbol: ">>", apply: shift_right },
    BinaryOp { symbol: "-", apply: sub },
    BinaryOp { symbol: "<", apply: lt },
    BinaryOp { symbol: "<=", apply: le },
    BinaryOp { symbol: "==", apply: eq },
    BinaryOp { symbol: "!=", apply: ne },
    BinaryOp { symbol: ">=", apply: ge },
    BinaryOp { symbol: ">", apply: gt },
];

pub fn lookup_unary(symbol: &str) -> Option<UnaryOp> {
    UNARY_OPS.iter().find(|op| op.symbol == symbol).copied()
}

pub fn lookup_binary(symbol: &str) -> Option<BinaryOp> {
    BINARY_OPS.iter().find(|op| op.symbol == symbol).copied()
}

// ========================================
// Numeric helpers
// ========================================

/// Numeric view of a value: bools widen to ints
pub(crate) enum Num {
    Int(BigInt),
    Float(f64),
}

impl Num {
    pub(crate) fn of(v: &Value) -> Option<Num> {
        match v {
            Value::Float(f) => Some(Num::Float(*f)),
            other => other.as_int().map(Num::Int),
        }
    }

    pub(crate) fn to_f64(&self) -> Result<f64, EvalError> {
        match self {
            Num::Float(f) => Ok(*f),
            Num::Int(n) => n
                .to_f64()
                .filter(|f| f.is_finite())
                .ok_or_else(|| EvalError::ValueError("int too large to convert to float".into())),
        }
    }
}

fn unsupported(symbol: &str, a: &Value, b: &Value) -> EvalError {
    EvalError::Unsupported(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        symbol,
        a.type_name(),
        b.type_name()
    ))
}

/// Apply an arithmetic operator: int op int stays exact, anything with a
/// float is computed in floating point.
fn arith(
    symbol: &str,
    a: &Value,
    b: &Value,
    int_op: fn(&BigInt, &BigInt) -> Result<Value, EvalError>,
    float_op: fn(f64, f64) -> Result<Value, EvalError>,
) -> OpResult {
    match (Num::of(a), Num::of(b)) {
        (Some(Num::Int(x)), Some(Num::Int(y))) => int_op(&x, &y).map(Some),
        (Some(x), Some(y)) => float_op(x.to_f64()?, y.to_f64()?).map(Some),
        _ => Err(unsupported(symbol, a, b)),
    }
}

/// Largest string or list a repetition may build, in bytes or items
pub(crate) const MAX_REPEAT_LEN: usize = 1 << 24;

/// Largest integer, in bits, that `<<` and `**` may build
pub(crate) const MAX_INT_BITS: u64 = 1 << 26;

/// Repetition count for a sequence of `len` elements
fn repeat_count(n: &BigInt, len: usize) -> Result<usize, EvalError> {
    if n.is_negative() || len == 0 {
        return Ok(0);
    }
    n.to_usize()
        .filter(|count| count.checked_mul(len).map_or(false, |total| total <= MAX_REPEAT_LEN))
        .ok_or_else(|| EvalError::ValueError("repeated sequence too large".into()))
}

fn shift_count(n: &BigInt) -> Result<u64, EvalError> {
    if n.is_negative() {
        return Err(EvalError::ValueError("negative shift count".into()));
    }
    Ok(n.to_u64().unwrap_or(u64::MAX))
}

/// Integer division rounding toward negative infinity
pub(crate) fn int_floor_div(a: &BigInt, b: &BigInt) -> Result<BigInt, EvalError> {
    if b.is_zero() {
        return Err(EvalError::ZeroDivision("integer division or modulo by zero".into()));
    }
    let q = a / b;
    let r = a % b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Remainder taking the sign of the divisor
pub(crate) fn int_mod(a: &BigInt, b: &BigInt) -> Result<BigInt, EvalError> {
    if b.is_zero() {
        return Err(EvalError::ZeroDivision("integer division or modulo by zero".into()));
    }
    let r = a % b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

pub(crate) fn float_mod(a: f64, b: f64) -> Result<f64, EvalError> {
    if b == 0.0 {
        return Err(EvalError::ZeroDivision("float modulo".into()));
    }
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

// ========================================
// Unary operators
// ========================================

fn invert(v: &Value) -> OpResult {
    match v.as_int() {
        Some(n) => Ok(Some(Value::Int(-(n + BigInt::one())))),
        None => Err(EvalError::Unsupported(format!(
            "bad operand type for unary ~: '{}'",
            v.type_name()
        ))),
    }
}

fn not(v: &Value) -> OpResult {
    Ok(Some(Value::Bool(!v.is_truthy())))
}

// ========================================
// Arithmetic
// ========================================

pub(crate) fn add(a: &Value, b: &Value) -> OpResult {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(Some(Value::Str(format!("{}{}", x, y)))),
        (Value::List(x), Value::List(y)) => {
            let mut items = x.clone();
            items.extend(y.iter().cloned());
            Ok(Some(Value::List(items)))
        }
        _ => arith("+", a, b, |x, y| Ok(Value::Int(x + y)), |x, y| Ok(Value::Float(x + y))),
    }
}

fn sub(a: &Value, b: &Value) -> OpResult {
    arith("-", a, b, |x, y| Ok(Value::Int(x - y)), |x, y| Ok(Value::Float(x - y)))
}

pub(crate) fn mul(a: &Value, b: &Value) -> OpResult {
    let repeated = match (a, b) {
        (Value::Str(s), n) | (n, Value::Str(s)) if !matches!(n, Value::Float(_)) => {
            match n.as_int() {
                Some(count) => Some(Value::Str(s.repeat(repeat_count(&count, s.len())?))),
                None => None,
            }
        }
        (Value::List(items), n) | (n, Value::List(items)) if !matches!(n, Value::Float(_)) => {
            match n.as_int() {
                Some(count) => {
                    let count = repeat_count(&count, items.len())?;
                    Some(Value::List(
                        std::iter::repeat(items.iter().cloned()).take(count).flatten().collect(),
                    ))
                }
                None => None,
            }
        }
        _ => None,
    };
    match repeated {
        Some(v) => Ok(Some(v)),
        None => arith("*", a, b, |x, y| Ok(Value::Int(x * y)), |x, y| Ok(Value::Float(x * y))),
    }
}

fn true_div(a: &Value, b: &Value) -> OpResult {
    match (Num::of(a), Num::of(b)) {
        (Some(x), Some(y)) => {
            let divisor = y.to_f64()?;
            if divisor == 0.0 {
                return Err(EvalError::ZeroDivision("division by zero".into()));
            }
            Ok(Some(Value::Float(x.to_f64()? / divisor)))
        }
        _ => Err(unsupported("/", a, b)),
    }
}

pub(crate) fn floor_div(a: &Value, b: &Value) -> OpResult {
    arith(
        "//",
        a,
        b,
        |x, y| int_floor_div(x, y).map(Value::Int),
        |x, y| {
            if y == 0.0 {
                return Err(EvalError::ZeroDivision("float floor division by zero".into()));
            }
            Ok(Value::Float((x / y).floor()))
        },
    )
}

pub(crate) fn modulo(a: &Value, b: &Value) -> OpResult {
    arith(
        "%",
        a,
        b,
        |x, y| int_mod(x, y).map(Value::Int),
        |x, y| float_mod(x, y).map(Value::Float),
    )
}

pub(crate) fn power(a: &Value, b: &Value) -> OpResult {
    arith("**", a, b, int_pow, float_pow)
}

fn int_pow(base: &BigInt, exp: &BigInt) -> Result<Value, EvalError> {
    if exp.is_negative() {
        let base = Num::Int(base.clone()).to_f64()?;
        let exp = Num::Int(exp.clone()).to_f64()?;
        return float_pow(base, exp);
    }
    // 0, 1 and -1 stay small for any exponent
    if base.is_zero() {
        return Ok(Value::from(if exp.is_zero() { 1 } else { 0 }));
    }
    if base.magnitude().is_one() {
        let negative = base.is_negative() && exp.is_odd();
        return Ok(Value::from(if negative { -1 } else { 1 }));
    }
    let exp = exp
        .to_u64()
        .filter(|e| base.bits().saturating_mul(*e) <= MAX_INT_BITS)
        .ok_or_else(|| EvalError::ValueError("exponent too large".into()))?;
    Ok(Value::Int(Pow::pow(base, exp)))
}

fn float_pow(base: f64, exp: f64) -> Result<Value, EvalError> {
    if base == 0.0 && exp < 0.0 {
        return Err(EvalError::ZeroDivision(
            "0.0 cannot be raised to a negative power".into(),
        ));
    }
    if base < 0.0 && exp.fract() != 0.0 {
        return Err(EvalError::ValueError(
            "negative number cannot be raised to a fractional power".into(),
        ));
    }
    Ok(Value::Float(base.powf(exp)))
}

fn mat_mul(a: &Value, b: &Value) -> OpResult {
    Err(unsupported("@", a, b))
}

// ========================================
// Bitwise
// ========================================

fn bitwise(
    symbol: &str,
    a: &Value,
    b: &Value,
    bool_op: fn(bool, bool) -> bool,
    int_op: fn(&BigInt, &BigInt) -> BigInt,
) -> OpResult {
    if let (Value::Bool(x), Value::Bool(y)) = (a, b) {
        return Ok(Some(Value::Bool(bool_op(*x, *y))));
    }
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => Ok(Some(Value::Int(int_op(&x, &y)))),
        _ => Err(unsupported(symbol, a, b)),
    }
}

fn bit_and(a: &Value, b: &Value) -> OpResult {
    bitwise("&", a, b, |x, y| x & y, |x, y| x & y)
}

fn bit_or(a: &Value, b: &Value) -> OpResult {
    bitwise("|", a, b, |x, y| x | y, |x, y| x | y)
}

fn bit_xor(a: &Value, b: &Value) -> OpResult {
    bitwise("^", a, b, |x, y| x ^ y, |x, y| x ^ y)
}

fn shift_left(a: &Value, b: &Value) -> OpResult {
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => {
            let count = shift_count(&y)?;
            if x.is_zero() {
                return Ok(Some(Value::from(0)));
            }
            if x.bits().saturating_add(count) > MAX_INT_BITS {
                return Err(EvalError::ValueError("shifted integer too large".into()));
            }
            Ok(Some(Value::Int(x << count)))
        }
        _ => Err(unsupported("<<", a, b)),
    }
}

/// Shifting out every bit leaves 0, or -1 for negatives
fn shift_right(a: &Value, b: &Value) -> OpResult {
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => {
            let count = shift_count(&y)?;
            if count >= x.bits() {
                let rest = if x.is_negative() { -1 } else { 0 };
                return Ok(Some(Value::from(rest)));
            }
            Ok(Some(Value::Int(x >> count)))
        }
        _ => Err(unsupported(">>", a, b)),
    }
}

// ========================================
// Comparison and membership
// ========================================

/// Equality with numeric coercion (1 == 1.0 == True)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| values_equal(p, q))
        }
        _ => match (Num::of(a), Num::of(b)) {
            (Some(Num::Int(x)), Some(Num::Int(y))) => x == y,
            (Some(x), Some(y)) => match (x.to_f64(), y.to_f64()) {
                (Ok(p), Ok(q)) => p == q,
                _ => false,
            },
            _ => false,
        },
    }
}

/// Ordering between comparable values; `None` when unordered (nan)
pub fn compare(symbol: &str, a: &Value, b: &Value) -> Result<Option<Ordering>, EvalError> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(Some(x.cmp(y))),
        (Value::List(x), Value::List(y)) => {
            for (p, q) in x.iter().zip(y) {
                if values_equal(p, q) {
                    continue;
                }
                return compare(symbol, p, q);
            }
            Ok(Some(x.len().cmp(&y.len())))
        }
        _ => match (Num::of(a), Num::of(b)) {
            (Some(Num::Int(x)), Some(Num::Int(y))) => Ok(Some(x.cmp(&y))),
            (Some(x), Some(y)) => Ok(x.to_f64()?.partial_cmp(&y.to_f64()?)),
            _ => Err(EvalError::Unsupported(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                symbol,
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

fn ordering(symbol: &str, a: &Value, b: &Value, test: fn(Ordering) -> bool) -> OpResult {
    let result = compare(symbol, a, b)?.map(test).unwrap_or(false);
    Ok(Some(Value::Bool(result)))
}

fn lt(a: &Value, b: &Value) -> OpResult {
    ordering("<", a, b, Ordering::is_lt)
}

fn le(a: &Value, b: &Value) -> OpResult {
    ordering("<=", a, b, Ordering::is_le)
}

fn gt(a: &Value, b: &Value) -> OpResult {
    ordering(">", a, b, Ordering::is_gt)
}

fn ge(a: &Value, b: &Value) -> OpResult {
    ordering(">=", a, b, Ordering::is_ge)
}

fn eq(a: &Value, b: &Value) -> OpResult {
    Ok(Some(Value::Bool(values_equal(a, b))))
}

fn ne(a: &Value, b: &Value) -> OpResult {
    Ok(Some(Value::Bool(!values_equal(a, b))))
}

/// `needle haystack in`
fn contains(needle: &Value, haystack: &Value) -> OpResult {
    match (needle, haystack) {
        (_, Value::List(items)) => Ok(Some(Value::Bool(
            items.iter().any(|item| values_equal(needle, item)),
        ))),
        (Value::Str(n), Value::Str(h)) => Ok(Some(Value::Bool(h.contains(n.as_str())))),
        (other, Value::Str(_)) => Err(EvalError::TypeError {
            expected: "str as left operand of 'in'".into(),
            got: other.type_name().into(),
        }),
        (_, other) => Err(EvalError::Unsupported(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Identity approximated as same type and equal value
fn identical(a: &Value, b: &Value) -> OpResult {
    let same = std::mem::discriminant(a) == std::mem::discriminant(b) && values_equal(a, b);
    Ok(Some(Value::Bool(same)))
}
