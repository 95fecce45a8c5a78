use super::{arg, iterable};
use crate::eval::EvalError;
use crate::ops::{self, compare, Num, OpResult};
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive};
use std::cmp::Ordering;

fn int_arg(v: &Value, name: &str) -> Result<BigInt, EvalError> {
    v.as_int().ok_or_else(|| EvalError::TypeError {
        expected: format!("int for {}()", name),
        got: v.type_name().into(),
    })
}

/// Convert an integral float to an int, rejecting nan and infinities
pub(crate) fn float_to_int(x: f64) -> Result<BigInt, EvalError> {
    if x.is_nan() {
        return Err(EvalError::ValueError("cannot convert float NaN to integer".into()));
    }
    BigInt::from_f64(x)
        .ok_or_else(|| EvalError::ValueError("cannot convert float infinity to integer".into()))
}

fn radix_repr(v: &Value, name: &str, radix: u32, prefix: &str) -> OpResult {
    let n = int_arg(v, name)?;
    let digits = n.abs().to_str_radix(radix);
    let sign = if n.is_negative() { "-" } else { "" };
    Ok(Some(Value::Str(format!("{}{}{}", sign, prefix, digits))))
}

/// Pick the extreme element of an iterable with `keep(candidate_vs_best)`
fn extreme(args: &[Value], name: &str, keep: Ordering) -> OpResult {
    let items = iterable(arg(args, 0, name)?)?;
    let mut iter = items.into_iter();
    let mut best = iter.next().ok_or_else(|| {
        EvalError::ValueError(format!("{}() arg is an empty sequence", name))
    })?;
    for item in iter {
        if compare("<", &item, &best)? == Some(keep) {
            best = item;
        }
    }
    Ok(Some(best))
}

pub(super) fn abs(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = arg(args, 0, "abs")?;
    match Num::of(x) {
        Some(Num::Int(n)) => Ok(Some(Value::Int(n.abs()))),
        Some(Num::Float(f)) => Ok(Some(Value::Float(f.abs()))),
        None => Err(EvalError::Unsupported(format!(
            "bad operand type for abs(): '{}'",
            x.type_name()
        ))),
    }
}

pub(super) fn all(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let items = iterable(arg(args, 0, "all")?)?;
    Ok(Some(Value::Bool(items.iter().all(Value::is_truthy))))
}

pub(super) fn any(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let items = iterable(arg(args, 0, "any")?)?;
    Ok(Some(Value::Bool(items.iter().any(Value::is_truthy))))
}

pub(super) fn bin(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    radix_repr(arg(args, 0, "bin")?, "bin", 2, "0b")
}

pub(super) fn oct(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    radix_repr(arg(args, 0, "oct")?, "oct", 8, "0o")
}

pub(super) fn hex(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    radix_repr(arg(args, 0, "hex")?, "hex", 16, "0x")
}

pub(super) fn chr(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let n = int_arg(arg(args, 0, "chr")?, "chr")?;
    n.to_u32()
        .and_then(char::from_u32)
        .map(|c| Some(Value::Str(c.to_string())))
        .ok_or_else(|| EvalError::ValueError("chr() arg not in range(0x110000)".into()))
}

pub(super) fn ord(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    match arg(args, 0, "ord")? {
        Value::Str(s) if s.chars().count() == 1 => {
            let c = s.chars().next().map(u32::from).unwrap_or_default();
            Ok(Some(Value::from(i64::from(c))))
        }
        Value::Str(s) => Err(EvalError::TypeError {
            expected: "a character".into(),
            got: format!("string of length {}", s.chars().count()),
        }),
        other => Err(EvalError::TypeError {
            expected: "str for ord()".into(),
            got: other.type_name().into(),
        }),
    }
}

/// divmod(x, y) -> [x // y, x % y]
pub(super) fn divmod(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = arg(args, 0, "divmod")?;
    let y = arg(args, 1, "divmod")?;
    let quotient = ops::floor_div(x, y)?;
    let remainder = ops::modulo(x, y)?;
    Ok(quotient
        .zip(remainder)
        .map(|(q, r)| Value::List(vec![q, r])))
}

pub(super) fn len(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    match arg(args, 0, "len")? {
        Value::Str(s) => Ok(Some(Value::from(s.chars().count() as i64))),
        Value::List(items) => Ok(Some(Value::from(items.len() as i64))),
        other => Err(EvalError::TypeError {
            expected: "sized value".into(),
            got: other.type_name().into(),
        }),
    }
}

pub(super) fn max(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    extreme(args, "max", Ordering::Greater)
}

pub(super) fn min(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    extreme(args, "min", Ordering::Less)
}

pub(super) fn pow(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    ops::power(arg(args, 0, "pow")?, arg(args, 1, "pow")?)
}

/// Writes the value and produces no result, so the argument stays on the stack
pub(super) fn print(args: &[Value], out: &mut Vec<String>) -> OpResult {
    let line = args
        .iter()
        .map(Value::to_print_string)
        .collect::<Vec<_>>()
        .join(" ");
    out.push(line);
    Ok(None)
}

pub(super) fn repr(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    Ok(Some(Value::Str(arg(args, 0, "repr")?.to_string())))
}

/// Round half to even, producing an int
pub(super) fn round(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = arg(args, 0, "round")?;
    match Num::of(x) {
        Some(Num::Int(n)) => Ok(Some(Value::Int(n))),
        Some(Num::Float(f)) => {
            let rounded = if (f - f.trunc()).abs() == 0.5 {
                2.0 * (f / 2.0).round()
            } else {
                f.round()
            };
            Ok(Some(Value::Int(float_to_int(rounded)?)))
        }
        None => Err(EvalError::TypeError {
            expected: "number for round()".into(),
            got: x.type_name().into(),
        }),
    }
}

/// Stable sort using only `<`; a failed comparison ends the sort
pub(super) fn sorted(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let items = iterable(arg(args, 0, "sorted")?)?;
    merge_sort(items).map(|items| Some(Value::List(items)))
}

fn less_than(a: &Value, b: &Value) -> Result<bool, EvalError> {
    Ok(compare("<", a, b)?.map_or(false, Ordering::is_lt))
}

/// Unordered pairs (nan) compare as not-less, so any input terminates
fn merge_sort(mut items: Vec<Value>) -> Result<Vec<Value>, EvalError> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = merge_sort(items.split_off(items.len() / 2))?;
    let left = merge_sort(items)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => less_than(r, l)?,
            _ => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

/// Sum starting from int 0; strings are rejected by `+` itself
pub(super) fn sum(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let items = iterable(arg(args, 0, "sum")?)?;
    let mut total = Value::from(0);
    for item in &items {
        if let Some(next) = ops::add(&total, item)? {
            total = next;
        }
    }
    Ok(Some(total))
}

// ========================================
// Conversions
// ========================================

pub(super) fn int(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = arg(args, 0, "int")?;
    let n = match x {
        Value::Int(n) => n.clone(),
        Value::Bool(b) => BigInt::from(u8::from(*b)),
        Value::Float(f) => float_to_int(f.trunc())?,
        Value::Str(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
            cleaned
                .trim_start_matches('+')
                .parse::<BigInt>()
                .map_err(|_| {
                    EvalError::ValueError(format!("invalid literal for int() with base 10: {}", x))
                })?
        }
        Value::List(_) => {
            return Err(EvalError::TypeError {
                expected: "number or string for int()".into(),
                got: x.type_name().into(),
            })
        }
    };
    Ok(Some(Value::Int(n)))
}

pub(super) fn float(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = arg(args, 0, "float")?;
    let f = match x {
        Value::Str(s) => {
            let t = s.trim().to_ascii_lowercase();
            match t.as_str() {
                "inf" | "+inf" | "infinity" => f64::INFINITY,
                "-inf" | "-infinity" => f64::NEG_INFINITY,
                "nan" | "+nan" | "-nan" => f64::NAN,
                _ => t.parse::<f64>().map_err(|_| {
                    EvalError::ValueError(format!("could not convert string to float: {}", x))
                })?,
            }
        }
        other => match Num::of(other) {
            Some(n) => n.to_f64()?,
            None => {
                return Err(EvalError::TypeError {
                    expected: "number or string for float()".into(),
                    got: other.type_name().into(),
                })
            }
        },
    };
    Ok(Some(Value::Float(f)))
}

pub(super) fn str(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    Ok(Some(Value::Str(arg(args, 0, "str")?.to_print_string())))
}

pub(super) fn bool(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    Ok(Some(Value::Bool(arg(args, 0, "bool")?.is_truthy())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&[Value], &mut Vec<String>) -> OpResult, args: Vec<Value>) -> Value {
        let mut out = Vec::new();
        f(&args, &mut out).unwrap().unwrap()
    }

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    #[test]
    fn sum_of_list() {
        assert_eq!(call(sum, vec![list(vec![1.into(), 2.into(), 3.into()])]), Value::from(6));
        assert_eq!(call(sum, vec![list(vec![1.into(), 0.5.into()])]), Value::from(1.5));
        assert_eq!(call(sum, vec![list(vec![])]), Value::from(0));
    }

    #[test]
    fn sum_of_strings_is_an_error() {
        let mut out = Vec::new();
        let result = sum(&[list(vec!["a".into()])], &mut out);
        assert!(matches!(result, Err(EvalError::Unsupported(_))));
    }

    #[test]
    fn print_writes_and_returns_nothing() {
        let mut out = Vec::new();
        let result = print(&[Value::from("hi")], &mut out).unwrap();
        assert_eq!(result, None);
        assert_eq!(out, vec!["hi".to_string()]);
    }

    #[test]
    fn max_and_min() {
        let items = list(vec![3.into(), 7.into(), 1.into()]);
        assert_eq!(call(max, vec![items.clone()]), Value::from(7));
        assert_eq!(call(min, vec![items]), Value::from(1));
        let mut out = Vec::new();
        assert!(matches!(
            max(&[list(vec![])], &mut out),
            Err(EvalError::ValueError(_))
        ));
    }

    #[test]
    fn round_half_to_even() {
        assert_eq!(call(round, vec![2.5.into()]), Value::from(2));
        assert_eq!(call(round, vec![3.5.into()]), Value::from(4));
        assert_eq!(call(round, vec![(-2.5).into()]), Value::from(-2));
        assert_eq!(call(round, vec![2.6.into()]), Value::from(3));
    }

    #[test]
    fn radix_strings() {
        assert_eq!(call(bin, vec![10.into()]), Value::from("0b1010"));
        assert_eq!(call(hex, vec![(-255).into()]), Value::from("-0xff"));
        assert_eq!(call(oct, vec![8.into()]), Value::from("0o10"));
    }

    #[test]
    fn characters() {
        assert_eq!(call(chr, vec![65.into()]), Value::from("A"));
        assert_eq!(call(ord, vec!["A".into()]), Value::from(65));
        let mut out = Vec::new();
        assert!(ord(&[Value::from("AB")], &mut out).is_err());
    }

    #[test]
    fn sorted_and_len() {
        let items = list(vec![3.into(), 1.into(), 2.into()]);
        assert_eq!(
            call(sorted, vec![items.clone()]),
            list(vec![1.into(), 2.into(), 3.into()])
        );
        assert_eq!(call(len, vec![items]), Value::from(3));
        assert_eq!(call(len, vec!["héllo".into()]), Value::from(5));
        let mut out = Vec::new();
        assert!(sorted(&[list(vec![1.into(), "a".into()])], &mut out).is_err());
    }

    #[test]
    fn sorted_with_nan_keeps_every_item() {
        let items: Vec<Value> = (0..40i64)
            .map(|i| if i % 3 == 0 { f64::NAN.into() } else { Value::from(40 - i) })
            .collect();
        let result = match call(sorted, vec![list(items)]) {
            Value::List(items) => items,
            other => panic!("expected list, got {:?}", other),
        };
        assert_eq!(result.len(), 40);
        let nans = result
            .iter()
            .filter(|v| matches!(v, Value::Float(x) if x.is_nan()))
            .count();
        assert_eq!(nans, 14);
    }

    #[test]
    fn sorted_mixed_types_long_list_is_an_error() {
        let mut items: Vec<Value> = (0..30i64).map(Value::from).collect();
        items.push("a".into());
        let mut out = Vec::new();
        assert!(matches!(
            sorted(&[list(items)], &mut out),
            Err(EvalError::Unsupported(_))
        ));
    }

    #[test]
    fn divmod_pairs() {
        assert_eq!(
            call(divmod, vec![7.into(), 2.into()]),
            list(vec![3.into(), 1.into()])
        );
    }

    #[test]
    fn conversions() {
        assert_eq!(call(int, vec!["42".into()]), Value::from(42));
        assert_eq!(call(int, vec![(-3.9).into()]), Value::from(-3));
        assert_eq!(call(float, vec!["2.5".into()]), Value::from(2.5));
        assert_eq!(call(float, vec![2.into()]), Value::from(2.0));
        assert_eq!(call(str, vec![1.5.into()]), Value::from("1.5"));
        assert_eq!(call(bool, vec![list(vec![])]), Value::from(false));
        let mut out = Vec::new();
        assert!(matches!(
            int(&[Value::from("x")], &mut out),
            Err(EvalError::ValueError(_))
        ));
        assert!(float_to_int(f64::NAN).is_err());
    }
}
