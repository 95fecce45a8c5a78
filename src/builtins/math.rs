use super::general::float_to_int;
use super::{arg, iterable};
use crate::eval::EvalError;
use crate::ops::{self, Num, OpResult};
use crate::value::Value;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive};

fn domain_error() -> EvalError {
    EvalError::ValueError("math domain error".into())
}

fn float_arg(args: &[Value], i: usize, name: &str) -> Result<f64, EvalError> {
    let v = arg(args, i, name)?;
    match Num::of(v) {
        Some(n) => n.to_f64(),
        None => Err(EvalError::TypeError {
            expected: format!("number for {}()", name),
            got: v.type_name().into(),
        }),
    }
}

fn int_arg(args: &[Value], i: usize, name: &str) -> Result<BigInt, EvalError> {
    let v = arg(args, i, name)?;
    v.as_int().ok_or_else(|| EvalError::TypeError {
        expected: format!("int for {}()", name),
        got: v.type_name().into(),
    })
}

/// Apply a float function of one argument.
///
/// `valid` rejects inputs outside the domain. A finite input producing an
/// infinite result is a range error.
fn float_fn(args: &[Value], name: &str, valid: fn(f64) -> bool, f: fn(f64) -> f64) -> OpResult {
    let x = float_arg(args, 0, name)?;
    if !x.is_nan() && !valid(x) {
        return Err(domain_error());
    }
    let y = f(x);
    if y.is_infinite() && x.is_finite() {
        return Err(EvalError::ValueError("math range error".into()));
    }
    Ok(Some(Value::Float(y)))
}

fn any_float(_: f64) -> bool {
    true
}

fn positive(x: f64) -> bool {
    x > 0.0
}

fn unit_range(x: f64) -> bool {
    (-1.0..=1.0).contains(&x)
}

fn finite(x: f64) -> bool {
    x.is_finite()
}

/// Round a number to an int with `f`; ints pass through unchanged
fn to_int(args: &[Value], name: &str, f: fn(f64) -> f64) -> OpResult {
    let v = arg(args, 0, name)?;
    match Num::of(v) {
        Some(Num::Int(n)) => Ok(Some(Value::Int(n))),
        Some(Num::Float(x)) => Ok(Some(Value::Int(float_to_int(f(x))?))),
        None => Err(EvalError::TypeError {
            expected: format!("number for {}()", name),
            got: v.type_name().into(),
        }),
    }
}

pub(super) fn sqrt(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "sqrt", |x| x >= 0.0, f64::sqrt)
}

pub(super) fn exp(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "exp", any_float, f64::exp)
}

/// Natural logarithm of the single argument
pub(super) fn log(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "log", positive, f64::ln)
}

pub(super) fn log2(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "log2", positive, f64::log2)
}

pub(super) fn log10(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "log10", positive, f64::log10)
}

pub(super) fn sin(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "sin", finite, f64::sin)
}

pub(super) fn cos(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "cos", finite, f64::cos)
}

pub(super) fn tan(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "tan", finite, f64::tan)
}

pub(super) fn asin(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "asin", unit_range, f64::asin)
}

pub(super) fn acos(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "acos", unit_range, f64::acos)
}

pub(super) fn atan(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "atan", any_float, f64::atan)
}

/// atan2(y, x); y is the value that was on top of the stack
pub(super) fn atan2(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let y = float_arg(args, 0, "atan2")?;
    let x = float_arg(args, 1, "atan2")?;
    Ok(Some(Value::Float(y.atan2(x))))
}

pub(super) fn sinh(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "sinh", any_float, f64::sinh)
}

pub(super) fn cosh(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "cosh", any_float, f64::cosh)
}

pub(super) fn tanh(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "tanh", any_float, f64::tanh)
}

pub(super) fn floor(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    to_int(args, "floor", f64::floor)
}

pub(super) fn ceil(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    to_int(args, "ceil", f64::ceil)
}

pub(super) fn trunc(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    to_int(args, "trunc", f64::trunc)
}

pub(super) fn fabs(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "fabs", any_float, f64::abs)
}

pub(super) fn degrees(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "degrees", any_float, f64::to_degrees)
}

pub(super) fn radians(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    float_fn(args, "radians", any_float, f64::to_radians)
}

pub(super) fn isfinite(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    Ok(Some(Value::Bool(float_arg(args, 0, "isfinite")?.is_finite())))
}

pub(super) fn isinf(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    Ok(Some(Value::Bool(float_arg(args, 0, "isinf")?.is_infinite())))
}

pub(super) fn isnan(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    Ok(Some(Value::Bool(float_arg(args, 0, "isnan")?.is_nan())))
}

pub(super) fn hypot(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = float_arg(args, 0, "hypot")?;
    let y = float_arg(args, 1, "hypot")?;
    Ok(Some(Value::Float(x.hypot(y))))
}

pub(super) fn copysign(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = float_arg(args, 0, "copysign")?;
    let y = float_arg(args, 1, "copysign")?;
    Ok(Some(Value::Float(x.copysign(y))))
}

pub(super) fn fmod(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let x = float_arg(args, 0, "fmod")?;
    let y = float_arg(args, 1, "fmod")?;
    if y == 0.0 || x.is_infinite() {
        return Err(domain_error());
    }
    Ok(Some(Value::Float(x % y)))
}

// ========================================
// Integer functions
// ========================================

pub(super) fn factorial(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let n = int_arg(args, 0, "factorial")?;
    if n.is_negative() {
        return Err(EvalError::ValueError(
            "factorial() not defined for negative values".into(),
        ));
    }
    let n = n
        .to_u64()
        .ok_or_else(|| EvalError::ValueError("factorial() argument too large".into()))?;
    let product = (2..=n).fold(BigInt::one(), |acc, k| acc * k);
    Ok(Some(Value::Int(product)))
}

pub(super) fn gcd(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let a = int_arg(args, 0, "gcd")?;
    let b = int_arg(args, 1, "gcd")?;
    Ok(Some(Value::Int(a.gcd(&b))))
}

pub(super) fn isqrt(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let n = int_arg(args, 0, "isqrt")?;
    if n.is_negative() {
        return Err(EvalError::ValueError(
            "isqrt() argument must be nonnegative".into(),
        ));
    }
    Ok(Some(Value::Int(n.sqrt())))
}

/// comb(n, k); n is the value that was on top of the stack
pub(super) fn comb(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let n = int_arg(args, 0, "comb")?;
    let k = int_arg(args, 1, "comb")?;
    if n.is_negative() || k.is_negative() {
        return Err(EvalError::ValueError(
            "comb() arguments must be non-negative".into(),
        ));
    }
    if k > n {
        return Ok(Some(Value::from(0)));
    }
    let k = std::cmp::min(k.clone(), &n - &k)
        .to_u64()
        .ok_or_else(|| EvalError::ValueError("comb() argument too large".into()))?;
    let mut result = BigInt::one();
    for i in 0..k {
        result = result * (&n - i) / (i + 1);
    }
    Ok(Some(Value::Int(result)))
}

// ========================================
// Folds
// ========================================

/// Product starting from int 1
pub(super) fn prod(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let items = iterable(arg(args, 0, "prod")?)?;
    let mut total = Value::from(1);
    for item in &items {
        if let Some(next) = ops::mul(&total, item)? {
            total = next;
        }
    }
    Ok(Some(total))
}

/// Exactly rounded float sum over a list of non-overlapping partials
pub(super) fn fsum(args: &[Value], _out: &mut Vec<String>) -> OpResult {
    let items = iterable(arg(args, 0, "fsum")?)?;
    let mut partials: Vec<f64> = Vec::new();
    let mut special = 0.0_f64;
    let mut inf_sum = 0.0_f64;
    for item in &items {
        let mut x = match Num::of(item) {
            Some(n) => n.to_f64()?,
            None => {
                return Err(EvalError::TypeError {
                    expected: "number for fsum()".into(),
                    got: item.type_name().into(),
                })
            }
        };
        if !x.is_finite() {
            if x.is_infinite() {
                inf_sum += x;
            }
            special += x;
            continue;
        }
        let mut kept = 0;
        for j in 0..partials.len() {
            let mut y = partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        if !x.is_finite() {
            return Err(EvalError::ValueError("intermediate overflow in fsum".into()));
        }
        partials.truncate(kept);
        partials.push(x);
    }

    if special != 0.0 {
        if inf_sum.is_nan() {
            return Err(EvalError::ValueError("-inf + inf in fsum".into()));
        }
        return Ok(Some(Value::Float(special)));
    }

    // Add the partials from the top until the sum stops being exact
    let mut hi = 0.0_f64;
    let mut n = partials.len();
    if n > 0 {
        n -= 1;
        hi = partials[n];
        let mut lo = 0.0_f64;
        while n > 0 {
            let x = hi;
            n -= 1;
            let y = partials[n];
            hi = x + y;
            lo = y - (hi - x);
            if lo != 0.0 {
                break;
            }
        }
        // Half-way case: the remaining partials decide the rounding direction
        if n > 0 && ((lo < 0.0 && partials[n - 1] < 0.0) || (lo > 0.0 && partials[n - 1] > 0.0)) {
            let y = lo * 2.0;
            let x = hi + y;
            if y == x - hi {
                hi = x;
            }
        }
    }
    Ok(Some(Value::Float(hi)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&[Value], &mut Vec<String>) -> OpResult, args: Vec<Value>) -> Result<Value, EvalError> {
        let mut out = Vec::new();
        f(&args, &mut out).map(|r| r.unwrap())
    }

    #[test]
    fn float_functions() {
        assert_eq!(call(sqrt, vec![16.into()]).unwrap(), Value::from(4.0));
        assert_eq!(call(exp, vec![0.into()]).unwrap(), Value::from(1.0));
        assert_eq!(call(log10, vec![1000.into()]).unwrap(), Value::from(3.0));
        assert_eq!(call(fabs, vec![(-2).into()]).unwrap(), Value::from(2.0));
    }

    #[test]
    fn domain_errors() {
        assert!(matches!(call(sqrt, vec![(-1).into()]), Err(EvalError::ValueError(_))));
        assert!(matches!(call(log, vec![0.into()]), Err(EvalError::ValueError(_))));
        assert!(matches!(call(asin, vec![2.into()]), Err(EvalError::ValueError(_))));
        assert!(matches!(call(exp, vec![1000.into()]), Err(EvalError::ValueError(_))));
        assert!(call(sqrt, vec!["x".into()]).is_err());
    }

    #[test]
    fn rounding_produces_ints() {
        assert_eq!(call(floor, vec![2.7.into()]).unwrap(), Value::from(2));
        assert_eq!(call(ceil, vec![2.1.into()]).unwrap(), Value::from(3));
        assert_eq!(call(trunc, vec![(-2.7).into()]).unwrap(), Value::from(-2));
        assert_eq!(call(floor, vec![5.into()]).unwrap(), Value::from(5));
        assert!(call(floor, vec![f64::INFINITY.into()]).is_err());
    }

    #[test]
    fn integer_functions() {
        assert_eq!(call(factorial, vec![5.into()]).unwrap(), Value::from(120));
        assert_eq!(call(factorial, vec![0.into()]).unwrap(), Value::from(1));
        assert!(call(factorial, vec![(-1).into()]).is_err());
        assert_eq!(call(gcd, vec![12.into(), 18.into()]).unwrap(), Value::from(6));
        assert_eq!(call(gcd, vec![0.into(), (-4).into()]).unwrap(), Value::from(4));
        assert_eq!(call(gcd, vec![(-12).into(), (-18).into()]).unwrap(), Value::from(6));
        assert_eq!(call(isqrt, vec![17.into()]).unwrap(), Value::from(4));
        assert_eq!(call(comb, vec![5.into(), 2.into()]).unwrap(), Value::from(10));
        assert_eq!(call(comb, vec![2.into(), 5.into()]).unwrap(), Value::from(0));
    }

    #[test]
    fn atan2_takes_y_first() {
        let r = call(atan2, vec![1.into(), 0.into()]).unwrap();
        assert_eq!(r, Value::from(std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn folds() {
        let items = Value::List(vec![2.into(), 3.into(), 4.into()]);
        assert_eq!(call(prod, vec![items]).unwrap(), Value::from(24));
        let tenths = Value::List(vec![0.1.into(); 10]);
        assert_eq!(call(fsum, vec![tenths]).unwrap(), Value::from(1.0));
    }

    #[test]
    fn fsum_is_exactly_rounded() {
        let floats = |xs: &[f64]| Value::List(xs.iter().map(|x| Value::from(*x)).collect());
        assert_eq!(
            call(fsum, vec![floats(&[1e16, 1.0, 1e-16])]).unwrap(),
            Value::from(1e16 + 2.0)
        );
        assert_eq!(
            call(fsum, vec![floats(&[1e100, 1.0, -1e100, 1e-100, 1e50, -1.0, -1e50])]).unwrap(),
            Value::from(1e-100)
        );
        assert_eq!(call(fsum, vec![floats(&[])]).unwrap(), Value::from(0.0));
    }

    #[test]
    fn fsum_special_values() {
        let floats = |xs: &[f64]| Value::List(xs.iter().map(|x| Value::from(*x)).collect());
        assert_eq!(
            call(fsum, vec![floats(&[f64::INFINITY, 1.0])]).unwrap(),
            Value::from(f64::INFINITY)
        );
        assert!(matches!(
            call(fsum, vec![floats(&[f64::INFINITY, f64::NEG_INFINITY])]),
            Err(EvalError::ValueError(_))
        ));
        assert!(matches!(
            call(fsum, vec![floats(&[1e308, 1e308])]),
            Err(EvalError::ValueError(_))
        ));
    }

    #[test]
    fn fmod_keeps_sign_of_dividend() {
        assert_eq!(call(fmod, vec![(-7).into(), 2.into()]).unwrap(), Value::from(-1.0));
        assert!(call(fmod, vec![1.into(), 0.into()]).is_err());
    }
}
