//! Standard callable table
//!
//! General-purpose functions live in `general`, floating point and integer
//! math in `math`. Arguments arrive in stack-pop order: `args[0]` is the
//! value that was on top of the stack.

mod general;
mod math;

use crate::eval::EvalError;
use crate::registry::{opt, req, Builtin, BuiltinFn, Param, Signature};
use crate::value::Value;

const X: &[Param] = &[req("x")];
const ITERABLE: &[Param] = &[req("iterable")];
const OBJ: &[Param] = &[req("obj")];
const XY: &[Param] = &[req("x"), req("y")];
const YX: &[Param] = &[req("y"), req("x")];
const NUMBER: &[Param] = &[req("number")];
const N: &[Param] = &[req("n")];
const POW: &[Param] = &[req("base"), req("exp"), opt("mod")];
const ROUND: &[Param] = &[req("number"), opt("ndigits")];
const SORTED: &[Param] = &[req("iterable"), opt("key"), opt("reverse")];
const FOLD: &[Param] = &[req("iterable"), opt("start")];

/// Register a builtin whose parameters are described by `params`
const fn sig(name: &'static str, params: &'static [Param], func: BuiltinFn) -> Builtin {
    Builtin { name, signature: Signature::Params(params), func }
}

/// Register a builtin whose signature is not described
const fn opaque(name: &'static str, func: BuiltinFn) -> Builtin {
    Builtin { name, signature: Signature::Opaque, func }
}

pub const BUILTINS: &[Builtin] = &[
    // General
    sig("abs", X, general::abs),
    sig("all", ITERABLE, general::all),
    sig("any", ITERABLE, general::any),
    sig("bin", NUMBER, general::bin),
    sig("chr", X, general::chr),
    sig("divmod", XY, general::divmod),
    sig("hex", NUMBER, general::hex),
    sig("len", OBJ, general::len),
    opaque("max", general::max),
    opaque("min", general::min),
    sig("oct", NUMBER, general::oct),
    sig("ord", X, general::ord),
    sig("pow", POW, general::pow),
    opaque("print", general::print),
    sig("repr", OBJ, general::repr),
    sig("round", ROUND, general::round),
    sig("sorted", SORTED, general::sorted),
    sig("sum", FOLD, general::sum),
    // Conversions
    sig("int", X, general::int),
    sig("float", X, general::float),
    sig("str", OBJ, general::str),
    sig("bool", X, general::bool),
    // Math
    sig("sqrt", X, math::sqrt),
    sig("exp", X, math::exp),
    opaque("log", math::log),
    sig("log2", X, math::log2),
    sig("log10", X, math::log10),
    sig("sin", X, math::sin),
    sig("cos", X, math::cos),
    sig("tan", X, math::tan),
    sig("asin", X, math::asin),
    sig("acos", X, math::acos),
    sig("atan", X, math::atan),
    sig("atan2", YX, math::atan2),
    sig("sinh", X, math::sinh),
    sig("cosh", X, math::cosh),
    sig("tanh", X, math::tanh),
    sig("floor", X, math::floor),
    sig("ceil", X, math::ceil),
    sig("trunc", X, math::trunc),
    sig("fabs", X, math::fabs),
    sig("factorial", N, math::factorial),
    sig("gcd", XY, math::gcd),
    sig("hypot", XY, math::hypot),
    sig("degrees", X, math::degrees),
    sig("radians", X, math::radians),
    sig("isqrt", N, math::isqrt),
    sig("comb", XY, math::comb),
    sig("copysign", XY, math::copysign),
    sig("fmod", XY, math::fmod),
    sig("isfinite", X, math::isfinite),
    sig("isinf", X, math::isinf),
    sig("isnan", X, math::isnan),
    sig("prod", FOLD, math::prod),
    sig("fsum", ITERABLE, math::fsum),
];

/// All standard builtins
pub fn all() -> impl Iterator<Item = Builtin> {
    BUILTINS.iter().copied()
}

// ========================================
// Argument helpers shared by general and math
// ========================================

/// Positional argument `i`
pub(crate) fn arg<'a>(args: &'a [Value], i: usize, name: &str) -> Result<&'a Value, EvalError> {
    args.get(i)
        .ok_or_else(|| EvalError::ValueError(format!("{}() missing argument {}", name, i + 1)))
}

/// Elements of a list, or the characters of a string
pub(crate) fn iterable(v: &Value) -> Result<Vec<Value>, EvalError> {
    match v {
        Value::List(items) => Ok(items.clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        other => Err(EvalError::TypeError {
            expected: "iterable".into(),
            got: other.type_name().into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = all().map(|b| b.name).collect();
        assert_eq!(names.len(), BUILTINS.len());
    }

    #[test]
    fn opaque_builtins() {
        let opaque: Vec<&str> = all()
            .filter(|b| b.signature == Signature::Opaque)
            .map(|b| b.name)
            .collect();
        assert_eq!(opaque, vec!["max", "min", "print", "log"]);
    }

    #[test]
    fn strings_iterate_by_character() {
        let chars = iterable(&Value::from("ab")).unwrap();
        assert_eq!(chars, vec![Value::from("a"), Value::from("b")]);
        assert!(iterable(&Value::from(1)).is_err());
    }
}
