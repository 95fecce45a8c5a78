//! Display formatting for stack values
//!
//! Floats always show a fractional part or an exponent, strings are
//! single-quoted unless that would need escaping, and lists print their
//! elements in quoted form.

use crate::value::Value;

/// Format a stack for the `stack` command: `[1, 2, 'three']`
pub fn render_stack(stack: &[Value]) -> String {
    format_list(stack)
}

/// Format a list of values as `[a, b, c]`
pub fn format_list(items: &[Value]) -> String {
    let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Format a float using the shortest round-trip digits.
///
/// Positional notation is used for decimal exponents in `-4..16`,
/// scientific notation (`1e+16`, `2.5e-07`) otherwise.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest digits, e.g. "-1.2345e-7"
    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let sign = if x < 0.0 { "-" } else { "" };

    if (-4..16).contains(&exp) {
        if exp >= 0 {
            let int_len = exp as usize + 1;
            if digits.len() <= int_len {
                format!("{}{}{}.0", sign, digits, "0".repeat(int_len - digits.len()))
            } else {
                format!("{}{}.{}", sign, &digits[..int_len], &digits[int_len..])
            }
        } else {
            let zeros = "0".repeat((-exp - 1) as usize);
            format!("{}0.{}{}", sign, zeros, digits)
        }
    } else {
        let mantissa = if digits.len() > 1 {
            format!("{}.{}", &digits[..1], &digits[1..])
        } else {
            digits
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exp.abs())
    }
}

/// Quote a string, preferring single quotes
pub fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_a_fraction() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(-2.25), "-2.25");
        assert_eq!(format_float(123.456), "123.456");
        assert_eq!(format_float(100.0), "100.0");
    }

    #[test]
    fn small_floats() {
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(2.5e-7), "2.5e-07");
    }

    #[test]
    fn large_floats() {
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e20), "1.5e+20");
    }

    #[test]
    fn special_floats() {
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(-0.0), "-0.0");
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_str("abc"), "'abc'");
        assert_eq!(quote_str("it's"), "\"it's\"");
        assert_eq!(quote_str("a\\b"), "'a\\\\b'");
        assert_eq!(quote_str("'\""), "'\\'\"'");
    }

    #[test]
    fn stack_rendering() {
        assert_eq!(render_stack(&[]), "[]");
        let stack = vec![Value::from(1), Value::from("x"), Value::List(vec![])];
        assert_eq!(render_stack(&stack), "[1, 'x', []]");
    }
}
