//! Literal grammar for a single word
//!
//! Words are already whitespace-delimited by the time they reach here, so the
//! grammar only has to recognize one literal spanning the whole word:
//! integers, floats, quoted strings, bracketed lists and bare names.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, tag_no_case, take_while1},
    character::complete::{alpha1, alphanumeric1, char, digit1, one_of},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize, value},
    multi::{many0, many0_count, separated_list1},
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};
use num_bigint::BigInt;
use thiserror::Error;

/// A literal recognized by the grammar, before names are looked up
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(BigInt),
    Float(f64),
    Str(String),
    /// A bare identifier (constant, callable or user binding)
    Name(String),
    List(Vec<Literal>),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("invalid syntax: {0}")]
    Syntax(String),
}

/// Digits with optional `_` separators: 1_000_000
fn decimal(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, many0(pair(char('_'), digit1))))(input)
}

fn strip_underscores(s: &str) -> String {
    s.chars().filter(|c| *c != '_').collect()
}

fn sign(input: &str) -> IResult<&str, Option<char>> {
    opt(one_of("+-"))(input)
}

/// 0x1f, -0o17, 0b1010
fn radix_int(input: &str) -> IResult<&str, Literal> {
    let (input, sign) = sign(input)?;
    let (input, (radix, body)) = alt((
        pair(value(16u32, tag_no_case("0x")), take_while1(|c: char| c.is_ascii_hexdigit() || c == '_')),
        pair(value(8u32, tag_no_case("0o")), take_while1(|c: char| c.is_digit(8) || c == '_')),
        pair(value(2u32, tag_no_case("0b")), take_while1(|c: char| c == '0' || c == '1' || c == '_')),
    ))(input)?;
    let digits = strip_underscores(body);
    match BigInt::parse_bytes(digits.as_bytes(), radix) {
        Some(n) => Ok((input, Literal::Int(if sign == Some('-') { -n } else { n }))),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), decimal)))(input)
}

/// 1.5, 5., .5, 1e3, -2.5E-3
fn float(input: &str) -> IResult<&str, Literal> {
    map_res(
        recognize(pair(
            opt(one_of("+-")),
            alt((
                recognize(tuple((decimal, char('.'), opt(decimal), opt(exponent)))),
                recognize(tuple((char('.'), decimal, opt(exponent)))),
                recognize(pair(decimal, exponent)),
            )),
        )),
        |s: &str| strip_underscores(s).parse::<f64>().map(Literal::Float),
    )(input)
}

fn decimal_int(input: &str) -> IResult<&str, Literal> {
    map_opt(recognize(pair(opt(one_of("+-")), decimal)), |s: &str| {
        let digits = strip_underscores(s.trim_start_matches('+'));
        digits.parse::<BigInt>().ok().map(Literal::Int)
    })(input)
}

fn number(input: &str) -> IResult<&str, Literal> {
    alt((radix_int, float, decimal_int))(input)
}

fn escape(input: &str) -> IResult<&str, &str> {
    alt((
        value("\\", tag("\\")),
        value("'", tag("'")),
        value("\"", tag("\"")),
        value("\n", tag("n")),
        value("\t", tag("t")),
        value("\r", tag("r")),
    ))(input)
}

fn single_quoted(input: &str) -> IResult<&str, Literal> {
    map(
        delimited(
            char('\''),
            map(opt(escaped_transform(is_not("\\'"), '\\', escape)), Option::unwrap_or_default),
            char('\''),
        ),
        Literal::Str,
    )(input)
}

fn double_quoted(input: &str) -> IResult<&str, Literal> {
    map(
        delimited(
            char('"'),
            map(opt(escaped_transform(is_not("\\\""), '\\', escape)), Option::unwrap_or_default),
            char('"'),
        ),
        Literal::Str,
    )(input)
}

/// [1,2,3], [], [[1],'a',pi,]
fn list(input: &str) -> IResult<&str, Literal> {
    map(
        delimited(
            char('['),
            opt(terminated(separated_list1(char(','), literal), opt(char(',')))),
            char(']'),
        ),
        |items| Literal::List(items.unwrap_or_default()),
    )(input)
}

/// [A-Za-z_][A-Za-z0-9_]*
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn name(input: &str) -> IResult<&str, Literal> {
    map(identifier, |s: &str| Literal::Name(s.to_string()))(input)
}

fn literal(input: &str) -> IResult<&str, Literal> {
    alt((single_quoted, double_quoted, list, number, name))(input)
}

/// Parse one whole word as a literal
pub fn lex_literal(word: &str) -> Result<Literal, LexError> {
    all_consuming(literal)(word)
        .map(|(_, lit)| lit)
        .map_err(|_| LexError::Syntax(word.to_string()))
}

/// Check whether a word is a plain identifier (usable as a binding name)
pub fn is_identifier(word: &str) -> bool {
    all_consuming(identifier)(word).is_ok()
}

/// `-name` style words: a signed identifier is parsed as negation of a name
pub(crate) fn signed_name(word: &str) -> Option<(bool, &str)> {
    let parsed: IResult<&str, (char, &str)> =
        all_consuming(pair(one_of("+-"), identifier))(word);
    parsed.ok().map(|(_, (s, n))| (s == '-', n))
}
