//! Token grammars.
//!
//! Every parser here only recognizes the shape of a token. Coercion into filter nodes happens in
//! the classifier.

use chumsky::prelude::*;

pub type Extra<'a> = extra::Err<Simple<'a, char>>;

/// The name inside an operator tag, e.g. `gt` of `{gt}`.
pub fn keyword<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric())
        .repeated()
        .at_least(1)
        .to_slice()
}

/// An operator tag: `{keyword}`.
pub fn tag<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> {
    just('{').ignore_then(keyword()).then_ignore(just('}'))
}

/// A tag followed by its (possibly empty) operand.
pub fn tagged<'a>() -> impl Parser<'a, &'a str, (&'a str, &'a str), Extra<'a>> {
    tag().then(any().repeated().to_slice())
}

/// Two or more segments separated by `|`.
///
/// A segment is plain text without braces or brackets, optionally preceded by a tag. A tagged
/// segment may instead carry a bracketed list operand: `{in}[1,2]|{in}[3]`.
pub fn pipe_list<'a>() -> impl Parser<'a, &'a str, Vec<&'a str>, Extra<'a>> {
    let plain = none_of("|{}[]").repeated();
    let list = just('[').then(none_of("[]").repeated()).then(just(']'));

    tag()
        .then(list.ignored().or(plain.clone().ignored()))
        .ignored()
        .or(plain.ignored())
        .to_slice()
        .filter(|segment: &&str| !segment.is_empty())
        .separated_by(just('|'))
        .at_least(2)
        .collect::<Vec<_>>()
}

/// Two or more tagged groups concatenated without a separator: `{gt}5{lt}10`.
pub fn brace_groups<'a>() -> impl Parser<'a, &'a str, Vec<&'a str>, Extra<'a>> {
    tag()
        .then(none_of("{|").repeated())
        .to_slice()
        .repeated()
        .at_least(2)
        .collect::<Vec<_>>()
}

/// A numeric string: `[+-]?(digits[.digits] | .digits)([eE][+-]?digits)?`.
pub fn number<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> {
    let digits = any().filter(|c: &char| c.is_ascii_digit()).repeated();
    let sign = one_of("+-").or_not();

    let mantissa = digits
        .clone()
        .at_least(1)
        .then(just('.').then(digits.clone()).or_not())
        .ignored()
        .or(just('.').then(digits.clone().at_least(1)).ignored());

    let exponent = one_of("eE")
        .then(sign.clone())
        .then(digits.at_least(1))
        .or_not();

    sign.then(mantissa).then(exponent).to_slice()
}

/// A query-string key with optional bracket segments: `name`, `tags[]`, `address[city]`.
pub fn key_path<'a>() -> impl Parser<'a, &'a str, (&'a str, Vec<&'a str>), Extra<'a>> {
    let segment = just('[')
        .ignore_then(none_of("[]").repeated().to_slice())
        .then_ignore(just(']'));

    none_of("[]")
        .repeated()
        .at_least(1)
        .to_slice()
        .then(segment.repeated().collect::<Vec<_>>())
}
