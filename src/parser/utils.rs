/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Parser trivia and lexical helpers.

use crate::ast::Span;
use crate::registry::{Cardinality, Target};
use nom::Parser;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending, satisfy},
    combinator::{cut, map, map_res, not, opt, recognize, value},
    error::context,
    multi::many0,
    sequence::{pair, preceded, terminated},
};

use super::PResult;

/// Words that can never name a feature inside an expression.
const RESERVED: &[&str] = &[
    "this", "ref", "parent", "some", "all", "no", "not", "and", "or", "true", "false",
];

/// Parses a simple double-quoted string literal.
///
/// Escape processing is intentionally minimal: labels and string constants
/// are consumed as raw text between quotes.
pub(super) fn string_literal(input: Span<'_>) -> PResult<'_, String> {
    map(
        nom::sequence::delimited(
            char('"'),
            take_while(|c| c != '"' && c != '\n' && c != '\r'),
            context("closing quote", char('"')),
        ),
        |s: Span<'_>| s.fragment().to_string(),
    )
    .parse(input)
}

/// Parses identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub(super) fn identifier(input: Span<'_>) -> PResult<'_, String> {
    map(
        recognize(pair(
            take_while1(is_ident_start),
            take_while(is_ident_continue),
        )),
        |s: Span<'_>| s.fragment().to_string(),
    )
    .parse(input)
}

/// Parses an identifier that is not a reserved expression word.
pub(super) fn name(input: Span<'_>) -> PResult<'_, String> {
    let (rest, ident) = identifier(input)?;
    if RESERVED.contains(&ident.as_str()) {
        return Err(nom::Err::Error(nom::error::VerboseError {
            errors: vec![(
                input,
                nom::error::VerboseErrorKind::Context("name (found reserved word)"),
            )],
        }));
    }
    Ok((rest, ident))
}

/// Parses dotted feature names (`Algorithm.status`).
pub(super) fn qualified_name(input: Span<'_>) -> PResult<'_, String> {
    map(
        recognize(pair(identifier, many0(pair(char('.'), identifier)))),
        |s: Span<'_>| s.fragment().to_string(),
    )
    .parse(input)
}

/// Matches `word` only when it is not the prefix of a longer identifier.
pub(super) fn keyword<'a>(word: &'static str) -> impl FnMut(Span<'a>) -> PResult<'a, Span<'a>> {
    move |input| terminated(tag(word), not(satisfy(is_ident_continue))).parse(input)
}

/// Parses an optionally negative decimal integer.
pub(super) fn integer(input: Span<'_>) -> PResult<'_, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: Span<'_>| {
        s.fragment().parse::<i64>()
    })
    .parse(input)
}

/// Parses a non-negative decimal integer.
pub(super) fn natural(input: Span<'_>) -> PResult<'_, u32> {
    map_res(digit1, |s: Span<'_>| s.fragment().parse::<u32>()).parse(input)
}

/// Parses `[n]`, `[min..max]` and `[min..*]`.
pub(super) fn cardinality(input: Span<'_>) -> PResult<'_, Cardinality> {
    let (input, _) = char('[').parse(input)?;
    let (input, min) = cut(context("lower bound", ws(natural))).parse(input)?;
    let (input, max) = opt(preceded(
        ws(tag("..")),
        cut(context("upper bound", ws(upper_bound))),
    ))
    .parse(input)?;
    let (input, _) = cut(context("']'", char(']'))).parse(input)?;
    let card = match max {
        Some(max) => Cardinality { min, max },
        None => Cardinality::exactly(min),
    };
    Ok((input, card))
}

fn upper_bound(input: Span<'_>) -> PResult<'_, Option<u32>> {
    alt((value(None, char('*')), map(natural, Some))).parse(input)
}

/// Parses a reference target (`int`, `string` or a feature name).
pub(super) fn target(input: Span<'_>) -> PResult<'_, Target> {
    alt((
        value(Target::Int, keyword("int")),
        value(Target::Str, keyword("string")),
        map(qualified_name, Target::Feature),
    ))
    .parse(input)
}

/// Returns whether a char can start an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Returns whether a char can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Skips zero-or-more whitespace/comments.
pub(super) fn ws0(input: Span<'_>) -> PResult<'_, ()> {
    value((), many0(alt((value((), multispace1), comment)))).parse(input)
}

/// Parses `// ...` line comments. `#` is the count operator, not a comment.
fn comment(input: Span<'_>) -> PResult<'_, ()> {
    value((), pair(tag("//"), opt(not_line_ending))).parse(input)
}

/// Wraps a parser with leading/trailing whitespace/comment skipping.
pub(super) fn ws<'a, O, P>(mut parser: P) -> impl FnMut(Span<'a>) -> PResult<'a, O>
where
    P: FnMut(Span<'a>) -> PResult<'a, O>,
{
    move |input| nom::sequence::delimited(ws0, &mut parser, ws0)(input)
}

/// Parses a specific character token with surrounding whitespace/comments.
pub(super) fn ws_char<'a>(c: char) -> impl FnMut(Span<'a>) -> PResult<'a, char> {
    ws(char(c))
}

/// Parses an exact operator token with surrounding whitespace/comments.
pub(super) fn ws_tag<'a>(token: &'static str) -> impl FnMut(Span<'a>) -> PResult<'a, Span<'a>> {
    ws(tag(token))
}
