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

//! Constraint expression parser.
//!
//! Precedence, loosest first: `=>` (right-associative), `||`/`or`,
//! `&&`/`and`, prefix `!`/`not` and quantifiers, comparisons, `+`/`-`,
//! `++`, then atoms.

use crate::ast::Span;
use crate::expr::{ArithOp, CompareOp, Expr, Path, PathBase, Quantifier, Step};
use nom::Parser;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{cut, map, not, opt, value},
    error::context,
    multi::many0,
    sequence::{pair, preceded, terminated},
};

use super::PResult;
use super::utils::{
    identifier, integer, keyword, name, string_literal, ws, ws0, ws_char, ws_tag,
};

/// Top-level expression parser.
pub(super) fn expr(input: Span<'_>) -> PResult<'_, Expr> {
    parse_implies(input)
}

fn parse_implies(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, premise) = parse_or(input)?;
    let (input, arrow) = opt(ws_tag("=>")).parse(input)?;
    if arrow.is_none() {
        return Ok((input, premise));
    }
    // Right-associative: `a => b => c` is `a => (b => c)`.
    let (input, conclusion) = cut(context("implication conclusion", parse_implies)).parse(input)?;
    Ok((input, Expr::implies(premise, conclusion)))
}

fn parse_or(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, first) = parse_and(input)?;
    let mut items = vec![first];
    loop {
        let (next, op) = opt(ws(alt((tag("||"), keyword("or"))))).parse(input)?;
        if op.is_none() {
            break;
        }
        let (next, operand) = cut(context("operand after '||'", parse_and)).parse(next)?;
        items.push(operand);
        input = next;
    }
    Ok((input, flatten(items, Expr::Or)))
}

fn parse_and(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, first) = parse_unary(input)?;
    let mut items = vec![first];
    loop {
        let (next, op) = opt(ws(alt((tag("&&"), keyword("and"))))).parse(input)?;
        if op.is_none() {
            break;
        }
        let (next, operand) = cut(context("operand after '&&'", parse_unary)).parse(next)?;
        items.push(operand);
        input = next;
    }
    Ok((input, flatten(items, Expr::And)))
}

fn flatten(mut items: Vec<Expr>, join: fn(Vec<Expr>) -> Expr) -> Expr {
    if items.len() == 1 {
        items.remove(0)
    } else {
        join(items)
    }
}

/// Parses prefix negation, quantifiers and comparisons.
fn parse_unary(input: Span<'_>) -> PResult<'_, Expr> {
    let (next, negation) = opt(ws(alt((
        terminated(tag("!"), not(char('='))),
        keyword("not"),
    ))))
    .parse(input)?;
    if negation.is_some() {
        let (next, inner) = cut(context("negated operand", parse_unary)).parse(next)?;
        return Ok((next, Expr::not(inner)));
    }
    alt((parse_quantified, parse_comparison)).parse(input)
}

/// Parses `some|all|no [name:] set [| body]`.
fn parse_quantified(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, quantifier) = ws(alt((
        value(Quantifier::Some, keyword("some")),
        value(Quantifier::All, keyword("all")),
        value(Quantifier::No, keyword("no")),
    )))
    .parse(input)?;
    quantified_tail(input, quantifier).map_err(super::commit)
}

fn quantified_tail(input: Span<'_>, quantifier: Quantifier) -> PResult<'_, Expr> {
    let (input, binding) = opt(terminated(ws(name), ws_char(':'))).parse(input)?;
    let (input, over) = context("quantified set", parse_union).parse(input)?;
    // A single `|` opens the body; `||` belongs to the enclosing disjunction.
    let (input, body) = opt(preceded(
        ws(terminated(char('|'), not(char('|')))),
        cut(context("quantifier body", expr)),
    ))
    .parse(input)?;
    Ok((input, Expr::quantified(quantifier, binding, over, body)))
}

fn parse_comparison(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, left) = parse_additive(input)?;
    let (input, op) = opt(ws(compare_op)).parse(input)?;
    let Some(op) = op else {
        return Ok((input, left));
    };
    let (input, right) = cut(context("right operand", parse_additive)).parse(input)?;
    Ok((input, Expr::compare(op, left, right)))
}

fn compare_op(input: Span<'_>) -> PResult<'_, CompareOp> {
    alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Ne, tag("!=")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Lt, tag("<")),
        value(CompareOp::Gt, tag(">")),
        value(CompareOp::Eq, terminated(tag("="), not(char('>')))),
    ))
    .parse(input)
}

/// Parses left-associative `+`/`-`.
fn parse_additive(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_union(input)?;
    loop {
        let (next, op) = opt(ws(alt((
            value(ArithOp::Add, terminated(char('+'), not(char('+')))),
            value(ArithOp::Sub, char('-')),
        ))))
        .parse(input)?;
        let Some(op) = op else {
            break;
        };

        // Left-associative fold: `a-b-c` becomes `(a-b)-c`.
        let (next, right) = cut(context("arithmetic operand", parse_union)).parse(next)?;
        left = match op {
            ArithOp::Add => Expr::add(left, right),
            ArithOp::Sub => Expr::sub(left, right),
        };
        input = next;
    }
    Ok((input, left))
}

/// Parses left-associative `++`.
fn parse_union(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_primary(input)?;
    loop {
        let (next, op) = opt(ws_tag("++")).parse(input)?;
        if op.is_none() {
            break;
        }
        let (next, right) = cut(context("union operand", parse_primary)).parse(next)?;
        left = Expr::union(left, right);
        input = next;
    }
    Ok((input, left))
}

/// Parses expression atoms.
fn parse_primary(input: Span<'_>) -> PResult<'_, Expr> {
    alt((
        parse_parenthesized,
        parse_count,
        parse_min,
        map(ws(integer), Expr::int),
        map(ws(string_literal), Expr::string),
        map(ws(keyword("true")), |_| Expr::bool(true)),
        map(ws(keyword("false")), |_| Expr::bool(false)),
        map(parse_path, Expr::Path),
    ))
    .parse(input)
}

fn parse_parenthesized(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, _) = ws_char('(').parse(input)?;
    cut(terminated(expr, context("')'", ws_char(')')))).parse(input)
}

fn parse_count(input: Span<'_>) -> PResult<'_, Expr> {
    map(
        preceded(ws_char('#'), cut(context("set after '#'", parse_primary))),
        Expr::count,
    )
    .parse(input)
}

/// Parses `min(set)`; `min` without `(` is left to the path parser.
fn parse_min(input: Span<'_>) -> PResult<'_, Expr> {
    map(
        preceded(
            pair(ws(keyword("min")), ws_char('(')),
            cut(terminated(expr, context("')'", ws_char(')')))),
        ),
        Expr::min,
    )
    .parse(input)
}

/// Parses `this|name` followed by `.child`, `.ref` and `.parent` steps.
fn parse_path(input: Span<'_>) -> PResult<'_, Path> {
    let (input, base) = preceded(
        ws0,
        alt((
            value(PathBase::This, keyword("this")),
            map(name, PathBase::Name),
        )),
    )
    .parse(input)?;
    let (input, steps) = many0(preceded(char('.'), cut(context("path step", path_step)))).parse(input)?;
    let (input, _) = ws0(input)?;
    Ok((input, Path { base, steps }))
}

fn path_step(input: Span<'_>) -> PResult<'_, Step> {
    alt((
        value(Step::Deref, keyword("ref")),
        value(Step::Parent, keyword("parent")),
        map(identifier, Step::Child),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::sequence::delimited;

    fn parse(source: &str) -> Expr {
        let (rest, expr) = delimited(ws0, expr, ws0)(Span::new(source)).expect("parse");
        assert!(rest.fragment().is_empty(), "unparsed tail: {:?}", rest.fragment());
        expr
    }

    #[test]
    fn binds_comparison_tighter_than_connectives() {
        let parsed = parse("this.a.ref = 1 && this.b.ref != \"x\" || false");
        let expected = Expr::or([
            Expr::and([
                Expr::eq(Path::this().child("a").deref(), Expr::int(1)),
                Expr::ne(Path::this().child("b").deref(), Expr::string("x")),
            ]),
            Expr::bool(false),
        ]);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn implication_is_right_associative() {
        let parsed = parse("a => b => c");
        let expected = Expr::implies(
            Path::name("a"),
            Expr::implies(Path::name("b"), Path::name("c")),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn quantifier_body_stops_before_double_bar() {
        let parsed = parse("some x || all c: Cipher | c.name.ref != \"DES\"");
        let expected = Expr::or([
            Expr::some(Path::name("x")),
            Expr::all_in(
                "c",
                Path::name("Cipher"),
                Expr::ne(Path::name("c").child("name").deref(), Expr::string("DES")),
            ),
        ]);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn arithmetic_and_count() {
        let parsed = parse("#(this.a ++ this.b) - 1 >= -2");
        let expected = Expr::ge(
            Expr::sub(
                Expr::count(Expr::union(Path::this().child("a"), Path::this().child("b"))),
                Expr::int(1),
            ),
            Expr::int(-2),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn min_over_a_union_of_paths() {
        let parsed = parse("this.level.ref = min(this.a.ref ++ this.b.ref) && min.x");
        let expected = Expr::and([
            Expr::eq(
                Path::this().child("level").deref(),
                Expr::min(Expr::union(
                    Path::this().child("a").deref(),
                    Path::this().child("b").deref(),
                )),
            ),
            Path::name("min").child("x").into(),
        ]);
        assert_eq!(parsed, expected);
        assert_eq!(parse(&expected.to_string()), expected);
    }

    #[test]
    fn keyword_operators_need_word_boundaries() {
        let parsed = parse("not nothing and order");
        let expected = Expr::and([
            Expr::not(Path::name("nothing")),
            Path::name("order").into(),
        ]);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn display_output_parses_back() {
        let original = Expr::and([
            Expr::some(Path::this().child("status").child("secure")),
            Expr::implies(
                Expr::gt(Path::this().child("keySize").deref(), Expr::int(128)),
                Expr::no_in("p", Path::this().child("padding").parent(), Expr::bool(true)),
            ),
        ]);
        assert_eq!(parse(&original.to_string()), original);
    }
}
