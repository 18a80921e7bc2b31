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

//! Statement parsers.

use crate::ast::{ConstraintStmt, FeatureStmt, ScopeStmt, SourceSpan, Span, Stmt, StmtKind};
use crate::registry::Cardinality;
use nom::Parser;
use nom::{
    branch::alt,
    combinator::{cut, map, opt, value},
    error::context,
    multi::separated_list1,
    sequence::{pair, preceded, separated_pair},
};

use super::expr::expr;
use super::utils::{
    cardinality, integer, keyword, name, natural, qualified_name, string_literal, target,
    ws, ws_char, ws_tag,
};
use super::{PResult, commit};

/// Parses one statement and its trailing semicolon.
pub(super) fn statement(input: Span<'_>) -> PResult<'_, Stmt> {
    let start = input;
    let (input, kind) = alt((
        map(scope_stmt, StmtKind::Scope),
        map(feature_stmt, StmtKind::Feature),
        map(constraint_stmt, StmtKind::Constraint),
    ))
    .parse(input)?;
    let end = input;
    let (input, _) = cut(context("';'", ws_char(';'))).parse(input)?;
    let span = SourceSpan::from_bounds(start, end);
    Ok((input, Stmt { kind, span }))
}

/// Parses `scope default N`, `scope int LO..HI`, `scope string N`,
/// `scope string alphabet "a", ...` and `scope Name N`.
fn scope_stmt(input: Span<'_>) -> PResult<'_, ScopeStmt> {
    let (input, _) = ws(keyword("scope")).parse(input)?;
    cut(context(
        "scope setting",
        alt((
            map(preceded(ws(keyword("default")), ws(natural)), ScopeStmt::Default),
            map(
                preceded(
                    ws(keyword("int")),
                    separated_pair(ws(integer), ws_tag(".."), ws(integer)),
                ),
                |(low, high)| ScopeStmt::IntRange { low, high },
            ),
            map(
                preceded(
                    pair(ws(keyword("string")), ws(keyword("alphabet"))),
                    separated_list1(ws_char(','), ws(string_literal)),
                ),
                ScopeStmt::Alphabet,
            ),
            map(preceded(ws(keyword("string")), ws(natural)), |n| {
                ScopeStmt::StringLength(n as usize)
            }),
            map(pair(ws(qualified_name), ws(natural)), |(name, bound)| {
                ScopeStmt::Feature { name, bound }
            }),
        )),
    ))
    .parse(input)
}

/// Parses `abstract|feature Name [in C] [extends P] [card] [group [card]] [-> target [card]]`.
fn feature_stmt(input: Span<'_>) -> PResult<'_, FeatureStmt> {
    let (input, is_abstract) = ws(alt((
        value(true, keyword("abstract")),
        value(false, keyword("feature")),
    )))
    .parse(input)?;
    feature_tail(input, is_abstract).map_err(commit)
}

fn feature_tail(input: Span<'_>, is_abstract: bool) -> PResult<'_, FeatureStmt> {
    let (input, name) = context("feature name", ws(name)).parse(input)?;
    let (input, within) = opt(preceded(
        ws(keyword("in")),
        cut(context("container name", ws(qualified_name))),
    ))
    .parse(input)?;
    let (input, extends) = opt(preceded(
        ws(keyword("extends")),
        cut(context("supertype name", ws(qualified_name))),
    ))
    .parse(input)?;
    let (input, card) = opt(ws(cardinality)).parse(input)?;
    // Bare `group` means exactly one child.
    let (input, group) = opt(preceded(ws(keyword("group")), opt(ws(cardinality)))).parse(input)?;
    let (input, reference) = opt(preceded(
        ws_tag("->"),
        cut(pair(
            context("reference target", ws(target)),
            opt(ws(cardinality)),
        )),
    ))
    .parse(input)?;
    Ok((
        input,
        FeatureStmt {
            is_abstract,
            name,
            within,
            extends,
            card,
            group: group.map(|card| card.unwrap_or(Cardinality::exactly(1))),
            reference,
        },
    ))
}

/// Parses `constraint [Owner] ["label"] : expr`.
fn constraint_stmt(input: Span<'_>) -> PResult<'_, ConstraintStmt> {
    let (input, _) = ws(keyword("constraint")).parse(input)?;
    constraint_tail(input).map_err(commit)
}

fn constraint_tail(input: Span<'_>) -> PResult<'_, ConstraintStmt> {
    let (input, owner) = opt(ws(qualified_name)).parse(input)?;
    let (input, label) = opt(ws(string_literal)).parse(input)?;
    let (input, _) = context("':'", ws_char(':')).parse(input)?;
    let (input, expr) = context("constraint expression", expr).parse(input)?;
    Ok((input, ConstraintStmt { owner, label, expr }))
}
