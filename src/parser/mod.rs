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

//! `nom` parser for feature-model declaration lists.
//!
//! The grammar is a flat sequence of `;`-terminated statements:
//! - `scope default N;`, `scope int LO..HI;`, `scope string N;`,
//!   `scope string alphabet "a", "b";` and `scope Name N;`
//! - `abstract|feature Name [in Container] [extends Parent] [min..max]
//!   [group [min..max]] [-> int|string|Feature [min..max]];`
//! - `constraint [Owner] ["label"]: expr;` (no owner means global)
//!
//! `//` starts a line comment.

mod expr;
mod statements;
mod utils;

use crate::ast::{Document, SourceSpan, Span};
use crate::diagnostics::SyntaxError;
use nom::{
    IResult,
    combinator::all_consuming,
    error::{VerboseError, VerboseErrorKind},
    multi::many0,
    sequence::delimited,
};

use self::statements::statement;
use self::utils::ws0;

type PResult<'a, O> = IResult<Span<'a>, O, VerboseError<Span<'a>>>;

/// Parses a declaration list into a spanned document.
pub fn parse_document(source: &str) -> Result<Document, SyntaxError> {
    parse_document_in_source(source, "<inline>")
}

/// Parses a declaration list while tagging diagnostics with a source name/path.
pub fn parse_document_in_source(source: &str, source_name: &str) -> Result<Document, SyntaxError> {
    let input = Span::new(source);
    // `all_consuming` ensures trailing garbage is treated as syntax error.
    let (_, statements) = match all_consuming(delimited(ws0, many0(statement), ws0))(input) {
        Ok(v) => v,
        Err(err) => return Err(parse_error_to_syntax_error(err, source_name, source)),
    };
    Ok(Document { statements })
}

/// Turns a recoverable error into a committed one once a statement keyword matched.
fn commit<E>(err: nom::Err<E>) -> nom::Err<E> {
    match err {
        nom::Err::Error(e) => nom::Err::Failure(e),
        other => other,
    }
}

/// Converts a `nom` verbose error to a located syntax error.
fn parse_error_to_syntax_error(
    err: nom::Err<VerboseError<Span<'_>>>,
    source_name: &str,
    source: &str,
) -> SyntaxError {
    match err {
        nom::Err::Incomplete(_) => SyntaxError::unlocated("Incomplete input", source_name),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            // Anchor on the innermost labelled expectation, else the deepest raw error.
            let anchor = e
                .errors
                .iter()
                .find(|(_, kind)| matches!(kind, VerboseErrorKind::Context(_)))
                .or_else(|| e.errors.first());
            if let Some((span, kind)) = anchor {
                let span = SourceSpan::from_bounds(*span, *span);
                let detail = match kind {
                    VerboseErrorKind::Context(ctx) => format!("Syntax error: expected {ctx}"),
                    VerboseErrorKind::Char(c) => format!("Syntax error: expected '{c}'"),
                    VerboseErrorKind::Nom(kind) => format!("Syntax error near {kind:?}"),
                };
                SyntaxError::located(detail, source_name, source, &span)
            } else {
                SyntaxError::unlocated("Syntax error", source_name)
            }
        }
    }
}
