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

//! Declaration-list AST with source spans.
//!
//! The parser produces a flat list of statements. The loader replays them
//! against a [`crate::registry::ModelBuilder`] and a [`crate::scope::Scope`].

use nom_locate::LocatedSpan;

use crate::expr::Expr;
use crate::registry::{Cardinality, Target};

/// Parser input span type carrying byte offsets and line/column info.
pub type Span<'a> = LocatedSpan<&'a str>;

/// Source range and anchor position for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based UTF-8 column.
    pub column: usize,
}

impl SourceSpan {
    /// Creates a source span from parser start/end positions.
    pub fn from_bounds(start: Span<'_>, end: Span<'_>) -> Self {
        Self {
            start: start.location_offset(),
            end: end.location_offset(),
            line: start.location_line() as usize,
            column: start.get_utf8_column(),
        }
    }

    /// Returns span length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a span that starts at `self` and ends at `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

/// `scope ...;` statement payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeStmt {
    /// `scope default N;`
    Default(u32),
    /// `scope int LO..HI;`
    IntRange {
        /// Smallest integer in the domain.
        low: i64,
        /// Largest integer in the domain.
        high: i64,
    },
    /// `scope string N;` (maximum string length).
    StringLength(usize),
    /// `scope string alphabet "a", "b";`
    Alphabet(Vec<String>),
    /// `scope Name N;`
    Feature {
        /// Simple or qualified feature name.
        name: String,
        /// Maximum number of instances.
        bound: u32,
    },
}

/// `abstract|feature ...;` statement payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureStmt {
    /// `abstract` keyword present.
    pub is_abstract: bool,
    /// Declared simple name.
    pub name: String,
    /// `in Container`.
    pub within: Option<String>,
    /// `extends Parent`.
    pub extends: Option<String>,
    /// `[min..max]` occurrence bounds.
    pub card: Option<Cardinality>,
    /// `group [min..max]`; bare `group` means exactly one.
    pub group: Option<Cardinality>,
    /// `-> target [min..max]`.
    pub reference: Option<(Target, Option<Cardinality>)>,
}

/// `constraint ...;` statement payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintStmt {
    /// Owning feature; `None` for global constraints.
    pub owner: Option<String>,
    /// Optional user label.
    pub label: Option<String>,
    /// Constraint body.
    pub expr: Expr,
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Search scope setting.
    Scope(ScopeStmt),
    /// Feature declaration.
    Feature(FeatureStmt),
    /// Constraint declaration.
    Constraint(ConstraintStmt),
}

/// Spanned statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// Statement payload.
    pub kind: StmtKind,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// Full parsed declaration list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Statements in source order.
    pub statements: Vec<Stmt>,
}
