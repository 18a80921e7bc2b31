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

//! Conflict reports for unsatisfiable requests.

use std::fmt;

/// Classification of one conflicting clause group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// A constraint attached to the model.
    Constraint,
    /// A constraint supplied with the query.
    QueryConstraint,
    /// Occurrence cardinality of a feature.
    Cardinality,
    /// Group cardinality of a feature.
    GroupCardinality,
    /// Reference cardinality of a feature.
    ReferenceCardinality,
    /// Scope bound of a feature.
    ScopeBound,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConflictKind::Constraint => "constraint",
            ConflictKind::QueryConstraint => "query constraint",
            ConflictKind::Cardinality => "cardinality",
            ConflictKind::GroupCardinality => "group cardinality",
            ConflictKind::ReferenceCardinality => "reference cardinality",
            ConflictKind::ScopeBound => "scope bound",
        };
        write!(f, "{label}")
    }
}

/// One member of a minimal conflicting subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictItem {
    /// What kind of restriction this is.
    pub kind: ConflictKind,
    /// Qualified name of the feature it belongs to (`None` for global constraints).
    pub feature: Option<String>,
    /// Human-readable summary, e.g. `group cardinality 1..1 of 'Algorithm.status'`.
    pub description: String,
}

impl fmt::Display for ConflictItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Minimal set of restrictions that cannot hold together: dropping any one
/// item makes the remainder satisfiable within the scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conflict {
    /// Conflicting items, in encoding order.
    pub items: Vec<ConflictItem>,
}

impl Conflict {
    /// Returns whether some item has `kind` and belongs to `feature`.
    pub fn mentions(&self, kind: ConflictKind, feature: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.kind == kind && item.feature.as_deref() == Some(feature))
    }

    /// Items of one kind.
    pub fn of_kind(&self, kind: ConflictKind) -> impl Iterator<Item = &ConflictItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "no instance satisfies all of:")?;
        for item in &self.items {
            writeln!(f, "  - {item}")?;
        }
        Ok(())
    }
}
