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

//! Build-time model errors.

use std::fmt;
use thiserror::Error;

/// Which cardinality of a feature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityKind {
    /// Occurrence cardinality.
    Occurrence,
    /// Group cardinality.
    Group,
    /// Reference cardinality.
    Reference,
}

impl fmt::Display for CardinalityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardinalityKind::Occurrence => write!(f, "occurrence"),
            CardinalityKind::Group => write!(f, "group"),
            CardinalityKind::Reference => write!(f, "reference"),
        }
    }
}

/// Reasons a declaration set cannot be frozen (or a query cannot be compiled).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Two features share a qualified name, or an effective definition
    /// inherits two children with the same simple name.
    #[error("duplicate feature name '{name}'")]
    DuplicateName {
        /// Offending qualified name.
        name: String,
    },
    /// A cardinality has `min > max`.
    #[error("invalid {kind} cardinality {min}..{max} on '{feature}'")]
    InvalidCardinality {
        /// Feature carrying the cardinality.
        feature: String,
        /// Which cardinality.
        kind: CardinalityKind,
        /// Declared lower bound.
        min: u32,
        /// Declared upper bound.
        max: u32,
    },
    /// `extends` chain loops back on itself.
    #[error("cyclic inheritance: {}", cycle.join(" -> "))]
    CyclicInheritance {
        /// Features on the cycle, starting and ending with the same name.
        cycle: Vec<String>,
    },
    /// A name does not resolve to a declared feature (or a local binding).
    #[error("unresolved reference '{name}' in {context}")]
    UnresolvedReference {
        /// Name that failed to resolve.
        name: String,
        /// Where the name was used.
        context: String,
    },
    /// A constraint expression is ill-typed.
    #[error("type mismatch in {context}: {message}")]
    TypeMismatch {
        /// Constraint the error occurred in.
        context: String,
        /// What went wrong.
        message: String,
    },
}
