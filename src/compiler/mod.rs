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

//! Constraint lowering from user expression trees into typed, name-resolved
//! [`Term`] trees.
//!
//! Lowering happens once per constraint (at finalize time for model
//! constraints, per request for query constraints). The resulting terms are
//! consumed unchanged by instance evaluation and by clause generation, so
//! both agree on semantics by construction.

mod context;
mod expr;
mod paths;

use std::collections::BTreeSet;

use crate::expr::{ArithOp, CompareOp, Expr, Literal, Path, PathBase, Primitive, Quantifier, Step};
use crate::registry::{ConstraintDecl, FeatureId, Model, ModelError, RefTarget};

use self::context::LowerContext;

/// Static type of a lowered term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueType {
    Bool,
    Int,
    Str,
    Nodes(FeatureId),
}

impl ValueType {
    fn describe(self, model: &Model) -> String {
        match self {
            ValueType::Bool => "boolean".into(),
            ValueType::Int => "integer".into(),
            ValueType::Str => "string".into(),
            ValueType::Nodes(id) => format!("occurrences of '{}'", model.feature(id).qualified_name()),
        }
    }

    fn is_set(self) -> bool {
        !matches!(self, ValueType::Bool)
    }
}

/// Start of a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Base {
    This,
    // Quantifier binding, by depth (outermost binding is 0).
    Local(usize),
    Global(FeatureId),
}

/// One resolved traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathStep {
    Child(FeatureId),
    Deref,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathTerm {
    pub(crate) base: Base,
    pub(crate) steps: Vec<PathStep>,
}

/// Typed, name-resolved constraint tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Term {
    Const(bool),
    Value(Primitive),
    Path(PathTerm),
    Not(Box<Term>),
    And(Vec<Term>),
    Or(Vec<Term>),
    Implies(Box<Term>, Box<Term>),
    // Both sides primitive-valued sets; holds only for singletons.
    CompareValues {
        op: CompareOp,
        left: Box<Term>,
        right: Box<Term>,
    },
    // Both sides occurrence sets; `equal == false` is set inequality.
    CompareSets {
        equal: bool,
        left: Box<Term>,
        right: Box<Term>,
    },
    // `body == None` is `true`. A local is bound only when `binds` is set.
    Quantified {
        quantifier: Quantifier,
        binds: bool,
        over: Box<Term>,
        body: Option<Box<Term>>,
    },
    Count(Box<Term>),
    // Singleton of the least member; empty when the set is empty.
    Min(Box<Term>),
    Arith {
        op: ArithOp,
        left: Box<Term>,
        right: Box<Term>,
    },
    Union(Box<Term>, Box<Term>),
}

/// Constraint compiled against a frozen model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Constraint {
    pub(crate) owner: Option<FeatureId>,
    pub(crate) label: String,
    pub(crate) term: Term,
}

/// Integer and string constants mentioned by constraints; they extend the
/// primitive domains chosen by the scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Literals {
    pub(crate) ints: BTreeSet<i64>,
    pub(crate) strings: BTreeSet<String>,
}

impl Literals {
    pub(crate) fn absorb(&mut self, expr: &Expr) {
        expr.for_each_literal(&mut |literal| match literal {
            Literal::Int(value) => {
                self.ints.insert(*value);
            }
            Literal::Str(value) => {
                self.strings.insert(value.clone());
            }
            Literal::Bool(_) => {}
        });
    }

    pub(crate) fn merged(&self, other: &Literals) -> Literals {
        let mut merged = self.clone();
        merged.ints.extend(other.ints.iter().copied());
        merged.strings.extend(other.strings.iter().cloned());
        merged
    }
}

/// Resolves the owner, lowers the expression and records its literals.
pub(crate) fn compile_constraint(
    model: &Model,
    decl: &ConstraintDecl,
    literals: &mut Literals,
) -> Result<Constraint, ModelError> {
    let owner = match &decl.owner {
        Some(name) => Some(model.lookup(name).ok_or_else(|| ModelError::UnresolvedReference {
            name: name.clone(),
            context: "constraint owner".into(),
        })?),
        None => None,
    };
    let label = decl
        .label
        .clone()
        .unwrap_or_else(|| decl.expr.to_string());
    let context = match owner {
        Some(id) => format!("constraint on '{}' ({label})", model.feature(id).qualified_name()),
        None => format!("global constraint ({label})"),
    };
    let mut ctx = LowerContext::new(model, owner, context);
    let term = ctx.lower_condition(&decl.expr)?;
    literals.absorb(&decl.expr);
    Ok(Constraint { owner, label, term })
}
