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

//! Per-request query constraints.

use crate::compiler::{self, Constraint, Literals};
use crate::expr::Expr;
use crate::registry::{ConstraintDecl, Model, ModelError};

/// Extra constraints applied to one solve request only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    constraints: Vec<ConstraintDecl>,
}

impl Query {
    /// Query without constraints (plain enumeration).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint evaluated on every occurrence of `owner`.
    pub fn constrain(mut self, owner: impl Into<String>, expr: Expr) -> Self {
        self.constraints.push(ConstraintDecl {
            owner: Some(owner.into()),
            label: None,
            expr,
        });
        self
    }

    /// Adds a labeled constraint on `owner`.
    pub fn constrain_labeled(
        mut self,
        owner: impl Into<String>,
        label: impl Into<String>,
        expr: Expr,
    ) -> Self {
        self.constraints.push(ConstraintDecl {
            owner: Some(owner.into()),
            label: Some(label.into()),
            expr,
        });
        self
    }

    /// Adds a constraint with no `this`.
    pub fn constrain_global(mut self, expr: Expr) -> Self {
        self.constraints.push(ConstraintDecl {
            owner: None,
            label: None,
            expr,
        });
        self
    }

    /// Number of query constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns whether the query adds nothing.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub(crate) fn compile(&self, model: &Model) -> Result<CompiledQuery, ModelError> {
        let mut literals = Literals::default();
        let constraints = self
            .constraints
            .iter()
            .map(|decl| compiler::compile_constraint(model, decl, &mut literals))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledQuery {
            constraints,
            literals,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CompiledQuery {
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) literals: Literals,
}
