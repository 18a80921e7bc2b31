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

//! Lowering context: owner, quantifier bindings and error construction.

use super::*;

/// State for lowering one constraint.
pub(super) struct LowerContext<'m> {
    pub(super) model: &'m Model,
    pub(super) owner: Option<FeatureId>,
    // Quantifier bindings, outermost first; unnamed bindings still occupy a depth.
    pub(super) locals: Vec<(Option<String>, FeatureId)>,
    pub(super) context: String,
}

impl<'m> LowerContext<'m> {
    pub(super) fn new(model: &'m Model, owner: Option<FeatureId>, context: String) -> Self {
        Self {
            model,
            owner,
            locals: Vec::new(),
            context,
        }
    }

    pub(super) fn resolve_local(&self, name: &str) -> Option<(usize, FeatureId)> {
        self.locals
            .iter()
            .rposition(|(bound, _)| bound.as_deref() == Some(name))
            .map(|depth| (depth, self.locals[depth].1))
    }

    pub(super) fn mismatch(&self, message: impl Into<String>) -> ModelError {
        ModelError::TypeMismatch {
            context: self.context.clone(),
            message: message.into(),
        }
    }

    pub(super) fn unresolved(&self, name: &str, place: impl std::fmt::Display) -> ModelError {
        ModelError::UnresolvedReference {
            name: name.to_string(),
            context: format!("{place} in {}", self.context),
        }
    }

    pub(super) fn describe(&self, ty: ValueType) -> String {
        ty.describe(self.model)
    }

    pub(super) fn qualified(&self, id: FeatureId) -> &str {
        self.model.feature(id).qualified_name()
    }
}
