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

//! Model Registry: feature declarations, inheritance flattening and the
//! frozen, read-only [`Model`].
//!
//! A model is built once through [`ModelBuilder`] and never mutated after
//! [`ModelBuilder::finalize`]. Every later stage (query compilation,
//! grounding, decoding) borrows it immutably, so one model can serve any
//! number of concurrent solve requests.

mod builder;
mod errors;
mod feature;
mod flatten;

use std::collections::BTreeMap;

pub use builder::{FeatureDecl, ModelBuilder, Target};
pub use errors::{CardinalityKind, ModelError};
pub use feature::{Cardinality, Feature, FeatureId, RefTarget, Reference};

pub(crate) use builder::ConstraintDecl;
pub(crate) use flatten::Effective;

use crate::compiler::{Constraint, Literals};
use crate::scope::Scope;
use crate::solver::SolveRequest;

/// Qualified-name index with a unique-simple-name fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NameIndex {
    qualified: BTreeMap<String, FeatureId>,
    simple: BTreeMap<String, Vec<FeatureId>>,
}

impl NameIndex {
    pub(crate) fn new<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> Self {
        let mut index = Self::default();
        for (idx, (simple, qualified)) in entries.enumerate() {
            let id = FeatureId(idx as u32);
            index.qualified.insert(qualified.to_string(), id);
            index.simple.entry(simple.to_string()).or_default().push(id);
        }
        index
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<FeatureId> {
        if let Some(id) = self.qualified.get(name) {
            return Some(*id);
        }
        match self.simple.get(name).map(Vec::as_slice) {
            Some([only]) => Some(*only),
            _ => None,
        }
    }
}

/// Frozen feature model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub(crate) features: Vec<Feature>,
    pub(crate) names: NameIndex,
    pub(crate) effective: Vec<Effective>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) roots: Vec<FeatureId>,
    pub(crate) literals: Literals,
}

impl Model {
    /// All features in declaration order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Feature by id.
    pub fn feature(&self, id: FeatureId) -> &Feature {
        &self.features[id.index()]
    }

    /// Resolves a qualified name, or a simple name that is unique in the model.
    pub fn lookup(&self, name: &str) -> Option<FeatureId> {
        self.names.lookup(name)
    }

    /// Top-level features, declaration order.
    pub fn top_level(&self) -> &[FeatureId] {
        &self.roots
    }

    /// Returns whether `sub` is `sup` or inherits from it.
    pub fn is_subtype(&self, sub: FeatureId, sup: FeatureId) -> bool {
        self.effective[sub.index()].lineage.contains(&sup)
    }

    /// Children including inherited ones, supertype children first.
    pub fn effective_children(&self, id: FeatureId) -> &[FeatureId] {
        &self.effective[id.index()].children
    }

    /// Reference attribute, own or inherited.
    pub fn effective_reference(&self, id: FeatureId) -> Option<Reference> {
        self.effective[id.index()].reference
    }

    /// Group cardinality, own or inherited.
    pub fn effective_group(&self, id: FeatureId) -> Option<Cardinality> {
        self.effective[id.index()].group
    }

    /// Concrete features that are `id` or extend it.
    pub fn concrete_subtypes(&self, id: FeatureId) -> &[FeatureId] {
        &self.effective[id.index()].subtypes
    }

    /// Number of attached constraints (feature-owned and global).
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Labels of attached constraints in declaration order.
    pub fn constraint_labels(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().map(|c| c.label.as_str())
    }

    /// Starts a solve request against this model.
    pub fn solve<'a>(&'a self, scope: &'a Scope) -> SolveRequest<'a> {
        SolveRequest::new(self, scope)
    }

    pub(crate) fn effective(&self, id: FeatureId) -> &Effective {
        &self.effective[id.index()]
    }

    pub(crate) fn effective_child_named(&self, id: FeatureId, name: &str) -> Option<FeatureId> {
        self.effective[id.index()]
            .children
            .iter()
            .copied()
            .find(|&child| self.features[child.index()].name == name)
    }

    fn attach_constraints(&mut self, constraints: Vec<Constraint>) {
        for effective in &mut self.effective {
            effective.constraints.clear();
            for &ancestor in &effective.lineage {
                effective.constraints.extend(
                    constraints
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| c.owner == Some(ancestor))
                        .map(|(idx, _)| idx),
                );
            }
        }
        self.constraints = constraints;
    }
}
