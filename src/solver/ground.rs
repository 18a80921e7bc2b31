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

//! Grounding: expands a frozen model under a scope into a finite tree of
//! candidate occurrence slots, each with a presence literal and, when the
//! feature carries a reference, one selection literal per domain value.

use tracing::debug;

use super::circuit::Circuit;
use super::errors::SolveError;
use crate::compiler::Literals;
use crate::expr::Primitive;
use crate::registry::{FeatureId, Model, RefTarget};
use crate::sat::Lit;
use crate::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SlotId(u32);

impl SlotId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Candidate value of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GroundValue {
    Prim(Primitive),
    Slot(SlotId),
}

/// Slots of one concrete child feature inside one container slot.
#[derive(Debug, Clone)]
pub(crate) struct SlotGroup {
    pub(crate) feature: FeatureId,
    pub(crate) slots: Vec<SlotId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) feature: FeatureId,
    pub(crate) parent: Option<SlotId>,
    pub(crate) presence: Lit,
    pub(crate) children: Vec<SlotGroup>,
    pub(crate) values: Vec<(GroundValue, Lit)>,
}

#[derive(Debug, Clone)]
pub(crate) struct Ground {
    pub(crate) slots: Vec<Slot>,
    pub(crate) roots: Vec<SlotGroup>,
    pub(crate) ints: Vec<i64>,
    pub(crate) strings: Vec<String>,
}

impl Ground {
    pub(crate) fn build(
        model: &Model,
        scope: &Scope,
        literals: &Literals,
        circuit: &mut Circuit,
        max_slots: usize,
    ) -> Result<Self, SolveError> {
        let range = scope.int_range.len();
        if range > max_slots as u64 {
            return Err(SolveError::ResourceExceeded {
                resource: "integer domain".into(),
                requested: usize::try_from(range).unwrap_or(usize::MAX),
                limit: max_slots,
            });
        }

        let mut grounder = Grounder {
            model,
            scope,
            circuit: &mut *circuit,
            slots: Vec::new(),
            chain: Vec::new(),
            max_slots,
        };
        let roots = grounder.expand(None, model.top_level())?;
        let mut ground = Ground {
            slots: grounder.slots,
            roots,
            ints: scope.int_domain(literals),
            strings: scope.string_domain(literals),
        };
        ground.allocate_values(model, circuit, max_slots)?;
        debug!(
            slots = ground.slots.len(),
            ints = ground.ints.len(),
            strings = ground.strings.len(),
            "grounded model"
        );
        Ok(ground)
    }

    pub(crate) fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.index()]
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len() as u32).map(SlotId)
    }

    /// Slots whose feature is `feature` or one of its subtypes.
    pub(crate) fn slots_of<'a>(
        &'a self,
        model: &'a Model,
        feature: FeatureId,
    ) -> impl Iterator<Item = SlotId> + 'a {
        self.ids()
            .filter(move |&id| model.is_subtype(self.slot(id).feature, feature))
    }

    /// Child slots of `slot` whose feature is exactly `child`.
    pub(crate) fn children_of(&self, slot: SlotId, child: FeatureId) -> &[SlotId] {
        self.slot(slot)
            .children
            .iter()
            .find(|group| group.feature == child)
            .map(|group| group.slots.as_slice())
            .unwrap_or(&[])
    }

    /// Presence and value literals; every satisfying assignment is fully
    /// determined by them.
    pub(crate) fn primary_lits(&self) -> Vec<Lit> {
        let mut lits = Vec::new();
        for slot in &self.slots {
            lits.push(slot.presence);
            lits.extend(slot.values.iter().map(|(_, lit)| *lit));
        }
        lits
    }

    fn allocate_values(
        &mut self,
        model: &Model,
        circuit: &mut Circuit,
        max_slots: usize,
    ) -> Result<(), SolveError> {
        let mut total = 0usize;
        for idx in 0..self.slots.len() {
            let Some(reference) = model.effective_reference(self.slots[idx].feature) else {
                continue;
            };
            let candidates: Vec<GroundValue> = match reference.target {
                RefTarget::Int => self
                    .ints
                    .iter()
                    .map(|&value| GroundValue::Prim(Primitive::Int(value)))
                    .collect(),
                RefTarget::Str => self
                    .strings
                    .iter()
                    .map(|value| GroundValue::Prim(Primitive::Str(value.clone())))
                    .collect(),
                RefTarget::Feature(target) => self
                    .slots_of(model, target)
                    .map(GroundValue::Slot)
                    .collect(),
            };
            total += candidates.len();
            if total > max_slots.saturating_mul(16) {
                return Err(SolveError::ResourceExceeded {
                    resource: "reference candidates".into(),
                    requested: total,
                    limit: max_slots.saturating_mul(16),
                });
            }
            self.slots[idx].values = candidates
                .into_iter()
                .map(|value| (value, circuit.input()))
                .collect();
        }
        Ok(())
    }
}

struct Grounder<'a> {
    model: &'a Model,
    scope: &'a Scope,
    circuit: &'a mut Circuit,
    slots: Vec<Slot>,
    // Features of the slots enclosing the one being expanded.
    chain: Vec<FeatureId>,
    max_slots: usize,
}

impl Grounder<'_> {
    fn expand(
        &mut self,
        parent: Option<SlotId>,
        features: &[FeatureId],
    ) -> Result<Vec<SlotGroup>, SolveError> {
        let model = self.model;
        let mut groups = Vec::new();
        for &feature in features {
            if model.feature(feature).is_abstract() {
                continue;
            }
            let capacity = self.capacity(feature);
            let mut group = SlotGroup {
                feature,
                slots: Vec::with_capacity(capacity),
            };
            for _ in 0..capacity {
                if self.slots.len() >= self.max_slots {
                    return Err(SolveError::ResourceExceeded {
                        resource: "slots".into(),
                        requested: self.slots.len() + 1,
                        limit: self.max_slots,
                    });
                }
                let id = SlotId(self.slots.len() as u32);
                let presence = self.circuit.input();
                self.slots.push(Slot {
                    feature,
                    parent,
                    presence,
                    children: Vec::new(),
                    values: Vec::new(),
                });
                group.slots.push(id);

                self.chain.push(feature);
                let children = self.expand(Some(id), model.effective_children(feature));
                self.chain.pop();
                self.slots[id.index()].children = children?;
            }
            groups.push(group);
        }
        Ok(groups)
    }

    /// Slots for `feature` under the current chain: its cardinality maximum,
    /// capped by the remaining scope of the feature and of every supertype.
    /// Enclosing slots of the same type use up scope, which also cuts off
    /// recursive containment.
    fn capacity(&self, feature: FeatureId) -> usize {
        let mut capacity = self
            .model
            .feature(feature)
            .cardinality()
            .max
            .unwrap_or(u32::MAX) as usize;
        for &ancestor in &self.model.effective(feature).lineage {
            let declared = self.model.feature(ancestor);
            let bound = self
                .scope
                .bound_for(declared.qualified_name(), declared.name()) as usize;
            let used = self
                .chain
                .iter()
                .filter(|&&enclosing| self.model.is_subtype(enclosing, ancestor))
                .count();
            capacity = capacity.min(bound.saturating_sub(used));
        }
        capacity
    }
}
