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

//! Clause generation.
//!
//! Hard clauses fix the shape of the slot tree (containment, symmetry
//! breaking, reference values only on present slots). Every other restriction
//! is a labeled clause group guarded by its own selector literal, so the
//! enumerator can switch all of them on through assumptions and the
//! diagnoser can switch them off one at a time.

use std::collections::HashMap;

use tracing::debug;

use super::circuit::Circuit;
use super::errors::SolveError;
use super::ground::{Ground, GroundValue, SlotGroup, SlotId};
use super::query::CompiledQuery;
use super::trace::{ConflictItem, ConflictKind};
use crate::compiler::Constraint;
use crate::registry::{Cardinality, FeatureId, Model};
use crate::sat::Lit;
use crate::scope::Scope;

/// Selector-guarded clause group.
#[derive(Debug, Clone)]
pub(crate) struct ClauseGroup {
    pub(crate) selector: Lit,
    pub(crate) item: ConflictItem,
}

/// Everything the enumerator needs: the circuit with all clauses, the
/// grounding it was built from and the selectors to assume.
pub(crate) struct Encoding {
    pub(crate) circuit: Circuit,
    pub(crate) ground: Ground,
    pub(crate) groups: Vec<ClauseGroup>,
    pub(crate) primary: Vec<Lit>,
}

impl Encoding {
    pub(crate) fn selectors(&self) -> Vec<Lit> {
        self.groups.iter().map(|group| group.selector).collect()
    }

    pub(crate) fn group_for(&self, selector: Lit) -> Option<&ClauseGroup> {
        self.groups.iter().find(|group| group.selector == selector)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Cardinality(FeatureId),
    Group(FeatureId),
    Reference(FeatureId),
    Scope(FeatureId),
    Constraint(usize),
    Query(usize),
}

pub(crate) fn encode(
    model: &Model,
    scope: &Scope,
    query: &CompiledQuery,
    max_slots: usize,
) -> Result<Encoding, SolveError> {
    let mut circuit = Circuit::new();
    let literals = model.literals.merged(&query.literals);
    let ground = Ground::build(model, scope, &literals, &mut circuit, max_slots)?;
    let primary = ground.primary_lits();

    let mut encoder = Encoder {
        model,
        ground: &ground,
        circuit,
        groups: Vec::new(),
        selectors: HashMap::new(),
    };
    encoder.structure();
    encoder.scope_bounds(scope);
    encoder.model_constraints();
    encoder.query_constraints(&query.constraints);

    let Encoder {
        circuit, groups, ..
    } = encoder;
    debug!(
        vars = circuit.sat_ref().num_vars(),
        clauses = circuit.sat_ref().num_clauses(),
        gates = circuit.gate_count(),
        groups = groups.len(),
        "encoded model"
    );
    Ok(Encoding {
        circuit,
        ground,
        groups,
        primary,
    })
}

pub(super) struct Encoder<'a> {
    pub(super) model: &'a Model,
    pub(super) ground: &'a Ground,
    pub(super) circuit: Circuit,
    groups: Vec<ClauseGroup>,
    selectors: HashMap<GroupKey, Lit>,
}

impl Encoder<'_> {
    fn qualified(&self, feature: FeatureId) -> String {
        self.model.feature(feature).qualified_name().to_string()
    }

    /// Adds `clause` to the group `key`, creating its selector on first use.
    fn soft(&mut self, key: GroupKey, clause: &[Lit], item: impl FnOnce(&Self) -> ConflictItem) {
        let selector = match self.selectors.get(&key) {
            Some(&selector) => selector,
            None => {
                let selector = self.circuit.input();
                let item = item(self);
                self.groups.push(ClauseGroup { selector, item });
                self.selectors.insert(key, selector);
                selector
            }
        };
        let mut guarded = clause.to_vec();
        guarded.push(!selector);
        self.circuit.require(&guarded);
    }

    /// `guard => holds`, skipped when trivially true.
    fn soft_implication(
        &mut self,
        key: GroupKey,
        guard: Option<Lit>,
        holds: Lit,
        item: impl FnOnce(&Self) -> ConflictItem,
    ) {
        if self.circuit.is_constant(holds, true) {
            return;
        }
        match guard {
            Some(guard) => self.soft(key, &[!guard, holds], item),
            None => self.soft(key, &[holds], item),
        }
    }

    fn presence(&self, slot: SlotId) -> Lit {
        self.ground.slot(slot).presence
    }

    fn structure(&mut self) {
        let ground = self.ground;
        for group in &ground.roots {
            self.occurrences(None, group);
        }
        for id in ground.ids() {
            let slot = ground.slot(id);
            if let Some(parent) = slot.parent {
                self.circuit.require(&[!slot.presence, ground.slot(parent).presence]);
            }
            for group in &slot.children {
                self.occurrences(Some(slot.presence), group);
            }
            self.group_cardinality(id);
            self.reference(id);
        }
    }

    /// Symmetry breaking and occurrence cardinality for one slot group.
    fn occurrences(&mut self, guard: Option<Lit>, group: &SlotGroup) {
        let presences: Vec<Lit> = group.slots.iter().map(|&s| self.presence(s)).collect();
        for pair in presences.windows(2) {
            self.circuit.require(&[!pair[1], pair[0]]);
        }
        let card = self.model.feature(group.feature).cardinality();
        let holds = self.within(&presences, card);
        let feature = group.feature;
        self.soft_implication(GroupKey::Cardinality(feature), guard, holds, |this| {
            let name = this.qualified(feature);
            ConflictItem {
                kind: ConflictKind::Cardinality,
                description: format!("cardinality {card} of '{name}'"),
                feature: Some(name),
            }
        });
    }

    fn group_cardinality(&mut self, id: SlotId) {
        let ground = self.ground;
        let slot = ground.slot(id);
        let Some(card) = self.model.effective_group(slot.feature) else {
            return;
        };
        let declaring = self.declaring(slot.feature, |model, f| {
            model.feature(f).group_cardinality().is_some()
        });
        let mut selected = Vec::with_capacity(slot.children.len());
        for group in &slot.children {
            let presences: Vec<Lit> = group.slots.iter().map(|&s| ground.slot(s).presence).collect();
            selected.push(self.circuit.or(presences));
        }
        let holds = self.within(&selected, card);
        self.soft_implication(GroupKey::Group(declaring), Some(slot.presence), holds, |this| {
            let name = this.qualified(declaring);
            ConflictItem {
                kind: ConflictKind::GroupCardinality,
                description: format!("group cardinality {card} of '{name}'"),
                feature: Some(name),
            }
        });
    }

    fn reference(&mut self, id: SlotId) {
        let ground = self.ground;
        let slot = ground.slot(id);
        let Some(reference) = self.model.effective_reference(slot.feature) else {
            return;
        };
        for (value, lit) in &slot.values {
            self.circuit.require(&[!*lit, slot.presence]);
            if let GroundValue::Slot(target) = value {
                self.circuit.require(&[!*lit, ground.slot(*target).presence]);
            }
        }
        let declaring = self.declaring(slot.feature, |model, f| {
            model.feature(f).reference().is_some()
        });
        let lits: Vec<Lit> = slot.values.iter().map(|(_, lit)| *lit).collect();
        let holds = self.within(&lits, reference.card);
        self.soft_implication(
            GroupKey::Reference(declaring),
            Some(slot.presence),
            holds,
            |this| {
                let name = this.qualified(declaring);
                ConflictItem {
                    kind: ConflictKind::ReferenceCardinality,
                    description: format!("reference cardinality {} of '{name}'", reference.card),
                    feature: Some(name),
                }
            },
        );
    }

    fn scope_bounds(&mut self, scope: &Scope) {
        let model = self.model;
        for feature in model.features() {
            let bound = scope.bound_for(feature.qualified_name(), feature.name()) as usize;
            let presences: Vec<Lit> = self
                .ground
                .slots_of(model, feature.id())
                .map(|s| self.presence(s))
                .collect();
            if presences.len() <= bound {
                continue;
            }
            let holds = self.circuit.at_most(bound, &presences);
            let id = feature.id();
            self.soft_implication(GroupKey::Scope(id), None, holds, |this| {
                let name = this.qualified(id);
                ConflictItem {
                    kind: ConflictKind::ScopeBound,
                    description: format!("scope bound {bound} of '{name}'"),
                    feature: Some(name),
                }
            });
        }
    }

    fn model_constraints(&mut self) {
        let model = self.model;
        let ground = self.ground;
        for id in ground.ids() {
            let feature = ground.slot(id).feature;
            for &index in &model.effective(feature).constraints {
                self.constraint(GroupKey::Constraint(index), &model.constraints[index], Some(id));
            }
        }
        for (index, constraint) in model.constraints.iter().enumerate() {
            if constraint.owner.is_none() {
                self.constraint(GroupKey::Constraint(index), constraint, None);
            }
        }
    }

    fn query_constraints(&mut self, constraints: &[Constraint]) {
        let model = self.model;
        let ground = self.ground;
        for (index, constraint) in constraints.iter().enumerate() {
            match constraint.owner {
                Some(owner) => {
                    for id in ground.slots_of(model, owner) {
                        self.constraint(GroupKey::Query(index), constraint, Some(id));
                    }
                }
                None => self.constraint(GroupKey::Query(index), constraint, None),
            }
        }
    }

    fn constraint(&mut self, key: GroupKey, constraint: &Constraint, this: Option<SlotId>) {
        let holds = self.condition(&constraint.term, this);
        let guard = this.map(|slot| self.presence(slot));
        let kind = match key {
            GroupKey::Query(_) => ConflictKind::QueryConstraint,
            _ => ConflictKind::Constraint,
        };
        self.soft_implication(key, guard, holds, |this| {
            let feature = constraint.owner.map(|owner| this.qualified(owner));
            let description = match &feature {
                Some(name) => format!("{kind} on '{name}': {}", constraint.label),
                None => format!("global {kind}: {}", constraint.label),
            };
            ConflictItem {
                kind,
                feature,
                description,
            }
        });
    }

    fn within(&mut self, lits: &[Lit], card: Cardinality) -> Lit {
        self.circuit
            .within(lits, card.min as usize, card.max.map(|max| max as usize))
    }

    /// Nearest feature in the lineage of `feature` that satisfies `declares`.
    fn declaring(&self, feature: FeatureId, declares: impl Fn(&Model, FeatureId) -> bool) -> FeatureId {
        self.model
            .effective(feature)
            .lineage
            .iter()
            .rev()
            .copied()
            .find(|&f| declares(self.model, f))
            .unwrap_or(feature)
    }
}
