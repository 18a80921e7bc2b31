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

//! Symbolic evaluation of constraint terms over the slot tree.
//!
//! A term denotes, for every assignment, a set of slots or primitive values.
//! Symbolically a set is a map from each candidate member to the literal
//! under which it belongs to the set. Conditions become single literals.
//! The rules mirror `instance::eval` exactly.

use std::collections::BTreeMap;

use super::encode::Encoder;
use super::ground::{GroundValue, SlotId};
use crate::compiler::{Base, PathStep, PathTerm, Term};
use crate::expr::{CompareOp, Primitive, Quantifier};
use crate::sat::Lit;

enum Sym {
    Cond(Lit),
    Slots(BTreeMap<SlotId, Lit>),
    Values(BTreeMap<Primitive, Lit>),
}

struct Env {
    this: Option<SlotId>,
    locals: Vec<SlotId>,
}

impl Encoder<'_> {
    /// Literal that holds iff `term` is true with `this` bound to a present slot.
    pub(super) fn condition(&mut self, term: &Term, this: Option<SlotId>) -> Lit {
        let mut env = Env {
            this,
            locals: Vec::new(),
        };
        self.cond(term, &mut env)
    }

    fn cond(&mut self, term: &Term, env: &mut Env) -> Lit {
        match self.sym(term, env) {
            Sym::Cond(lit) => lit,
            Sym::Slots(members) => self.circuit.or(members.into_values()),
            Sym::Values(members) => self.circuit.or(members.into_values()),
        }
    }

    fn sym(&mut self, term: &Term, env: &mut Env) -> Sym {
        match term {
            Term::Const(value) => Sym::Cond(self.circuit.constant(*value)),
            Term::Value(value) => {
                let truth = self.circuit.constant(true);
                Sym::Values(BTreeMap::from([(value.clone(), truth)]))
            }
            Term::Path(path) => self.path(path, env),
            Term::Not(inner) => Sym::Cond(!self.cond(inner, env)),
            Term::And(items) => {
                let lits: Vec<Lit> = items.iter().map(|item| self.cond(item, env)).collect();
                Sym::Cond(self.circuit.and(lits))
            }
            Term::Or(items) => {
                let lits: Vec<Lit> = items.iter().map(|item| self.cond(item, env)).collect();
                Sym::Cond(self.circuit.or(lits))
            }
            Term::Implies(premise, conclusion) => {
                let premise = self.cond(premise, env);
                let conclusion = self.cond(conclusion, env);
                Sym::Cond(self.circuit.implies(premise, conclusion))
            }
            Term::CompareValues { op, left, right } => {
                let left = self.values(left, env);
                let right = self.values(right, env);
                Sym::Cond(self.compare_values(*op, &left, &right))
            }
            Term::CompareSets { equal, left, right } => {
                let left = self.slots(left, env);
                let right = self.slots(right, env);
                let mut keys: Vec<SlotId> = left.keys().chain(right.keys()).copied().collect();
                keys.sort_unstable();
                keys.dedup();
                let falsity = self.circuit.constant(false);
                let mut same = Vec::with_capacity(keys.len());
                for key in keys {
                    let l = left.get(&key).copied().unwrap_or(falsity);
                    let r = right.get(&key).copied().unwrap_or(falsity);
                    same.push(self.circuit.iff(l, r));
                }
                let equal_sets = self.circuit.and(same);
                Sym::Cond(if *equal { equal_sets } else { !equal_sets })
            }
            Term::Quantified {
                quantifier,
                binds,
                over,
                body,
            } => Sym::Cond(self.quantified(*quantifier, *binds, over, body.as_deref(), env)),
            Term::Count(inner) => {
                let members: Vec<Lit> = match self.sym(inner, env) {
                    Sym::Slots(members) => members.into_values().collect(),
                    Sym::Values(members) => members.into_values().collect(),
                    Sym::Cond(lit) => vec![lit],
                };
                let table = self.circuit.count_table(&members, members.len() + 1);
                let mut counts = BTreeMap::new();
                for size in 0..=members.len() {
                    let exact = self.circuit.and([table[size], !table[size + 1]]);
                    if !self.circuit.is_constant(exact, false) {
                        counts.insert(Primitive::Int(size as i64), exact);
                    }
                }
                Sym::Values(counts)
            }
            Term::Min(inner) => {
                // A member is the minimum iff no smaller member is present.
                let members = self.values(inner, env);
                let mut smaller: Vec<Lit> = Vec::with_capacity(members.len());
                let mut least = BTreeMap::new();
                for (value, member) in members {
                    let below = self.circuit.or(smaller.iter().copied());
                    let lit = self.circuit.and([member, !below]);
                    if !self.circuit.is_constant(lit, false) {
                        least.insert(value, lit);
                    }
                    smaller.push(member);
                }
                Sym::Values(least)
            }
            Term::Arith { op, left, right } => {
                let left = self.values(left, env);
                let right = self.values(right, env);
                let both_single = {
                    let l = self.singleton(&left);
                    let r = self.singleton(&right);
                    self.circuit.and([l, r])
                };
                let mut result = BTreeMap::new();
                for (a, la) in &left {
                    for (b, lb) in &right {
                        let (Primitive::Int(a), Primitive::Int(b)) = (a, b) else {
                            continue;
                        };
                        let Some(value) = op.apply(*a, *b) else {
                            continue;
                        };
                        let lit = self.circuit.and([*la, *lb, both_single]);
                        self.insert_or(&mut result, Primitive::Int(value), lit);
                    }
                }
                Sym::Values(result)
            }
            Term::Union(left, right) => match (self.sym(left, env), self.sym(right, env)) {
                (Sym::Slots(mut merged), Sym::Slots(other)) => {
                    for (slot, lit) in other {
                        self.insert_or(&mut merged, slot, lit);
                    }
                    Sym::Slots(merged)
                }
                (Sym::Values(mut merged), Sym::Values(other)) => {
                    for (value, lit) in other {
                        self.insert_or(&mut merged, value, lit);
                    }
                    Sym::Values(merged)
                }
                _ => Sym::Cond(self.circuit.constant(false)),
            },
        }
    }

    fn slots(&mut self, term: &Term, env: &mut Env) -> BTreeMap<SlotId, Lit> {
        match self.sym(term, env) {
            Sym::Slots(members) => members,
            _ => BTreeMap::new(),
        }
    }

    fn values(&mut self, term: &Term, env: &mut Env) -> BTreeMap<Primitive, Lit> {
        match self.sym(term, env) {
            Sym::Values(members) => members,
            _ => BTreeMap::new(),
        }
    }

    fn path(&mut self, path: &PathTerm, env: &Env) -> Sym {
        let ground = self.ground;
        let truth = self.circuit.constant(true);
        let mut current: BTreeMap<SlotId, Lit> = match path.base {
            Base::This => env.this.map(|slot| (slot, truth)).into_iter().collect(),
            Base::Local(depth) => BTreeMap::from([(env.locals[depth], truth)]),
            Base::Global(feature) => ground
                .slots_of(self.model, feature)
                .map(|slot| (slot, ground.slot(slot).presence))
                .collect(),
        };

        for step in &path.steps {
            let mut next = BTreeMap::new();
            match step {
                PathStep::Child(child) => {
                    for (&slot, &member) in &current {
                        for &target in ground.children_of(slot, *child) {
                            let lit = self.circuit.and([member, ground.slot(target).presence]);
                            self.insert_or(&mut next, target, lit);
                        }
                    }
                }
                PathStep::Parent => {
                    for (&slot, &member) in &current {
                        if let Some(parent) = ground.slot(slot).parent {
                            self.insert_or(&mut next, parent, member);
                        }
                    }
                }
                PathStep::Deref => {
                    let mut primitives = BTreeMap::new();
                    for (&slot, &member) in &current {
                        for (value, selected) in &ground.slot(slot).values {
                            let lit = self.circuit.and([member, *selected]);
                            match value {
                                GroundValue::Slot(target) => self.insert_or(&mut next, *target, lit),
                                GroundValue::Prim(value) => {
                                    self.insert_or(&mut primitives, value.clone(), lit)
                                }
                            }
                        }
                    }
                    // Primitive values end the path.
                    if !primitives.is_empty() {
                        return Sym::Values(primitives);
                    }
                }
            }
            current = next;
        }
        Sym::Slots(current)
    }

    fn quantified(
        &mut self,
        quantifier: Quantifier,
        binds: bool,
        over: &Term,
        body: Option<&Term>,
        env: &mut Env,
    ) -> Lit {
        let members: Vec<(Option<SlotId>, Lit)> = match self.sym(over, env) {
            Sym::Slots(members) => members.into_iter().map(|(s, l)| (Some(s), l)).collect(),
            Sym::Values(members) => members.into_values().map(|l| (None, l)).collect(),
            Sym::Cond(lit) => vec![(None, lit)],
        };
        let mut satisfying = Vec::with_capacity(members.len());
        let mut violating = Vec::with_capacity(members.len());
        for (slot, member) in members {
            let holds = match (body, slot) {
                (Some(body), Some(slot)) if binds => {
                    env.locals.push(slot);
                    let holds = self.cond(body, env);
                    env.locals.pop();
                    holds
                }
                (Some(body), _) => self.cond(body, env),
                (None, _) => self.circuit.constant(true),
            };
            satisfying.push(self.circuit.and([member, holds]));
            violating.push(self.circuit.and([member, !holds]));
        }
        match quantifier {
            Quantifier::Some => self.circuit.or(satisfying),
            Quantifier::No => !self.circuit.or(satisfying),
            Quantifier::All => !self.circuit.or(violating),
        }
    }

    fn compare_values(
        &mut self,
        op: CompareOp,
        left: &BTreeMap<Primitive, Lit>,
        right: &BTreeMap<Primitive, Lit>,
    ) -> Lit {
        // `!=` is the negation of `=`, not "some pair differs".
        if op == CompareOp::Ne {
            return !self.compare_values(CompareOp::Eq, left, right);
        }
        let left_single = self.singleton(left);
        let right_single = self.singleton(right);
        let mut pairs = Vec::new();
        for (a, la) in left {
            for (b, lb) in right {
                let related = match (a, b) {
                    (Primitive::Int(a), Primitive::Int(b)) => op.holds(a, b),
                    (Primitive::Str(a), Primitive::Str(b)) => op.holds(a, b),
                    _ => false,
                };
                if related {
                    pairs.push(self.circuit.and([*la, *lb]));
                }
            }
        }
        let some_pair = self.circuit.or(pairs);
        self.circuit.and([left_single, right_single, some_pair])
    }

    fn singleton(&mut self, members: &BTreeMap<Primitive, Lit>) -> Lit {
        let lits: Vec<Lit> = members.values().copied().collect();
        self.circuit.exactly(1, &lits)
    }

    fn insert_or<K: Ord>(&mut self, map: &mut BTreeMap<K, Lit>, key: K, lit: Lit) {
        if self.circuit.is_constant(lit, false) {
            return;
        }
        let merged = match map.get(&key) {
            Some(&existing) => self.circuit.or([existing, lit]),
            None => lit,
        };
        map.insert(key, merged);
    }
}
