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

//! Direct evaluation of constraint terms on an instance.

use std::collections::BTreeSet;

use super::{Instance, NodeId, Value};
use crate::compiler::{Base, PathStep, PathTerm, Term};
use crate::expr::{CompareOp, Primitive, Quantifier};
use crate::registry::Model;

enum Val {
    Cond(bool),
    Nodes(BTreeSet<NodeId>),
    Values(BTreeSet<Primitive>),
}

struct Evaluator<'a> {
    model: &'a Model,
    instance: &'a Instance,
    this: Option<NodeId>,
    locals: Vec<NodeId>,
}

/// Evaluates `term` with `this` bound to `this`.
pub(crate) fn holds(model: &Model, instance: &Instance, term: &Term, this: Option<NodeId>) -> bool {
    let mut evaluator = Evaluator {
        model,
        instance,
        this,
        locals: Vec::new(),
    };
    evaluator.cond(term)
}

impl Evaluator<'_> {
    fn cond(&mut self, term: &Term) -> bool {
        match self.eval(term) {
            Val::Cond(value) => value,
            Val::Nodes(members) => !members.is_empty(),
            Val::Values(members) => !members.is_empty(),
        }
    }

    fn nodes(&mut self, term: &Term) -> BTreeSet<NodeId> {
        match self.eval(term) {
            Val::Nodes(members) => members,
            _ => BTreeSet::new(),
        }
    }

    fn values(&mut self, term: &Term) -> BTreeSet<Primitive> {
        match self.eval(term) {
            Val::Values(members) => members,
            _ => BTreeSet::new(),
        }
    }

    fn eval(&mut self, term: &Term) -> Val {
        match term {
            Term::Const(value) => Val::Cond(*value),
            Term::Value(value) => Val::Values(BTreeSet::from([value.clone()])),
            Term::Path(path) => self.path(path),
            Term::Not(inner) => Val::Cond(!self.cond(inner)),
            Term::And(items) => Val::Cond(items.iter().all(|item| self.cond(item))),
            Term::Or(items) => Val::Cond(items.iter().any(|item| self.cond(item))),
            Term::Implies(premise, conclusion) => {
                Val::Cond(!self.cond(premise) || self.cond(conclusion))
            }
            Term::CompareValues { op, left, right } => {
                let left = self.values(left);
                let right = self.values(right);
                Val::Cond(compare_values(*op, &left, &right))
            }
            Term::CompareSets { equal, left, right } => {
                let same = self.nodes(left) == self.nodes(right);
                Val::Cond(same == *equal)
            }
            Term::Quantified {
                quantifier,
                binds,
                over,
                body,
            } => {
                let members: Vec<Option<NodeId>> = match self.eval(over) {
                    Val::Nodes(members) => members.into_iter().map(Some).collect(),
                    Val::Values(members) => members.iter().map(|_| None).collect(),
                    Val::Cond(true) => vec![None],
                    Val::Cond(false) => Vec::new(),
                };
                let mut outcomes = Vec::with_capacity(members.len());
                for member in members {
                    let outcome = match (body.as_deref(), member) {
                        (Some(body), Some(node)) if *binds => {
                            self.locals.push(node);
                            let outcome = self.cond(body);
                            self.locals.pop();
                            outcome
                        }
                        (Some(body), _) => self.cond(body),
                        (None, _) => true,
                    };
                    outcomes.push(outcome);
                }
                Val::Cond(match quantifier {
                    Quantifier::Some => outcomes.iter().any(|&o| o),
                    Quantifier::All => outcomes.iter().all(|&o| o),
                    Quantifier::No => !outcomes.iter().any(|&o| o),
                })
            }
            Term::Count(inner) => {
                let size = match self.eval(inner) {
                    Val::Nodes(members) => members.len(),
                    Val::Values(members) => members.len(),
                    Val::Cond(value) => usize::from(value),
                };
                Val::Values(BTreeSet::from([Primitive::Int(size as i64)]))
            }
            Term::Min(inner) => {
                let least = self.values(inner).into_iter().next();
                Val::Values(least.into_iter().collect())
            }
            Term::Arith { op, left, right } => {
                let left = self.values(left);
                let right = self.values(right);
                let mut result = BTreeSet::new();
                if let (Some(Primitive::Int(a)), Some(Primitive::Int(b))) =
                    (single(&left), single(&right))
                {
                    if let Some(value) = op.apply(*a, *b) {
                        result.insert(Primitive::Int(value));
                    }
                }
                Val::Values(result)
            }
            Term::Union(left, right) => match (self.eval(left), self.eval(right)) {
                (Val::Nodes(mut a), Val::Nodes(b)) => {
                    a.extend(b);
                    Val::Nodes(a)
                }
                (Val::Values(mut a), Val::Values(b)) => {
                    a.extend(b);
                    Val::Values(a)
                }
                _ => Val::Cond(false),
            },
        }
    }

    fn path(&self, path: &PathTerm) -> Val {
        let instance = self.instance;
        let mut current: BTreeSet<NodeId> = match path.base {
            Base::This => self.this.into_iter().collect(),
            Base::Local(depth) => BTreeSet::from([self.locals[depth]]),
            Base::Global(feature) => instance
                .nodes()
                .filter(|(_, node)| self.model.is_subtype(node.feature, feature))
                .map(|(id, _)| id)
                .collect(),
        };
        for step in &path.steps {
            let mut next = BTreeSet::new();
            match step {
                PathStep::Child(child) => {
                    for &node in &current {
                        next.extend(
                            instance
                                .node(node)
                                .children
                                .iter()
                                .copied()
                                .filter(|&c| instance.node(c).feature == *child),
                        );
                    }
                }
                PathStep::Parent => {
                    next.extend(current.iter().filter_map(|&node| instance.node(node).parent));
                }
                PathStep::Deref => {
                    let mut primitives = BTreeSet::new();
                    for &node in &current {
                        for value in &instance.node(node).values {
                            match value {
                                Value::Node(target) => {
                                    next.insert(*target);
                                }
                                Value::Int(v) => {
                                    primitives.insert(Primitive::Int(*v));
                                }
                                Value::Str(v) => {
                                    primitives.insert(Primitive::Str(v.clone()));
                                }
                            }
                        }
                    }
                    if !primitives.is_empty() {
                        return Val::Values(primitives);
                    }
                }
            }
            current = next;
        }
        Val::Nodes(current)
    }
}

fn single(set: &BTreeSet<Primitive>) -> Option<&Primitive> {
    if set.len() == 1 { set.iter().next() } else { None }
}

fn compare_values(op: CompareOp, left: &BTreeSet<Primitive>, right: &BTreeSet<Primitive>) -> bool {
    if op == CompareOp::Ne {
        return !compare_values(CompareOp::Eq, left, right);
    }
    match (single(left), single(right)) {
        (Some(Primitive::Int(a)), Some(Primitive::Int(b))) => op.holds(a, b),
        (Some(Primitive::Str(a)), Some(Primitive::Str(b))) => op.holds(a, b),
        _ => false,
    }
}
