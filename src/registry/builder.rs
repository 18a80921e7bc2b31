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

//! Declaration builder and `finalize` (resolve, validate, freeze).

use std::collections::BTreeMap;

use tracing::debug;

use super::errors::{CardinalityKind, ModelError};
use super::feature::{Cardinality, Feature, FeatureId, RefTarget, Reference};
use super::flatten::flatten;
use super::{Model, NameIndex};
use crate::compiler::{self, Literals};
use crate::expr::Expr;

/// Unresolved reference target, named by feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Integer attribute.
    Int,
    /// String attribute.
    Str,
    /// Occurrences of the named feature type.
    Feature(String),
}

/// One feature declaration. Names may refer to features declared later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDecl {
    pub(crate) name: String,
    pub(crate) is_abstract: bool,
    pub(crate) within: Option<String>,
    pub(crate) extends: Option<String>,
    pub(crate) card: Cardinality,
    pub(crate) group: Option<Cardinality>,
    pub(crate) reference: Option<(Target, Cardinality)>,
}

impl FeatureDecl {
    fn new(name: impl Into<String>, is_abstract: bool) -> Self {
        Self {
            name: name.into(),
            is_abstract,
            within: None,
            extends: None,
            card: Cardinality::default(),
            group: None,
            reference: None,
        }
    }

    /// Concrete feature with occurrence cardinality `1..1`.
    pub fn concrete(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// Abstract feature (a type only, never instantiated directly).
    pub fn abstract_feature(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// Nests the feature inside a container, named by qualified or unique simple name.
    pub fn within(mut self, container: impl Into<String>) -> Self {
        self.within = Some(container.into());
        self
    }

    /// Sets the supertype.
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.extends = Some(supertype.into());
        self
    }

    /// Sets the occurrence cardinality.
    pub fn card(mut self, card: Cardinality) -> Self {
        self.card = card;
        self
    }

    /// Sets the group cardinality over distinct child features.
    pub fn group(mut self, card: Cardinality) -> Self {
        self.group = Some(card);
        self
    }

    /// Adds a `1..1` reference attribute.
    pub fn reference(self, target: Target) -> Self {
        self.reference_with(target, Cardinality::default())
    }

    /// Adds a reference attribute with an explicit cardinality.
    pub fn reference_with(mut self, target: Target, card: Cardinality) -> Self {
        self.reference = Some((target, card));
        self
    }

    /// Declared simple name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConstraintDecl {
    pub(crate) owner: Option<String>,
    pub(crate) label: Option<String>,
    pub(crate) expr: Expr,
}

/// Collects declarations; [`ModelBuilder::finalize`] turns them into a [`Model`].
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    features: Vec<FeatureDecl>,
    constraints: Vec<ConstraintDecl>,
}

impl ModelBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature declaration.
    pub fn declare(&mut self, decl: FeatureDecl) -> &mut Self {
        self.features.push(decl);
        self
    }

    /// Attaches a constraint evaluated relative to each occurrence of `owner`.
    pub fn constrain(&mut self, owner: impl Into<String>, expr: Expr) -> &mut Self {
        self.constraints.push(ConstraintDecl {
            owner: Some(owner.into()),
            label: None,
            expr,
        });
        self
    }

    /// Like [`constrain`](Self::constrain), with a label used in conflict reports.
    pub fn constrain_labeled(
        &mut self,
        owner: impl Into<String>,
        label: impl Into<String>,
        expr: Expr,
    ) -> &mut Self {
        self.constraints.push(ConstraintDecl {
            owner: Some(owner.into()),
            label: Some(label.into()),
            expr,
        });
        self
    }

    /// Attaches a constraint with no `this`.
    pub fn constrain_global(&mut self, expr: Expr) -> &mut Self {
        self.constraints.push(ConstraintDecl {
            owner: None,
            label: None,
            expr,
        });
        self
    }

    /// Like [`constrain_global`](Self::constrain_global), with a label.
    pub fn constrain_global_labeled(&mut self, label: impl Into<String>, expr: Expr) -> &mut Self {
        self.constraints.push(ConstraintDecl {
            owner: None,
            label: Some(label.into()),
            expr,
        });
        self
    }

    /// Number of feature declarations so far.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Resolves every name, validates and freezes the model.
    pub fn finalize(self) -> Result<Model, ModelError> {
        debug!(
            features = self.features.len(),
            constraints = self.constraints.len(),
            "finalizing model"
        );
        for decl in &self.features {
            check_cardinalities(decl)?;
        }

        let (qualified, containers) = resolve_containers(&self.features)?;
        let names = NameIndex::new(
            self.features
                .iter()
                .zip(&qualified)
                .map(|(decl, qualified)| (decl.name.as_str(), qualified.as_str())),
        );

        let mut features = Vec::with_capacity(self.features.len());
        for (idx, decl) in self.features.iter().enumerate() {
            let qualified_name = &qualified[idx];
            let extends = match &decl.extends {
                Some(name) => Some(names.lookup(name).ok_or_else(|| {
                    ModelError::UnresolvedReference {
                        name: name.clone(),
                        context: format!("supertype of '{qualified_name}'"),
                    }
                })?),
                None => None,
            };
            let reference = match &decl.reference {
                Some((target, card)) => Some(Reference {
                    target: match target {
                        Target::Int => RefTarget::Int,
                        Target::Str => RefTarget::Str,
                        Target::Feature(name) => {
                            RefTarget::Feature(names.lookup(name).ok_or_else(|| {
                                ModelError::UnresolvedReference {
                                    name: name.clone(),
                                    context: format!("reference of '{qualified_name}'"),
                                }
                            })?)
                        }
                    },
                    card: *card,
                }),
                None => None,
            };
            features.push(Feature {
                id: FeatureId(idx as u32),
                name: decl.name.clone(),
                qualified: qualified_name.clone(),
                is_abstract: decl.is_abstract,
                extends,
                container: containers[idx].map(|c| FeatureId(c as u32)),
                card: decl.card,
                group: decl.group,
                reference,
                children: Vec::new(),
            });
        }

        let mut roots = Vec::new();
        for idx in 0..features.len() {
            let id = FeatureId(idx as u32);
            match features[idx].container {
                Some(container) => features[container.index()].children.push(id),
                None => roots.push(id),
            }
        }

        check_inheritance(&features)?;
        let effective = flatten(&features)?;

        let mut model = Model {
            features,
            names,
            effective,
            constraints: Vec::new(),
            roots,
            literals: Literals::default(),
        };

        let mut constraints = Vec::with_capacity(self.constraints.len());
        let mut literals = Literals::default();
        for decl in &self.constraints {
            constraints.push(compiler::compile_constraint(&model, decl, &mut literals)?);
        }
        model.attach_constraints(constraints);
        model.literals = literals;
        debug!(
            features = model.features.len(),
            constraints = model.constraints.len(),
            "model frozen"
        );
        Ok(model)
    }
}

fn check_cardinalities(decl: &FeatureDecl) -> Result<(), ModelError> {
    let mut checks = vec![(CardinalityKind::Occurrence, decl.card)];
    if let Some(group) = decl.group {
        checks.push((CardinalityKind::Group, group));
    }
    if let Some((_, card)) = &decl.reference {
        checks.push((CardinalityKind::Reference, *card));
    }
    for (kind, card) in checks {
        if !card.is_valid() {
            return Err(ModelError::InvalidCardinality {
                feature: decl.name.clone(),
                kind,
                min: card.min,
                max: card.max.unwrap_or(u32::MAX),
            });
        }
    }
    Ok(())
}

/// Computes qualified names by repeatedly resolving containers whose own
/// qualified name is already known. Anything left over (unknown names or
/// containment loops) is unresolved.
fn resolve_containers(
    decls: &[FeatureDecl],
) -> Result<(Vec<String>, Vec<Option<usize>>), ModelError> {
    let mut qualified: Vec<Option<String>> = vec![None; decls.len()];
    let mut containers: Vec<Option<usize>> = vec![None; decls.len()];
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut pending: Vec<usize> = (0..decls.len()).collect();

    loop {
        let mut still_pending = Vec::new();
        for &idx in &pending {
            let decl = &decls[idx];
            let name = match &decl.within {
                None => Some(decl.name.clone()),
                Some(within) => container_index(decls, &qualified, within).and_then(|c| {
                    qualified[c].as_ref().map(|parent| {
                        containers[idx] = Some(c);
                        format!("{parent}.{}", decl.name)
                    })
                }),
            };
            match name {
                Some(name) => {
                    if seen.insert(name.clone(), idx).is_some() {
                        return Err(ModelError::DuplicateName { name });
                    }
                    qualified[idx] = Some(name);
                }
                None => still_pending.push(idx),
            }
        }
        if still_pending.len() == pending.len() {
            break;
        }
        pending = still_pending;
    }

    if let Some(&idx) = pending.first() {
        let decl = &decls[idx];
        return Err(ModelError::UnresolvedReference {
            name: decl.within.clone().unwrap_or_default(),
            context: format!("container of '{}'", decl.name),
        });
    }
    Ok((qualified.into_iter().flatten().collect(), containers))
}

fn container_index(decls: &[FeatureDecl], qualified: &[Option<String>], name: &str) -> Option<usize> {
    if name.contains('.') {
        return qualified.iter().position(|q| q.as_deref() == Some(name));
    }
    let top_level: Vec<usize> = decls
        .iter()
        .enumerate()
        .filter(|(_, d)| d.name == name && d.within.is_none())
        .map(|(idx, _)| idx)
        .collect();
    if top_level.len() == 1 {
        return Some(top_level[0]);
    }
    let any: Vec<usize> = decls
        .iter()
        .enumerate()
        .filter(|(_, d)| d.name == name)
        .map(|(idx, _)| idx)
        .collect();
    (any.len() == 1).then(|| any[0])
}

fn check_inheritance(features: &[Feature]) -> Result<(), ModelError> {
    for start in features {
        let mut chain = vec![start.id];
        let mut current = start.extends;
        while let Some(next) = current {
            if next == start.id {
                chain.push(start.id);
                return Err(ModelError::CyclicInheritance {
                    cycle: chain
                        .iter()
                        .map(|id| features[id.index()].qualified.clone())
                        .collect(),
                });
            }
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = features[next.index()].extends;
        }
    }
    Ok(())
}
