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

//! Inheritance flattening.

use super::errors::ModelError;
use super::feature::{Cardinality, Feature, FeatureId, Reference};

/// Effective definition of a feature after inheritance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Effective {
    // Supertypes root-most first, ending with the feature itself.
    pub(crate) lineage: Vec<FeatureId>,
    pub(crate) children: Vec<FeatureId>,
    pub(crate) reference: Option<Reference>,
    pub(crate) group: Option<Cardinality>,
    // Concrete features that are this feature or extend it, declaration order.
    pub(crate) subtypes: Vec<FeatureId>,
    // Indices into `Model::constraints`, supertype constraints first.
    pub(crate) constraints: Vec<usize>,
}

pub(crate) fn flatten(features: &[Feature]) -> Result<Vec<Effective>, ModelError> {
    let mut effective = Vec::with_capacity(features.len());
    for feature in features {
        let mut lineage = vec![feature.id];
        let mut current = feature.extends;
        while let Some(next) = current {
            lineage.push(next);
            current = features[next.index()].extends;
        }
        lineage.reverse();

        let mut children: Vec<FeatureId> = Vec::new();
        let mut reference = None;
        let mut group = None;
        for &ancestor in &lineage {
            let source = &features[ancestor.index()];
            for &child in &source.children {
                let name = &features[child.index()].name;
                if children
                    .iter()
                    .any(|&other| &features[other.index()].name == name)
                {
                    return Err(ModelError::DuplicateName {
                        name: format!("{}.{}", feature.qualified, name),
                    });
                }
                children.push(child);
            }
            if source.reference.is_some() {
                reference = source.reference;
            }
            if source.group.is_some() {
                group = source.group;
            }
        }

        effective.push(Effective {
            lineage,
            children,
            reference,
            group,
            subtypes: Vec::new(),
            constraints: Vec::new(),
        });
    }

    for feature in features.iter().filter(|f| !f.is_abstract) {
        let lineage = effective[feature.id.index()].lineage.clone();
        for ancestor in lineage {
            effective[ancestor.index()].subtypes.push(feature.id);
        }
    }
    Ok(effective)
}
