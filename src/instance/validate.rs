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

//! Independent re-check of every instance invariant.

use super::{Instance, NodeId, Value, holds};
use crate::compiler::Constraint;
use crate::registry::{Model, RefTarget};
use crate::scope::Scope;

/// Returns a description of the first violated invariant.
pub(crate) fn validate(
    model: &Model,
    scope: &Scope,
    query: &[Constraint],
    instance: &Instance,
) -> Result<(), String> {
    check_forest(model, instance)?;
    check_top_level(model, instance)?;
    for (id, node) in instance.nodes() {
        check_children(model, instance, id)?;
        check_reference(model, instance, id)?;
        for &index in &model.effective(node.feature).constraints {
            let constraint = &model.constraints[index];
            if !holds(model, instance, &constraint.term, Some(id)) {
                return Err(format!(
                    "constraint '{}' fails on '{}'",
                    constraint.label,
                    instance.path(id)
                ));
            }
        }
    }
    check_scope(model, scope, instance)?;

    let globals = model.constraints.iter().filter(|c| c.owner.is_none());
    for constraint in globals.chain(query.iter().filter(|c| c.owner.is_none())) {
        if !holds(model, instance, &constraint.term, None) {
            return Err(format!("global constraint '{}' fails", constraint.label));
        }
    }
    for constraint in query {
        let Some(owner) = constraint.owner else {
            continue;
        };
        for (id, node) in instance.nodes() {
            if model.is_subtype(node.feature, owner)
                && !holds(model, instance, &constraint.term, Some(id))
            {
                return Err(format!(
                    "query constraint '{}' fails on '{}'",
                    constraint.label,
                    instance.path(id)
                ));
            }
        }
    }
    Ok(())
}

fn check_forest(model: &Model, instance: &Instance) -> Result<(), String> {
    for (id, node) in instance.nodes() {
        let feature = model.feature(node.feature);
        if feature.is_abstract() {
            return Err(format!("abstract feature '{}' was instantiated", node.qualified));
        }
        match (node.parent, feature.container()) {
            (None, None) => {}
            (Some(parent), Some(container)) => {
                if !model.is_subtype(instance.node(parent).feature, container) {
                    return Err(format!("'{}' sits in the wrong container", instance.path(id)));
                }
            }
            _ => return Err(format!("'{}' has a broken containment link", instance.path(id))),
        }
    }
    Ok(())
}

fn check_top_level(model: &Model, instance: &Instance) -> Result<(), String> {
    for &feature in model.top_level() {
        if model.feature(feature).is_abstract() {
            continue;
        }
        let count = instance
            .roots()
            .iter()
            .filter(|&&root| instance.node(root).feature == feature)
            .count();
        let card = model.feature(feature).cardinality();
        if !card.contains(count) {
            return Err(format!(
                "{count} top-level occurrences of '{}' outside {card}",
                model.feature(feature).qualified_name()
            ));
        }
    }
    Ok(())
}

fn check_children(model: &Model, instance: &Instance, id: NodeId) -> Result<(), String> {
    let node = instance.node(id);
    let mut distinct = 0;
    for &child in model.effective_children(node.feature) {
        let count = node
            .children
            .iter()
            .filter(|&&c| instance.node(c).feature == child)
            .count();
        if count > 0 {
            distinct += 1;
        }
        if model.feature(child).is_abstract() {
            continue;
        }
        let card = model.feature(child).cardinality();
        if !card.contains(count) {
            return Err(format!(
                "'{}' has {count} '{}' children outside {card}",
                instance.path(id),
                model.feature(child).name()
            ));
        }
    }
    if let Some(group) = model.effective_group(node.feature) {
        if !group.contains(distinct) {
            return Err(format!(
                "'{}' selects {distinct} child features outside group {group}",
                instance.path(id)
            ));
        }
    }
    Ok(())
}

fn check_reference(model: &Model, instance: &Instance, id: NodeId) -> Result<(), String> {
    let node = instance.node(id);
    let Some(reference) = model.effective_reference(node.feature) else {
        if node.values.is_empty() {
            return Ok(());
        }
        return Err(format!("'{}' holds values without a reference", instance.path(id)));
    };
    if !reference.card.contains(node.values.len()) {
        return Err(format!(
            "'{}' holds {} values outside {}",
            instance.path(id),
            node.values.len(),
            reference.card
        ));
    }
    for value in &node.values {
        let fits = match (value, reference.target) {
            (Value::Int(_), RefTarget::Int) | (Value::Str(_), RefTarget::Str) => true,
            (Value::Node(target), RefTarget::Feature(feature)) => {
                model.is_subtype(instance.node(*target).feature, feature)
            }
            _ => false,
        };
        if !fits {
            return Err(format!("'{}' holds a value of the wrong type", instance.path(id)));
        }
    }
    Ok(())
}

fn check_scope(model: &Model, scope: &Scope, instance: &Instance) -> Result<(), String> {
    for feature in model.features() {
        let count = instance
            .nodes()
            .filter(|(_, node)| model.is_subtype(node.feature, feature.id()))
            .count();
        let bound = scope.bound_for(feature.qualified_name(), feature.name()) as usize;
        if count > bound {
            return Err(format!(
                "{count} occurrences of '{}' exceed scope {bound}",
                feature.qualified_name()
            ));
        }
    }
    Ok(())
}
