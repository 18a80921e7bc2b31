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

//! Assignment to instance tree.

use std::collections::HashMap;

use super::{Instance, Node, NodeId, Value};
use crate::expr::Primitive;
use crate::registry::Model;
use crate::sat::SatSolver;
use crate::solver::SolveError;
use crate::solver::ground::{Ground, GroundValue, SlotId};

/// Builds the instance selected by the solver's current model.
pub(crate) fn decode(model: &Model, ground: &Ground, sat: &SatSolver) -> Result<Instance, SolveError> {
    let mut node_of: HashMap<SlotId, NodeId> = HashMap::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut roots = Vec::new();

    for id in ground.ids() {
        let slot = ground.slot(id);
        if !sat.model_value(slot.presence) {
            continue;
        }
        let parent = match slot.parent {
            Some(parent) => Some(*node_of.get(&parent).ok_or_else(|| {
                SolveError::ModelInconsistency(format!(
                    "occurrence of '{}' present without its container",
                    model.feature(slot.feature).qualified_name()
                ))
            })?),
            None => None,
        };
        let node_id = NodeId(nodes.len() as u32);
        let feature = model.feature(slot.feature);
        nodes.push(Node {
            feature: slot.feature,
            name: feature.name().to_string(),
            qualified: feature.qualified_name().to_string(),
            parent,
            children: Vec::new(),
            values: Vec::new(),
        });
        match parent {
            Some(parent) => nodes[parent.index()].children.push(node_id),
            None => roots.push(node_id),
        }
        node_of.insert(id, node_id);
    }

    for id in ground.ids() {
        let Some(&node_id) = node_of.get(&id) else {
            continue;
        };
        let mut values = Vec::new();
        for (value, lit) in &ground.slot(id).values {
            if !sat.model_value(*lit) {
                continue;
            }
            values.push(match value {
                GroundValue::Prim(Primitive::Int(v)) => Value::Int(*v),
                GroundValue::Prim(Primitive::Str(v)) => Value::Str(v.clone()),
                GroundValue::Slot(target) => match node_of.get(target) {
                    Some(&target) => Value::Node(target),
                    None => {
                        return Err(SolveError::ModelInconsistency(format!(
                            "'{}' references an absent occurrence",
                            nodes[node_id.index()].qualified
                        )));
                    }
                },
            });
        }
        nodes[node_id.index()].values = values;
    }

    Ok(Instance { nodes, roots })
}
