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

//! Immutable, validated instance trees.

mod canonical;
mod decode;
mod eval;
mod validate;

use std::collections::BTreeSet;
use std::fmt;

use crate::registry::FeatureId;

pub(crate) use decode::decode;
pub(crate) use eval::holds;
pub(crate) use validate::validate;

/// Index of a node inside one [`Instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position in the instance arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Value held by a node's reference attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// Integer value.
    Int(i64),
    /// String value.
    Str(String),
    /// Another occurrence in the same instance.
    Node(NodeId),
}

/// One occurrence of a concrete feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) feature: FeatureId,
    pub(crate) name: String,
    pub(crate) qualified: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) values: Vec<Value>,
}

impl Node {
    /// Feature this node instantiates.
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    /// Simple feature name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified feature name.
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    /// Containing node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes, in slot order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Reference values, in domain order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The single reference value, if there is exactly one.
    pub fn value(&self) -> Option<&Value> {
        match self.values.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// Value in [`InstanceTree`] form, with occurrences named by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValue {
    /// Integer value.
    Int(i64),
    /// String value.
    Str(String),
    /// Path of the referenced occurrence, e.g. `Ciphers/AES128`.
    Occurrence(String),
}

/// Nested `{feature, values, children}` view of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTree {
    /// Qualified feature name.
    pub feature: String,
    /// Reference values.
    pub values: Vec<TreeValue>,
    /// Children in slot order.
    pub children: Vec<InstanceTree>,
}

/// One solution: a forest of feature occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<NodeId>,
}

impl Instance {
    /// Top-level nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All nodes with their ids, depth-first in slot order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the instance has no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes whose feature has this qualified name, or this simple name.
    pub fn find_all(&self, name: &str) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.qualified == name || node.name == name)
            .map(|(id, _)| id)
            .collect()
    }

    /// First child of `node` with the given simple name.
    pub fn child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.node(node)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).name == name)
    }

    /// Follows `node`'s single reference to another node.
    pub fn target(&self, node: NodeId) -> Option<NodeId> {
        match self.node(node).value() {
            Some(Value::Node(target)) => Some(*target),
            _ => None,
        }
    }

    /// Slash-separated path of simple names; repeated siblings get `#k`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            let siblings: Vec<NodeId> = match node.parent {
                Some(parent) => self.node(parent).children.clone(),
                None => self.roots.clone(),
            };
            let ordinal = siblings
                .iter()
                .filter(|&&s| self.node(s).feature == node.feature)
                .position(|&s| s == node_id)
                .unwrap_or(0);
            if ordinal == 0 {
                segments.push(node.name.clone());
            } else {
                segments.push(format!("{}#{ordinal}", node.name));
            }
            current = node.parent;
        }
        segments.reverse();
        segments.join("/")
    }

    /// Nested view of the whole instance.
    pub fn tree(&self) -> Vec<InstanceTree> {
        self.roots.iter().map(|&root| self.subtree(root)).collect()
    }

    fn subtree(&self, id: NodeId) -> InstanceTree {
        let node = self.node(id);
        InstanceTree {
            feature: node.qualified.clone(),
            values: node
                .values
                .iter()
                .map(|value| match value {
                    Value::Int(v) => TreeValue::Int(*v),
                    Value::Str(v) => TreeValue::Str(v.clone()),
                    Value::Node(target) => TreeValue::Occurrence(self.path(*target)),
                })
                .collect(),
            children: node.children.iter().map(|&c| self.subtree(c)).collect(),
        }
    }

    /// Key that is equal for two instances iff they are isomorphic: same
    /// features, values, containment and reference aliasing, whatever the
    /// order of sibling occurrences or the slots they came from.
    pub fn canonical_key(&self) -> String {
        canonical::certificate(self)
    }

    /// Human-readable name of the instance: the `name` attributes reachable
    /// through the references of its roots, joined with `+`. Roots that hold
    /// no reference (plain catalogs) are skipped unless every root is one.
    pub fn display_name(&self) -> String {
        let referencing: Vec<NodeId> = self
            .roots
            .iter()
            .copied()
            .filter(|&root| self.holds_reference(root))
            .collect();
        let roots = if referencing.is_empty() {
            self.roots.clone()
        } else {
            referencing
        };
        let mut visited = BTreeSet::new();
        let parts: Vec<String> = roots
            .into_iter()
            .map(|root| self.display_part(root, &mut visited))
            .filter(|part| !part.is_empty())
            .collect();
        parts.join("+")
    }

    /// Display name of one subtree.
    pub fn display_name_of(&self, node: NodeId) -> String {
        self.display_part(node, &mut BTreeSet::new())
    }

    fn holds_reference(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.values.iter().any(|value| matches!(value, Value::Node(_)))
            || node.children.iter().any(|&child| self.holds_reference(child))
    }

    fn display_part(&self, id: NodeId, visited: &mut BTreeSet<NodeId>) -> String {
        if !visited.insert(id) {
            return String::new();
        }
        let node = self.node(id);
        if node.name == "name" {
            if let Some(Value::Str(name)) = node.value() {
                return name.clone();
            }
        }
        let mut parts: Vec<String> = node
            .children
            .iter()
            .map(|&child| self.display_part(child, visited))
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            parts = node
                .values
                .iter()
                .filter_map(|value| match value {
                    Value::Node(target) => Some(self.display_part(*target, visited)),
                    _ => None,
                })
                .filter(|part| !part.is_empty())
                .collect();
        }
        parts.join("+")
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        write!(f, "{:indent$}{}", "", node.name, indent = depth * 2)?;
        for value in &node.values {
            match value {
                Value::Int(v) => write!(f, " = {v}")?,
                Value::Str(v) => write!(f, " = {v:?}")?,
                Value::Node(target) => write!(f, " -> {}", self.path(*target))?,
            }
        }
        writeln!(f)?;
        for &child in &node.children {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &root in &self.roots {
            self.fmt_node(f, root, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, parent: Option<u32>, children: &[u32], values: Vec<Value>) -> Node {
        Node {
            feature: FeatureId(0),
            name: name.to_string(),
            qualified: name.to_string(),
            parent: parent.map(NodeId),
            children: children.iter().copied().map(NodeId).collect(),
            values,
        }
    }

    fn sample(swap: bool) -> Instance {
        // Two `c` children under `r`, with different values; `swap` flips their order.
        let (first, second) = if swap { (2, 1) } else { (1, 2) };
        let mut nodes = vec![
            node("r", None, &[1, 2], vec![]),
            node("c", Some(0), &[], vec![Value::Int(first)]),
            node("c", Some(0), &[], vec![Value::Int(second)]),
        ];
        for (idx, n) in nodes.iter_mut().enumerate() {
            n.feature = FeatureId(if idx == 0 { 0 } else { 1 });
        }
        Instance {
            nodes,
            roots: vec![NodeId(0)],
        }
    }

    #[test]
    fn canonical_key_ignores_sibling_order() {
        assert_ne!(sample(false), sample(true));
        assert_eq!(sample(false).canonical_key(), sample(true).canonical_key());
    }

    #[test]
    fn paths_number_repeated_siblings() {
        let instance = sample(false);
        assert_eq!(instance.path(NodeId(1)), "r/c");
        assert_eq!(instance.path(NodeId(2)), "r/c#1");
    }

    #[test]
    fn display_name_follows_references_to_name_attributes() {
        let nodes = vec![
            node("Task", None, &[1], vec![]),
            node("cipher", Some(0), &[], vec![Value::Node(NodeId(2))]),
            node("AES", None, &[3, 4], vec![]),
            node("name", Some(2), &[], vec![Value::Str("AES-128".into())]),
            node("keySize", Some(2), &[], vec![Value::Int(128)]),
        ];
        let instance = Instance {
            nodes,
            roots: vec![NodeId(0)],
        };
        assert_eq!(instance.display_name(), "AES-128");
    }

    #[test]
    fn tree_reports_referenced_paths() {
        let mut nodes = vec![
            node("a", None, &[], vec![Value::Node(NodeId(1))]),
            node("b", None, &[], vec![Value::Str("x".into())]),
        ];
        nodes[1].feature = FeatureId(1);
        let instance = Instance {
            nodes,
            roots: vec![NodeId(0), NodeId(1)],
        };
        let tree = instance.tree();
        assert_eq!(tree[0].values, vec![TreeValue::Occurrence("b".into())]);
        assert_eq!(tree[1].values, vec![TreeValue::Str("x".into())]);
        assert_eq!(instance.to_string(), "a -> b\nb = \"x\"\n");
    }
}
