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

//! Canonical form of an instance up to the order of sibling occurrences.
//!
//! Colour refinement runs over containment and reference edges. When a colour
//! class stays ambiguous, each member is individualized in turn and the least
//! certificate over all branches is kept.

use super::{Instance, Value};

type Colours = Vec<u32>;

/// Certificate equal for two instances iff they are isomorphic.
pub(super) fn certificate(instance: &Instance) -> String {
    let graph = Graph::new(instance);
    let colours = graph.refine(graph.initial.clone());
    graph.search(colours)
}

struct Graph {
    labels: Vec<String>,
    initial: Colours,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    targets: Vec<Vec<usize>>,
    sources: Vec<Vec<usize>>,
}

impl Graph {
    fn new(instance: &Instance) -> Self {
        let len = instance.nodes.len();
        let mut labels = Vec::with_capacity(len);
        let mut parents = Vec::with_capacity(len);
        let mut children = Vec::with_capacity(len);
        let mut targets = Vec::with_capacity(len);
        let mut sources = vec![Vec::new(); len];
        for (idx, node) in instance.nodes.iter().enumerate() {
            let primitives: Vec<String> = node
                .values
                .iter()
                .filter_map(|value| match value {
                    Value::Int(v) => Some(v.to_string()),
                    Value::Str(v) => Some(format!("{v:?}")),
                    Value::Node(_) => None,
                })
                .collect();
            labels.push(format!("{}({})", node.qualified, primitives.join(",")));
            parents.push(node.parent.map(|p| p.index()));
            children.push(node.children.iter().map(|c| c.index()).collect::<Vec<_>>());
            let outgoing: Vec<usize> = node
                .values
                .iter()
                .filter_map(|value| match value {
                    Value::Node(target) => Some(target.index()),
                    _ => None,
                })
                .collect();
            for &target in &outgoing {
                sources[target].push(idx);
            }
            targets.push(outgoing);
        }
        let initial = rank(&labels);
        Self {
            labels,
            initial,
            parents,
            children,
            targets,
            sources,
        }
    }

    /// Splits colour classes by their neighbourhoods until nothing splits.
    fn refine(&self, mut colours: Colours) -> Colours {
        loop {
            let signatures: Vec<_> = (0..colours.len())
                .map(|node| {
                    (
                        colours[node],
                        self.parents[node].map(|p| colours[p]),
                        sorted_colours(&self.children[node], &colours),
                        sorted_colours(&self.targets[node], &colours),
                        sorted_colours(&self.sources[node], &colours),
                    )
                })
                .collect();
            let next = rank(&signatures);
            if class_count(&next) == class_count(&colours) {
                return next;
            }
            colours = next;
        }
    }

    fn search(&self, colours: Colours) -> String {
        let Some(cell) = self.first_ambiguous_class(&colours) else {
            return self.encode(&colours);
        };
        let members: Vec<usize> = (0..colours.len()).filter(|&n| colours[n] == cell).collect();
        let mut tried: Vec<usize> = Vec::new();
        let mut best: Option<String> = None;
        for &member in &members {
            if tried.iter().any(|&other| self.are_twins(other, member)) {
                continue;
            }
            tried.push(member);
            let individualized: Colours = colours
                .iter()
                .enumerate()
                .map(|(node, &colour)| 2 * colour + u32::from(node != member))
                .collect();
            let candidate = self.search(self.refine(individualized));
            if best.as_ref().map_or(true, |current| candidate < *current) {
                best = Some(candidate);
            }
        }
        best.unwrap_or_default()
    }

    fn first_ambiguous_class(&self, colours: &[u32]) -> Option<u32> {
        let mut sizes = vec![0usize; class_count(colours)];
        for &colour in colours {
            sizes[colour as usize] += 1;
        }
        sizes.iter().position(|&size| size > 1).map(|c| c as u32)
    }

    // Swapping two unreferenced leaf siblings with equal labels and targets
    // is an automorphism, so one of them stands for both.
    fn are_twins(&self, a: usize, b: usize) -> bool {
        let mut targets_a = self.targets[a].clone();
        let mut targets_b = self.targets[b].clone();
        targets_a.sort_unstable();
        targets_b.sort_unstable();
        self.parents[a] == self.parents[b]
            && self.labels[a] == self.labels[b]
            && self.children[a].is_empty()
            && self.children[b].is_empty()
            && self.sources[a].is_empty()
            && self.sources[b].is_empty()
            && targets_a == targets_b
    }

    /// Serializes a discrete colouring: one entry per colour, in colour order.
    fn encode(&self, colours: &[u32]) -> String {
        let mut order: Vec<usize> = (0..colours.len()).collect();
        order.sort_by_key(|&node| colours[node]);
        let entries: Vec<(&str, Option<u32>, Vec<u32>)> = order
            .into_iter()
            .map(|node| {
                (
                    self.labels[node].as_str(),
                    self.parents[node].map(|p| colours[p]),
                    sorted_colours(&self.targets[node], colours),
                )
            })
            .collect();
        format!("{entries:?}")
    }
}

fn sorted_colours(nodes: &[usize], colours: &[u32]) -> Vec<u32> {
    let mut out: Vec<u32> = nodes.iter().map(|&n| colours[n]).collect();
    out.sort_unstable();
    out
}

/// Dense ranks of `keys`; equal keys share a rank.
fn rank<T: Ord + Clone>(keys: &[T]) -> Colours {
    let mut sorted = keys.to_vec();
    sorted.sort();
    sorted.dedup();
    keys.iter()
        .map(|key| sorted.binary_search(key).unwrap_or_default() as u32)
        .collect()
}

fn class_count(colours: &[u32]) -> usize {
    colours.iter().max().map_or(0, |&max| max as usize + 1)
}
