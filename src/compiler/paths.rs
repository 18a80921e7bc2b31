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

//! Path resolution: base lookup and typed step navigation.

use super::*;

impl LowerContext<'_> {
    /// Resolves a path into a term plus the type of the set it yields.
    pub(super) fn lower_path(&self, path: &Path) -> Result<(PathTerm, ValueType), ModelError> {
        let (base, mut ty) = match &path.base {
            PathBase::This => {
                let Some(owner) = self.owner else {
                    return Err(self.mismatch("'this' is not available in a global constraint"));
                };
                (Base::This, ValueType::Nodes(owner))
            }
            PathBase::Name(name) => {
                // Locals shadow feature names.
                if let Some((depth, feature)) = self.resolve_local(name) {
                    (Base::Local(depth), ValueType::Nodes(feature))
                } else if let Some(feature) = self.model.lookup(name) {
                    (Base::Global(feature), ValueType::Nodes(feature))
                } else {
                    return Err(self.unresolved(name, "path base"));
                }
            }
        };

        let mut steps = Vec::with_capacity(path.steps.len());
        for step in &path.steps {
            let ValueType::Nodes(current) = ty else {
                return Err(self.mismatch(format!(
                    "cannot navigate past a {} value in '{path}'",
                    self.describe(ty)
                )));
            };
            match step {
                Step::Child(name) => {
                    let Some(child) = self.model.effective_child_named(current, name) else {
                        return Err(
                            self.unresolved(name, format!("children of '{}'", self.qualified(current)))
                        );
                    };
                    steps.push(PathStep::Child(child));
                    ty = ValueType::Nodes(child);
                }
                Step::Deref => {
                    let Some(reference) = self.model.effective_reference(current) else {
                        return Err(self.mismatch(format!(
                            "'{}' has no reference to dereference",
                            self.qualified(current)
                        )));
                    };
                    steps.push(PathStep::Deref);
                    ty = match reference.target {
                        RefTarget::Int => ValueType::Int,
                        RefTarget::Str => ValueType::Str,
                        RefTarget::Feature(target) => ValueType::Nodes(target),
                    };
                }
                Step::Parent => {
                    let Some(container) = self.model.feature(current).container() else {
                        return Err(self.mismatch(format!(
                            "'{}' is top-level and has no parent",
                            self.qualified(current)
                        )));
                    };
                    steps.push(PathStep::Parent);
                    ty = ValueType::Nodes(container);
                }
            }
        }
        Ok((PathTerm { base, steps }, ty))
    }

    /// Closest common supertype of two features, if any.
    pub(super) fn common_supertype(&self, left: FeatureId, right: FeatureId) -> Option<FeatureId> {
        self.model
            .effective(left)
            .lineage
            .iter()
            .rev()
            .copied()
            .find(|&ancestor| self.model.is_subtype(right, ancestor))
    }
}
