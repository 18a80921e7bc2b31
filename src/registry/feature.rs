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

//! Frozen feature records and their cardinalities.

use std::fmt;

/// Dense index of a feature inside a frozen [`Model`](super::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub(crate) u32);

impl FeatureId {
    /// Position of the feature in declaration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Inclusive `[min, max]` bound; `max == None` means unbounded (`*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    /// Lower bound.
    pub min: u32,
    /// Upper bound, `None` for `*`.
    pub max: Option<u32>,
}

impl Cardinality {
    /// Bounded cardinality.
    pub const fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// `n..n`
    pub const fn exactly(n: u32) -> Self {
        Self::new(n, n)
    }

    /// `0..1`
    pub const fn optional() -> Self {
        Self::new(0, 1)
    }

    /// `min..*`
    pub const fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    /// `0..*`
    pub const fn many() -> Self {
        Self::at_least(0)
    }

    /// Returns whether `count` lies inside the bound.
    pub fn contains(&self, count: usize) -> bool {
        let count = count as u64;
        count >= u64::from(self.min) && self.max.map_or(true, |max| count <= u64::from(max))
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.max.map_or(true, |max| self.min <= max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::exactly(1)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// Resolved reference target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefTarget {
    /// Integer attribute.
    Int,
    /// String attribute.
    Str,
    /// Occurrences of a feature type (or any of its subtypes).
    Feature(FeatureId),
}

/// Resolved reference attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    /// What the reference points at.
    pub target: RefTarget,
    /// How many targets one occurrence holds (default `1..1`).
    pub card: Cardinality,
}

/// Frozen feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub(crate) id: FeatureId,
    pub(crate) name: String,
    pub(crate) qualified: String,
    pub(crate) is_abstract: bool,
    pub(crate) extends: Option<FeatureId>,
    pub(crate) container: Option<FeatureId>,
    pub(crate) card: Cardinality,
    pub(crate) group: Option<Cardinality>,
    pub(crate) reference: Option<Reference>,
    // Declared (not inherited) children, declaration order.
    pub(crate) children: Vec<FeatureId>,
}

impl Feature {
    /// Feature id.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Simple name, as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique dotted name (`Container.child`).
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    /// Abstract features never occur directly in an instance.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Direct supertype.
    pub fn extends(&self) -> Option<FeatureId> {
        self.extends
    }

    /// Containing feature, `None` at top level.
    pub fn container(&self) -> Option<FeatureId> {
        self.container
    }

    /// Occurrence cardinality per container occurrence.
    pub fn cardinality(&self) -> Cardinality {
        self.card
    }

    /// Declared group cardinality.
    pub fn group_cardinality(&self) -> Option<Cardinality> {
        self.group
    }

    /// Declared reference attribute.
    pub fn reference(&self) -> Option<Reference> {
        self.reference
    }

    /// Declared children.
    pub fn children(&self) -> &[FeatureId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_membership_handles_unbounded_max() {
        assert!(Cardinality::many().contains(1000));
        assert!(!Cardinality::at_least(2).contains(1));
        assert!(Cardinality::optional().contains(0));
        assert!(!Cardinality::optional().contains(2));
    }

    #[test]
    fn cardinality_renders_star() {
        assert_eq!(Cardinality::at_least(1).to_string(), "1..*");
        assert_eq!(Cardinality::exactly(3).to_string(), "3..3");
    }

    #[test]
    fn inverted_bounds_are_invalid() {
        assert!(!Cardinality::new(3, 1).is_valid());
        assert!(Cardinality::at_least(9).is_valid());
    }
}
