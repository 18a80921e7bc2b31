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

//! Scope Manager: finite bounds on occurrence counts and primitive domains.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compiler::Literals;
use crate::registry::Model;

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    /// Smallest value.
    pub low: i64,
    /// Largest value.
    pub high: i64,
}

impl IntRange {
    /// Number of values in the range (0 when inverted).
    pub fn len(&self) -> u64 {
        if self.low > self.high {
            0
        } else {
            self.high.abs_diff(self.low).saturating_add(1)
        }
    }

    /// Returns whether the range has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Finite search bounds for one solve request.
///
/// Every feature, abstract or concrete, is bounded: by its own override when
/// present, else by `default_bound`. The bound of an abstract feature limits
/// the total number of occurrences of all its concrete subtypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    /// Bound applied to every feature without an override.
    pub default_bound: u32,
    /// Per-feature bounds keyed by qualified or unique simple name.
    pub overrides: BTreeMap<String, u32>,
    /// Integer values available to `int` references.
    pub int_range: IntRange,
    /// Longest string literal admitted into the string domain.
    pub string_max_len: usize,
    /// Explicit string domain; replaces the literal-derived domain when set.
    pub string_alphabet: Option<Vec<String>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            default_bound: 1,
            overrides: BTreeMap::new(),
            int_range: IntRange { low: -8, high: 7 },
            string_max_len: 64,
            string_alphabet: None,
        }
    }
}

impl Scope {
    /// Default scope: bound 1 per feature, integers `-8..7`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the global default bound.
    pub fn with_default(mut self, bound: u32) -> Self {
        self.default_bound = bound;
        self
    }

    /// Overrides the bound of one feature.
    pub fn with_bound(mut self, feature: impl Into<String>, bound: u32) -> Self {
        self.overrides.insert(feature.into(), bound);
        self
    }

    /// Sets the integer range.
    pub fn with_int_range(mut self, low: i64, high: i64) -> Self {
        self.int_range = IntRange { low, high };
        self
    }

    /// Sets the maximum string length.
    pub fn with_string_max_len(mut self, len: usize) -> Self {
        self.string_max_len = len;
        self
    }

    /// Sets an explicit string alphabet.
    pub fn with_alphabet<I, S>(mut self, alphabet: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.string_alphabet = Some(alphabet.into_iter().map(Into::into).collect());
        self
    }

    /// Bound for a feature given its qualified and simple names.
    pub fn bound_for(&self, qualified: &str, simple: &str) -> u32 {
        self.overrides
            .get(qualified)
            .or_else(|| self.overrides.get(simple))
            .copied()
            .unwrap_or(self.default_bound)
    }

    /// Checks override names and ranges against a model.
    pub(crate) fn validate(&self, model: &Model) -> Result<(), String> {
        if self.int_range.is_empty() {
            return Err(format!(
                "integer range {}..{} is empty",
                self.int_range.low, self.int_range.high
            ));
        }
        for name in self.overrides.keys() {
            let known = model.lookup(name).is_some()
                || model.features().iter().any(|feature| feature.name() == name);
            if !known {
                return Err(format!("scope names unknown feature '{name}'"));
            }
        }
        Ok(())
    }

    /// Integer domain: the range plus every integer literal, ascending.
    pub(crate) fn int_domain(&self, literals: &Literals) -> Vec<i64> {
        let mut values: Vec<i64> = (self.int_range.low..=self.int_range.high).collect();
        values.extend(literals.ints.iter().copied());
        values.sort_unstable();
        values.dedup();
        values
    }

    /// String domain: the alphabet, else short enough literals, else `""`.
    pub(crate) fn string_domain(&self, literals: &Literals) -> Vec<String> {
        let mut values: Vec<String> = match &self.string_alphabet {
            Some(alphabet) => alphabet.clone(),
            None => literals
                .strings
                .iter()
                .filter(|s| s.chars().count() <= self.string_max_len)
                .cloned()
                .collect(),
        };
        values.sort();
        values.dedup();
        if values.is_empty() {
            values.push(String::new());
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literals(ints: &[i64], strings: &[&str]) -> Literals {
        Literals {
            ints: ints.iter().copied().collect(),
            strings: strings.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn own_override_wins_over_default() {
        let scope = Scope::new().with_default(2).with_bound("Cipher", 5);
        assert_eq!(scope.bound_for("Cipher", "Cipher"), 5);
        assert_eq!(scope.bound_for("Digest", "Digest"), 2);
    }

    #[test]
    fn qualified_override_beats_simple_override() {
        let scope = Scope::new().with_bound("Task.cipher", 3).with_bound("cipher", 1);
        assert_eq!(scope.bound_for("Task.cipher", "cipher"), 3);
        assert_eq!(scope.bound_for("Other.cipher", "cipher"), 1);
    }

    #[test]
    fn int_domain_includes_literals_outside_range() {
        let scope = Scope::new().with_int_range(0, 2);
        assert_eq!(scope.int_domain(&literals(&[1, 256], &[])), vec![0, 1, 2, 256]);
    }

    #[test]
    fn string_domain_filters_long_literals() {
        let scope = Scope::new().with_string_max_len(3);
        assert_eq!(
            scope.string_domain(&literals(&[], &["DES", "AES with 128bit key"])),
            vec!["DES".to_string()]
        );
    }

    #[test]
    fn string_domain_falls_back_to_empty_string() {
        assert_eq!(Scope::new().string_domain(&Literals::default()), vec![String::new()]);
    }

    #[test]
    fn alphabet_replaces_literal_domain() {
        let scope = Scope::new().with_alphabet(["b", "a"]);
        assert_eq!(
            scope.string_domain(&literals(&[], &["zzz"])),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn deserializes_from_toml_with_defaults() {
        let scope: Scope = toml::from_str(
            r#"
default_bound = 3
int_range = { low = 0, high = 300 }

[overrides]
Cipher = 4
"#,
        )
        .expect("scope parses");
        assert_eq!(scope.default_bound, 3);
        assert_eq!(scope.bound_for("Cipher", "Cipher"), 4);
        assert_eq!(scope.int_range, IntRange { low: 0, high: 300 });
        assert_eq!(scope.string_max_len, 64);
    }
}
