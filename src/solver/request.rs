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

//! Solve requests, lazy enumeration and reports.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::budget::{Budget, CancelToken, Interruption};
use super::diagnose::minimal_conflict;
use super::encode::{Encoding, encode};
use super::errors::SolveError;
use super::query::{CompiledQuery, Query};
use super::trace::Conflict;
use crate::config::SolveOptions;
use crate::instance::{self, Instance};
use crate::registry::Model;
use crate::sat::{Lit, SatOutcome};
use crate::scope::Scope;

/// How an enumeration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every instance within the scope was produced.
    Exhausted,
    /// No instance exists within the scope.
    Unsat {
        /// Minimal conflicting restrictions, when diagnosis was enabled.
        conflict: Option<Conflict>,
    },
    /// `max_instances` instances were yielded and at least one more exists.
    Limited,
    /// A budget or cancel token stopped the search.
    Interrupted(Interruption),
}

/// Collected result of [`SolveRequest::run`].
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Instances in enumeration order.
    pub instances: Vec<Instance>,
    /// Why enumeration stopped.
    pub outcome: Outcome,
}

impl SolveReport {
    /// Returns whether the request had no instance at all.
    pub fn is_unsat(&self) -> bool {
        matches!(self.outcome, Outcome::Unsat { .. })
    }

    /// Conflict explanation of an unsatisfiable request.
    pub fn conflict(&self) -> Option<&Conflict> {
        match &self.outcome {
            Outcome::Unsat { conflict } => conflict.as_ref(),
            _ => None,
        }
    }
}

/// One solve request: model, scope, optional query and limits.
///
/// The model and scope are only borrowed, so independent requests over the
/// same model can run on different threads.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    model: &'a Model,
    scope: &'a Scope,
    query: Query,
    options: SolveOptions,
    cancel: Option<CancelToken>,
}

impl<'a> SolveRequest<'a> {
    /// Request with no query and default options.
    pub fn new(model: &'a Model, scope: &'a Scope) -> Self {
        Self {
            model,
            scope,
            query: Query::new(),
            options: SolveOptions::default(),
            cancel: None,
        }
    }

    /// Adds query constraints.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Replaces the solve options.
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Compiles the query, grounds and encodes the model, and returns the
    /// lazy instance sequence.
    pub fn solutions(self) -> Result<Solutions<'a>, SolveError> {
        self.scope.validate(self.model).map_err(SolveError::Scope)?;
        let query = self.query.compile(self.model)?;
        let encoding = encode(self.model, self.scope, &query, self.options.max_slots)?;
        let assumptions = encoding.selectors();
        let budget = Budget::new(
            self.options.step_limit,
            self.options.time_limit_ms.map(Duration::from_millis),
            self.cancel,
        );
        Ok(Solutions {
            model: self.model,
            scope: self.scope,
            query,
            encoding,
            assumptions,
            budget,
            options: self.options,
            seen: HashSet::new(),
            yielded: 0,
            outcome: None,
            halted: false,
        })
    }

    /// Runs the enumeration to its end and collects everything.
    ///
    /// Budget interruptions end the report with [`Outcome::Interrupted`];
    /// other errors are returned.
    pub fn run(self) -> Result<SolveReport, SolveError> {
        let mut solutions = self.solutions()?;
        let mut instances = Vec::new();
        for item in solutions.by_ref() {
            match item {
                Ok(instance) => instances.push(instance),
                Err(SolveError::Timeout(_) | SolveError::Cancelled) => break,
                Err(err) => return Err(err),
            }
        }
        let outcome = solutions.outcome().cloned().unwrap_or(Outcome::Exhausted);
        Ok(SolveReport { instances, outcome })
    }
}

/// Lazy sequence of distinct, validated instances.
///
/// Ends after the last instance, or with one `Err` item when a budget runs
/// out; [`Solutions::outcome`] then tells why it ended.
pub struct Solutions<'a> {
    model: &'a Model,
    scope: &'a Scope,
    query: CompiledQuery,
    encoding: Encoding,
    assumptions: Vec<Lit>,
    budget: Budget,
    options: SolveOptions,
    seen: HashSet<String>,
    yielded: usize,
    outcome: Option<Outcome>,
    halted: bool,
}

impl Solutions<'_> {
    /// Why the sequence ended; `None` while it can still yield, and after an
    /// internal [`SolveError::ModelInconsistency`].
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Instances yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    fn finish(&mut self, outcome: Outcome) {
        let sat = self.encoding.circuit.sat_ref();
        info!(
            instances = self.yielded,
            steps = self.budget.steps(),
            conflicts = sat.conflicts(),
            decisions = sat.decisions(),
            outcome = ?outcome,
            "enumeration finished"
        );
        self.outcome = Some(outcome);
    }

    fn interrupted(&mut self, reason: Interruption) -> Option<Result<Instance, SolveError>> {
        warn!(%reason, instances = self.yielded, "enumeration interrupted");
        self.finish(Outcome::Interrupted(reason));
        Some(Err(SolveError::from(reason)))
    }

    // Internal failures leave the outcome unset.
    fn halt(&mut self, err: SolveError) -> Option<Result<Instance, SolveError>> {
        warn!(%err, instances = self.yielded, "enumeration halted");
        self.halted = true;
        Some(Err(err))
    }

    fn block_current(&mut self) {
        let sat = self.encoding.circuit.sat_ref();
        let clause: Vec<Lit> = self
            .encoding
            .primary
            .iter()
            .map(|&lit| if sat.model_value(lit) { !lit } else { lit })
            .collect();
        self.encoding.circuit.require(&clause);
    }

    fn decode_current(&self) -> Result<Instance, SolveError> {
        let instance = instance::decode(
            self.model,
            &self.encoding.ground,
            self.encoding.circuit.sat_ref(),
        )?;
        instance::validate(self.model, self.scope, &self.query.constraints, &instance)
            .map_err(SolveError::ModelInconsistency)?;
        Ok(instance)
    }
}

impl Iterator for Solutions<'_> {
    type Item = Result<Instance, SolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.outcome.is_some() || self.halted {
            return None;
        }
        loop {
            let outcome = self
                .encoding
                .circuit
                .sat()
                .solve(&self.assumptions, &mut self.budget);
            match outcome {
                SatOutcome::Sat => {
                    let decoded = self.decode_current();
                    self.block_current();
                    let instance = match decoded {
                        Ok(instance) => instance,
                        Err(err) => return self.halt(err),
                    };
                    if !self.seen.insert(instance.canonical_key()) {
                        debug!("skipping symmetric duplicate");
                        continue;
                    }
                    // One more distinct instance exists past the limit.
                    if self
                        .options
                        .max_instances
                        .is_some_and(|max| self.yielded >= max)
                    {
                        self.finish(Outcome::Limited);
                        return None;
                    }
                    self.yielded += 1;
                    debug!(index = self.yielded, nodes = instance.len(), "instance found");
                    return Some(Ok(instance));
                }
                SatOutcome::Unsat => {
                    if self.yielded > 0 {
                        self.finish(Outcome::Exhausted);
                        return None;
                    }
                    let conflict = if self.options.diagnose {
                        match minimal_conflict(&mut self.encoding, &mut self.budget) {
                            Ok(conflict) => Some(conflict),
                            Err(reason) => return self.interrupted(reason),
                        }
                    } else {
                        None
                    };
                    self.finish(Outcome::Unsat { conflict });
                    return None;
                }
                SatOutcome::Interrupted(reason) => return self.interrupted(reason),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;

    #[test]
    fn internal_failures_do_not_claim_exhaustion() {
        let loaded = load_str("feature A;\nfeature b in A [0..1];\n").expect("model loads");
        let mut solutions = loaded.model.solve(&loaded.scope).solutions().expect("encodes");
        let item = solutions.halt(SolveError::ModelInconsistency("slot without parent".into()));
        assert!(matches!(item, Some(Err(SolveError::ModelInconsistency(_)))));
        assert!(solutions.next().is_none());
        assert_eq!(solutions.outcome(), None);
        assert_eq!(solutions.yielded(), 0);
    }
}
