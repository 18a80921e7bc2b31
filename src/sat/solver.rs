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

//! Conflict-driven clause learning.
//!
//! Two watched literals per clause, first-UIP learning with non-chronological
//! backjumping, and solving under assumptions with failed-assumption
//! extraction. Decisions always pick the lowest unassigned variable with the
//! positive phase first, so a given clause database and assumption list
//! always produce the same model.

use super::{Lit, Var};
use crate::solver::budget::{Budget, Interruption};

/// Result of one `solve` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SatOutcome {
    Sat,
    Unsat,
    Interrupted(Interruption),
}

type ClauseRef = usize;

fn lit_value(assigns: &[Option<bool>], lit: Lit) -> Option<bool> {
    assigns[lit.var().index()].map(|value| value == lit.is_positive())
}

/// Incremental SAT solver.
#[derive(Debug, Default)]
pub(crate) struct SatSolver {
    clauses: Vec<Vec<Lit>>,
    watches: Vec<Vec<ClauseRef>>,
    assigns: Vec<Option<bool>>,
    levels: Vec<usize>,
    reasons: Vec<Option<ClauseRef>>,
    seen: Vec<bool>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    qhead: usize,
    // Every variable below the cursor is assigned.
    cursor: usize,
    // False once the clause database is unsatisfiable without assumptions.
    ok: bool,
    model: Vec<bool>,
    failed: Vec<Lit>,
    conflicts: u64,
    decisions: u64,
}

impl SatSolver {
    pub(crate) fn new() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub(crate) fn new_var(&mut self) -> Var {
        let var = Var(self.assigns.len() as u32);
        self.assigns.push(None);
        self.levels.push(0);
        self.reasons.push(None);
        self.seen.push(false);
        self.model.push(false);
        self.watches.push(Vec::new());
        self.watches.push(Vec::new());
        var
    }

    pub(crate) fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    pub(crate) fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub(crate) fn conflicts(&self) -> u64 {
        self.conflicts
    }

    pub(crate) fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Value of a literal in the last model.
    pub(crate) fn model_value(&self, lit: Lit) -> bool {
        self.model[lit.var().index()] == lit.is_positive()
    }

    /// Assumptions responsible for the last `Unsat` (empty when the clause
    /// database itself is unsatisfiable).
    pub(crate) fn failed_assumptions(&self) -> &[Lit] {
        &self.failed
    }

    /// Adds a clause at decision level zero. Returns `false` once the
    /// database has become unsatisfiable.
    pub(crate) fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if !self.ok {
            return false;
        }
        self.cancel_until(0);
        let mut sorted = lits.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut kept = Vec::with_capacity(sorted.len());
        for (idx, &lit) in sorted.iter().enumerate() {
            if idx > 0 && sorted[idx - 1] == !lit {
                return true;
            }
            match lit_value(&self.assigns, lit) {
                Some(true) => return true,
                Some(false) => {}
                None => kept.push(lit),
            }
        }

        match kept.len() {
            0 => self.ok = false,
            1 => {
                self.enqueue(kept[0], None);
                if self.propagate().is_some() {
                    self.ok = false;
                }
            }
            _ => {
                self.attach(kept);
            }
        }
        self.ok
    }

    /// Searches for a model extending `assumptions`.
    pub(crate) fn solve(&mut self, assumptions: &[Lit], budget: &mut Budget) -> SatOutcome {
        self.failed.clear();
        if !self.ok {
            return SatOutcome::Unsat;
        }
        if let Err(reason) = budget.check_now() {
            return SatOutcome::Interrupted(reason);
        }
        self.cancel_until(0);

        let outcome = loop {
            if let Some(conflict) = self.propagate() {
                self.conflicts += 1;
                if let Err(reason) = budget.charge() {
                    break SatOutcome::Interrupted(reason);
                }
                if self.decision_level() == 0 {
                    self.ok = false;
                    break SatOutcome::Unsat;
                }
                let (learnt, backjump) = self.analyze(conflict);
                self.cancel_until(backjump);
                let asserting = learnt[0];
                if learnt.len() == 1 {
                    self.enqueue(asserting, None);
                } else {
                    let clause = self.attach(learnt);
                    self.enqueue(asserting, Some(clause));
                }
                continue;
            }

            let level = self.decision_level();
            if level < assumptions.len() {
                let assumption = assumptions[level];
                match lit_value(&self.assigns, assumption) {
                    Some(true) => self.trail_lim.push(self.trail.len()),
                    Some(false) => {
                        self.analyze_final(assumption);
                        break SatOutcome::Unsat;
                    }
                    None => {
                        self.trail_lim.push(self.trail.len());
                        self.enqueue(assumption, None);
                    }
                }
                continue;
            }

            match self.next_unassigned() {
                None => {
                    for (slot, value) in self.model.iter_mut().zip(&self.assigns) {
                        *slot = value.unwrap_or(false);
                    }
                    break SatOutcome::Sat;
                }
                Some(var) => {
                    self.decisions += 1;
                    if let Err(reason) = budget.charge() {
                        break SatOutcome::Interrupted(reason);
                    }
                    self.trail_lim.push(self.trail.len());
                    self.enqueue(var.positive(), None);
                }
            }
        };
        self.cancel_until(0);
        outcome
    }

    fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    fn attach(&mut self, lits: Vec<Lit>) -> ClauseRef {
        let clause = self.clauses.len();
        self.watches[lits[0].code()].push(clause);
        self.watches[lits[1].code()].push(clause);
        self.clauses.push(lits);
        clause
    }

    fn enqueue(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let var = lit.var().index();
        self.assigns[var] = Some(lit.is_positive());
        self.levels[var] = self.decision_level();
        self.reasons[var] = reason;
        self.trail.push(lit);
    }

    fn cancel_until(&mut self, level: usize) {
        if self.decision_level() <= level {
            return;
        }
        let limit = self.trail_lim[level];
        for &lit in &self.trail[limit..] {
            let var = lit.var().index();
            self.assigns[var] = None;
            self.reasons[var] = None;
            self.cursor = self.cursor.min(var);
        }
        self.trail.truncate(limit);
        self.trail_lim.truncate(level);
        self.qhead = limit;
    }

    fn next_unassigned(&mut self) -> Option<Var> {
        while self.cursor < self.assigns.len() {
            if self.assigns[self.cursor].is_none() {
                return Some(Var(self.cursor as u32));
            }
            self.cursor += 1;
        }
        None
    }

    /// Unit propagation; returns a falsified clause on conflict.
    fn propagate(&mut self) -> Option<ClauseRef> {
        let mut conflict = None;
        while self.qhead < self.trail.len() {
            let false_lit = !self.trail[self.qhead];
            self.qhead += 1;
            let mut watchers = std::mem::take(&mut self.watches[false_lit.code()]);
            let mut kept = 0;
            let mut idx = 0;
            while idx < watchers.len() {
                let clause_ref = watchers[idx];
                idx += 1;
                let lits = &mut self.clauses[clause_ref];
                if lits[0] == false_lit {
                    lits.swap(0, 1);
                }
                let first = lits[0];
                if lit_value(&self.assigns, first) == Some(true) {
                    watchers[kept] = clause_ref;
                    kept += 1;
                    continue;
                }

                let mut moved = false;
                for k in 2..lits.len() {
                    if lit_value(&self.assigns, lits[k]) != Some(false) {
                        lits.swap(1, k);
                        self.watches[lits[1].code()].push(clause_ref);
                        moved = true;
                        break;
                    }
                }
                if moved {
                    continue;
                }

                watchers[kept] = clause_ref;
                kept += 1;
                if lit_value(&self.assigns, first) == Some(false) {
                    conflict = Some(clause_ref);
                    while idx < watchers.len() {
                        watchers[kept] = watchers[idx];
                        kept += 1;
                        idx += 1;
                    }
                } else {
                    self.enqueue(first, Some(clause_ref));
                }
            }
            watchers.truncate(kept);
            self.watches[false_lit.code()] = watchers;
            if conflict.is_some() {
                self.qhead = self.trail.len();
                break;
            }
        }
        conflict
    }

    /// First-UIP conflict analysis. Returns the learnt clause (asserting
    /// literal first, highest remaining level second) and the backjump level.
    fn analyze(&mut self, conflict: ClauseRef) -> (Vec<Lit>, usize) {
        let current = self.decision_level();
        let mut learnt = vec![Lit(0)];
        let mut pending = 0usize;
        let mut resolved: Option<Lit> = None;
        let mut index = self.trail.len();
        let mut clause_ref = conflict;

        loop {
            for k in 0..self.clauses[clause_ref].len() {
                let lit = self.clauses[clause_ref][k];
                if Some(lit) == resolved {
                    continue;
                }
                let var = lit.var().index();
                if !self.seen[var] && self.levels[var] > 0 {
                    self.seen[var] = true;
                    if self.levels[var] >= current {
                        pending += 1;
                    } else {
                        learnt.push(lit);
                    }
                }
            }
            loop {
                index -= 1;
                if self.seen[self.trail[index].var().index()] {
                    break;
                }
            }
            let lit = self.trail[index];
            let var = lit.var().index();
            self.seen[var] = false;
            pending -= 1;
            resolved = Some(lit);
            if pending == 0 {
                break;
            }
            clause_ref = self.reasons[var].expect("implied literal on the conflict side has a reason");
        }
        learnt[0] = !resolved.expect("conflict analysis resolves at least one literal");

        let mut backjump = 0;
        if learnt.len() > 1 {
            let mut max_idx = 1;
            for k in 2..learnt.len() {
                if self.levels[learnt[k].var().index()] > self.levels[learnt[max_idx].var().index()] {
                    max_idx = k;
                }
            }
            learnt.swap(1, max_idx);
            backjump = self.levels[learnt[1].var().index()];
        }
        for lit in &learnt[1..] {
            self.seen[lit.var().index()] = false;
        }
        (learnt, backjump)
    }

    /// Collects the assumptions that imply `!failed`.
    fn analyze_final(&mut self, failed: Lit) {
        self.failed.clear();
        self.failed.push(failed);
        if self.decision_level() == 0 {
            return;
        }
        let root = failed.var().index();
        self.seen[root] = true;
        for idx in (self.trail_lim[0]..self.trail.len()).rev() {
            let lit = self.trail[idx];
            let var = lit.var().index();
            if !self.seen[var] {
                continue;
            }
            match self.reasons[var] {
                None => self.failed.push(lit),
                Some(clause_ref) => {
                    for k in 1..self.clauses[clause_ref].len() {
                        let reason_var = self.clauses[clause_ref][k].var().index();
                        if self.levels[reason_var] > 0 {
                            self.seen[reason_var] = true;
                        }
                    }
                }
            }
            self.seen[var] = false;
        }
        self.seen[root] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(solver: &mut SatSolver, count: usize) -> Vec<Lit> {
        (0..count).map(|_| solver.new_var().positive()).collect()
    }

    fn count_models(solver: &mut SatSolver, vars: &[Lit]) -> usize {
        let mut budget = Budget::unlimited();
        let mut models = 0;
        while solver.solve(&[], &mut budget) == SatOutcome::Sat {
            models += 1;
            let block: Vec<Lit> = vars
                .iter()
                .map(|&lit| if solver.model_value(lit) { !lit } else { lit })
                .collect();
            solver.add_clause(&block);
        }
        models
    }

    #[test]
    fn prefers_positive_phase_in_variable_order() {
        let mut solver = SatSolver::new();
        let x = lits(&mut solver, 3);
        solver.add_clause(&[!x[0], !x[1]]);
        assert_eq!(solver.solve(&[], &mut Budget::unlimited()), SatOutcome::Sat);
        assert!(solver.model_value(x[0]));
        assert!(!solver.model_value(x[1]));
        assert!(solver.model_value(x[2]));
    }

    #[test]
    fn enumerates_all_models_with_blocking_clauses() {
        let mut solver = SatSolver::new();
        let x = lits(&mut solver, 3);
        solver.add_clause(&[x[0], x[1], x[2]]);
        assert_eq!(count_models(&mut solver, &x), 7);
    }

    #[test]
    fn refutes_pigeonhole_three_into_two() {
        let mut solver = SatSolver::new();
        // p[i][h]: pigeon i sits in hole h
        let p: Vec<Vec<Lit>> = (0..3).map(|_| lits(&mut solver, 2)).collect();
        for pigeon in &p {
            solver.add_clause(pigeon);
        }
        for hole in 0..2 {
            for a in 0..3 {
                for b in (a + 1)..3 {
                    solver.add_clause(&[!p[a][hole], !p[b][hole]]);
                }
            }
        }
        assert_eq!(solver.solve(&[], &mut Budget::unlimited()), SatOutcome::Unsat);
        assert!(solver.failed_assumptions().is_empty());
    }

    #[test]
    fn reports_failed_assumptions() {
        let mut solver = SatSolver::new();
        let x = lits(&mut solver, 4);
        // x0 => x2, x1 => !x2; x3 is irrelevant
        solver.add_clause(&[!x[0], x[2]]);
        solver.add_clause(&[!x[1], !x[2]]);
        let outcome = solver.solve(&[x[3], x[0], x[1]], &mut Budget::unlimited());
        assert_eq!(outcome, SatOutcome::Unsat);
        let mut failed = solver.failed_assumptions().to_vec();
        failed.sort();
        assert_eq!(failed, vec![x[0], x[1]]);

        // The database itself stays satisfiable.
        assert_eq!(solver.solve(&[x[0]], &mut Budget::unlimited()), SatOutcome::Sat);
        assert!(!solver.model_value(x[1]));
    }

    #[test]
    fn step_limit_interrupts_search() {
        let mut solver = SatSolver::new();
        let x = lits(&mut solver, 8);
        solver.add_clause(&x);
        let mut budget = Budget::new(Some(2), None, None);
        assert!(matches!(
            solver.solve(&[], &mut budget),
            SatOutcome::Interrupted(Interruption::StepLimit { limit: 2 })
        ));
    }

    #[test]
    fn learns_through_long_implication_chains() {
        let mut solver = SatSolver::new();
        let x = lits(&mut solver, 6);
        // x0 forces a chain ending in a contradiction, so x0 must be false.
        for k in 0..4 {
            solver.add_clause(&[!x[k], x[k + 1]]);
        }
        solver.add_clause(&[!x[4], !x[0]]);
        assert_eq!(solver.solve(&[], &mut Budget::unlimited()), SatOutcome::Sat);
        assert!(!solver.model_value(x[0]));
        assert!(solver.model_value(x[5]));
    }
}
