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

//! Hash-consed AND/NOT circuit over the SAT core.
//!
//! Every gate is fully Tseitin-encoded, so a gate literal is equivalent to
//! the function it names and can be used positively or negatively. Constant
//! inputs are folded and structurally equal gates are shared.

use std::collections::HashMap;

use crate::sat::{Lit, SatSolver};

pub(crate) struct Circuit {
    sat: SatSolver,
    truth: Lit,
    gates: HashMap<Vec<Lit>, Lit>,
}

impl Circuit {
    pub(crate) fn new() -> Self {
        let mut sat = SatSolver::new();
        let truth = sat.new_var().positive();
        sat.add_clause(&[truth]);
        Self {
            sat,
            truth,
            gates: HashMap::new(),
        }
    }

    pub(crate) fn constant(&self, value: bool) -> Lit {
        if value { self.truth } else { !self.truth }
    }

    pub(crate) fn is_constant(&self, lit: Lit, value: bool) -> bool {
        lit == self.constant(value)
    }

    /// Unconstrained input variable.
    pub(crate) fn input(&mut self) -> Lit {
        self.sat.new_var().positive()
    }

    pub(crate) fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub(crate) fn sat(&mut self) -> &mut SatSolver {
        &mut self.sat
    }

    pub(crate) fn sat_ref(&self) -> &SatSolver {
        &self.sat
    }

    /// Adds `clause` as a hard clause.
    pub(crate) fn require(&mut self, clause: &[Lit]) {
        self.sat.add_clause(clause);
    }

    pub(crate) fn and(&mut self, inputs: impl IntoIterator<Item = Lit>) -> Lit {
        let mut lits = Vec::new();
        for lit in inputs {
            if lit == self.truth {
                continue;
            }
            if lit == !self.truth {
                return !self.truth;
            }
            lits.push(lit);
        }
        lits.sort_unstable();
        lits.dedup();
        if lits.windows(2).any(|pair| pair[1] == !pair[0]) {
            return !self.truth;
        }
        match lits.len() {
            0 => return self.truth,
            1 => return lits[0],
            _ => {}
        }
        if let Some(&gate) = self.gates.get(&lits) {
            return gate;
        }

        let gate = self.input();
        for &lit in &lits {
            self.sat.add_clause(&[!gate, lit]);
        }
        let mut clause: Vec<Lit> = lits.iter().map(|&lit| !lit).collect();
        clause.push(gate);
        self.sat.add_clause(&clause);
        self.gates.insert(lits, gate);
        gate
    }

    pub(crate) fn or(&mut self, inputs: impl IntoIterator<Item = Lit>) -> Lit {
        let negated: Vec<Lit> = inputs.into_iter().map(|lit| !lit).collect();
        !self.and(negated)
    }

    pub(crate) fn implies(&mut self, premise: Lit, conclusion: Lit) -> Lit {
        self.or([!premise, conclusion])
    }

    pub(crate) fn iff(&mut self, left: Lit, right: Lit) -> Lit {
        let forward = self.implies(left, right);
        let backward = self.implies(right, left);
        self.and([forward, backward])
    }

    /// `table[j]` holds iff at least `j` of `lits` hold, for `j` in `0..=limit`.
    pub(crate) fn count_table(&mut self, lits: &[Lit], limit: usize) -> Vec<Lit> {
        let mut table = vec![!self.truth; limit + 1];
        table[0] = self.truth;
        for &lit in lits {
            for j in (1..=limit).rev() {
                let carried = self.and([table[j - 1], lit]);
                table[j] = self.or([table[j], carried]);
            }
        }
        table
    }

    pub(crate) fn at_least(&mut self, k: usize, lits: &[Lit]) -> Lit {
        if k == 0 {
            return self.truth;
        }
        if k > lits.len() {
            return !self.truth;
        }
        self.count_table(lits, k)[k]
    }

    pub(crate) fn at_most(&mut self, k: usize, lits: &[Lit]) -> Lit {
        !self.at_least(k + 1, lits)
    }

    /// `min <= count(lits) <= max` (`max == None` is unbounded).
    pub(crate) fn within(&mut self, lits: &[Lit], min: usize, max: Option<usize>) -> Lit {
        let lower = self.at_least(min, lits);
        let upper = match max {
            Some(max) => self.at_most(max, lits),
            None => self.truth,
        };
        self.and([lower, upper])
    }

    pub(crate) fn exactly(&mut self, k: usize, lits: &[Lit]) -> Lit {
        self.within(lits, k, Some(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::SatOutcome;
    use crate::solver::budget::Budget;

    fn count_models(circuit: &mut Circuit, inputs: &[Lit], goal: Lit) -> usize {
        circuit.require(&[goal]);
        let mut budget = Budget::unlimited();
        let mut models = 0;
        while circuit.sat().solve(&[], &mut budget) == SatOutcome::Sat {
            models += 1;
            let block: Vec<Lit> = inputs
                .iter()
                .map(|&lit| if circuit.sat_ref().model_value(lit) { !lit } else { lit })
                .collect();
            circuit.require(&block);
        }
        models
    }

    #[test]
    fn folds_constants() {
        let mut circuit = Circuit::new();
        let x = circuit.input();
        let t = circuit.constant(true);
        assert_eq!(circuit.and([x, t]), x);
        let contradiction = circuit.and([x, !x]);
        assert!(circuit.is_constant(contradiction, false));
        let tautology = circuit.or([x, !x]);
        assert!(circuit.is_constant(tautology, true));
    }

    #[test]
    fn shares_structurally_equal_gates() {
        let mut circuit = Circuit::new();
        let x = circuit.input();
        let y = circuit.input();
        let first = circuit.and([x, y]);
        let second = circuit.and([y, x, y]);
        assert_eq!(first, second);
        assert_eq!(circuit.gate_count(), 1);
    }

    #[test]
    fn exactly_counts_binomially() {
        let mut circuit = Circuit::new();
        let inputs: Vec<Lit> = (0..5).map(|_| circuit.input()).collect();
        let goal = circuit.exactly(2, &inputs);
        assert_eq!(count_models(&mut circuit, &inputs, goal), 10);
    }

    #[test]
    fn at_most_zero_forbids_everything() {
        let mut circuit = Circuit::new();
        let inputs: Vec<Lit> = (0..3).map(|_| circuit.input()).collect();
        let goal = circuit.at_most(0, &inputs);
        assert_eq!(count_models(&mut circuit, &inputs, goal), 1);
    }

    #[test]
    fn iff_is_negatable() {
        let mut circuit = Circuit::new();
        let x = circuit.input();
        let y = circuit.input();
        let same = circuit.iff(x, y);
        assert_eq!(count_models(&mut circuit, &[x, y], !same), 2);
    }
}
