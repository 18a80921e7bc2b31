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

//! Deletion-based minimal unsatisfiable subset over clause-group selectors.

use tracing::debug;

use super::budget::{Budget, Interruption};
use super::encode::Encoding;
use super::trace::Conflict;
use crate::sat::{Lit, SatOutcome};

/// Shrinks the failed assumptions of the last `Unsat` call to a subset in
/// which every selector is necessary.
pub(crate) fn minimal_conflict(
    encoding: &mut Encoding,
    budget: &mut Budget,
) -> Result<Conflict, Interruption> {
    let selectors = encoding.selectors();
    let failed = encoding.circuit.sat_ref().failed_assumptions().to_vec();
    let mut core = restrict(&selectors, &failed);
    debug!(initial = core.len(), groups = selectors.len(), "minimizing conflict");

    let mut idx = 0;
    while idx < core.len() {
        let candidate: Vec<Lit> = core
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != idx)
            .map(|(_, &lit)| lit)
            .collect();
        match encoding.circuit.sat().solve(&candidate, budget) {
            SatOutcome::Unsat => {
                // Items before `idx` stay necessary in any smaller core.
                let failed = encoding.circuit.sat_ref().failed_assumptions().to_vec();
                core = restrict(&candidate, &failed);
            }
            SatOutcome::Sat => idx += 1,
            SatOutcome::Interrupted(reason) => return Err(reason),
        }
    }

    let items = core
        .iter()
        .filter_map(|&selector| encoding.group_for(selector))
        .map(|group| group.item.clone())
        .collect();
    Ok(Conflict { items })
}

/// Members of `ordered` that also occur in `subset`, keeping `ordered`'s order.
fn restrict(ordered: &[Lit], subset: &[Lit]) -> Vec<Lit> {
    ordered
        .iter()
        .copied()
        .filter(|lit| subset.contains(lit))
        .collect()
}
