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

//! Step and wall-clock budgets plus cooperative cancellation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared cancellation flag; clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, not yet cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every search holding this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Why a search stopped before reaching a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// The step budget ran out.
    StepLimit {
        /// Configured limit.
        limit: u64,
    },
    /// The deadline passed.
    Deadline {
        /// Configured limit in milliseconds.
        limit_ms: u64,
    },
    /// A [`CancelToken`] fired.
    Cancelled,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interruption::StepLimit { limit } => write!(f, "step limit of {limit} reached"),
            Interruption::Deadline { limit_ms } => write!(f, "time limit of {limit_ms} ms reached"),
            Interruption::Cancelled => write!(f, "cancelled"),
        }
    }
}

// Clock and flag are polled once per this many steps.
const POLL_INTERVAL: u64 = 256;

/// Budget shared by every SAT call of one solve request.
#[derive(Debug)]
pub(crate) struct Budget {
    steps: u64,
    step_limit: Option<u64>,
    deadline: Option<(Instant, u64)>,
    cancel: Option<CancelToken>,
}

impl Budget {
    pub(crate) fn new(
        step_limit: Option<u64>,
        time_limit: Option<Duration>,
        cancel: Option<CancelToken>,
    ) -> Self {
        Self {
            steps: 0,
            step_limit,
            deadline: time_limit.map(|limit| (Instant::now() + limit, limit.as_millis() as u64)),
            cancel,
        }
    }

    #[cfg(test)]
    pub(crate) fn unlimited() -> Self {
        Self::new(None, None, None)
    }

    pub(crate) fn steps(&self) -> u64 {
        self.steps
    }

    /// Counts one conflict or decision.
    pub(crate) fn charge(&mut self) -> Result<(), Interruption> {
        self.steps += 1;
        if let Some(limit) = self.step_limit {
            if self.steps > limit {
                return Err(Interruption::StepLimit { limit });
            }
        }
        if self.steps % POLL_INTERVAL == 0 {
            self.check_now()?;
        }
        Ok(())
    }

    /// Checks cancellation and the deadline immediately.
    pub(crate) fn check_now(&self) -> Result<(), Interruption> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(Interruption::Cancelled);
        }
        if let Some((deadline, limit_ms)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Interruption::Deadline { limit_ms });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_limit_trips_after_limit() {
        let mut budget = Budget::new(Some(3), None, None);
        for _ in 0..3 {
            budget.charge().expect("within limit");
        }
        assert_eq!(budget.charge(), Err(Interruption::StepLimit { limit: 3 }));
    }

    #[test]
    fn cancellation_is_visible_through_clones() {
        let token = CancelToken::new();
        let budget = Budget::new(None, None, Some(token.clone()));
        assert!(budget.check_now().is_ok());
        token.cancel();
        assert_eq!(budget.check_now(), Err(Interruption::Cancelled));
    }

    #[test]
    fn zero_time_limit_expires_immediately() {
        let budget = Budget::new(None, Some(Duration::ZERO), None);
        assert_eq!(budget.check_now(), Err(Interruption::Deadline { limit_ms: 0 }));
    }
}
