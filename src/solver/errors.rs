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

//! Error types surfaced by solve requests.

use thiserror::Error;

use super::budget::Interruption;
use crate::registry::ModelError;

/// Errors produced while preparing or running a solve request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// A query constraint failed to resolve or type-check.
    #[error("invalid query: {0}")]
    Query(#[from] ModelError),
    /// The scope does not fit the model.
    #[error("invalid scope: {0}")]
    Scope(String),
    /// Grounding would exceed a configured limit.
    #[error("resource exceeded: {resource} needs {requested}, limit is {limit}")]
    ResourceExceeded {
        /// What grew too large.
        resource: String,
        /// Requested amount.
        requested: usize,
        /// Configured limit.
        limit: usize,
    },
    /// The step or time budget ran out.
    #[error("search stopped: {0}")]
    Timeout(Interruption),
    /// A cancel token fired.
    #[error("search cancelled")]
    Cancelled,
    /// A decoded assignment violated a model invariant. Always an engine bug.
    #[error("internal model inconsistency: {0}")]
    ModelInconsistency(String),
}

impl From<Interruption> for SolveError {
    fn from(reason: Interruption) -> Self {
        match reason {
            Interruption::Cancelled => SolveError::Cancelled,
            other => SolveError::Timeout(other),
        }
    }
}

impl SolveError {
    /// Returns whether the request may succeed with larger limits.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            SolveError::Timeout(_) | SolveError::ResourceExceeded { .. }
        )
    }
}
