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

//! Solver / Instance Finder.
//!
//! A request is processed in four stages: the query is compiled against the
//! frozen model, the model is grounded into a finite slot tree under the
//! scope, every restriction is encoded as clauses over a Tseitin circuit,
//! and a CDCL SAT core enumerates models which are decoded, re-validated and
//! blocked one by one.

pub(crate) mod budget;
mod circuit;
mod diagnose;
mod encode;
mod errors;
pub(crate) mod ground;
mod query;
mod request;
mod symbolic;
mod trace;

pub use budget::{CancelToken, Interruption};
pub use errors::SolveError;
pub use query::Query;
pub use request::{Outcome, SolveReport, SolveRequest, Solutions};
pub use trace::{Conflict, ConflictItem, ConflictKind};
