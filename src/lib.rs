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

//! Bounded feature-model instantiation engine.
//!
//! This crate provides:
//! - A build-then-freeze feature registry with inheritance, containment,
//!   cardinalities, group cardinalities and typed references.
//! - Constraint expressions over model paths, type-checked at finalize time.
//! - A finite [`Scope`] on occurrence counts and primitive domains.
//! - Exhaustive, duplicate-free instance enumeration through a CDCL SAT core,
//!   with minimal conflict reports for unsatisfiable requests.
//! - A declaration-list loader with line/column/caret diagnostics.
//!
//! # Pipeline
//!
//! 1. Declare features and constraints ([`ModelBuilder`] or [`load_str`]).
//! 2. [`ModelBuilder::finalize`] resolves names, flattens inheritance and
//!    compiles constraints into typed terms.
//! 3. [`Model::solve`] grounds the model into occurrence slots within the
//!    scope and encodes structure and constraints as clauses.
//! 4. [`Solutions`] yields validated [`Instance`] trees until the space is
//!    exhausted, a limit is hit, or the request proves unsatisfiable.
//!
//! ```no_run
//! use feature_model_solver::{Expr, Path, Query, load_str};
//!
//! let loaded = load_str(
//!     "abstract Cipher;\n\
//!      feature keySize in Cipher -> int;\n\
//!      feature Ciphers;\n\
//!      feature AES in Ciphers extends Cipher;\n\
//!      constraint AES: this.keySize.ref = 128;\n\
//!      feature Task;\n\
//!      feature cipher in Task -> Cipher;\n",
//! )?;
//! let query = Query::new().constrain(
//!     "Task",
//!     Expr::gt(Path::this().child("cipher").deref().child("keySize").deref(), Expr::int(100)),
//! );
//! let report = loaded.model.solve(&loaded.scope).with_query(query).run()?;
//! for instance in &report.instances {
//!     println!("{instance}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ast;
mod catalog;
mod compiler;
mod config;
mod diagnostics;
mod expr;
mod instance;
mod loader;
mod parser;
mod registry;
mod sat;
mod scope;
mod solver;

pub use ast::{
    ConstraintStmt, Document, FeatureStmt, ScopeStmt, SourceSpan, Span, Stmt, StmtKind,
};
pub use catalog::{CRYPTO_CATALOG, crypto_catalog};
pub use config::{ConfigError, EngineConfig, SolveOptions};
pub use diagnostics::SyntaxError;
pub use expr::{ArithOp, CompareOp, Expr, Literal, Path, PathBase, Primitive, Quantifier, Step};
pub use instance::{Instance, InstanceTree, Node, NodeId, TreeValue, Value};
pub use loader::{LoadError, LoadedModel, load_file, load_str, load_str_named};
pub use parser::{parse_document, parse_document_in_source};
pub use registry::{
    Cardinality, CardinalityKind, Feature, FeatureDecl, FeatureId, Model, ModelBuilder,
    ModelError, RefTarget, Reference, Target,
};
pub use scope::{IntRange, Scope};
pub use solver::{
    CancelToken, Conflict, ConflictItem, ConflictKind, Interruption, Outcome, Query, SolveError,
    SolveReport, SolveRequest, Solutions,
};

#[cfg(test)]
mod tests;
