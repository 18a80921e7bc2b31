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

//! Declaration-list loader: parses source text and replays it against a
//! [`ModelBuilder`] and a [`Scope`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::ast::{FeatureStmt, ScopeStmt, SourceSpan, StmtKind};
use crate::diagnostics::SyntaxError;
use crate::parser::parse_document_in_source;
use crate::registry::{FeatureDecl, Model, ModelBuilder, ModelError};
use crate::scope::Scope;

/// Failure to load a declaration list.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Malformed source, or a scope statement naming an unknown feature.
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    /// Well-formed source describing an invalid model.
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
    /// The file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Frozen model plus the scope its `scope` statements describe.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    /// Finalized model.
    pub model: Model,
    /// Scope assembled from `scope` statements over [`Scope::default`].
    pub scope: Scope,
}

/// Loads a declaration list from inline source.
pub fn load_str(source: &str) -> Result<LoadedModel, LoadError> {
    load_str_named(source, "<inline>")
}

/// Loads a declaration list, tagging diagnostics with `source_name`.
pub fn load_str_named(source: &str, source_name: &str) -> Result<LoadedModel, LoadError> {
    let document = parse_document_in_source(source, source_name)?;
    debug!(
        source = source_name,
        statements = document.statements.len(),
        "parsed declaration list"
    );

    let mut builder = ModelBuilder::new();
    let mut scope = Scope::default();
    let mut scoped_names: Vec<(String, SourceSpan)> = Vec::new();
    for stmt in document.statements {
        match stmt.kind {
            StmtKind::Scope(ScopeStmt::Default(bound)) => scope.default_bound = bound,
            StmtKind::Scope(ScopeStmt::IntRange { low, high }) => {
                if low > high {
                    return Err(SyntaxError::located(
                        format!("empty integer range {low}..{high}"),
                        source_name,
                        source,
                        &stmt.span,
                    )
                    .into());
                }
                scope = scope.with_int_range(low, high);
            }
            StmtKind::Scope(ScopeStmt::StringLength(len)) => scope.string_max_len = len,
            StmtKind::Scope(ScopeStmt::Alphabet(alphabet)) => scope = scope.with_alphabet(alphabet),
            StmtKind::Scope(ScopeStmt::Feature { name, bound }) => {
                scope.overrides.insert(name.clone(), bound);
                scoped_names.push((name, stmt.span));
            }
            StmtKind::Feature(feature) => {
                builder.declare(feature_decl(feature));
            }
            StmtKind::Constraint(constraint) => match (constraint.owner, constraint.label) {
                (Some(owner), Some(label)) => {
                    builder.constrain_labeled(owner, label, constraint.expr);
                }
                (Some(owner), None) => {
                    builder.constrain(owner, constraint.expr);
                }
                (None, Some(label)) => {
                    builder.constrain_global_labeled(label, constraint.expr);
                }
                (None, None) => {
                    builder.constrain_global(constraint.expr);
                }
            },
        }
    }

    let model = builder.finalize()?;
    for (name, span) in &scoped_names {
        let known = model.lookup(name).is_some()
            || model.features().iter().any(|feature| feature.name() == name);
        if !known {
            return Err(SyntaxError::located(
                format!("scope names unknown feature '{name}'"),
                source_name,
                source,
                span,
            )
            .into());
        }
    }
    Ok(LoadedModel { model, scope })
}

/// Reads and loads a declaration-list file.
pub fn load_file(path: impl AsRef<Path>) -> Result<LoadedModel, LoadError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str_named(&source, &path.display().to_string())
}

fn feature_decl(stmt: FeatureStmt) -> FeatureDecl {
    let mut decl = if stmt.is_abstract {
        FeatureDecl::abstract_feature(stmt.name)
    } else {
        FeatureDecl::concrete(stmt.name)
    };
    if let Some(container) = stmt.within {
        decl = decl.within(container);
    }
    if let Some(supertype) = stmt.extends {
        decl = decl.extends(supertype);
    }
    if let Some(card) = stmt.card {
        decl = decl.card(card);
    }
    if let Some(group) = stmt.group {
        decl = decl.group(group);
    }
    match stmt.reference {
        Some((target, Some(card))) => decl.reference_with(target, card),
        Some((target, None)) => decl.reference(target),
        None => decl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Cardinality, RefTarget};

    #[test]
    fn builds_features_and_scope() {
        let loaded = load_str(
            "scope default 2; scope int 0..3; scope Item 4;\n\
             abstract Base;\n\
             feature Item extends Base [0..*] group;\n\
             feature tag in Item [0..2] -> string;\n\
             feature size in Base -> int [0..1];\n\
             constraint Item \"small\": this.size.ref < 3;\n",
        )
        .expect("load");
        assert_eq!(loaded.scope.default_bound, 2);
        assert_eq!(loaded.scope.int_range.high, 3);
        assert_eq!(loaded.scope.overrides.get("Item"), Some(&4));

        let item = loaded.model.lookup("Item").expect("Item");
        let item = loaded.model.feature(item);
        assert_eq!(item.cardinality(), Cardinality::many());
        assert_eq!(item.group_cardinality(), Some(Cardinality::exactly(1)));

        let size = loaded.model.lookup("Base.size").expect("size");
        let reference = loaded.model.feature(size).reference().expect("reference");
        assert_eq!(reference.target, RefTarget::Int);
        assert_eq!(reference.card, Cardinality::optional());
        assert_eq!(loaded.model.constraint_labels().collect::<Vec<_>>(), vec!["small"]);
    }

    #[test]
    fn rejects_empty_int_range_with_location() {
        let err = load_str("scope default 1;\nscope int 5..1;\n").expect_err("empty range");
        let LoadError::Syntax(err) = err else {
            panic!("expected syntax error, got {err:?}");
        };
        assert_eq!(err.message, "empty integer range 5..1");
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn rejects_scope_for_unknown_feature() {
        let err = load_str("feature A;\nscope B 3;\n").expect_err("unknown scope name");
        let LoadError::Syntax(err) = err else {
            panic!("expected syntax error, got {err:?}");
        };
        assert!(err.message.contains("'B'"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn surfaces_model_errors() {
        let err = load_str("feature A extends Missing;").expect_err("unresolved");
        assert!(matches!(
            err,
            LoadError::Model(ModelError::UnresolvedReference { .. })
        ));
    }
}
