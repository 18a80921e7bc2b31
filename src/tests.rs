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

//! Crate unit tests.

use super::*;
use std::collections::BTreeSet;

fn first_caret_column(pointer: &str) -> Option<usize> {
    pointer.chars().position(|ch| ch == '^').map(|idx| idx + 1)
}

fn assert_parse_error_case(case_name: &str, source: &str, expected_line: usize) {
    let err = parse_document(source).expect_err("parse should fail");
    assert_eq!(
        err.line, expected_line,
        "{case_name}: unexpected error line"
    );
    assert!(err.column > 0, "{case_name}: expected non-zero column");
    assert!(
        err.message.contains("Syntax error") || err.message.contains("Incomplete input"),
        "{case_name}: unexpected message '{}'",
        err.message
    );

    let expected_snippet = source
        .lines()
        .nth(err.line.saturating_sub(1))
        .unwrap_or_default();
    assert_eq!(
        err.snippet, expected_snippet,
        "{case_name}: snippet should match source line"
    );
    assert!(
        err.pointer.contains('^'),
        "{case_name}: missing caret pointer"
    );
    assert_eq!(
        first_caret_column(&err.pointer),
        Some(err.column),
        "{case_name}: caret column mismatch"
    );
}

fn model_error(source: &str) -> ModelError {
    match load_str(source) {
        Err(LoadError::Model(err)) => err,
        other => panic!("expected a model error, got {other:?}"),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn solve(source: &str) -> SolveReport {
    init_tracing();
    let loaded = load_str(source).expect("model loads");
    loaded.model.solve(&loaded.scope).run().expect("solve")
}

#[test]
fn reports_parse_errors_with_line_and_caret() {
    let cases = [
        ("unterminated cardinality", "feature A;\nfeature b in A [2..;\n", 2),
        ("scope without value", "feature A;\n\nscope default x;\n", 3),
        ("reserved feature name", "feature this;\n", 1),
        ("unterminated label", "feature A;\nconstraint A \"oops: true;\n", 2),
        ("dangling path step", "feature A;\nconstraint A: some this.;\n", 2),
    ];
    for (name, source, line) in cases {
        assert_parse_error_case(name, source, line);
    }
}

#[test]
fn reports_parse_error_for_unknown_statement() {
    let src = "feature A;\nfeatures B;\n";
    let err = parse_document(src).expect_err("parse should fail");
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 1);
    assert!(err.message.contains("Syntax error"));
    assert!(err.pointer.contains('^'));
}

#[test]
fn parses_every_statement_form() {
    let src = "// header\n\
               scope default 2;\n\
               scope int 0..3;\n\
               scope string 8;\n\
               scope string alphabet \"a\", \"b\";\n\
               abstract A group [0..2];\n\
               feature x in A [0..*] -> int [1..2];\n\
               feature B extends A;\n\
               scope B.x 3;\n\
               constraint B \"small\": all v: this.x | v.ref < 3;\n\
               constraint: #B = 1;\n";
    let doc = parse_document(src).expect("parses");
    assert_eq!(doc.statements.len(), 10);
    match &doc.statements[5].kind {
        StmtKind::Feature(stmt) => {
            assert_eq!(stmt.within.as_deref(), Some("A"));
            assert_eq!(stmt.card, Some(Cardinality::at_least(0)));
            assert_eq!(
                stmt.reference,
                Some((Target::Int, Some(Cardinality::new(1, 2))))
            );
        }
        other => panic!("expected a feature statement, got {other:?}"),
    }
    match &doc.statements[7].kind {
        StmtKind::Scope(ScopeStmt::Feature { name, bound }) => {
            assert_eq!(name, "B.x");
            assert_eq!(*bound, 3);
        }
        other => panic!("expected a feature scope, got {other:?}"),
    }
    match &doc.statements[9].kind {
        StmtKind::Constraint(stmt) => {
            assert_eq!(stmt.owner, None);
            assert_eq!(stmt.label, None);
        }
        other => panic!("expected a constraint, got {other:?}"),
    }
    assert_eq!(doc.statements[1].span.line, 3);
}

#[test]
fn reports_duplicate_names() {
    assert_eq!(
        model_error("feature A;\nfeature A;\n"),
        ModelError::DuplicateName { name: "A".into() }
    );
}

#[test]
fn reports_inherited_duplicate_children() {
    let err = model_error(
        "abstract X;\nfeature c in X;\nfeature Y extends X;\nfeature c in Y;\n",
    );
    assert_eq!(err, ModelError::DuplicateName { name: "Y.c".into() });
}

#[test]
fn reports_invalid_cardinalities_by_kind() {
    assert_eq!(
        model_error("feature A [3..1];\n"),
        ModelError::InvalidCardinality {
            feature: "A".into(),
            kind: CardinalityKind::Occurrence,
            min: 3,
            max: 1,
        }
    );
    assert!(matches!(
        model_error("feature A group [2..1];\n"),
        ModelError::InvalidCardinality {
            kind: CardinalityKind::Group,
            ..
        }
    ));
    assert!(matches!(
        model_error("feature A -> int [2..0];\n"),
        ModelError::InvalidCardinality {
            kind: CardinalityKind::Reference,
            ..
        }
    ));
}

#[test]
fn reports_cyclic_inheritance() {
    let err = model_error("abstract A extends B;\nabstract B extends A;\n");
    match &err {
        ModelError::CyclicInheritance { cycle } => {
            assert_eq!(cycle.first(), cycle.last());
            assert_eq!(cycle.len(), 3);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
    assert!(err.to_string().starts_with("cyclic inheritance: "));
}

#[test]
fn reports_unresolved_names() {
    assert_eq!(
        model_error("feature A extends Missing;\n"),
        ModelError::UnresolvedReference {
            name: "Missing".into(),
            context: "supertype of 'A'".into(),
        }
    );
    assert_eq!(
        model_error("feature a in Missing;\n"),
        ModelError::UnresolvedReference {
            name: "Missing".into(),
            context: "container of 'a'".into(),
        }
    );
    assert!(matches!(
        model_error("feature A;\nconstraint A: some this.missing;\n"),
        ModelError::UnresolvedReference { name, .. } if name == "missing"
    ));
    assert!(matches!(
        model_error("feature A;\nconstraint Nobody: true;\n"),
        ModelError::UnresolvedReference { context, .. } if context == "constraint owner"
    ));
}

#[test]
fn containment_cycles_do_not_resolve() {
    assert!(matches!(
        model_error("feature a in b;\nfeature b in a;\n"),
        ModelError::UnresolvedReference { .. }
    ));
}

#[test]
fn reports_type_mismatches() {
    let err = model_error("feature A -> string;\nconstraint A: this.ref < \"x\";\n");
    match &err {
        ModelError::TypeMismatch { message, .. } => {
            assert!(message.contains("ordering is only defined on integers"));
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }

    let err = model_error("feature A;\nconstraint: some this;\n");
    assert!(matches!(
        err,
        ModelError::TypeMismatch { ref message, .. } if message.contains("'this'")
    ));
}

#[test]
fn optional_children_enumerate_every_subset() {
    let report = solve("feature Root;\nfeature a in Root [0..1];\nfeature b in Root [0..1];\n");
    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.instances.len(), 4);
    let keys: BTreeSet<String> = report.instances.iter().map(Instance::canonical_key).collect();
    assert_eq!(keys.len(), 4);
}

#[test]
fn group_cardinality_selects_exactly_one() {
    let report = solve("feature Root group;\nfeature a in Root [0..1];\nfeature b in Root [0..1];\n");
    assert_eq!(report.instances.len(), 2);
    for instance in &report.instances {
        let tree = instance.tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].feature, "Root");
        assert_eq!(tree[0].children.len(), 1);
    }
}

#[test]
fn integer_arithmetic_ranges_over_the_scope() {
    let report = solve(
        "scope int 0..3;\n\
         feature Root;\n\
         feature x in Root -> int;\n\
         feature y in Root -> int;\n\
         constraint Root: this.x.ref + this.y.ref = 3;\n",
    );
    assert_eq!(report.outcome, Outcome::Exhausted);
    let pairs: BTreeSet<(i64, i64)> = report
        .instances
        .iter()
        .map(|instance| {
            let tree = instance.tree();
            let value = |idx: usize| match tree[0].children[idx].values.as_slice() {
                [TreeValue::Int(v)] => *v,
                other => panic!("expected one int, got {other:?}"),
            };
            (value(0), value(1))
        })
        .collect();
    assert_eq!(pairs, BTreeSet::from([(0, 3), (1, 2), (2, 1), (3, 0)]));
}

#[test]
fn counting_collapses_sibling_permutations() {
    let report = solve(
        "scope default 3;\n\
         feature Root;\n\
         feature b in Root [0..*];\n\
         constraint Root: #this.b = 2;\n",
    );
    assert_eq!(report.instances.len(), 1);
    let instance = &report.instances[0];
    assert_eq!(instance.find_all("b").len(), 2);
}

#[test]
fn parent_steps_reach_the_container() {
    let report = solve(
        "feature Root;\n\
         feature flag in Root [0..1];\n\
         feature c in Root [0..1];\n\
         constraint c: some this.parent.flag;\n",
    );
    // {}, {flag} and {flag, c}.
    assert_eq!(report.instances.len(), 3);
    for instance in &report.instances {
        if !instance.find_all("c").is_empty() {
            assert!(!instance.find_all("flag").is_empty());
        }
    }
}

#[test]
fn query_compile_errors_are_reported_before_search() {
    let loaded = load_str("feature A;\n").expect("model loads");
    let err = loaded
        .model
        .solve(&loaded.scope)
        .with_query(Query::new().constrain("Missing", Expr::bool(true)))
        .run()
        .expect_err("query should not compile");
    assert!(matches!(err, SolveError::Query(ModelError::UnresolvedReference { .. })));
}

#[test]
fn scope_overrides_must_name_features() {
    let loaded = load_str("feature A;\n").expect("model loads");
    let scope = Scope::new().with_bound("Nope", 2);
    let err = loaded.model.solve(&scope).run().expect_err("scope is invalid");
    assert!(matches!(err, SolveError::Scope(_)));
}

#[test]
fn diagnosis_can_be_disabled() {
    let loaded = load_str("feature A;\nconstraint A: false;\n").expect("model loads");
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_options(SolveOptions::default().with_diagnose(false))
        .run()
        .expect("solve");
    assert_eq!(report.outcome, Outcome::Unsat { conflict: None });
}

#[test]
fn unsatisfiable_constraints_are_named_in_the_conflict() {
    let loaded =
        load_str("feature A;\nconstraint A \"never\": false;\n").expect("model loads");
    let report = loaded.model.solve(&loaded.scope).run().expect("solve");
    let conflict = report.conflict().expect("diagnosed");
    assert!(conflict
        .items
        .iter()
        .any(|item| item.description.contains("never")));
}

#[test]
fn aliased_and_distinct_references_are_separate_instances() {
    let source = "scope default 2;\nfeature A [2..2];\nfeature x -> A;\nfeature y -> A;\n";
    let all = solve(source);
    assert_eq!(all.outcome, Outcome::Exhausted);
    assert_eq!(all.instances.len(), 2);

    let loaded = load_str(source).expect("model loads");
    let count = |expr: Expr| {
        loaded
            .model
            .solve(&loaded.scope)
            .with_query(Query::new().constrain_global(expr))
            .run()
            .expect("solve")
            .instances
            .len()
    };
    let same = count(Expr::eq(Path::name("x").deref(), Path::name("y").deref()));
    let different = count(Expr::ne(Path::name("x").deref(), Path::name("y").deref()));
    assert_eq!((same, different), (1, 1));
}

#[test]
fn min_selects_the_least_referenced_value() {
    let report = solve(
        "scope int 0..2;\n\
         feature Root;\n\
         feature a in Root -> int;\n\
         feature b in Root -> int;\n\
         feature low in Root -> int;\n\
         constraint Root: this.low.ref = min(this.a.ref ++ this.b.ref);\n",
    );
    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.instances.len(), 9);
    for instance in &report.instances {
        let tree = instance.tree();
        let value = |idx: usize| match tree[0].children[idx].values.as_slice() {
            [TreeValue::Int(v)] => *v,
            other => panic!("expected one int, got {other:?}"),
        };
        assert_eq!(value(2), value(0).min(value(1)));
    }
}

#[test]
fn min_rejects_occurrence_sets() {
    let err = model_error("feature A;\nfeature b in A [0..2];\nconstraint A: min(this.b) = 0;\n");
    assert!(matches!(
        err,
        ModelError::TypeMismatch { ref message, .. } if message.contains("min needs integers")
    ));
}

#[test]
fn limit_equal_to_the_instance_count_reports_exhaustion() {
    let source = "feature Root;\nfeature a in Root [0..1];\nfeature b in Root [0..1];\n";
    let loaded = load_str(source).expect("model loads");
    let run = |max: usize| {
        loaded
            .model
            .solve(&loaded.scope)
            .with_options(SolveOptions::default().with_max_instances(max))
            .run()
            .expect("solve")
    };
    let exact = run(4);
    assert_eq!(exact.instances.len(), 4);
    assert_eq!(exact.outcome, Outcome::Exhausted);
    let short = run(3);
    assert_eq!(short.instances.len(), 3);
    assert_eq!(short.outcome, Outcome::Limited);
}
