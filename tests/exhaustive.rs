//! Scope-bounded exhaustiveness against brute-force enumerations.

use std::collections::BTreeSet;

use feature_model_solver::{
    Cardinality, Expr, FeatureDecl, Instance, ModelBuilder, Outcome, Path, Scope, Target, Value,
};
use proptest::prelude::*;

const BOUND: u32 = 2;

#[derive(Debug, Clone)]
struct Scenario {
    cards: Vec<Cardinality>,
    group: Option<(u32, u32)>,
    implication: Option<(usize, usize)>,
}

fn card_strategy() -> impl Strategy<Value = Cardinality> {
    (0u32..=2, proptest::option::of(0u32..=3)).prop_map(|(min, extra)| match extra {
        Some(extra) => Cardinality::new(min, min + extra),
        None => Cardinality::at_least(min),
    })
}

fn scenario_strategy() -> impl Strategy<Value = Scenario> {
    proptest::collection::vec(card_strategy(), 1..=3)
        .prop_flat_map(|cards| {
            let n = cards.len();
            let group = proptest::option::of(
                (0..=n as u32).prop_flat_map(move |lo| (Just(lo), lo..=n as u32)),
            );
            let implication = proptest::option::of((0..n, 0..n));
            (Just(cards), group, implication)
        })
        .prop_map(|(cards, group, implication)| Scenario {
            cards,
            group,
            implication,
        })
}

fn child(idx: usize) -> String {
    format!("f{idx}")
}

/// Every admissible child-count vector; leaves are interchangeable, so each
/// vector is exactly one instance.
fn brute_force(scenario: &Scenario) -> BTreeSet<Vec<usize>> {
    let ranges: Vec<(usize, usize)> = scenario
        .cards
        .iter()
        .map(|card| {
            let high = card.max.unwrap_or(BOUND).min(BOUND);
            (card.min as usize, high as usize)
        })
        .collect();
    let mut vectors = vec![Vec::new()];
    for &(low, high) in &ranges {
        let mut next = Vec::new();
        for prefix in &vectors {
            for count in low..=high {
                let mut extended: Vec<usize> = prefix.clone();
                extended.push(count);
                next.push(extended);
            }
        }
        vectors = next;
    }
    vectors
        .into_iter()
        .filter(|counts| {
            let selected = counts.iter().filter(|&&count| count > 0).count() as u32;
            let group_ok = scenario
                .group
                .map_or(true, |(low, high)| low <= selected && selected <= high);
            let implication_ok = scenario
                .implication
                .map_or(true, |(premise, conclusion)| {
                    counts[premise] == 0 || counts[conclusion] > 0
                });
            group_ok && implication_ok
        })
        .collect()
}

fn build(scenario: &Scenario) -> feature_model_solver::Model {
    let mut builder = ModelBuilder::new();
    let mut root = FeatureDecl::concrete("Root");
    if let Some((low, high)) = scenario.group {
        root = root.group(Cardinality::new(low, high));
    }
    builder.declare(root);
    for (idx, card) in scenario.cards.iter().enumerate() {
        builder.declare(FeatureDecl::concrete(child(idx)).within("Root").card(*card));
    }
    if let Some((premise, conclusion)) = scenario.implication {
        builder.constrain(
            "Root",
            Expr::implies(
                Expr::some(Path::this().child(child(premise))),
                Expr::some(Path::this().child(child(conclusion))),
            ),
        );
    }
    builder.finalize().expect("generated model is valid")
}

/// Relation required between the `x` and `y` references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aliasing {
    Free,
    Same,
    Different,
}

#[derive(Debug, Clone)]
struct RefScenario {
    targets: (u32, u32),
    y_optional: bool,
    aliasing: Aliasing,
}

fn ref_scenario_strategy() -> impl Strategy<Value = RefScenario> {
    (
        0u32..=2,
        0u32..=2,
        any::<bool>(),
        prop_oneof![
            Just(Aliasing::Free),
            Just(Aliasing::Same),
            Just(Aliasing::Different)
        ],
    )
        .prop_map(|(min, extra, y_optional, aliasing)| RefScenario {
            targets: (min, min + extra),
            y_optional,
            aliasing,
        })
}

/// Isomorphism class of a `Root{x -> A, y? -> A, v -> int}` instance:
/// number of `A`, whether `y` exists and shares `x`'s target, and `v`.
type RefClass = (usize, Option<bool>, i64);

fn ref_brute_force(scenario: &RefScenario) -> BTreeSet<RefClass> {
    let (low, high) = scenario.targets;
    let mut classes = BTreeSet::new();
    for count in low as usize..=high.min(BOUND) as usize {
        for x in 0..count {
            let ys: Vec<Option<usize>> = if scenario.y_optional {
                std::iter::once(None).chain((0..count).map(Some)).collect()
            } else {
                (0..count).map(Some).collect()
            };
            for y in ys {
                let same = y.map(|y| y == x);
                let admissible = match scenario.aliasing {
                    Aliasing::Free => true,
                    Aliasing::Same => same == Some(true),
                    Aliasing::Different => same != Some(true),
                };
                if admissible {
                    for v in 0..=1 {
                        classes.insert((count, same, v));
                    }
                }
            }
        }
    }
    classes
}

fn build_with_references(scenario: &RefScenario) -> feature_model_solver::Model {
    let (low, high) = scenario.targets;
    let y_card = if scenario.y_optional {
        Cardinality::optional()
    } else {
        Cardinality::exactly(1)
    };
    let mut builder = ModelBuilder::new();
    builder
        .declare(FeatureDecl::concrete("A").card(Cardinality::new(low, high)))
        .declare(FeatureDecl::concrete("Root"))
        .declare(
            FeatureDecl::concrete("x")
                .within("Root")
                .reference(Target::Feature("A".into())),
        )
        .declare(
            FeatureDecl::concrete("y")
                .within("Root")
                .card(y_card)
                .reference(Target::Feature("A".into())),
        )
        .declare(FeatureDecl::concrete("v").within("Root").reference(Target::Int));
    let x_ref = Path::this().child("x").deref();
    let y_ref = Path::this().child("y").deref();
    match scenario.aliasing {
        Aliasing::Free => {}
        Aliasing::Same => {
            builder.constrain("Root", Expr::eq(x_ref, y_ref));
        }
        Aliasing::Different => {
            builder.constrain("Root", Expr::ne(x_ref, y_ref));
        }
    }
    builder.finalize().expect("generated model is valid")
}

fn ref_class(instance: &Instance) -> RefClass {
    let x = instance.find_all("x")[0];
    let same = instance
        .find_all("y")
        .first()
        .map(|&y| instance.target(y) == instance.target(x));
    let v = match instance.find_all("v").first().and_then(|&v| instance.node(v).value()) {
        Some(Value::Int(v)) => *v,
        other => panic!("expected an int value, got {other:?}"),
    };
    (instance.find_all("A").len(), same, v)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn enumerates_every_reference_aliasing_class_once(scenario in ref_scenario_strategy()) {
        let model = build_with_references(&scenario);
        let scope = Scope::new().with_default(BOUND).with_int_range(0, 1);
        let report = model.solve(&scope).run().expect("solve");

        let found: Vec<RefClass> = report.instances.iter().map(ref_class).collect();
        let distinct: BTreeSet<RefClass> = found.iter().cloned().collect();
        prop_assert_eq!(distinct.len(), found.len(), "duplicate instances");
        prop_assert_eq!(&distinct, &ref_brute_force(&scenario));
        if distinct.is_empty() {
            prop_assert!(report.is_unsat());
        } else {
            prop_assert_eq!(report.outcome, Outcome::Exhausted);
        }
    }

    #[test]
    fn enumerates_exactly_the_admissible_count_vectors(scenario in scenario_strategy()) {
        let model = build(&scenario);
        let scope = Scope::new().with_default(BOUND);
        let report = model.solve(&scope).run().expect("solve");

        let found: Vec<Vec<usize>> = report
            .instances
            .iter()
            .map(|instance| {
                (0..scenario.cards.len())
                    .map(|idx| instance.find_all(&child(idx)).len())
                    .collect()
            })
            .collect();
        let distinct: BTreeSet<Vec<usize>> = found.iter().cloned().collect();
        prop_assert_eq!(distinct.len(), found.len(), "duplicate instances");

        let expected = brute_force(&scenario);
        prop_assert_eq!(&distinct, &expected);
        if expected.is_empty() {
            prop_assert!(report.is_unsat());
        } else {
            prop_assert_eq!(report.outcome, Outcome::Exhausted);
        }
    }

    #[test]
    fn identical_declarations_build_equal_models(scenario in scenario_strategy()) {
        prop_assert_eq!(build(&scenario), build(&scenario));
    }
}
