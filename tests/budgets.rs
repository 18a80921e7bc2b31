//! Step limits, deadlines and cancellation.

use feature_model_solver::{
    CancelToken, Interruption, Outcome, SolveError, SolveOptions, crypto_catalog,
};

#[test]
fn step_limit_interrupts_the_request() {
    let loaded = crypto_catalog().expect("catalog");
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_options(SolveOptions::default().with_step_limit(1))
        .run()
        .expect("interruption is not an error for run");
    assert!(report.instances.is_empty());
    assert_eq!(
        report.outcome,
        Outcome::Interrupted(Interruption::StepLimit { limit: 1 })
    );
}

#[test]
fn interrupted_runs_yield_a_prefix_of_the_full_enumeration() {
    let loaded = crypto_catalog().expect("catalog");
    let full: Vec<String> = loaded
        .model
        .solve(&loaded.scope)
        .run()
        .expect("solve")
        .instances
        .iter()
        .map(|instance| instance.canonical_key())
        .collect();

    let mut limit = 1;
    while limit < 1 << 20 {
        let report = loaded
            .model
            .solve(&loaded.scope)
            .with_options(SolveOptions::default().with_step_limit(limit))
            .run()
            .expect("solve");
        let keys: Vec<String> = report
            .instances
            .iter()
            .map(|instance| instance.canonical_key())
            .collect();
        assert_eq!(keys[..], full[..keys.len()]);
        match report.outcome {
            Outcome::Exhausted => {
                assert_eq!(keys.len(), full.len());
                return;
            }
            Outcome::Interrupted(Interruption::StepLimit { limit: reported }) => {
                assert_eq!(reported, limit);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        limit *= 2;
    }
    panic!("enumeration never completed");
}

#[test]
fn zero_deadline_times_out_before_the_first_instance() {
    let loaded = crypto_catalog().expect("catalog");
    let mut solutions = loaded
        .model
        .solve(&loaded.scope)
        .with_options(SolveOptions::default().with_time_limit_ms(0))
        .solutions()
        .expect("prepare");
    let first = solutions.next().expect("one item");
    assert_eq!(
        first.expect_err("deadline"),
        SolveError::Timeout(Interruption::Deadline { limit_ms: 0 })
    );
    assert!(solutions.next().is_none());
    assert_eq!(
        solutions.outcome(),
        Some(&Outcome::Interrupted(Interruption::Deadline { limit_ms: 0 }))
    );
}

#[test]
fn cancellation_keeps_already_yielded_instances() {
    let loaded = crypto_catalog().expect("catalog");
    let token = CancelToken::new();
    let mut solutions = loaded
        .model
        .solve(&loaded.scope)
        .with_cancel(token.clone())
        .solutions()
        .expect("prepare");

    let first = solutions.next().expect("item").expect("instance");
    assert!(!first.is_empty());
    token.cancel();
    assert_eq!(
        solutions.next().expect("item").expect_err("cancelled"),
        SolveError::Cancelled
    );
    assert!(solutions.next().is_none());
    assert_eq!(solutions.yielded(), 1);
    assert_eq!(
        solutions.outcome(),
        Some(&Outcome::Interrupted(Interruption::Cancelled))
    );
}

#[test]
fn slot_limit_is_a_resource_error() {
    let loaded = crypto_catalog().expect("catalog");
    let err = loaded
        .model
        .solve(&loaded.scope)
        .with_options(SolveOptions::default().with_max_slots(10))
        .solutions()
        .err()
        .expect("too many slots");
    assert!(err.is_resource_limit(), "{err}");
}
