//! Independent solve requests over one shared model.

use feature_model_solver::{Expr, Instance, Model, Path, Query, Scope, crypto_catalog};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn frozen_artifacts_are_thread_safe() {
    assert_send_sync::<Model>();
    assert_send_sync::<Scope>();
    assert_send_sync::<Instance>();
    assert_send_sync::<Query>();
}

#[test]
fn parallel_requests_match_sequential_results() {
    let loaded = crypto_catalog().expect("catalog");
    let key_sizes = [56_i64, 128, 256, 512];
    let query_for = |key: i64| {
        Query::new().constrain(
            "PasswordBasedEncryption",
            Expr::eq(
                Path::this().child("cipher").deref().child("keySize").deref(),
                Expr::int(key),
            ),
        )
    };

    let sequential: Vec<Vec<String>> = key_sizes
        .iter()
        .map(|&key| {
            let report = loaded
                .model
                .solve(&loaded.scope)
                .with_query(query_for(key))
                .run()
                .expect("solve");
            report.instances.iter().map(Instance::canonical_key).collect()
        })
        .collect();

    let parallel: Vec<Vec<String>> = std::thread::scope(|s| {
        let handles: Vec<_> = key_sizes
            .iter()
            .map(|&key| {
                let loaded = &loaded;
                let query = query_for(key);
                s.spawn(move || {
                    let report = loaded
                        .model
                        .solve(&loaded.scope)
                        .with_query(query)
                        .run()
                        .expect("solve");
                    report
                        .instances
                        .iter()
                        .map(Instance::canonical_key)
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("solver thread"))
            .collect()
    });

    assert_eq!(parallel, sequential);
    let counts: Vec<usize> = parallel.iter().map(Vec::len).collect();
    assert_eq!(counts, vec![3, 3, 3, 0]);
}
