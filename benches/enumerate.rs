//! Criterion benchmarks for loading and enumerating the bundled catalog.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use feature_model_solver::{CRYPTO_CATALOG, Expr, Path, Query, crypto_catalog, load_str};

fn bench_load_catalog(c: &mut Criterion) {
    c.bench_function("load_crypto_catalog", |b| {
        b.iter(|| load_str(black_box(CRYPTO_CATALOG)).expect("catalog loads"))
    });
}

fn bench_enumerate_catalog(c: &mut Criterion) {
    let loaded = crypto_catalog().expect("catalog loads");
    c.bench_function("enumerate_crypto_catalog", |b| {
        b.iter(|| {
            let report = loaded.model.solve(&loaded.scope).run().expect("solve");
            black_box(report.instances.len())
        })
    });
}

fn bench_diagnose_unsat_query(c: &mut Criterion) {
    let loaded = crypto_catalog().expect("catalog loads");
    let key_size = Path::this().child("cipher").deref().child("keySize").deref();
    c.bench_function("diagnose_unsat_query", |b| {
        b.iter(|| {
            let query = Query::new().constrain(
                "PasswordBasedEncryption",
                Expr::gt(key_size.clone(), Expr::int(300)),
            );
            let report = loaded
                .model
                .solve(&loaded.scope)
                .with_query(query)
                .run()
                .expect("solve");
            black_box(report.conflict().map(|c| c.items.len()))
        })
    });
}

criterion_group!(
    benches,
    bench_load_catalog,
    bench_enumerate_catalog,
    bench_diagnose_unsat_query
);
criterion_main!(benches);
