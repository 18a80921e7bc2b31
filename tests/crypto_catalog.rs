//! Scenarios over the bundled password-based encryption catalog.

use std::collections::BTreeSet;

use feature_model_solver::{
    ConflictKind, Expr, Instance, LoadedModel, Outcome, Path, Query, SolveOptions, crypto_catalog,
};

fn catalog() -> LoadedModel {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    crypto_catalog().expect("bundled catalog loads")
}

fn pbe_attribute(attribute: &str) -> Path {
    Path::this().child(attribute).deref()
}

fn chosen(instance: &Instance, attribute: &str) -> String {
    let pbe = instance.find_all("PasswordBasedEncryption")[0];
    let slot = instance.child(pbe, attribute).expect("attribute present");
    let target = instance.target(slot).expect("reference resolved");
    instance.node(target).name().to_string()
}

#[test]
fn enumerates_every_task_configuration() {
    let loaded = catalog();
    let report = loaded.model.solve(&loaded.scope).run().expect("solve");
    assert_eq!(report.outcome, Outcome::Exhausted);
    // Three ciphers, three digests, one key derivation algorithm.
    assert_eq!(report.instances.len(), 9);

    let pairs: BTreeSet<(String, String)> = report
        .instances
        .iter()
        .map(|instance| (chosen(instance, "cipher"), chosen(instance, "digest")))
        .collect();
    assert_eq!(pairs.len(), 9);
    for instance in &report.instances {
        assert_eq!(chosen(instance, "kda"), "pbkdf");
    }
}

#[test]
fn scenario_a_keeps_only_large_keys() {
    let loaded = catalog();
    let query = Query::new().constrain(
        "PasswordBasedEncryption",
        Expr::gt(pbe_attribute("cipher").child("keySize").deref(), Expr::int(100)),
    );
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_query(query)
        .run()
        .expect("solve");

    let ciphers: BTreeSet<String> = report
        .instances
        .iter()
        .map(|instance| chosen(instance, "cipher"))
        .collect();
    assert_eq!(
        ciphers,
        BTreeSet::from(["AES128".to_string(), "AES256".to_string()])
    );
    assert_eq!(report.instances.len(), 6);
}

#[test]
fn scenario_b_reports_status_group_and_key_size() {
    let loaded = catalog();
    let cipher = pbe_attribute("cipher");
    let query = Query::new().constrain(
        "PasswordBasedEncryption",
        Expr::and([
            Expr::some(cipher.clone().child("status").child("insecure")),
            Expr::eq(cipher.child("keySize").deref(), Expr::int(256)),
        ]),
    );
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_query(query)
        .run()
        .expect("solve");

    assert!(report.is_unsat());
    assert!(report.instances.is_empty());
    let conflict = report.conflict().expect("diagnosis enabled by default");
    assert!(
        conflict.mentions(ConflictKind::GroupCardinality, "Algorithm.status"),
        "{conflict}"
    );
    assert!(
        conflict.items.iter().any(|item| {
            matches!(item.kind, ConflictKind::Constraint | ConflictKind::QueryConstraint)
                && item.description.contains("keySize")
        }),
        "{conflict}"
    );
}

#[test]
fn des_is_reproduced_as_secure_sample_data() {
    let loaded = catalog();
    let query = Query::new().constrain(
        "PasswordBasedEncryption",
        Expr::and([
            Expr::eq(pbe_attribute("cipher").child("name").deref(), Expr::string("DES")),
            Expr::some(pbe_attribute("cipher").child("status").child("secure")),
        ]),
    );
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_query(query)
        .run()
        .expect("solve");
    assert_eq!(report.instances.len(), 3);
}

#[test]
fn display_names_follow_task_references() {
    let loaded = catalog();
    let query = Query::new()
        .constrain(
            "PasswordBasedEncryption",
            Expr::eq(pbe_attribute("digest").child("name").deref(), Expr::string("SHA-256")),
        )
        .constrain(
            "PasswordBasedEncryption",
            Expr::eq(pbe_attribute("cipher").child("keySize").deref(), Expr::int(256)),
        );
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_query(query)
        .run()
        .expect("solve");
    assert_eq!(report.instances.len(), 1);
    assert_eq!(
        report.instances[0].display_name(),
        "PBKDF+SHA-256+AES with 256bit key"
    );
}

#[test]
fn max_instances_limits_the_sequence() {
    let loaded = catalog();
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_options(SolveOptions::default().with_max_instances(4))
        .run()
        .expect("solve");
    assert_eq!(report.instances.len(), 4);
    assert_eq!(report.outcome, Outcome::Limited);
}

#[test]
fn global_query_constraints_need_no_owner() {
    let loaded = catalog();
    let query = Query::new().constrain_global(Expr::all_in(
        "task",
        Path::name("PasswordBasedEncryption"),
        Expr::ne(
            Path::name("task").child("digest").deref().child("name").deref(),
            Expr::string("MD5"),
        ),
    ));
    let report = loaded
        .model
        .solve(&loaded.scope)
        .with_query(query)
        .run()
        .expect("solve");
    assert_eq!(report.instances.len(), 6);
    for instance in &report.instances {
        assert_ne!(chosen(instance, "digest"), "md5");
    }
}
