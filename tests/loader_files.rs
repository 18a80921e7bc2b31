//! Loading declaration lists and configurations from disk.

use std::io::Write;

use feature_model_solver::{EngineConfig, LoadError, Outcome, load_file};

#[test]
fn loads_a_model_file_and_solves_it() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "scope default 2;\n\
         feature Pizza;\n\
         feature topping in Pizza [1..2] -> string;\n\
         constraint Pizza: all t: this.topping | t.ref != \"pineapple\";\n\
         scope string alphabet \"cheese\", \"pineapple\";"
    )
    .expect("write");

    let loaded = load_file(file.path()).expect("load");
    let report = loaded.model.solve(&loaded.scope).run().expect("solve");
    assert_eq!(report.outcome, Outcome::Exhausted);
    // One or two toppings, both cheese.
    assert_eq!(report.instances.len(), 2);
}

#[test]
fn syntax_errors_name_the_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "feature A;\nfeature B in A [2..];\n").expect("write");

    let err = load_file(file.path()).expect_err("syntax error");
    let LoadError::Syntax(err) = err else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!(err.file, file.path().display().to_string());
    assert_eq!(err.line, 2);
    assert!(err.message.contains("upper bound"), "{}", err.message);
    assert!(err.to_string().contains(" --> "));
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_file(dir.path().join("absent.fm")).expect_err("missing");
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn engine_config_drives_a_solve() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "[scope]\ndefault_bound = 3\n\n[solve]\nmax_instances = 2\n"
    )
    .expect("write");
    let config = EngineConfig::from_file(file.path()).expect("config");

    let loaded = feature_model_solver::load_str("feature A; feature b in A [0..*];")
        .expect("load");
    let report = loaded
        .model
        .solve(&config.scope)
        .with_options(config.solve)
        .run()
        .expect("solve");
    assert_eq!(report.instances.len(), 2);
    assert_eq!(report.outcome, Outcome::Limited);
}
