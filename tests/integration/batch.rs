//! Batch corpus processing through the real binary and a scripted
//! engine.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

use crate::common;

fn json_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

#[test]
fn test_poisoned_source_does_not_halt_batch() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let engine = common::write_stub_engine(corpus.path());

    common::write_corpus_source(corpus.path(), "a", &common::storage_template());
    common::write_corpus_source(corpus.path(), "b", &common::poisoned_template());
    common::write_corpus_source(corpus.path(), "c", &common::storage_template());

    Command::cargo_bin("armsnap")
        .unwrap()
        .arg("process")
        .arg(corpus.path())
        .arg("--out")
        .arg(out.path())
        .arg("--engine")
        .arg(&engine)
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 processed"))
        .stdout(predicate::str::contains("1 failed"));

    // Exactly the two healthy sources were written.
    let envelopes = json_files(out.path());
    assert_eq!(envelopes.len(), 2);

    let entry: Value =
        serde_json::from_str(&std::fs::read_to_string(&envelopes[0]).unwrap()).unwrap();
    assert_eq!(
        entry["snapshot"]["predictedResources"][0]["type"],
        "Microsoft.Storage/storageAccounts"
    );
    assert_eq!(
        entry["snapshot"]["diagnostics"][0],
        "resources[0] Warning Stub: stub diagnostic"
    );
    assert_eq!(entry["resourceTypes"][0], "Microsoft.Storage/storageAccounts");
    assert!(
        entry["dateUpdated"]
            .as_str()
            .is_some_and(|stamp| stamp.starts_with("2024-06-01T00:00:00")),
        "dateUpdated: {}",
        entry["dateUpdated"]
    );

    // The healthy sources also got sibling snapshot files; the poisoned
    // one did not.
    assert!(corpus.path().join("a/azuredeploy.snapshot.json").is_file());
    assert!(!corpus.path().join("b/azuredeploy.snapshot.json").is_file());
    assert!(corpus.path().join("c/azuredeploy.snapshot.json").is_file());
}

#[test]
fn test_reprocessing_overwrites_same_envelopes() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let engine = common::write_stub_engine(corpus.path());

    common::write_corpus_source(corpus.path(), "app", &common::storage_template());

    for _ in 0..2 {
        Command::cargo_bin("armsnap")
            .unwrap()
            .arg("process")
            .arg(corpus.path())
            .arg("--out")
            .arg(out.path())
            .arg("--engine")
            .arg(&engine)
            .arg("--no-progress")
            .assert()
            .success();
    }

    // Deterministic ids: the second run overwrote the first run's file.
    assert_eq!(json_files(out.path()).len(), 1);
}

#[test]
fn test_all_sources_failing_exits_nonzero() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let engine = common::write_stub_engine(corpus.path());

    common::write_corpus_source(corpus.path(), "bad", &common::poisoned_template());

    Command::cargo_bin("armsnap")
        .unwrap()
        .arg("process")
        .arg(corpus.path())
        .arg("--out")
        .arg(out.path())
        .arg("--engine")
        .arg(&engine)
        .arg("--no-progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corpus sources failed"));
}

#[test]
fn test_missing_engine_is_reported_with_suggestion() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    common::write_corpus_source(corpus.path(), "app", &common::storage_template());

    Command::cargo_bin("armsnap")
        .unwrap()
        .arg("process")
        .arg(corpus.path())
        .arg("--out")
        .arg(out.path())
        .arg("--no-progress")
        .env_remove("ARMSNAP_ENGINE")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no expansion engine configured"))
        .stderr(predicate::str::contains("ARMSNAP_ENGINE"));
}
