//! `armsnap schema` through the real binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

use crate::common;

fn write_index(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("types.json");
    std::fs::write(&path, common::type_index_json()).unwrap();
    path
}

#[test]
fn test_schema_prints_compiled_document() {
    let dir = TempDir::new().unwrap();
    let index = write_index(&dir);

    let assert = Command::cargo_bin("armsnap")
        .unwrap()
        .args([
            "schema",
            "Microsoft.KeyVault/vaults@2024-11-01",
            "--index",
        ])
        .arg(&index)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let schema: Value = serde_json::from_str(&stdout).unwrap();

    // The named Sku type is hoisted and referenced.
    assert_eq!(
        schema["properties"]["sku"]["$ref"],
        "#/definitions/Sku"
    );
    // The all-literal union collapsed to an enum.
    assert_eq!(
        schema["definitions"]["Sku"]["properties"]["family"],
        serde_json::json!({"type": "string", "enum": ["A", "B"]})
    );
    // Read-only properties never surface.
    assert!(schema["properties"].get("vaultUri").is_none());
}

#[test]
fn test_schema_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let index = write_index(&dir);
    let output = dir.path().join("schema.json");

    Command::cargo_bin("armsnap")
        .unwrap()
        .args(["schema", "Microsoft.Storage/storageAccounts@2024-01-01"])
        .arg("--index")
        .arg(&index)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let schema: Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    // The storage body is `any`: an unconstrained schema.
    assert_eq!(schema, serde_json::json!({}));
}

#[test]
fn test_unknown_api_version_lists_alternatives() {
    let dir = TempDir::new().unwrap();
    let index = write_index(&dir);

    Command::cargo_bin("armsnap")
        .unwrap()
        .args(["schema", "Microsoft.KeyVault/vaults@1999-01-01", "--index"])
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Possible api versions"))
        .stderr(predicate::str::contains("2023-07-01"))
        .stderr(predicate::str::contains("2024-11-01"));
}

#[test]
fn test_unknown_resource_type_suggests_provider_types() {
    let dir = TempDir::new().unwrap();
    let index = write_index(&dir);

    Command::cargo_bin("armsnap")
        .unwrap()
        .args(["schema", "Microsoft.KeyVault/wallets@2024-11-01", "--index"])
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Microsoft.KeyVault/vaults"));
}

#[test]
fn test_malformed_resource_reference_is_rejected() {
    let dir = TempDir::new().unwrap();
    let index = write_index(&dir);

    Command::cargo_bin("armsnap")
        .unwrap()
        .args(["schema", "Microsoft.KeyVault/vaults", "--index"])
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected <resourceType>@<apiVersion>"));
}
