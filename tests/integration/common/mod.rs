//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

pub const DEPLOYMENT_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";

/// A template with one storage account whose name echoes a defaultless
/// parameter.
pub fn storage_template() -> Value {
    json!({
        "$schema": DEPLOYMENT_SCHEMA,
        "contentVersion": "1.0.0.0",
        "parameters": {"accountName": {"type": "string"}},
        "resources": [{
            "type": "Microsoft.Storage/storageAccounts",
            "apiVersion": "2024-01-01",
            "name": "[parameters('accountName')]"
        }]
    })
}

/// A template the scripted stub engine refuses to expand.
pub fn poisoned_template() -> Value {
    json!({
        "$schema": DEPLOYMENT_SCHEMA,
        "contentVersion": "1.0.0.0",
        "resources": [{"type": "Fail/fail", "name": "boom"}]
    })
}

pub fn empty_parameters() -> Value {
    json!({
        "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#",
        "contentVersion": "1.0.0.0",
        "parameters": {}
    })
}

/// Lays out one corpus entry: descriptor, template, and parameters file.
pub fn write_corpus_source(root: &Path, name: &str, template: &Value) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("metadata.json"),
        json!({
            "itemDisplayName": format!("{name} display"),
            "description": format!("{name} description"),
            "summary": format!("{name} summary"),
            "dateUpdated": "2024-06-01"
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(dir.join("azuredeploy.json"), template.to_string()).unwrap();
    std::fs::write(
        dir.join("azuredeploy.parameters.json"),
        empty_parameters().to_string(),
    )
    .unwrap();
}

/// A type index with a vault type (two API versions) whose `sku.family`
/// is an all-literal union, plus a storage type.
pub fn type_index_json() -> String {
    let vault_entry = json!({
        "nodes": [
            {"$type": "string"},
            {"$type": "stringLiteral", "value": "A"},
            {"$type": "stringLiteral", "value": "B"},
            {"$type": "union", "elements": [1, 2]},
            {"$type": "object", "name": "Sku", "properties": {
                "name": {"type": 0, "required": true},
                "family": {"type": 3, "required": true}
            }},
            {"$type": "object", "properties": {
                "sku": {"type": 4, "required": true},
                "vaultUri": {"type": 0, "readOnly": true}
            }}
        ],
        "body": 5
    });

    json!({
        "resources": {
            "Microsoft.KeyVault/vaults@2023-07-01": vault_entry.clone(),
            "Microsoft.KeyVault/vaults@2024-11-01": vault_entry,
            "Microsoft.Storage/storageAccounts@2024-01-01": {
                "nodes": [{"$type": "any"}],
                "body": 0
            }
        }
    })
    .to_string()
}

/// Writes an executable stub engine script that consumes the request on
/// stdin, fails for poisoned templates, and otherwise emits a fixed
/// expansion result.
#[cfg(unix)]
pub fn write_stub_engine(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("stub-engine.sh");
    std::fs::write(
        &path,
        r#"#!/bin/sh
input=$(cat)
case "$input" in
  *Fail/fail*)
    echo "stub engine: poisoned template" >&2
    exit 1
    ;;
esac
printf '%s' '{"preflightResources":[{"type":"Microsoft.Storage/storageAccounts","name":"predicted"}],"extensibleResources":[],"diagnostics":[{"target":"resources[0]","level":"Warning","code":"Stub","message":"stub diagnostic"}]}'
"#,
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
