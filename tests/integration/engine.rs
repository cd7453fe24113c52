//! Subprocess engine driver against scripted stub engines.

#![cfg(unix)]

use armsnap::core::{ArmsnapError, CancelToken};
use armsnap::expansion::{CommandEngine, ExpandRequest, ExpansionEngine};
use armsnap::symbolic::{DeploymentOverrides, bind_parameters, build_metadata};
use armsnap::template::Template;
use tempfile::TempDir;

use crate::common;

fn sample_request() -> ExpandRequest {
    let template = Template::parse(&common::storage_template().to_string()).unwrap();
    let metadata = build_metadata(&DeploymentOverrides::default());
    let bindings = bind_parameters(&template, &indexmap::IndexMap::new());
    ExpandRequest::new(&template, bindings, metadata)
}

#[tokio::test]
async fn test_command_engine_round_trips_result() {
    let dir = TempDir::new().unwrap();
    let script = common::write_stub_engine(dir.path());
    let engine = CommandEngine::new(&script.display().to_string()).unwrap();

    let result = engine
        .expand(&sample_request(), &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(result.preflight_resources.len(), 1);
    assert_eq!(
        result.preflight_resources[0]["type"],
        "Microsoft.Storage/storageAccounts"
    );
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.diagnostics[0].to_string(),
        "resources[0] Warning Stub: stub diagnostic"
    );
}

#[tokio::test]
async fn test_command_engine_surfaces_failure_with_stderr() {
    let dir = TempDir::new().unwrap();
    let script = common::write_stub_engine(dir.path());
    let engine = CommandEngine::new(&script.display().to_string()).unwrap();

    let template = Template::parse(&common::poisoned_template().to_string()).unwrap();
    let metadata = build_metadata(&DeploymentOverrides::default());
    let bindings = bind_parameters(&template, &indexmap::IndexMap::new());
    let request = ExpandRequest::new(&template, bindings, metadata);

    let err = engine
        .expand(&request, &CancelToken::new())
        .await
        .unwrap_err();
    match err {
        ArmsnapError::ExpansionFailed { reason } => {
            assert!(reason.contains("poisoned template"), "reason: {reason}");
        }
        other => panic!("expected ExpansionFailed, got {other}"),
    }
}

#[tokio::test]
async fn test_command_engine_rejects_malformed_output() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("bad-engine.sh");
    std::fs::write(&script, "#!/bin/sh\ncat > /dev/null\necho 'not json'\n").unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    let engine = CommandEngine::new(&script.display().to_string()).unwrap();

    let err = engine
        .expand(&sample_request(), &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ArmsnapError::EngineResponseInvalid { .. }));
}

#[tokio::test]
async fn test_command_engine_spawn_failure() {
    let engine = CommandEngine::new("/nonexistent/armsnap-engine").unwrap();
    let err = engine
        .expand(&sample_request(), &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ArmsnapError::EngineSpawnFailed { .. }));
}

#[tokio::test]
async fn test_command_engine_observes_pre_cancellation() {
    let dir = TempDir::new().unwrap();
    let script = common::write_stub_engine(dir.path());
    let engine = CommandEngine::new(&script.display().to_string()).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = engine.expand(&sample_request(), &cancel).await.unwrap_err();
    assert!(matches!(err, ArmsnapError::Cancelled));
}
