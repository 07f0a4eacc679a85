// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ckb_core::{CascadeError, SystemClock};
use ckb_storage::test_support::FakeStore;
use std::os::unix::fs::PermissionsExt;
use tempfile::tempdir;

fn test_config(logs_dir: PathBuf, agent_binary: &str) -> CascadeConfig {
    CascadeConfig {
        logs_dir,
        work_dir: std::env::temp_dir(),
        reconcile_interval: Duration::from_secs(3),
        reconcile_grace: Duration::from_secs(5),
        default_stage_timeout: Duration::from_secs(300),
        implementation_timeout: Duration::from_secs(1800),
        completion_poll_interval: Duration::from_secs(2),
        agent_binary: agent_binary.to_string(),
    }
}

fn base_exec_config(working_dir: PathBuf, timeout: Duration) -> ExecutionConfig {
    ExecutionConfig {
        doc_id: None,
        doc_title: "test doc".to_string(),
        prompt: "do the thing".to_string(),
        allowed_tools: Vec::new(),
        model: None,
        timeout,
        cascade_run_id: None,
        working_dir,
        extra_env: Vec::new(),
        output_instruction: None,
    }
}

#[tokio::test]
async fn execute_sync_success_records_completed() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FakeStore::new());
    let config = test_config(dir.path().join("logs"), "true");
    let engine = ExecutionEngine::new(store.clone(), Arc::new(SystemClock), config);
    let cfg = base_exec_config(dir.path().to_path_buf(), Duration::from_secs(5));

    let result = engine.execute_sync(cfg).await.unwrap();

    assert!(result.success);
    assert_eq!(result.exit_code, Some(0));
    let record = store.get(result.execution_id).await.unwrap();
    assert_eq!(record.status, ExecutionStatus::Completed);
    assert_eq!(record.exit_code, Some(0));
}

#[tokio::test]
async fn execute_sync_nonzero_exit_records_failed() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FakeStore::new());
    let config = test_config(dir.path().join("logs"), "false");
    let engine = ExecutionEngine::new(store.clone(), Arc::new(SystemClock), config);
    let cfg = base_exec_config(dir.path().to_path_buf(), Duration::from_secs(5));

    let result = engine.execute_sync(cfg).await.unwrap();

    assert!(!result.success);
    assert_ne!(result.exit_code, Some(0));
    let record = store.get(result.execution_id).await.unwrap();
    assert_eq!(record.status, ExecutionStatus::Failed);
}

#[tokio::test]
async fn execute_sync_timeout_kills_child_and_returns_timeout_error() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("slow-agent.sh");
    std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();

    let store = Arc::new(FakeStore::new());
    let config = test_config(dir.path().join("logs"), script.to_str().unwrap());
    let engine = ExecutionEngine::new(store.clone(), Arc::new(SystemClock), config);
    let cfg = base_exec_config(dir.path().to_path_buf(), Duration::from_millis(150));

    let err = engine.execute_sync(cfg).await.unwrap_err();

    assert!(matches!(err, EngineError::Cascade(CascadeError::Timeout(_))));
}

#[tokio::test]
async fn execute_detached_returns_immediately_without_waiting() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FakeStore::new());
    let config = test_config(dir.path().join("logs"), "true");
    let engine = ExecutionEngine::new(store.clone(), Arc::new(SystemClock), config);
    let cfg = base_exec_config(dir.path().to_path_buf(), Duration::from_secs(5));

    let handle = engine.execute_detached(cfg).await.unwrap();

    assert!(handle.pid > 0);
    let record = store.get(handle.execution_id).await.unwrap();
    assert_eq!(record.status, ExecutionStatus::Running);
    assert_eq!(record.pid, Some(handle.pid));
}

#[tokio::test]
async fn execute_sync_missing_binary_fails_without_creating_a_running_record() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FakeStore::new());
    let config = test_config(dir.path().join("logs"), "no-such-binary-anywhere");
    let engine = ExecutionEngine::new(store.clone(), Arc::new(SystemClock), config);
    let cfg = base_exec_config(dir.path().to_path_buf(), Duration::from_secs(5));

    let err = engine.execute_sync(cfg).await.unwrap_err();

    assert!(matches!(err, EngineError::Cascade(CascadeError::EnvironmentInvalid { .. })));
    let record = store.get(ExecutionId::new(1)).await.unwrap();
    assert_eq!(record.status, ExecutionStatus::Failed);
}
