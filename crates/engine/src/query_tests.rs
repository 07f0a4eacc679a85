// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ckb_core::{ExecutionStatus, Stage};
use ckb_storage::test_support::FakeStore;
use std::sync::Arc;

#[tokio::test]
async fn list_at_stage_returns_documents_created_at_that_stage() {
    let store = Arc::new(FakeStore::new());
    let api = QueryApi::new(store.clone());

    let id = DocumentStore::create(&*store, "A".into(), "c".into(), None, None, Some(Stage::Idea))
        .await
        .unwrap();

    let docs = api.list_at_stage(Stage::Idea, None).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, id);
}

#[tokio::test]
async fn recent_executions_and_running_executions_reflect_store_state() {
    let store = Arc::new(FakeStore::new());
    let api = QueryApi::new(store.clone());

    let id = ExecutionRecordStore::create(&*store, None, "t".into(), "/tmp/a.log".into(), "/tmp".into(), None)
        .await
        .unwrap();

    let running = api.running_executions().await.unwrap();
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].id, id);

    let recent = api.recent_executions(None).await.unwrap();
    assert_eq!(recent.len(), 1);

    ExecutionRecordStore::set_status(&*store, id, ExecutionStatus::Completed, Some(0)).await.unwrap();
    let running = api.running_executions().await.unwrap();
    assert!(running.is_empty());
}

#[tokio::test]
async fn cascade_status_and_executions_for_run_compose_across_both_stores() {
    let store = Arc::new(FakeStore::new());
    let api = QueryApi::new(store.clone());

    let doc_id = DocumentStore::create(&*store, "A".into(), "c".into(), None, None, Some(Stage::Idea))
        .await
        .unwrap();
    let run_id = CascadeRunStore::create(&*store, doc_id, Stage::Idea, Stage::Done).await.unwrap();
    ExecutionRecordStore::create(&*store, Some(doc_id), "A".into(), "/tmp/a.log".into(), "/tmp".into(), Some(run_id))
        .await
        .unwrap();

    let status = api.cascade_status(run_id).await.unwrap();
    assert_eq!(status.start_doc_id, doc_id);

    let execs = api.executions_for_run(run_id).await.unwrap();
    assert_eq!(execs.len(), 1);
    assert_eq!(execs[0].cascade_run_id, Some(run_id));
}

#[tokio::test]
async fn get_document_surfaces_not_found_for_an_unknown_id() {
    let store = Arc::new(FakeStore::new());
    let api = QueryApi::new(store);

    let err = api.get_document(DocId::new(999)).await.unwrap_err();
    assert!(matches!(err, ckb_core::StoreError::NotFound(_)));
}
