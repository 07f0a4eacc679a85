// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query/Subscription API: the read-only surface the UI (or CLI `show`
//! commands) uses to list documents, inspect cascade runs and their
//! executions, and tail a live execution's log. Grounded in the teacher's
//! read-side query helpers layered over its store, bridging here to
//! `ckb_adapters::LogStream` for the tailing half instead of a
//! tmux-pane-scrape.

use ckb_adapters::LogStream;
use ckb_core::{
    CascadeRun, CascadeRunId, CascadeRunStore, DocId, Document, DocumentStore, ExecutionId,
    ExecutionRecord, ExecutionRecordStore, Stage, StoreError,
};
use std::sync::Arc;

/// Largest page size returned by an unpaginated list method on this API.
const DEFAULT_LIST_LIMIT: usize = 100;

/// Read-only view over a store, for callers that only need to look, not
/// drive the cascade.
pub struct QueryApi<S> {
    store: Arc<S>,
}

impl<S> QueryApi<S>
where
    S: crate::Store,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn get_document(&self, id: DocId) -> Result<Document, StoreError> {
        DocumentStore::get(&*self.store, id).await
    }

    pub async fn list_at_stage(&self, stage: Stage, limit: Option<usize>) -> Result<Vec<Document>, StoreError> {
        self.store.list_at_stage(stage, limit.unwrap_or(DEFAULT_LIST_LIMIT)).await
    }

    pub async fn list_children(&self, parent_id: DocId) -> Result<Vec<Document>, StoreError> {
        self.store.list_children(parent_id).await
    }

    pub async fn get_execution(&self, id: ExecutionId) -> Result<ExecutionRecord, StoreError> {
        ExecutionRecordStore::get(&*self.store, id).await
    }

    pub async fn recent_executions(&self, limit: Option<usize>) -> Result<Vec<ExecutionRecord>, StoreError> {
        ExecutionRecordStore::list_recent(&*self.store, limit.unwrap_or(DEFAULT_LIST_LIMIT)).await
    }

    pub async fn running_executions(&self) -> Result<Vec<ExecutionRecord>, StoreError> {
        self.store.list_running().await
    }

    pub async fn executions_for_run(&self, run_id: CascadeRunId) -> Result<Vec<ExecutionRecord>, StoreError> {
        self.store.list_by_cascade_run(run_id).await
    }

    pub async fn cascade_status(&self, run_id: CascadeRunId) -> Result<CascadeRun, StoreError> {
        CascadeRunStore::get(&*self.store, run_id).await
    }

    pub async fn recent_cascade_runs(&self, limit: Option<usize>) -> Result<Vec<CascadeRun>, StoreError> {
        CascadeRunStore::list_recent(&*self.store, limit.unwrap_or(DEFAULT_LIST_LIMIT)).await
    }

    /// Begin tailing an execution's log file. The caller subscribes via
    /// `ckb_adapters::LogSubscriber` on the returned stream; dropping it
    /// stops the tail.
    pub async fn subscribe_log(&self, execution_id: ExecutionId) -> Result<LogStream, StoreError> {
        let record = ExecutionRecordStore::get(&*self.store, execution_id).await?;
        Ok(LogStream::open(record.log_file))
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
