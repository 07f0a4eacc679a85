// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store interfaces consumed by the core. Implementations live in
//! `ckb-storage` (durable, WAL-backed) and behind `ckb-storage`'s
//! `test-support` feature (in-memory fake), mirroring the teacher's split
//! between its daemon-backed adapters and their `Fake*` test doubles.

use crate::agent_def::{AgentDefId, AgentDefinition};
use crate::cascade::{CascadeRun, CascadeRunId, CascadeRunStatus};
use crate::document::{DocId, Document, Stage};
use crate::execution::{ExecutionId, ExecutionRecord, ExecutionStatus};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persist documents, stages, parent links, PR URLs.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: DocId) -> StoreResult<Document>;

    async fn create(
        &self,
        title: String,
        content: String,
        project: Option<String>,
        parent_id: Option<DocId>,
        stage: Option<Stage>,
    ) -> StoreResult<DocId>;

    async fn set_stage(&self, id: DocId, stage: Option<Stage>) -> StoreResult<()>;

    async fn set_pr_url(&self, id: DocId, url: String) -> StoreResult<()>;

    /// Returns documents at `stage` ordered by ascending `created_at`,
    /// ties broken by ascending id, oldest first, capped at `limit`.
    async fn list_at_stage(&self, stage: Stage, limit: usize) -> StoreResult<Vec<Document>>;

    async fn list_children(&self, parent_id: DocId) -> StoreResult<Vec<Document>>;
}

/// Persist execution rows. Records are born `running`; the store exposes
/// no join queries, callers compose.
#[async_trait]
pub trait ExecutionRecordStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn create(
        &self,
        doc_id: Option<DocId>,
        doc_title: String,
        log_file: std::path::PathBuf,
        working_dir: std::path::PathBuf,
        cascade_run_id: Option<CascadeRunId>,
    ) -> StoreResult<ExecutionId>;

    async fn set_pid(&self, id: ExecutionId, pid: u32) -> StoreResult<()>;

    async fn set_status(
        &self,
        id: ExecutionId,
        status: ExecutionStatus,
        exit_code: Option<i32>,
    ) -> StoreResult<()>;

    async fn get(&self, id: ExecutionId) -> StoreResult<ExecutionRecord>;

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<ExecutionRecord>>;

    async fn list_running(&self) -> StoreResult<Vec<ExecutionRecord>>;

    async fn list_by_cascade_run(&self, run_id: CascadeRunId) -> StoreResult<Vec<ExecutionRecord>>;
}

/// Persist cascade runs.
#[async_trait]
pub trait CascadeRunStore: Send + Sync {
    async fn create(
        &self,
        start_doc_id: DocId,
        start_stage: Stage,
        stop_stage: Stage,
    ) -> StoreResult<CascadeRunId>;

    async fn get(&self, id: CascadeRunId) -> StoreResult<CascadeRun>;

    async fn advance(&self, id: CascadeRunId, new_doc_id: DocId, new_stage: Stage)
        -> StoreResult<()>;

    async fn set_pr_url(&self, id: CascadeRunId, url: String) -> StoreResult<()>;

    async fn set_status(
        &self,
        id: CascadeRunId,
        status: CascadeRunStatus,
        error_message: Option<String>,
    ) -> StoreResult<()>;

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<CascadeRun>>;
}

/// CRUD over Agent Definitions.
#[async_trait]
pub trait AgentDefinitionStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn create(&self, def: AgentDefinition) -> StoreResult<AgentDefId>;

    async fn get(&self, id: AgentDefId) -> StoreResult<AgentDefinition>;

    async fn get_by_name(&self, name: &str) -> StoreResult<AgentDefinition>;

    /// Ordered by `category, name`; filters inactive by default.
    async fn list(&self, include_inactive: bool) -> StoreResult<Vec<AgentDefinition>>;

    async fn set_active(&self, id: AgentDefId, is_active: bool) -> StoreResult<()>;

    async fn record_usage(&self, id: AgentDefId, success: bool) -> StoreResult<()>;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
