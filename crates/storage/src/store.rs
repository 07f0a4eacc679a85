// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Database`: the durable, WAL-backed implementation of every `ckb-core`
//! store trait. A single writer lock around [`MaterializedState`] serializes
//! mutations; each one is appended to the WAL, flushed, applied to state,
//! and (every [`CHECKPOINT_INTERVAL`] writes) folded into a background
//! zstd-compressed snapshot so the WAL can be truncated.

use crate::checkpoint::{load_snapshot, Checkpointer};
use crate::event::StorageEvent;
use crate::state::MaterializedState;
use crate::wal::Wal;
use async_trait::async_trait;
use chrono::Utc;
use ckb_core::{
    AgentDefId, AgentDefinition, AgentDefinitionStore, CascadeRun, CascadeRunId, CascadeRunStatus,
    CascadeRunStore, DocId, Document, DocumentStore, ExecutionId, ExecutionRecord,
    ExecutionRecordStore, ExecutionStatus, Stage, StoreError, StoreResult,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Number of durable writes between background checkpoints.
const CHECKPOINT_INTERVAL: u64 = 200;

struct Inner {
    state: MaterializedState,
    wal: Wal,
    checkpointer: Checkpointer,
    writes_since_checkpoint: u64,
}

/// Embedded, crash-safe store for every cascadekb entity.
///
/// Opens (or creates) a snapshot + WAL pair under `data_dir`, replays any
/// WAL entries past the snapshot's sequence, and serializes all further
/// mutations through a single in-process lock (there is exactly one writer:
/// this process; spec §5 calls this "a single embedded relational database").
pub struct Database {
    inner: Mutex<Inner>,
}

fn io_err<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Io(e.to_string())
}

impl Database {
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let snapshot_path = data_dir.join("snapshot.json");
        let wal_path = data_dir.join("wal").join("events.wal");

        let loaded = load_snapshot(&snapshot_path).map_err(io_err)?;
        let (state, seq) = match loaded {
            Some(snapshot) => (snapshot.state, snapshot.seq),
            None => (MaterializedState::new(), 0),
        };

        let mut wal = Wal::open(&wal_path, seq).map_err(io_err)?;
        let mut state = state;
        for entry in wal.entries_after(seq).map_err(io_err)? {
            state.apply(&entry.event);
            wal.mark_processed(entry.seq);
        }

        let checkpointer = Checkpointer::new(snapshot_path);

        Ok(Self {
            inner: Mutex::new(Inner {
                state,
                wal,
                checkpointer,
                writes_since_checkpoint: 0,
            }),
        })
    }

    /// Force a synchronous checkpoint and WAL truncation. Used on shutdown.
    pub fn checkpoint_now(&self) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let seq = inner.wal.processed_seq();
        let result = inner
            .checkpointer
            .checkpoint_sync(seq, &inner.state)
            .map_err(io_err)?;
        inner.wal.truncate_before(result.seq).map_err(io_err)?;
        inner.writes_since_checkpoint = 0;
        Ok(())
    }

    fn commit(&self, event: StorageEvent) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let seq = inner.wal.append(&event).map_err(io_err)?;
        inner.wal.flush().map_err(io_err)?;
        inner.state.apply(&event);
        inner.wal.mark_processed(seq);
        inner.writes_since_checkpoint += 1;

        if inner.writes_since_checkpoint >= CHECKPOINT_INTERVAL {
            let handle = inner.checkpointer.start(seq, &inner.state);
            if let Ok(result) = handle.wait() {
                let _ = inner.wal.truncate_before(result.seq);
            }
            inner.writes_since_checkpoint = 0;
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn get(&self, id: DocId) -> StoreResult<Document> {
        let inner = self.inner.lock();
        inner
            .state
            .get_document(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))
    }

    async fn create(
        &self,
        title: String,
        content: String,
        project: Option<String>,
        parent_id: Option<DocId>,
        stage: Option<Stage>,
    ) -> StoreResult<DocId> {
        let id = {
            let inner = self.inner.lock();
            DocId::new(inner.state.next_doc_id + 1)
        };
        self.commit(StorageEvent::DocumentCreated {
            id,
            title,
            content,
            project,
            parent_id,
            stage,
            created_at: Utc::now(),
        })?;
        Ok(id)
    }

    async fn set_stage(&self, id: DocId, stage: Option<Stage>) -> StoreResult<()> {
        self.commit(StorageEvent::DocumentStageSet { id, stage })
    }

    async fn set_pr_url(&self, id: DocId, url: String) -> StoreResult<()> {
        self.commit(StorageEvent::DocumentPrUrlSet { id, url })
    }

    async fn list_at_stage(&self, stage: Stage, limit: usize) -> StoreResult<Vec<Document>> {
        let inner = self.inner.lock();
        Ok(inner
            .state
            .documents_at_stage(stage)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_children(&self, parent_id: DocId) -> StoreResult<Vec<Document>> {
        let inner = self.inner.lock();
        let mut children: Vec<Document> = inner
            .state
            .documents
            .values()
            .filter(|d| !d.is_deleted && d.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(children)
    }
}

#[async_trait]
impl ExecutionRecordStore for Database {
    async fn create(
        &self,
        doc_id: Option<DocId>,
        doc_title: String,
        log_file: PathBuf,
        working_dir: PathBuf,
        cascade_run_id: Option<CascadeRunId>,
    ) -> StoreResult<ExecutionId> {
        let id = {
            let inner = self.inner.lock();
            ExecutionId::new(inner.state.next_execution_id + 1)
        };
        self.commit(StorageEvent::ExecutionCreated {
            id,
            doc_id,
            doc_title,
            log_file,
            working_dir,
            cascade_run_id,
            started_at: Utc::now(),
        })?;
        Ok(id)
    }

    async fn set_pid(&self, id: ExecutionId, pid: u32) -> StoreResult<()> {
        self.commit(StorageEvent::ExecutionPidSet { id, pid })
    }

    async fn set_status(
        &self,
        id: ExecutionId,
        status: ExecutionStatus,
        exit_code: Option<i32>,
    ) -> StoreResult<()> {
        self.commit(StorageEvent::ExecutionStatusSet {
            id,
            status,
            exit_code,
            completed_at: Utc::now(),
        })
    }

    async fn get(&self, id: ExecutionId) -> StoreResult<ExecutionRecord> {
        let inner = self.inner.lock();
        inner
            .state
            .get_execution(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("execution {id}")))
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<ExecutionRecord>> {
        let inner = self.inner.lock();
        let mut records: Vec<ExecutionRecord> = inner.state.executions.values().cloned().collect();
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn list_running(&self) -> StoreResult<Vec<ExecutionRecord>> {
        let inner = self.inner.lock();
        Ok(inner
            .state
            .executions
            .values()
            .filter(|r| r.status == ExecutionStatus::Running)
            .cloned()
            .collect())
    }

    async fn list_by_cascade_run(&self, run_id: CascadeRunId) -> StoreResult<Vec<ExecutionRecord>> {
        let inner = self.inner.lock();
        let mut records: Vec<ExecutionRecord> = inner
            .state
            .executions
            .values()
            .filter(|r| r.cascade_run_id == Some(run_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(records)
    }
}

#[async_trait]
impl CascadeRunStore for Database {
    async fn create(
        &self,
        start_doc_id: DocId,
        start_stage: Stage,
        stop_stage: Stage,
    ) -> StoreResult<CascadeRunId> {
        let id = {
            let inner = self.inner.lock();
            CascadeRunId::new(inner.state.next_cascade_run_id + 1)
        };
        self.commit(StorageEvent::CascadeRunCreated {
            id,
            start_doc_id,
            start_stage,
            stop_stage,
            started_at: Utc::now(),
        })?;
        Ok(id)
    }

    async fn get(&self, id: CascadeRunId) -> StoreResult<CascadeRun> {
        let inner = self.inner.lock();
        inner
            .state
            .get_cascade_run(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("cascade run {id}")))
    }

    async fn advance(
        &self,
        id: CascadeRunId,
        new_doc_id: DocId,
        new_stage: Stage,
    ) -> StoreResult<()> {
        let completed_at = {
            let inner = self.inner.lock();
            let run = inner
                .state
                .get_cascade_run(id)
                .ok_or_else(|| StoreError::NotFound(format!("cascade run {id}")))?;
            (new_stage == run.stop_stage).then(Utc::now)
        };
        self.commit(StorageEvent::CascadeRunAdvanced {
            id,
            doc_id: new_doc_id,
            stage: new_stage,
            completed_at,
        })
    }

    async fn set_pr_url(&self, id: CascadeRunId, url: String) -> StoreResult<()> {
        self.commit(StorageEvent::CascadeRunPrUrlSet { id, url })
    }

    async fn set_status(
        &self,
        id: CascadeRunId,
        status: CascadeRunStatus,
        error_message: Option<String>,
    ) -> StoreResult<()> {
        let completed_at = status.is_terminal().then(Utc::now);
        self.commit(StorageEvent::CascadeRunStatusSet {
            id,
            status,
            error_message,
            completed_at,
        })
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<CascadeRun>> {
        let inner = self.inner.lock();
        let mut runs: Vec<CascadeRun> = inner.state.cascade_runs.values().cloned().collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(limit);
        Ok(runs)
    }
}

#[async_trait]
impl AgentDefinitionStore for Database {
    async fn create(&self, def: AgentDefinition) -> StoreResult<AgentDefId> {
        let id = {
            let inner = self.inner.lock();
            AgentDefId::new(inner.state.next_agent_def_id + 1)
        };
        if self.get_by_name(&def.name).await.is_ok() {
            return Err(StoreError::AlreadyExists(format!(
                "agent definition named {}",
                def.name
            )));
        }
        self.commit(StorageEvent::AgentDefCreated {
            id,
            name: def.name,
            display_name: def.display_name,
            description: def.description,
            category: def.category,
            system_prompt: def.system_prompt,
            user_prompt_template: def.user_prompt_template,
            allowed_tools: def.allowed_tools,
            max_context_docs: def.max_context_docs,
            timeout_seconds: def.timeout_seconds,
            output_tags: def.output_tags,
        })?;
        Ok(id)
    }

    async fn get(&self, id: AgentDefId) -> StoreResult<AgentDefinition> {
        let inner = self.inner.lock();
        inner
            .state
            .get_agent_def(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("agent definition {id}")))
    }

    async fn get_by_name(&self, name: &str) -> StoreResult<AgentDefinition> {
        let inner = self.inner.lock();
        inner
            .state
            .agent_defs
            .values()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("agent definition named {name}")))
    }

    async fn list(&self, include_inactive: bool) -> StoreResult<Vec<AgentDefinition>> {
        let inner = self.inner.lock();
        let mut defs: Vec<AgentDefinition> = inner
            .state
            .agent_defs
            .values()
            .filter(|d| include_inactive || d.is_active)
            .cloned()
            .collect();
        defs.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)));
        Ok(defs)
    }

    async fn set_active(&self, id: AgentDefId, is_active: bool) -> StoreResult<()> {
        self.commit(StorageEvent::AgentDefActiveSet { id, is_active })
    }

    async fn record_usage(&self, id: AgentDefId, success: bool) -> StoreResult<()> {
        self.commit(StorageEvent::AgentDefUsageRecorded {
            id,
            success,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
