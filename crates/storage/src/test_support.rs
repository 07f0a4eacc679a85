// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fake stores for engine/adapter unit tests, mirroring the
//! teacher's `Fake*` test doubles: same trait surface as `Database`, no
//! filesystem, no WAL, so call sites can be exercised without a temp dir.

use async_trait::async_trait;
use chrono::Utc;
use ckb_core::{
    AgentDefId, AgentDefinition, AgentDefinitionStore, CascadeRun, CascadeRunId, CascadeRunStatus,
    CascadeRunStore, DocId, Document, DocumentStore, ExecutionId, ExecutionRecord,
    ExecutionRecordStore, ExecutionStatus, Stage, StoreError, StoreResult,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory store implementing every cascadekb store trait.
#[derive(Default)]
pub struct FakeStore {
    documents: Mutex<HashMap<u64, Document>>,
    executions: Mutex<HashMap<u64, ExecutionRecord>>,
    cascade_runs: Mutex<HashMap<u64, CascadeRun>>,
    agent_defs: Mutex<HashMap<u64, AgentDefinition>>,
    next_doc_id: Mutex<u64>,
    next_execution_id: Mutex<u64>,
    next_cascade_run_id: Mutex<u64>,
    next_agent_def_id: Mutex<u64>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(counter: &Mutex<u64>) -> u64 {
        let mut guard = counter.lock();
        *guard += 1;
        *guard
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn get(&self, id: DocId) -> StoreResult<Document> {
        self.documents
            .lock()
            .get(&id.get())
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
        let id = DocId::new(Self::next(&self.next_doc_id));
        self.documents.lock().insert(
            id.get(),
            Document {
                id,
                title,
                content,
                project,
                parent_id,
                stage,
                pr_url: None,
                created_at: Utc::now(),
                is_deleted: false,
            },
        );
        Ok(id)
    }

    async fn set_stage(&self, id: DocId, stage: Option<Stage>) -> StoreResult<()> {
        let mut docs = self.documents.lock();
        let doc = docs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))?;
        doc.stage = stage;
        Ok(())
    }

    async fn set_pr_url(&self, id: DocId, url: String) -> StoreResult<()> {
        let mut docs = self.documents.lock();
        let doc = docs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))?;
        doc.pr_url = Some(url);
        Ok(())
    }

    async fn list_at_stage(&self, stage: Stage, limit: usize) -> StoreResult<Vec<Document>> {
        let docs = self.documents.lock();
        let mut matching: Vec<Document> = docs
            .values()
            .filter(|d| !d.is_deleted && d.stage == Some(stage))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn list_children(&self, parent_id: DocId) -> StoreResult<Vec<Document>> {
        let docs = self.documents.lock();
        let mut children: Vec<Document> = docs
            .values()
            .filter(|d| !d.is_deleted && d.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(children)
    }
}

#[async_trait]
impl ExecutionRecordStore for FakeStore {
    async fn create(
        &self,
        doc_id: Option<DocId>,
        doc_title: String,
        log_file: PathBuf,
        working_dir: PathBuf,
        cascade_run_id: Option<CascadeRunId>,
    ) -> StoreResult<ExecutionId> {
        let id = ExecutionId::new(Self::next(&self.next_execution_id));
        self.executions.lock().insert(
            id.get(),
            ExecutionRecord {
                id,
                doc_id,
                doc_title,
                status: ExecutionStatus::Running,
                started_at: Utc::now(),
                completed_at: None,
                log_file,
                exit_code: None,
                working_dir,
                pid: None,
                cascade_run_id,
            },
        );
        Ok(id)
    }

    async fn set_pid(&self, id: ExecutionId, pid: u32) -> StoreResult<()> {
        let mut execs = self.executions.lock();
        let record = execs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("execution {id}")))?;
        record.pid = Some(pid);
        Ok(())
    }

    async fn set_status(
        &self,
        id: ExecutionId,
        status: ExecutionStatus,
        exit_code: Option<i32>,
    ) -> StoreResult<()> {
        let mut execs = self.executions.lock();
        let record = execs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("execution {id}")))?;
        record.status = status;
        record.exit_code = exit_code;
        record.completed_at = Some(Utc::now());
        Ok(())
    }

    async fn get(&self, id: ExecutionId) -> StoreResult<ExecutionRecord> {
        self.executions
            .lock()
            .get(&id.get())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("execution {id}")))
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<ExecutionRecord>> {
        let execs = self.executions.lock();
        let mut records: Vec<ExecutionRecord> = execs.values().cloned().collect();
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn list_running(&self) -> StoreResult<Vec<ExecutionRecord>> {
        let execs = self.executions.lock();
        Ok(execs
            .values()
            .filter(|r| r.status == ExecutionStatus::Running)
            .cloned()
            .collect())
    }

    async fn list_by_cascade_run(&self, run_id: CascadeRunId) -> StoreResult<Vec<ExecutionRecord>> {
        let execs = self.executions.lock();
        let mut records: Vec<ExecutionRecord> = execs
            .values()
            .filter(|r| r.cascade_run_id == Some(run_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(records)
    }
}

#[async_trait]
impl CascadeRunStore for FakeStore {
    async fn create(
        &self,
        start_doc_id: DocId,
        start_stage: Stage,
        stop_stage: Stage,
    ) -> StoreResult<CascadeRunId> {
        let id = CascadeRunId::new(Self::next(&self.next_cascade_run_id));
        self.cascade_runs.lock().insert(
            id.get(),
            CascadeRun {
                id,
                start_doc_id,
                current_doc_id: start_doc_id,
                start_stage,
                stop_stage,
                current_stage: start_stage,
                status: CascadeRunStatus::Running,
                pr_url: None,
                started_at: Utc::now(),
                completed_at: None,
                error_message: None,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: CascadeRunId) -> StoreResult<CascadeRun> {
        self.cascade_runs
            .lock()
            .get(&id.get())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("cascade run {id}")))
    }

    async fn advance(
        &self,
        id: CascadeRunId,
        new_doc_id: DocId,
        new_stage: Stage,
    ) -> StoreResult<()> {
        let mut runs = self.cascade_runs.lock();
        let run = runs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("cascade run {id}")))?;
        run.current_doc_id = new_doc_id;
        run.current_stage = new_stage;
        if new_stage == run.stop_stage {
            run.status = CascadeRunStatus::Completed;
            run.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_pr_url(&self, id: CascadeRunId, url: String) -> StoreResult<()> {
        let mut runs = self.cascade_runs.lock();
        let run = runs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("cascade run {id}")))?;
        run.pr_url = Some(url);
        Ok(())
    }

    async fn set_status(
        &self,
        id: CascadeRunId,
        status: CascadeRunStatus,
        error_message: Option<String>,
    ) -> StoreResult<()> {
        let mut runs = self.cascade_runs.lock();
        let run = runs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("cascade run {id}")))?;
        run.status = status;
        run.error_message = error_message;
        if status.is_terminal() {
            run.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<CascadeRun>> {
        let runs = self.cascade_runs.lock();
        let mut out: Vec<CascadeRun> = runs.values().cloned().collect();
        out.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl AgentDefinitionStore for FakeStore {
    async fn create(&self, def: AgentDefinition) -> StoreResult<AgentDefId> {
        if self.get_by_name(&def.name).await.is_ok() {
            return Err(StoreError::AlreadyExists(format!(
                "agent definition named {}",
                def.name
            )));
        }
        let id = AgentDefId::new(Self::next(&self.next_agent_def_id));
        self.agent_defs.lock().insert(id.get(), AgentDefinition { id, ..def });
        Ok(id)
    }

    async fn get(&self, id: AgentDefId) -> StoreResult<AgentDefinition> {
        self.agent_defs
            .lock()
            .get(&id.get())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("agent definition {id}")))
    }

    async fn get_by_name(&self, name: &str) -> StoreResult<AgentDefinition> {
        self.agent_defs
            .lock()
            .values()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("agent definition named {name}")))
    }

    async fn list(&self, include_inactive: bool) -> StoreResult<Vec<AgentDefinition>> {
        let defs = self.agent_defs.lock();
        let mut out: Vec<AgentDefinition> = defs
            .values()
            .filter(|d| include_inactive || d.is_active)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)));
        Ok(out)
    }

    async fn set_active(&self, id: AgentDefId, is_active: bool) -> StoreResult<()> {
        let mut defs = self.agent_defs.lock();
        let def = defs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("agent definition {id}")))?;
        def.is_active = is_active;
        Ok(())
    }

    async fn record_usage(&self, id: AgentDefId, success: bool) -> StoreResult<()> {
        let mut defs = self.agent_defs.lock();
        let def = defs
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("agent definition {id}")))?;
        def.record_usage(success, Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_store_round_trips_a_document() {
        let store = FakeStore::new();
        let id = DocumentStore::create(&store, "T".into(), "C".into(), None, None, Some(Stage::Idea))
            .await
            .unwrap();
        let doc = DocumentStore::get(&store, id).await.unwrap();
        assert_eq!(doc.title, "T");
    }

    #[tokio::test]
    async fn fake_store_rejects_duplicate_agent_names() {
        let store = FakeStore::new();
        let def = AgentDefinition {
            id: AgentDefId::new(0),
            name: "planner".into(),
            display_name: "Planner".into(),
            description: "".into(),
            category: "plan".into(),
            system_prompt: "".into(),
            user_prompt_template: "".into(),
            allowed_tools: Default::default(),
            max_context_docs: 1,
            timeout_seconds: 60,
            output_tags: vec![],
            is_active: true,
            usage_count: 0,
            success_count: 0,
            failure_count: 0,
            last_used_at: None,
        };
        AgentDefinitionStore::create(&store, def.clone()).await.unwrap();
        let err = AgentDefinitionStore::create(&store, def).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }
}
