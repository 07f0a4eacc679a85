// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay.

use crate::event::StorageEvent;
use ckb_core::{
    AgentDefId, AgentDefinition, CascadeRun, CascadeRunId, CascadeRunStatus, DocId, Document,
    ExecutionId, ExecutionRecord, ExecutionStatus, Stage,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The full in-memory state, rebuilt by replaying [`StorageEvent`]s over a
/// snapshot. Id counters are persisted here (rather than derived from
/// `HashMap::len`) so that soft-deletes and out-of-order replay never
/// reuse an id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub documents: HashMap<u64, Document>,
    pub executions: HashMap<u64, ExecutionRecord>,
    pub cascade_runs: HashMap<u64, CascadeRun>,
    pub agent_defs: HashMap<u64, AgentDefinition>,

    pub next_doc_id: u64,
    pub next_execution_id: u64,
    pub next_cascade_run_id: u64,
    pub next_agent_def_id: u64,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &StorageEvent) {
        match event {
            StorageEvent::DocumentCreated {
                id,
                title,
                content,
                project,
                parent_id,
                stage,
                created_at,
            } => {
                self.documents.insert(
                    id.get(),
                    Document {
                        id: *id,
                        title: title.clone(),
                        content: content.clone(),
                        project: project.clone(),
                        parent_id: *parent_id,
                        stage: *stage,
                        pr_url: None,
                        created_at: *created_at,
                        is_deleted: false,
                    },
                );
                self.next_doc_id = self.next_doc_id.max(id.get());
            }
            StorageEvent::DocumentStageSet { id, stage } => {
                if let Some(doc) = self.documents.get_mut(&id.get()) {
                    doc.stage = *stage;
                }
            }
            StorageEvent::DocumentPrUrlSet { id, url } => {
                if let Some(doc) = self.documents.get_mut(&id.get()) {
                    doc.pr_url = Some(url.clone());
                }
            }

            StorageEvent::ExecutionCreated {
                id,
                doc_id,
                doc_title,
                log_file,
                working_dir,
                cascade_run_id,
                started_at,
            } => {
                self.executions.insert(
                    id.get(),
                    ExecutionRecord {
                        id: *id,
                        doc_id: *doc_id,
                        doc_title: doc_title.clone(),
                        status: ExecutionStatus::Running,
                        started_at: *started_at,
                        completed_at: None,
                        log_file: log_file.clone(),
                        exit_code: None,
                        working_dir: working_dir.clone(),
                        pid: None,
                        cascade_run_id: *cascade_run_id,
                    },
                );
                self.next_execution_id = self.next_execution_id.max(id.get());
            }
            StorageEvent::ExecutionPidSet { id, pid } => {
                if let Some(record) = self.executions.get_mut(&id.get()) {
                    record.pid = Some(*pid);
                }
            }
            StorageEvent::ExecutionStatusSet {
                id,
                status,
                exit_code,
                completed_at,
            } => {
                if let Some(record) = self.executions.get_mut(&id.get()) {
                    record.status = *status;
                    record.exit_code = *exit_code;
                    record.completed_at = Some(*completed_at);
                }
            }

            StorageEvent::CascadeRunCreated {
                id,
                start_doc_id,
                start_stage,
                stop_stage,
                started_at,
            } => {
                self.cascade_runs.insert(
                    id.get(),
                    CascadeRun {
                        id: *id,
                        start_doc_id: *start_doc_id,
                        current_doc_id: *start_doc_id,
                        start_stage: *start_stage,
                        stop_stage: *stop_stage,
                        current_stage: *start_stage,
                        status: CascadeRunStatus::Running,
                        pr_url: None,
                        started_at: *started_at,
                        completed_at: None,
                        error_message: None,
                    },
                );
                self.next_cascade_run_id = self.next_cascade_run_id.max(id.get());
            }
            StorageEvent::CascadeRunAdvanced {
                id,
                doc_id,
                stage,
                completed_at,
            } => {
                if let Some(run) = self.cascade_runs.get_mut(&id.get()) {
                    run.current_doc_id = *doc_id;
                    run.current_stage = *stage;
                    if *stage == run.stop_stage {
                        run.status = CascadeRunStatus::Completed;
                        run.completed_at = *completed_at;
                    }
                }
            }
            StorageEvent::CascadeRunPrUrlSet { id, url } => {
                if let Some(run) = self.cascade_runs.get_mut(&id.get()) {
                    run.pr_url = Some(url.clone());
                }
            }
            StorageEvent::CascadeRunStatusSet {
                id,
                status,
                error_message,
                completed_at,
            } => {
                if let Some(run) = self.cascade_runs.get_mut(&id.get()) {
                    run.status = *status;
                    run.error_message = error_message.clone();
                    run.completed_at = *completed_at;
                }
            }

            StorageEvent::AgentDefCreated {
                id,
                name,
                display_name,
                description,
                category,
                system_prompt,
                user_prompt_template,
                allowed_tools,
                max_context_docs,
                timeout_seconds,
                output_tags,
            } => {
                self.agent_defs.insert(
                    id.get(),
                    AgentDefinition {
                        id: *id,
                        name: name.clone(),
                        display_name: display_name.clone(),
                        description: description.clone(),
                        category: category.clone(),
                        system_prompt: system_prompt.clone(),
                        user_prompt_template: user_prompt_template.clone(),
                        allowed_tools: allowed_tools.clone(),
                        max_context_docs: *max_context_docs,
                        timeout_seconds: *timeout_seconds,
                        output_tags: output_tags.clone(),
                        is_active: true,
                        usage_count: 0,
                        success_count: 0,
                        failure_count: 0,
                        last_used_at: None,
                    },
                );
                self.next_agent_def_id = self.next_agent_def_id.max(id.get());
            }
            StorageEvent::AgentDefActiveSet { id, is_active } => {
                if let Some(def) = self.agent_defs.get_mut(&id.get()) {
                    def.is_active = *is_active;
                }
            }
            StorageEvent::AgentDefUsageRecorded { id, success, at } => {
                if let Some(def) = self.agent_defs.get_mut(&id.get()) {
                    def.record_usage(*success, *at);
                }
            }
        }
    }

    pub fn get_document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(&id.get())
    }

    pub fn get_execution(&self, id: ExecutionId) -> Option<&ExecutionRecord> {
        self.executions.get(&id.get())
    }

    pub fn get_cascade_run(&self, id: CascadeRunId) -> Option<&CascadeRun> {
        self.cascade_runs.get(&id.get())
    }

    pub fn get_agent_def(&self, id: AgentDefId) -> Option<&AgentDefinition> {
        self.agent_defs.get(&id.get())
    }

    pub fn documents_at_stage(&self, stage: Stage) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self
            .documents
            .values()
            .filter(|d| !d.is_deleted && d.stage == Some(stage))
            .collect();
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.get().cmp(&b.id.get())));
        docs
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
