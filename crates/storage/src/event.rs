// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage events: the append-only vocabulary the write-ahead log records.
//! `MaterializedState::apply` is the single place that turns an event into
//! a state mutation, mirroring the teacher's event-sourced daemon state.

use ckb_core::{AgentDefId, CascadeRunId, CascadeRunStatus, DocId, ExecutionId, ExecutionStatus, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StorageEvent {
    DocumentCreated {
        id: DocId,
        title: String,
        content: String,
        project: Option<String>,
        parent_id: Option<DocId>,
        stage: Option<Stage>,
        created_at: DateTime<Utc>,
    },
    DocumentStageSet {
        id: DocId,
        stage: Option<Stage>,
    },
    DocumentPrUrlSet {
        id: DocId,
        url: String,
    },

    ExecutionCreated {
        id: ExecutionId,
        doc_id: Option<DocId>,
        doc_title: String,
        log_file: PathBuf,
        working_dir: PathBuf,
        cascade_run_id: Option<CascadeRunId>,
        started_at: DateTime<Utc>,
    },
    ExecutionPidSet {
        id: ExecutionId,
        pid: u32,
    },
    ExecutionStatusSet {
        id: ExecutionId,
        status: ExecutionStatus,
        exit_code: Option<i32>,
        completed_at: DateTime<Utc>,
    },

    CascadeRunCreated {
        id: CascadeRunId,
        start_doc_id: DocId,
        start_stage: Stage,
        stop_stage: Stage,
        started_at: DateTime<Utc>,
    },
    CascadeRunAdvanced {
        id: CascadeRunId,
        doc_id: DocId,
        stage: Stage,
        completed_at: Option<DateTime<Utc>>,
    },
    CascadeRunPrUrlSet {
        id: CascadeRunId,
        url: String,
    },
    CascadeRunStatusSet {
        id: CascadeRunId,
        status: CascadeRunStatus,
        error_message: Option<String>,
        completed_at: Option<DateTime<Utc>>,
    },

    AgentDefCreated {
        id: AgentDefId,
        name: String,
        display_name: String,
        description: String,
        category: String,
        system_prompt: String,
        user_prompt_template: String,
        allowed_tools: BTreeSet<String>,
        max_context_docs: u32,
        timeout_seconds: u64,
        output_tags: Vec<String>,
    },
    AgentDefActiveSet {
        id: AgentDefId,
        is_active: bool,
    },
    AgentDefUsageRecorded {
        id: AgentDefId,
        success: bool,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
