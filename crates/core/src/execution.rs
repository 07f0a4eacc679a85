// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution records: one row per invocation of the external AI binary.

use crate::cascade::CascadeRunId;
use crate::define_id;
use crate::document::DocId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

define_id! {
    /// Identity of an [`ExecutionRecord`].
    pub struct ExecutionId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

/// Derived token-usage figures extracted from a completed log's
/// `__RAW_RESULT_JSON__:` sentinel line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub total_cost_usd: f64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens
            + self.output_tokens
            + self.cache_read_input_tokens
            + self.cache_creation_input_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    pub doc_id: Option<DocId>,
    pub doc_title: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub log_file: PathBuf,
    pub exit_code: Option<i32>,
    pub working_dir: PathBuf,
    pub pid: Option<u32>,
    pub cascade_run_id: Option<CascadeRunId>,
}

impl ExecutionRecord {
    /// A record is a zombie iff it is `running`, has a recorded pid, and
    /// that pid no longer resolves to a live process. Pure predicate —
    /// callers supply the liveness probe result rather than this type
    /// reaching into the OS itself.
    pub fn is_zombie(&self, pid_is_alive: bool) -> bool {
        self.status == ExecutionStatus::Running && self.pid.is_some() && !pid_is_alive
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
