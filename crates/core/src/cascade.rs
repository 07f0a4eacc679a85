// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cascade runs: one traversal of the fixed stage pipeline, grouping the
//! executions that produced it. Modeled after the teacher's step-history
//! pipeline state machine, narrowed to the five fixed cascade stages.

use crate::define_id;
use crate::document::{DocId, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

define_id! {
    /// Identity of a [`CascadeRun`].
    pub struct CascadeRunId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeRunStatus {
    Running,
    Completed,
    Failed,
    Paused,
    Cancelled,
}

impl CascadeRunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CascadeRunStatus::Completed | CascadeRunStatus::Failed | CascadeRunStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeRun {
    pub id: CascadeRunId,
    pub start_doc_id: DocId,
    pub current_doc_id: DocId,
    pub start_stage: Stage,
    pub stop_stage: Stage,
    pub current_stage: Stage,
    pub status: CascadeRunStatus,
    pub pr_url: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl CascadeRun {
    pub fn new(
        id: CascadeRunId,
        start_doc_id: DocId,
        start_stage: Stage,
        stop_stage: Stage,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            start_doc_id,
            current_doc_id: start_doc_id,
            start_stage,
            stop_stage,
            current_stage: start_stage,
            status: CascadeRunStatus::Running,
            pr_url: None,
            started_at: now,
            completed_at: None,
            error_message: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Advance to the next stage after a successful stage transition,
    /// marking the run `completed` once `current_stage` reaches `stop_stage`.
    pub fn advance(&mut self, new_doc_id: DocId, new_stage: Stage, now: DateTime<Utc>) {
        self.current_doc_id = new_doc_id;
        self.current_stage = new_stage;
        if new_stage == self.stop_stage {
            self.status = CascadeRunStatus::Completed;
            self.completed_at = Some(now);
        }
    }

    pub fn fail(&mut self, error_message: impl Into<String>, now: DateTime<Utc>) {
        self.status = CascadeRunStatus::Failed;
        self.error_message = Some(error_message.into());
        self.completed_at = Some(now);
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.status = CascadeRunStatus::Cancelled;
        self.completed_at = Some(now);
    }
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod tests;
