// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent definitions: reusable, stored configurations for an execution
//! (prompt template, allowed tool list, timeout). Grounded in the
//! teacher's runbook-style agent config but reshaped into a CRUD-able
//! store entity with a usage-counter lifecycle, per spec.

use crate::define_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

define_id! {
    /// Identity of an [`AgentDefinition`].
    pub struct AgentDefId;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: AgentDefId,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub system_prompt: String,
    /// Template with `{{var}}` placeholders.
    pub user_prompt_template: String,
    pub allowed_tools: BTreeSet<String>,
    pub max_context_docs: u32,
    pub timeout_seconds: u64,
    pub output_tags: Vec<String>,
    pub is_active: bool,
    pub usage_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AgentDefinition {
    pub fn record_usage(&mut self, success: bool, now: DateTime<Utc>) {
        self.usage_count += 1;
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        self.last_used_at = Some(now);
    }

    /// Substitute `{{var}}` placeholders in the user prompt template.
    /// Unresolved placeholders are left verbatim.
    pub fn render_prompt(&self, vars: &std::collections::HashMap<String, String>) -> String {
        let mut rendered = self.user_prompt_template.clone();
        for (key, value) in vars {
            rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
        }
        rendered
    }
}

#[cfg(test)]
#[path = "agent_def_tests.rs"]
mod tests;
