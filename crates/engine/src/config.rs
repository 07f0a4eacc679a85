// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ambient configuration for the Execution Engine, Zombie Reconciler, and
//! Cascade Engine. Mirrors `ckb-adapters::env`'s override pattern —
//! `CKB_*` environment variables with hardcoded fallbacks — for the knobs
//! that belong to this crate rather than the adapters layer.

use std::path::PathBuf;
use std::time::Duration;

/// Timeout for ordinary cascade stages (idea→prompt, prompt→analyzed,
/// analyzed→planned): 5 minutes.
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 300;

/// Timeout for the `planned→done` transition, which does real
/// implementation work rather than analysis: 30 minutes.
pub const IMPLEMENTATION_TIMEOUT_SECS: u64 = 1800;

/// How often the Cascade Engine's completion monitor polls a detached
/// execution's log file for a terminal marker.
pub const COMPLETION_POLL_SECS: u64 = 2;

pub const DEFAULT_AGENT_BINARY: &str = "claude";

/// Ambient configuration, loadable from the environment with documented
/// fallbacks. Cheap to clone; held by value in both `ExecutionEngine` and
/// `CascadeEngine`.
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    pub logs_dir: PathBuf,
    /// Working directory handed to every spawned execution. Cascade
    /// stages operate on document content passed in the prompt, not a
    /// code checkout, so every execution shares one scratch directory.
    pub work_dir: PathBuf,
    pub reconcile_interval: Duration,
    pub reconcile_grace: Duration,
    pub default_stage_timeout: Duration,
    pub implementation_timeout: Duration,
    pub completion_poll_interval: Duration,
    pub agent_binary: String,
}

impl CascadeConfig {
    /// Load from `CKB_*` environment variables, falling back to the
    /// constants above. Shared knobs (`logs_dir`, the reconciler's sweep
    /// interval and grace window) are read through `ckb_adapters::env` so
    /// both crates agree on one source of truth.
    pub fn from_env() -> Self {
        Self {
            logs_dir: ckb_adapters::env::logs_dir(),
            work_dir: ckb_adapters::env::ckb_home().join("work"),
            reconcile_interval: ckb_adapters::env::reconcile_interval_ms(),
            reconcile_grace: ckb_adapters::env::reconcile_grace_ms(),
            default_stage_timeout: parse_secs_env("CKB_DEFAULT_TIMEOUT_SECS")
                .unwrap_or(Duration::from_secs(DEFAULT_STAGE_TIMEOUT_SECS)),
            implementation_timeout: parse_secs_env("CKB_IMPLEMENTATION_TIMEOUT_SECS")
                .unwrap_or(Duration::from_secs(IMPLEMENTATION_TIMEOUT_SECS)),
            completion_poll_interval: parse_secs_env("CKB_COMPLETION_POLL_SECS")
                .unwrap_or(Duration::from_secs(COMPLETION_POLL_SECS)),
            agent_binary: std::env::var("CKB_AGENT_BINARY")
                .unwrap_or_else(|_| DEFAULT_AGENT_BINARY.to_string()),
        }
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_secs_env(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
