// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Zombie Reconciler: periodically sweeps `running` execution records,
//! reclaiming ones whose process has died without writing a terminal log
//! marker (a true zombie) and ones that have outlived the longest
//! configured timeout as a conservative backstop — the store's
//! `executions` schema carries no per-record timeout, so real per-stage
//! deadlines are enforced by `ExecutionEngine::execute_sync`'s own poll
//! loop and the Cascade Engine's completion monitor; this sweep only
//! catches what those miss after a restart or a lost monitor task.
//! Grounded in the teacher's `lifecycle::reconcile::reconcile_state`
//! shape — iterate non-terminal entities, probe liveness, log what was
//! reclaimed — stripped of its tmux/agent-run/event-bus machinery since
//! cascadekb reconciles one flat list of execution records directly
//! against the store.

use crate::config::CascadeConfig;
use crate::error::EngineResult;
use crate::liveness;
use ckb_core::{Clock, ExecutionRecordStore, ExecutionStatus};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Run one sweep. Returns the number of records reclaimed.
pub async fn reconcile_once<S>(
    store: &S,
    clock: &dyn Clock,
    config: &CascadeConfig,
) -> EngineResult<usize>
where
    S: ExecutionRecordStore,
{
    let running = store.list_running().await?;
    let now = clock.now();
    let grace = chrono::Duration::from_std(config.reconcile_grace).unwrap_or(chrono::Duration::zero());
    let backstop =
        chrono::Duration::from_std(config.implementation_timeout).unwrap_or(chrono::Duration::zero());

    let mut reclaimed = 0usize;
    for record in running {
        let age = now - record.started_at;

        let Some(pid) = record.pid else {
            // Spawned but never got a pid recorded — a crash between
            // `create()` and `set_pid()`. Only act once past the grace
            // window, since a legitimate spawn-in-flight looks the same.
            if age >= grace {
                store
                    .set_status(record.id, ExecutionStatus::Failed, Some(-1))
                    .await?;
                append_log_note(&record.log_file, "reconciler: no pid recorded past grace window");
                tracing::warn!(execution_id = %record.id, "reconciler: reclaimed pid-less execution");
                reclaimed += 1;
            }
            continue;
        };

        if age < grace {
            continue;
        }

        let alive = liveness::is_alive(pid).await;
        if record.is_zombie(alive) {
            store
                .set_status(record.id, ExecutionStatus::Failed, Some(-1))
                .await?;
            append_log_note(&record.log_file, "reconciler: process no longer exists");
            tracing::warn!(execution_id = %record.id, pid, "reconciler: reclaimed zombie execution");
            reclaimed += 1;
            continue;
        }

        if alive && age > backstop {
            liveness::kill_best_effort(pid).await;
            store
                .set_status(record.id, ExecutionStatus::Failed, Some(-1))
                .await?;
            append_log_note(&record.log_file, "reconciler: exceeded backstop timeout");
            tracing::warn!(execution_id = %record.id, pid, age_secs = age.num_seconds(), "reconciler: killed execution exceeding backstop timeout");
            reclaimed += 1;
        }
    }

    Ok(reclaimed)
}

/// Append a synthetic lifecycle "stop" marker so a log's tail reflects why
/// the execution ended, even though the reconciler (not the wrapper)
/// observed it. Best-effort: an unwritable log is not worth failing over.
fn append_log_note(log_file: &Path, note: &str) {
    let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(log_file) else {
        return;
    };
    let line = serde_json::json!({
        "type": "lifecycle",
        "event": "stop",
        "exit_code": -1,
        "note": note,
    });
    let _ = writeln!(file, "{line}");
}

/// Run [`reconcile_once`] on a fixed interval until the process exits.
/// Errors are logged and swallowed — a reconciler sweep never brings down
/// the process it watches over.
pub fn spawn_loop<S>(store: Arc<S>, clock: Arc<dyn Clock>, config: CascadeConfig) -> tokio::task::JoinHandle<()>
where
    S: ExecutionRecordStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.reconcile_interval);
        loop {
            interval.tick().await;
            match reconcile_once(&*store, &*clock, &config).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(reclaimed = n, "reconciler: sweep reclaimed executions"),
                Err(e) => tracing::warn!(error = %e, "reconciler: sweep failed"),
            }
        }
    })
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
