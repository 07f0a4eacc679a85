// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution Engine: the façade that creates an [`ExecutionRecord`], hands
//! the command to the Process Supervisor, and either waits for completion
//! (`execute_sync`) or returns immediately with a handle the caller polls
//! later (`execute_detached`). Grounded in the teacher's `Executor::execute`
//! (tracing-span-wrapped effect dispatch, elapsed-time logging) and
//! `spawn.rs` (building the command/env before handing off to the
//! supervisor), reshaped around cascadekb's wrapper-mediated detached
//! spawn instead of a tmux session.

use crate::config::CascadeConfig;
use crate::error::{EngineError, EngineResult};
use crate::{liveness, log_paths, terminal};
use ckb_adapters::SpawnRequest;
use ckb_core::{CascadeError, CascadeRunId, Clock, DocId, ExecutionId, ExecutionRecordStore, ExecutionStatus};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Everything the Execution Engine needs to spawn and track one
/// invocation of the external AI binary.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub doc_id: Option<DocId>,
    pub doc_title: String,
    pub prompt: String,
    pub allowed_tools: Vec<String>,
    pub model: Option<String>,
    pub timeout: Duration,
    pub cascade_run_id: Option<CascadeRunId>,
    pub working_dir: PathBuf,
    pub extra_env: Vec<(String, String)>,
    /// Appended to the prompt verbatim, asking the agent to save its
    /// result and report back an id/URL the Output Parser can recover
    /// from the log. Cascade stages leave this `None` — their output is
    /// the literal next-stage document content, no save-and-report round
    /// trip needed. Ad hoc agent invocations set it so a result can be
    /// reunited with its caller without piping subprocess stdout into the
    /// store directly.
    pub output_instruction: Option<String>,
}

/// Outcome of a synchronous execution: the caller already knows whether
/// it succeeded and can read the output immediately.
#[derive(Debug, Clone)]
pub struct SyncExecutionResult {
    pub execution_id: ExecutionId,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub log_file: PathBuf,
    /// Raw contents of the log file, for output extraction by the caller.
    pub log_text: String,
}

/// A live execution the caller chose not to wait for. The Cascade Engine's
/// completion monitor (or the CLI's `cascade status`) polls it later.
#[derive(Debug, Clone)]
pub struct DetachedHandle {
    pub execution_id: ExecutionId,
    pub pid: u32,
    pub log_file: PathBuf,
}

/// Façade over the Process Supervisor, adding record bookkeeping and two
/// completion strategies. Generic over any store implementing
/// [`ExecutionRecordStore`] — the real WAL-backed `Database` in
/// production, `ckb_storage::test_support::FakeStore` in tests.
pub struct ExecutionEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: CascadeConfig,
    log_nonce: AtomicU64,
}

impl<S> ExecutionEngine<S>
where
    S: ExecutionRecordStore,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: CascadeConfig) -> Self {
        let seed = clock.epoch_ms().unsigned_abs();
        Self { store, clock, config, log_nonce: AtomicU64::new(seed) }
    }

    fn effective_prompt(&self, cfg: &ExecutionConfig) -> String {
        match &cfg.output_instruction {
            Some(instruction) => format!("{}\n\n{}", cfg.prompt, instruction),
            None => cfg.prompt.clone(),
        }
    }

    fn build_command(&self, cfg: &ExecutionConfig) -> Vec<String> {
        let mut cmd = vec![
            self.config.agent_binary.clone(),
            "-p".to_string(),
            self.effective_prompt(cfg),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
        ];
        if !cfg.allowed_tools.is_empty() {
            cmd.push("--allowedTools".to_string());
            cmd.push(cfg.allowed_tools.join(","));
        }
        if let Some(model) = &cfg.model {
            cmd.push("--model".to_string());
            cmd.push(model.clone());
        }
        cmd
    }

    async fn spawn(&self, cfg: &ExecutionConfig) -> EngineResult<(ExecutionId, PathBuf, u32)> {
        let nonce = self.log_nonce.fetch_add(1, Ordering::Relaxed);
        let log_file = log_paths::execution_log_path(&self.config.logs_dir, nonce);

        let execution_id = self
            .store
            .create(
                cfg.doc_id,
                cfg.doc_title.clone(),
                log_file.clone(),
                cfg.working_dir.clone(),
                cfg.cascade_run_id,
            )
            .await?;

        let req = SpawnRequest {
            execution_id: execution_id.get(),
            cmd: self.build_command(cfg),
            log_file: log_file.clone(),
            working_dir: cfg.working_dir.clone(),
            env: cfg.extra_env.clone(),
            required_binaries: Vec::new(),
        };

        let pid = match ckb_adapters::spawn_detached(req) {
            Ok(pid) => pid,
            Err(e) => {
                self.store
                    .set_status(execution_id, ExecutionStatus::Failed, Some(-1))
                    .await?;
                return Err(EngineError::Cascade(e));
            }
        };

        self.store.set_pid(execution_id, pid).await?;
        Ok((execution_id, log_file, pid))
    }

    /// Spawn and poll until the process reports a terminal marker or
    /// `cfg.timeout` elapses, whichever comes first. On timeout, the
    /// process is killed and the record marked failed.
    pub async fn execute_sync(&self, cfg: ExecutionConfig) -> EngineResult<SyncExecutionResult> {
        let span = tracing::info_span!("execute_sync", doc_title = %cfg.doc_title);
        let _guard = span.enter();
        let start = std::time::Instant::now();

        let (execution_id, log_file, pid) = self.spawn(&cfg).await?;
        let deadline = start + cfg.timeout;
        let mut poll = tokio::time::interval(Duration::from_millis(300));

        let state = loop {
            poll.tick().await;
            let state = terminal::scan(&log_file);
            if state.has_stopped() {
                break state;
            }
            if std::time::Instant::now() >= deadline {
                liveness::kill_best_effort(pid).await;
                self.store
                    .set_status(execution_id, ExecutionStatus::Failed, Some(-1))
                    .await?;
                tracing::warn!(execution_id = %execution_id, timeout_s = cfg.timeout.as_secs(), "execute_sync: deadline exceeded");
                return Err(EngineError::Cascade(CascadeError::Timeout(cfg.timeout)));
            }
        };

        let exit_code = state.exit_code;
        let success = exit_code == Some(0) && !state.is_error;
        self.store
            .set_status(
                execution_id,
                if success { ExecutionStatus::Completed } else { ExecutionStatus::Failed },
                exit_code.or(Some(-1)),
            )
            .await?;

        tracing::info!(
            execution_id = %execution_id,
            success,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "execute_sync: finished"
        );

        let log_text = std::fs::read_to_string(&log_file).unwrap_or_default();

        Ok(SyncExecutionResult { execution_id, success, exit_code, log_file, log_text })
    }

    /// Spawn and return immediately without waiting for completion.
    pub async fn execute_detached(&self, cfg: ExecutionConfig) -> EngineResult<DetachedHandle> {
        let span = tracing::info_span!("execute_detached", doc_title = %cfg.doc_title);
        let _guard = span.enter();
        let (execution_id, log_file, pid) = self.spawn(&cfg).await?;
        tracing::info!(execution_id = %execution_id, pid, "execute_detached: spawned");
        Ok(DetachedHandle { execution_id, pid, log_file })
    }
}

#[cfg(test)]
#[path = "execution_engine_tests.rs"]
mod tests;
