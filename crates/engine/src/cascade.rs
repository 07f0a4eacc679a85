// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cascade Engine: drives a [`Document`] through the fixed
//! `idea → prompt → analyzed → planned → done` pipeline, one stage
//! transition at a time, grouping the executions it spawns into
//! [`CascadeRun`]s. Grounded in the teacher's `runtime/pipeline.rs`
//! (stage-to-stage advancement) and `runtime/monitor.rs` (polling a
//! detached unit to completion and folding the result back into store
//! state), reshaped around cascadekb's five fixed document stages instead
//! of an open-ended step graph.

use crate::config::CascadeConfig;
use crate::error::{EngineError, EngineResult};
use crate::execution_engine::{ExecutionConfig, ExecutionEngine, SyncExecutionResult};
use crate::liveness;
use crate::terminal;
use ckb_core::{
    AgentDefId, AgentDefinitionStore, CascadeRunId, CascadeRunStatus, CascadeRunStore, Clock,
    DocId, Document, DocumentStore, ExecutionId, ExecutionRecordStore, ExecutionStatus, Stage,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Largest number of source documents `synthesize` will fold into one.
/// Not a spec-mandated cap, just a sane ceiling on one Markdown document's
/// size; `list_at_stage` already caps a single store round trip.
const SYNTHESIZE_SOURCE_LIMIT: usize = 500;

/// Outcome of [`CascadeEngine::process`].
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// No document was at the requested stage.
    NoOp,
    /// The stage transition ran synchronously and finished.
    Completed { execution_id: ExecutionId, child_doc_id: Option<DocId>, pr_url: Option<String> },
    /// The stage transition failed; the source document was left in place.
    Failed { execution_id: Option<ExecutionId>, error: String },
    /// The stage transition was spawned detached; a completion monitor is
    /// tracking it in the background.
    Spawned { execution_id: ExecutionId, log_file: PathBuf, pid: u32 },
}

/// Drives documents through the cascade pipeline on top of any store that
/// satisfies [`crate::Store`].
pub struct CascadeEngine<S> {
    store: Arc<S>,
    execution_engine: ExecutionEngine<S>,
    config: CascadeConfig,
}

impl<S> CascadeEngine<S>
where
    S: crate::Store + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: CascadeConfig) -> Self {
        let execution_engine = ExecutionEngine::new(store.clone(), clock, config.clone());
        Self { store, execution_engine, config }
    }

    /// Create the initial document at `start_stage`. When `auto`, also
    /// start a cascade run: `sync` drives it in this call until `done` or
    /// the first failure; otherwise only the first stage is spawned
    /// detached and the caller advances the rest.
    pub async fn add(
        &self,
        content: String,
        title: Option<String>,
        project: Option<String>,
        start_stage: Stage,
        stop_stage: Stage,
        auto: bool,
        sync: bool,
    ) -> EngineResult<DocId> {
        if start_stage.is_after(stop_stage) {
            return Err(EngineError::InvalidOperation(format!(
                "start stage {start_stage} is after stop stage {stop_stage}"
            )));
        }

        let title = title.unwrap_or_else(|| default_title(&content));
        let doc_id =
            DocumentStore::create(&*self.store, title, content, project, None, Some(start_stage))
                .await?;

        if !auto || start_stage.is_terminal() {
            return Ok(doc_id);
        }

        let run_id = CascadeRunStore::create(&*self.store, doc_id, start_stage, stop_stage).await?;

        if !sync {
            self.process(start_stage, Some(doc_id), false).await?;
            return Ok(doc_id);
        }

        let mut stage = start_stage;
        let mut current_doc = doc_id;
        loop {
            let result = self.process(stage, Some(current_doc), true).await?;
            let child_doc_id = match result {
                ProcessResult::Completed { child_doc_id, .. } => child_doc_id,
                _ => break,
            };
            let Some(next_stage) = stage.next() else { break };
            let Some(child_id) = child_doc_id else { break };
            current_doc = child_id;
            stage = next_stage;
            if stage == stop_stage || stage.is_terminal() {
                break;
            }
        }
        let _ = run_id;
        Ok(doc_id)
    }

    /// Advance one document through `stage`'s transition.
    ///
    /// `doc_id`, when given, must name a document currently at `stage`;
    /// otherwise the oldest document at `stage` is selected. Returns
    /// [`ProcessResult::NoOp`] if no document is found.
    pub async fn process(
        &self,
        stage: Stage,
        doc_id: Option<DocId>,
        sync: bool,
    ) -> EngineResult<ProcessResult> {
        if stage.is_terminal() {
            return Err(EngineError::InvalidOperation(format!(
                "{stage} is terminal; nothing to process"
            )));
        }

        let doc = match doc_id {
            Some(id) => {
                let doc = DocumentStore::get(&*self.store, id).await?;
                if doc.stage != Some(stage) {
                    return Err(EngineError::InvalidOperation(format!(
                        "document {id} is at stage {:?}, not {stage}",
                        doc.stage
                    )));
                }
                doc
            }
            None => {
                let mut candidates = self.store.list_at_stage(stage, 1).await?;
                match candidates.pop() {
                    Some(d) => d,
                    None => return Ok(ProcessResult::NoOp),
                }
            }
        };

        // Safe: `stage.is_terminal()` was rejected above, so both are total.
        let to_stage = stage.next().expect("next_stage is total on non-terminal stages");
        let template = stage.prompt_template().expect("prompt_template is total on non-terminal stages");
        let prompt = template.replace("{content}", &doc.content);

        let timeout = if stage == Stage::Planned {
            self.config.implementation_timeout
        } else {
            self.config.default_stage_timeout
        };

        let run_id = find_active_run_for_doc(&*self.store, doc.id).await?;

        let exec_cfg = ExecutionConfig {
            doc_id: Some(doc.id),
            doc_title: doc.title.clone(),
            prompt,
            allowed_tools: Vec::new(),
            model: None,
            timeout,
            cascade_run_id: run_id,
            working_dir: self.config.work_dir.clone(),
            extra_env: Vec::new(),
            output_instruction: None,
        };

        if sync {
            self.process_sync(exec_cfg, &doc, stage, to_stage, run_id).await
        } else {
            self.process_detached(exec_cfg, doc, stage, to_stage, timeout, run_id).await
        }
    }

    async fn process_sync(
        &self,
        exec_cfg: ExecutionConfig,
        doc: &Document,
        from_stage: Stage,
        to_stage: Stage,
        run_id: Option<CascadeRunId>,
    ) -> EngineResult<ProcessResult> {
        let result = match self.execution_engine.execute_sync(exec_cfg).await {
            Ok(r) => r,
            Err(e) => {
                if let Some(run_id) = run_id {
                    fail_run(&*self.store, run_id, format!("stage {from_stage} failed: {e}")).await?;
                }
                return Ok(ProcessResult::Failed { execution_id: None, error: e.to_string() });
            }
        };

        if !result.success {
            if let Some(run_id) = run_id {
                fail_run(
                    &*self.store,
                    run_id,
                    format!("stage {from_stage} failed, exit {:?}", result.exit_code),
                )
                .await?;
            }
            return Ok(ProcessResult::Failed {
                execution_id: Some(result.execution_id),
                error: format!("execution {} failed, exit {:?}", result.execution_id, result.exit_code),
            });
        }

        apply_stage_success(&*self.store, &*self.store, &result, doc, from_stage, to_stage, run_id).await
    }

    async fn process_detached(
        &self,
        exec_cfg: ExecutionConfig,
        doc: Document,
        from_stage: Stage,
        to_stage: Stage,
        timeout: std::time::Duration,
        run_id: Option<CascadeRunId>,
    ) -> EngineResult<ProcessResult> {
        let handle = self.execution_engine.execute_detached(exec_cfg).await?;
        let deadline = Instant::now() + timeout;
        spawn_completion_monitor(
            self.store.clone(),
            self.config.completion_poll_interval,
            doc,
            from_stage,
            to_stage,
            handle.execution_id,
            handle.log_file.clone(),
            handle.pid,
            deadline,
            run_id,
        );
        Ok(ProcessResult::Spawned {
            execution_id: handle.execution_id,
            log_file: handle.log_file,
            pid: handle.pid,
        })
    }

    /// Combine every document at `stage` into one new document at the
    /// same stage, content being the sources concatenated under
    /// document-id headers. Refused with fewer than two sources. Unless
    /// `keep`, sources are fast-forwarded to `done`.
    pub async fn synthesize(
        &self,
        stage: Stage,
        keep: bool,
        project: Option<String>,
    ) -> EngineResult<DocId> {
        let sources = self.store.list_at_stage(stage, SYNTHESIZE_SOURCE_LIMIT).await?;
        if sources.len() < 2 {
            return Err(EngineError::InvalidOperation(
                "synthesize requires at least 2 source documents".to_string(),
            ));
        }

        let mut content = String::new();
        for doc in &sources {
            content.push_str(&format!("## Document #{}: {}\n\n{}\n\n", doc.id, doc.title, doc.content));
        }
        let title = format!("Synthesis of {} documents at {stage}", sources.len());

        let synth_id =
            DocumentStore::create(&*self.store, title, content, project, None, Some(stage)).await?;

        if !keep {
            for doc in &sources {
                self.store.set_stage(doc.id, Some(Stage::Done)).await?;
            }
        }

        Ok(synth_id)
    }

    /// Move a document directly to `to` (or its natural next stage)
    /// without running any execution — the state diagram's `advance()`
    /// bypass edge, used to skip a stage's agent invocation entirely.
    pub async fn advance(&self, doc_id: DocId, to: Option<Stage>) -> EngineResult<Stage> {
        let doc = DocumentStore::get(&*self.store, doc_id).await?;
        let target = match to {
            Some(stage) => stage,
            None => doc.stage.and_then(|s| s.next()).ok_or_else(|| {
                EngineError::InvalidOperation(format!(
                    "document {doc_id} has no stage to advance from"
                ))
            })?,
        };
        DocumentStore::set_stage(&*self.store, doc_id, Some(target)).await?;
        if let Some(run_id) = find_active_run_for_doc(&*self.store, doc_id).await? {
            CascadeRunStore::advance(&*self.store, run_id, doc_id, target).await?;
        }
        Ok(target)
    }

    /// Take a document out of the cascade (`stage = None`) without
    /// deleting it — the store exposes no hard delete, and a removed
    /// document's content remains readable by id.
    pub async fn remove(&self, doc_id: DocId) -> EngineResult<()> {
        DocumentStore::set_stage(&*self.store, doc_id, None).await?;
        Ok(())
    }

    /// Run a free-form prompt with no stored Agent Definition behind it —
    /// the ad hoc `agent <prompt>` CLI shape (spec.md §6). Builds the same
    /// output-instruction mechanism `run_agent_definition` uses so a
    /// result can be recovered from the log without a stdout-to-store
    /// pipe, but records no usage counters since there is no definition
    /// to attribute the run to.
    pub async fn run_ad_hoc(
        &self,
        prompt: String,
        title: String,
        tags: Vec<String>,
        want_pr: bool,
        doc_id: Option<DocId>,
        sync: bool,
    ) -> EngineResult<ProcessResult> {
        let mut instruction =
            format!("When done, save your result (tags: {tags:?}) and report the saved document id.");
        if want_pr {
            instruction.push_str(" Also open a pull request and report its URL.");
        }

        let exec_cfg = ExecutionConfig {
            doc_id,
            doc_title: title,
            prompt,
            allowed_tools: Vec::new(),
            model: None,
            timeout: self.config.default_stage_timeout,
            cascade_run_id: None,
            working_dir: self.config.work_dir.clone(),
            extra_env: Vec::new(),
            output_instruction: Some(instruction),
        };

        if sync {
            match self.execution_engine.execute_sync(exec_cfg).await {
                Ok(r) => Ok(ProcessResult::Completed {
                    execution_id: r.execution_id,
                    child_doc_id: None,
                    pr_url: ckb_adapters::parse_log_file(&r.log_file).pr_url,
                }),
                Err(e) => Ok(ProcessResult::Failed { execution_id: None, error: e.to_string() }),
            }
        } else {
            let handle = self.execution_engine.execute_detached(exec_cfg).await?;
            Ok(ProcessResult::Spawned {
                execution_id: handle.execution_id,
                log_file: handle.log_file,
                pid: handle.pid,
            })
        }
    }

    /// Run an Agent Definition ad hoc: render its prompt template,
    /// append the output-instruction, and record usage on completion.
    /// Unlike a cascade stage, the result is not automatically turned
    /// into a document — the caller reads it back from the log via
    /// `ckb_adapters::parse_log_file`.
    pub async fn run_agent_definition(
        &self,
        agent_store: &dyn AgentDefinitionStore,
        agent_id: AgentDefId,
        vars: HashMap<String, String>,
        doc_id: Option<DocId>,
        sync: bool,
    ) -> EngineResult<ProcessResult> {
        let def = agent_store.get(agent_id).await?;
        let prompt = def.render_prompt(&vars);
        let output_instruction = format!(
            "When done, save your result (tags: {:?}) and report the saved document id, \
             and the PR URL if you opened one.",
            def.output_tags
        );

        let exec_cfg = ExecutionConfig {
            doc_id,
            doc_title: def.display_name.clone(),
            prompt,
            allowed_tools: def.allowed_tools.iter().cloned().collect(),
            model: None,
            timeout: std::time::Duration::from_secs(def.timeout_seconds),
            cascade_run_id: None,
            working_dir: self.config.work_dir.clone(),
            extra_env: Vec::new(),
            output_instruction: Some(output_instruction),
        };

        if sync {
            let result = self.execution_engine.execute_sync(exec_cfg).await;
            let success = result.is_ok();
            agent_store.record_usage(agent_id, success).await?;
            match result {
                Ok(r) => Ok(ProcessResult::Completed {
                    execution_id: r.execution_id,
                    child_doc_id: None,
                    pr_url: ckb_adapters::parse_log_file(&r.log_file).pr_url,
                }),
                Err(e) => Ok(ProcessResult::Failed { execution_id: None, error: e.to_string() }),
            }
        } else {
            let handle = self.execution_engine.execute_detached(exec_cfg).await?;
            Ok(ProcessResult::Spawned {
                execution_id: handle.execution_id,
                log_file: handle.log_file,
                pid: handle.pid,
            })
        }
    }
}

fn default_title(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or("untitled").trim();
    let truncated: String = first_line.chars().take(80).collect();
    if truncated.is_empty() { "untitled".to_string() } else { truncated }
}

/// The store exposes no "active run for this document" query, only
/// `list_recent`; scan for the most recent non-terminal run whose
/// `current_doc_id` matches. Good enough at cascadekb's expected scale
/// (one interactive user, a handful of concurrent runs).
async fn find_active_run_for_doc(
    runs: &dyn CascadeRunStore,
    doc_id: DocId,
) -> EngineResult<Option<CascadeRunId>> {
    let recent = runs.list_recent(200).await?;
    Ok(recent
        .into_iter()
        .find(|run| !run.is_terminal() && run.current_doc_id == doc_id)
        .map(|run| run.id))
}

async fn fail_run(
    runs: &dyn CascadeRunStore,
    run_id: CascadeRunId,
    message: impl Into<String>,
) -> EngineResult<()> {
    runs.set_status(run_id, CascadeRunStatus::Failed, Some(message.into())).await?;
    Ok(())
}

/// Shared success path for both the sync caller and the completion
/// monitor: extract the output, create the child document (or, on empty
/// output, advance the source document itself), retire the source
/// document, stamp PR URLs, and advance the cascade run.
async fn apply_stage_success(
    docs: &dyn DocumentStore,
    runs: &dyn CascadeRunStore,
    result: &SyncExecutionResult,
    doc: &Document,
    from_stage: Stage,
    to_stage: Stage,
    run_id: Option<CascadeRunId>,
) -> EngineResult<ProcessResult> {
    let output_text = ckb_adapters::extract_output_text(&result.log_text);
    let parsed = ckb_adapters::parse_log_file(&result.log_file);

    let child_doc_id = if output_text.trim().is_empty() {
        tracing::warn!(
            execution_id = %result.execution_id,
            doc_id = %doc.id,
            "cascade: stage produced no output, advancing source document in place"
        );
        docs.set_stage(doc.id, Some(to_stage)).await?;
        None
    } else {
        let child_title = Document::child_title(&doc.title, from_stage, to_stage);
        let child_id = docs
            .create(child_title, output_text, doc.project.clone(), Some(doc.id), Some(to_stage))
            .await?;
        docs.set_stage(doc.id, Some(Stage::Done)).await?;
        Some(child_id)
    };

    if let Some(url) = &parsed.pr_url {
        docs.set_pr_url(doc.id, url.clone()).await?;
        if let Some(child_id) = child_doc_id {
            docs.set_pr_url(child_id, url.clone()).await?;
        }
    }

    if let Some(run_id) = run_id {
        let advance_doc_id = child_doc_id.unwrap_or(doc.id);
        runs.advance(run_id, advance_doc_id, to_stage).await?;
        if let Some(url) = &parsed.pr_url {
            runs.set_pr_url(run_id, url.clone()).await?;
        }
    }

    Ok(ProcessResult::Completed { execution_id: result.execution_id, child_doc_id, pr_url: parsed.pr_url })
}

/// Poll a detached execution's log to completion, then fold the result
/// into store state the same way the sync path does. Spawned with owned
/// clones, never `&self` or `Arc<Self>`, so it outlives the call that
/// started it — mirrors the teacher's `runtime::monitor` shell-effect
/// task shape.
#[allow(clippy::too_many_arguments)]
fn spawn_completion_monitor<S>(
    store: Arc<S>,
    poll_interval: std::time::Duration,
    doc: Document,
    from_stage: Stage,
    to_stage: Stage,
    execution_id: ExecutionId,
    log_file: PathBuf,
    pid: u32,
    deadline: Instant,
    run_id: Option<CascadeRunId>,
) where
    S: crate::Store + 'static,
{
    tokio::spawn(async move {
        let mut poll = tokio::time::interval(poll_interval);
        loop {
            poll.tick().await;
            let state = terminal::scan(&log_file);
            if state.has_stopped() {
                let success = state.exit_code == Some(0) && !state.is_error;
                if let Err(e) = finish_detached(
                    &*store,
                    execution_id,
                    &log_file,
                    success,
                    state.exit_code,
                    &doc,
                    from_stage,
                    to_stage,
                    run_id,
                )
                .await
                {
                    tracing::warn!(execution_id = %execution_id, error = %e, "cascade: completion monitor failed to record outcome");
                }
                return;
            }

            if Instant::now() >= deadline {
                liveness::kill_best_effort(pid).await;
                let _ = finish_detached(
                    &*store, execution_id, &log_file, false, Some(-1), &doc, from_stage, to_stage, run_id,
                )
                .await;
                return;
            }

            if !liveness::is_alive(pid).await {
                // Process died without writing a terminal marker: a
                // zombie. The reconciler would also catch this on its
                // next sweep; finishing here avoids waiting for it.
                let _ = finish_detached(
                    &*store, execution_id, &log_file, false, Some(-1), &doc, from_stage, to_stage, run_id,
                )
                .await;
                return;
            }
        }
    });
}

#[allow(clippy::too_many_arguments)]
async fn finish_detached<S>(
    store: &S,
    execution_id: ExecutionId,
    log_file: &std::path::Path,
    success: bool,
    exit_code: Option<i32>,
    doc: &Document,
    from_stage: Stage,
    to_stage: Stage,
    run_id: Option<CascadeRunId>,
) -> EngineResult<()>
where
    S: crate::Store,
{
    ExecutionRecordStore::set_status(
        store,
        execution_id,
        if success { ExecutionStatus::Completed } else { ExecutionStatus::Failed },
        exit_code,
    )
    .await?;

    if !success {
        if let Some(run_id) = run_id {
            fail_run(store, run_id, format!("stage {from_stage} failed, exit {exit_code:?}")).await?;
        }
        return Ok(());
    }

    let log_text = std::fs::read_to_string(log_file).unwrap_or_default();
    let result = SyncExecutionResult {
        execution_id,
        success,
        exit_code,
        log_file: log_file.to_path_buf(),
        log_text,
    };
    apply_stage_success(store, store, &result, doc, from_stage, to_stage, run_id).await?;
    Ok(())
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod tests;
