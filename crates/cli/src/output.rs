// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text/JSON output selection shared across every subcommand.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty-print any serializable value as JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a UTC timestamp as relative time (e.g. "5s", "2m", "1h", "3d").
pub fn format_time_ago(when: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(when);
    let secs = elapsed.num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

/// Render an `agent run`/`agent ask`/`cascade process` outcome, exiting
/// with code 1 via [`crate::exit_error::ExitError`] when the execution
/// itself failed (a usage error still goes through clap's own exit path).
pub fn print_process_result(result: &ckb_engine::ProcessResult, format: OutputFormat) -> anyhow::Result<()> {
    use ckb_engine::ProcessResult;

    match result {
        ProcessResult::NoOp => {
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({"status": "no_op"}))?;
            } else {
                println!("{}", crate::color::context("nothing to process"));
            }
            Ok(())
        }
        ProcessResult::Completed { execution_id, child_doc_id, pr_url } => {
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({
                    "status": "completed",
                    "execution_id": execution_id.get(),
                    "child_doc_id": child_doc_id.map(|id| id.get()),
                    "pr_url": pr_url,
                }))?;
            } else {
                println!("{} execution #{}", crate::color::status("completed"), execution_id);
                if let Some(id) = child_doc_id {
                    println!("  child document: #{id}");
                }
                if let Some(url) = pr_url {
                    println!("  pull request: {url}");
                }
            }
            Ok(())
        }
        ProcessResult::Spawned { execution_id, log_file, pid } => {
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({
                    "status": "spawned",
                    "execution_id": execution_id.get(),
                    "log_file": log_file.to_string_lossy(),
                    "pid": pid,
                }))?;
            } else {
                println!("{} execution #{} (pid {pid})", crate::color::status("running"), execution_id);
                println!("  log: {}", log_file.display());
            }
            Ok(())
        }
        ProcessResult::Failed { execution_id, error } => {
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({
                    "status": "failed",
                    "execution_id": execution_id.map(|id| id.get()),
                    "error": error,
                }))?;
            } else {
                eprintln!("{} {error}", crate::color::status("failed"));
            }
            Err(crate::exit_error::ExitError::operational(error.clone()))
        }
    }
}
