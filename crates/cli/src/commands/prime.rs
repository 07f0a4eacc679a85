// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prime` — emit a snapshot of session context (documents ready to
//! process at each stage, recent executions) for a caller bootstrapping
//! a fresh session against the store (spec.md §6).

use anyhow::Result;
use ckb_core::{Stage, STAGE_ORDER};
use clap::Args;

use crate::context::Context;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct PrimeArgs {
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
    /// Suppress the "no ready documents" / "no recent executions" notices
    #[arg(long)]
    pub quiet: bool,
    /// Include every recent execution instead of just the running ones
    #[arg(long)]
    pub verbose: bool,
}

pub async fn handle(args: PrimeArgs, ctx: &Context) -> Result<()> {
    let mut ready = Vec::new();
    for stage in STAGE_ORDER.iter().copied().filter(|s| !s.is_terminal()) {
        ready.extend(ctx.query.list_at_stage(stage, None).await?);
    }

    let executions = if args.verbose {
        ctx.query.recent_executions(Some(20)).await?
    } else {
        ctx.query.running_executions().await?
    };

    if args.format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "ready_documents": ready,
            "executions": executions,
        }));
    }

    if ready.is_empty() {
        if !args.quiet {
            println!("{}", crate::color::context("no documents ready to process"));
        }
    } else {
        println!("{}", crate::color::header("ready:"));
        for doc in &ready {
            let stage = doc.stage.unwrap_or(Stage::Idea);
            println!("  #{:<6} {:<8} {}", doc.id, crate::color::status(stage.as_str()), doc.title);
        }
    }

    if executions.is_empty() {
        if !args.quiet {
            println!("{}", crate::color::context("no recent executions"));
        }
    } else {
        println!("{}", crate::color::header("executions:"));
        for exec in &executions {
            println!(
                "  #{:<6} {:<10} {}",
                exec.id,
                crate::color::status(exec_status_label(exec.status)),
                exec.doc_title,
            );
        }
    }

    Ok(())
}

fn exec_status_label(status: ckb_core::ExecutionStatus) -> &'static str {
    match status {
        ckb_core::ExecutionStatus::Running => "running",
        ckb_core::ExecutionStatus::Completed => "completed",
        ckb_core::ExecutionStatus::Failed => "failed",
    }
}

#[cfg(test)]
#[path = "prime_tests.rs"]
mod tests;
