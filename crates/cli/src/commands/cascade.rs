// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cascade add/process/status/show/advance/remove/synthesize` — the
//! Cascade Engine's CLI surface (spec.md §6, §4.8).

use anyhow::Result;
use ckb_core::{CascadeRunStatus, DocId, Stage};
use clap::{Args, Subcommand};

use crate::context::Context;
use crate::exit_error::ExitError;
use crate::output::{print_json, print_process_result, OutputFormat};

#[derive(Args)]
pub struct CascadeArgs {
    #[command(subcommand)]
    pub command: CascadeCommand,
}

#[derive(Subcommand)]
pub enum CascadeCommand {
    /// Create a new document at `--stage` (default `idea`)
    Add {
        text: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value = "idea")]
        stage: String,
        /// Drive the cascade automatically instead of just creating the document
        #[arg(long)]
        auto: bool,
        /// With --auto, drive it synchronously to completion (or failure)
        #[arg(long)]
        sync: bool,
    },
    /// Process the document at `stage` (the oldest one, unless `--doc`)
    Process {
        stage: String,
        #[arg(long)]
        doc: Option<u64>,
        #[arg(long)]
        sync: bool,
        /// Show which document would be processed without running anything
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// List recent cascade runs
    Status,
    /// List documents currently at `stage`
    Show { stage: String },
    /// Move a document directly to its next stage without running an agent
    Advance {
        id: u64,
        #[arg(long)]
        to: Option<String>,
    },
    /// Take a document out of the cascade
    Remove { id: u64 },
    /// Merge every document at `stage` into one new document at the same stage
    Synthesize {
        stage: String,
        /// Don't retire the source documents to `done`
        #[arg(long)]
        keep: bool,
    },
}

pub async fn handle(args: CascadeArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    match args.command {
        CascadeCommand::Add { text, title, stage, auto, sync } => {
            add(ctx, text, title, &stage, auto, sync, format).await
        }
        CascadeCommand::Process { stage, doc, sync, dry_run } => {
            process(ctx, &stage, doc, sync, dry_run, format).await
        }
        CascadeCommand::Status => status(ctx, format).await,
        CascadeCommand::Show { stage } => show(ctx, &stage, format).await,
        CascadeCommand::Advance { id, to } => advance(ctx, id, to, format).await,
        CascadeCommand::Remove { id } => remove(ctx, id, format).await,
        CascadeCommand::Synthesize { stage, keep } => synthesize(ctx, &stage, keep, format).await,
    }
}

fn run_status_label(status: CascadeRunStatus) -> &'static str {
    match status {
        CascadeRunStatus::Running => "running",
        CascadeRunStatus::Completed => "completed",
        CascadeRunStatus::Failed => "failed",
        CascadeRunStatus::Paused => "paused",
        CascadeRunStatus::Cancelled => "cancelled",
    }
}

fn parse_stage(s: &str) -> Result<Stage> {
    Stage::parse(s).ok_or_else(|| {
        ExitError::usage(format!("unknown stage '{s}' (expected idea, prompt, analyzed, planned, or done)"))
    })
}

async fn add(
    ctx: &Context,
    text: String,
    title: Option<String>,
    stage: &str,
    auto: bool,
    sync: bool,
    format: OutputFormat,
) -> Result<()> {
    let start_stage = parse_stage(stage)?;
    let doc_id = ctx.engine.add(text, title, None, start_stage, Stage::Done, auto, sync).await?;
    if format == OutputFormat::Json {
        print_json(&serde_json::json!({"doc_id": doc_id.get()}))?;
    } else {
        println!("created document #{doc_id} at {start_stage}");
    }
    Ok(())
}

async fn process(
    ctx: &Context,
    stage: &str,
    doc: Option<u64>,
    sync: bool,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let stage = parse_stage(stage)?;
    let doc_id = doc.map(DocId::new);

    if dry_run {
        let candidate = match doc_id {
            Some(id) => Some(ckb_core::DocumentStore::get(&*ctx.store, id).await?),
            None => ctx.query.list_at_stage(stage, Some(1)).await?.into_iter().next(),
        };
        return match candidate {
            Some(doc) if doc.stage == Some(stage) => {
                if format == OutputFormat::Json {
                    print_json(&doc)
                } else {
                    println!("would process #{} \"{}\" at {}", doc.id, doc.title, stage);
                    Ok(())
                }
            }
            _ => {
                if format == OutputFormat::Json {
                    print_json(&serde_json::json!({"status": "no_op"}))
                } else {
                    println!("{}", crate::color::context("nothing to process"));
                    Ok(())
                }
            }
        };
    }

    let result = ctx.engine.process(stage, doc_id, sync).await?;
    print_process_result(&result, format)
}

async fn status(ctx: &Context, format: OutputFormat) -> Result<()> {
    let runs = ctx.query.recent_cascade_runs(None).await?;
    if format == OutputFormat::Json {
        return print_json(&runs);
    }
    if runs.is_empty() {
        println!("{}", crate::color::context("no cascade runs yet"));
        return Ok(());
    }
    for run in runs {
        println!(
            "#{:<6} {:<10} doc #{:<6} {} -> {} (now {})",
            run.id,
            crate::color::status(run_status_label(run.status)),
            run.current_doc_id,
            run.start_stage,
            run.stop_stage,
            run.current_stage,
        );
        if let Some(err) = &run.error_message {
            println!("   {}", crate::color::status(&format!("failed: {err}")));
        }
    }
    Ok(())
}

async fn show(ctx: &Context, stage: &str, format: OutputFormat) -> Result<()> {
    let stage = parse_stage(stage)?;
    let docs = ctx.query.list_at_stage(stage, None).await?;
    if format == OutputFormat::Json {
        return print_json(&docs);
    }
    if docs.is_empty() {
        println!("{}", crate::color::context(&format!("no documents at {stage}")));
        return Ok(());
    }
    for doc in docs {
        println!(
            "#{:<6} {:<8} {} ({})",
            doc.id,
            crate::color::status(stage.as_str()),
            doc.title,
            crate::output::format_time_ago(doc.created_at),
        );
    }
    Ok(())
}

async fn advance(ctx: &Context, id: u64, to: Option<String>, format: OutputFormat) -> Result<()> {
    let to_stage = to.as_deref().map(parse_stage).transpose()?;
    let reached = ctx.engine.advance(DocId::new(id), to_stage).await?;
    if format == OutputFormat::Json {
        print_json(&serde_json::json!({"doc_id": id, "stage": reached.as_str()}))?;
    } else {
        println!("#{id} advanced to {reached}");
    }
    Ok(())
}

async fn remove(ctx: &Context, id: u64, format: OutputFormat) -> Result<()> {
    ctx.engine.remove(DocId::new(id)).await?;
    if format == OutputFormat::Json {
        print_json(&serde_json::json!({"doc_id": id, "removed": true}))?;
    } else {
        println!("#{id} removed from the cascade");
    }
    Ok(())
}

async fn synthesize(ctx: &Context, stage: &str, keep: bool, format: OutputFormat) -> Result<()> {
    let stage = parse_stage(stage)?;
    let synth_id = ctx.engine.synthesize(stage, keep, None).await?;
    if format == OutputFormat::Json {
        print_json(&serde_json::json!({"doc_id": synth_id.get()}))?;
    } else {
        println!("created synthesis document #{synth_id} at {stage}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod tests;
