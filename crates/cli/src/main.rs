// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ckb - cascadekb CLI: a thin `clap` wrapper over `ckb-engine`'s Cascade
//! Engine and Query API. No independent business logic lives here —
//! every command is a parse-then-delegate call, per spec.md §6.

mod color;
mod commands;
mod context;
mod exit_error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{agent, cascade, prime};
use context::Context;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "ckb",
    version,
    about = "cascadekb - a knowledge-base agent orchestrator",
    styles = color::styles()
)]
struct Cli {
    /// Override the store's data directory (default: $CKB_HOME/db)
    #[arg(short = 'd', long = "data-dir", global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format for agent/cascade commands
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a stored agent definition or a free-form prompt
    Agent(agent::AgentArgs),
    /// Drive documents through the idea -> prompt -> analyzed -> planned -> done pipeline
    Cascade(cascade::CascadeArgs),
    /// Emit a snapshot of session context
    Prime(prime::PrimeArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |err| err.code);
        let msg = e.to_string();
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(code);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(Context::default_data_dir);
    let ctx = Context::open(&data_dir)?;

    match cli.command {
        Commands::Agent(args) => agent::handle(args, &ctx, cli.output).await,
        Commands::Cascade(args) => cascade::handle(args, &ctx, cli.output).await,
        Commands::Prime(args) => prime::handle(args, &ctx).await,
    }
}
