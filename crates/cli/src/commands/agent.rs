// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent run <name|id>` and `agent ask <prompt>` — executing a stored
//! Agent Definition or a free-form ad hoc prompt (spec.md §6).

use std::collections::HashMap;

use anyhow::{bail, Context as _, Result};
use ckb_core::{AgentDefId, AgentDefinitionStore, DocId};
use clap::{Args, Subcommand};

use super::parse_key_value;
use crate::context::Context;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommand,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Execute a stored Agent Definition by name or id
    Run {
        /// Agent name or numeric id
        name_or_id: String,
        /// Document to bind the run to, exposed to the template as
        /// `{{document}}`
        #[arg(long, conflicts_with = "query")]
        doc: Option<u64>,
        /// Ad hoc query text, exposed to the template as `{{query}}`
        #[arg(long, conflicts_with = "doc")]
        query: Option<String>,
        /// Additional template variables (repeatable)
        #[arg(long = "var", value_parser = parse_key_value)]
        var: Vec<(String, String)>,
        #[arg(long, conflicts_with = "foreground")]
        background: bool,
        #[arg(long, conflicts_with = "background")]
        foreground: bool,
    },
    /// Run a free-form prompt with no stored definition behind it
    Ask {
        /// The prompt text
        prompt: String,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        title: Option<String>,
        /// Reserved for grouping related ad hoc runs; not yet surfaced
        /// anywhere besides the execution record's doc_title.
        #[arg(long)]
        group: Option<String>,
        #[arg(long = "group-role")]
        group_role: Option<String>,
        /// Ask the agent to also open a pull request
        #[arg(long)]
        pr: bool,
        #[arg(short = 'v', long)]
        verbose: bool,
    },
}

pub async fn handle(args: AgentArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    match args.command {
        AgentCommand::Run { name_or_id, doc, query, var, background, foreground } => {
            run(ctx, name_or_id, doc, query, var, background, foreground, format).await
        }
        AgentCommand::Ask { prompt, tags, title, group, group_role, pr, verbose } => {
            ask(ctx, prompt, tags, title, group, group_role, pr, verbose, format).await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run(
    ctx: &Context,
    name_or_id: String,
    doc: Option<u64>,
    query: Option<String>,
    var: Vec<(String, String)>,
    background: bool,
    foreground: bool,
    format: OutputFormat,
) -> Result<()> {
    let def = match name_or_id.parse::<u64>() {
        Ok(id) => AgentDefinitionStore::get(&*ctx.store, AgentDefId::new(id)).await,
        Err(_) => AgentDefinitionStore::get_by_name(&*ctx.store, &name_or_id).await,
    }
    .with_context(|| format!("no agent definition matching '{name_or_id}'"))?;

    let mut vars: HashMap<String, String> = var.into_iter().collect();
    let doc_id = match (doc, &query) {
        (Some(_), Some(_)) => bail!("--doc and --query are mutually exclusive"),
        (Some(id), None) => {
            let document = ckb_core::DocumentStore::get(&*ctx.store, DocId::new(id)).await?;
            vars.entry("document".to_string()).or_insert_with(|| document.content.clone());
            Some(DocId::new(id))
        }
        (None, Some(text)) => {
            vars.entry("query".to_string()).or_insert_with(|| text.clone());
            None
        }
        (None, None) => None,
    };

    // Foreground (synchronous) unless --background is explicitly requested.
    let sync = !background || foreground;

    let result = ctx.engine.run_agent_definition(&*ctx.store, def.id, vars, doc_id, sync).await?;
    crate::output::print_process_result(&result, format)
}

#[allow(clippy::too_many_arguments)]
async fn ask(
    ctx: &Context,
    prompt: String,
    tags: Vec<String>,
    title: Option<String>,
    group: Option<String>,
    group_role: Option<String>,
    pr: bool,
    verbose: bool,
    format: OutputFormat,
) -> Result<()> {
    let title = title.unwrap_or_else(|| {
        let first_line = prompt.lines().next().unwrap_or("ad hoc agent run");
        first_line.chars().take(80).collect()
    });
    if verbose && format == OutputFormat::Text {
        eprintln!("{} {}", crate::color::header("prompt:"), prompt);
        if let Some(group) = &group {
            eprintln!("{} {group} (role: {:?})", crate::color::header("group:"), group_role);
        }
    }

    let result = ctx.engine.run_ad_hoc(prompt, title, tags, pr, None, true).await?;
    crate::output::print_process_result(&result, format)
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
