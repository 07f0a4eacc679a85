// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Documents: the Markdown artifacts that move through the cascade.

use crate::define_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

define_id! {
    /// Identity of a [`Document`].
    pub struct DocId;
}

/// A position in the fixed cascade pipeline. `stage = None` on a document
/// means it is not (or no longer) part of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idea,
    Prompt,
    Analyzed,
    Planned,
    Done,
}

/// Stages in pipeline order, leaf (`Idea`) first.
pub const STAGE_ORDER: [Stage; 5] = [
    Stage::Idea,
    Stage::Prompt,
    Stage::Analyzed,
    Stage::Planned,
    Stage::Done,
];

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idea => "idea",
            Stage::Prompt => "prompt",
            Stage::Analyzed => "analyzed",
            Stage::Planned => "planned",
            Stage::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idea" => Some(Stage::Idea),
            "prompt" => Some(Stage::Prompt),
            "analyzed" => Some(Stage::Analyzed),
            "planned" => Some(Stage::Planned),
            "done" => Some(Stage::Done),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done)
    }

    /// `next_stage` is total on every non-terminal stage.
    pub fn next(&self) -> Option<Stage> {
        let idx = STAGE_ORDER.iter().position(|s| s == self)?;
        STAGE_ORDER.get(idx + 1).copied()
    }

    fn order_index(&self) -> usize {
        STAGE_ORDER.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Whether `self` is strictly later in the fixed order than `other`.
    pub fn is_after(&self, other: Stage) -> bool {
        self.order_index() > other.order_index()
    }

    /// Stage prompt template: a format string with one `{content}` hole.
    /// `Done` is terminal and has no template.
    pub fn prompt_template(&self) -> Option<&'static str> {
        match self {
            Stage::Idea => Some(
                "Refine the following idea into a clear, actionable prompt for an \
                 implementation agent:\n\n{content}",
            ),
            Stage::Prompt => Some(
                "Analyze the codebase in light of the following prompt and report \
                 findings relevant to implementing it:\n\n{content}",
            ),
            Stage::Analyzed => Some(
                "Using the following analysis, produce a concrete implementation \
                 plan:\n\n{content}",
            ),
            Stage::Planned => Some(
                "Implement the following plan, opening a pull request when \
                 done:\n\n{content}",
            ),
            Stage::Done => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub content: String,
    pub project: Option<String>,
    pub parent_id: Option<DocId>,
    pub stage: Option<Stage>,
    pub pr_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Document {
    pub fn child_title(parent_title: &str, from: Stage, to: Stage) -> String {
        format!("{parent_title} [{from}\u{2192}{to}]")
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
