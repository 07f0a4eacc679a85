// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output Parser: extracts the final document id, PR URL, and token usage
//! from an execution's log file. Grounded in the teacher's session-log
//! tail-scanning style (`extract_last_assistant_text`/`parse_state_from_line`
//! in its agent watcher), reshaped from "is the agent still working" state
//! detection into "what did the agent report" result extraction. Never
//! raises: any I/O or decode error yields an empty [`ParsedOutput`].

use ckb_core::TokenUsage;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOutput {
    pub doc_id: Option<u64>,
    pub pr_url: Option<String>,
    pub token_usage: Option<TokenUsage>,
}

const RAW_RESULT_SENTINEL: &str = "__RAW_RESULT_JSON__:";

fn ansi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("valid regex"))
}

fn doc_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)saved as #(\d+)",
            r"(?i)document id:\s*(\d+)",
            r"(?i)doc id\s*(\d+)",
            r"(?i)doc_id\s*[:=]\s*(\d+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

fn pr_url_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)PR_URL:\s*(https://\S+/pull/\d+)",
            r"\[[^\]]*\]\((https://\S+/pull/\d+)\)",
            r"(https://\S+/pull/\d+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

/// Strip ANSI escape sequences so pattern matching sees plain text.
fn strip_ansi(line: &str) -> String {
    ansi_re().replace_all(line, "").into_owned()
}

/// Scan cleaned lines for the last match of any doc-id pattern.
fn extract_doc_id(text: &str) -> Option<u64> {
    let mut found = None;
    for raw_line in text.lines() {
        let line = strip_ansi(raw_line);
        for pattern in doc_id_patterns() {
            if let Some(caps) = pattern.captures(&line) {
                if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<u64>().ok()) {
                    found = Some(n);
                }
            }
        }
    }
    found
}

/// Scan cleaned lines for the last PR URL match, across tolerant forms.
fn extract_pr_url(text: &str) -> Option<String> {
    let mut found = None;
    for raw_line in text.lines() {
        let line = strip_ansi(raw_line);
        for pattern in pr_url_patterns() {
            if let Some(caps) = pattern.captures(&line) {
                if let Some(url) = caps.get(1) {
                    found = Some(url.as_str().to_string());
                }
            }
        }
    }
    found
}

/// Locate the `__RAW_RESULT_JSON__:` sentinel line and extract token usage.
fn extract_token_usage(text: &str) -> Option<TokenUsage> {
    let line = text
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with(RAW_RESULT_SENTINEL))?;
    let json_part = line.trim_start().strip_prefix(RAW_RESULT_SENTINEL)?.trim();
    let value: serde_json::Value = serde_json::from_str(json_part).ok()?;
    let get_u64 = |key: &str| value.get(key).and_then(|v| v.as_u64()).unwrap_or(0);
    let total_cost_usd = value.get("total_cost_usd").and_then(|v| v.as_f64()).unwrap_or(0.0);
    Some(TokenUsage {
        input_tokens: get_u64("input_tokens"),
        output_tokens: get_u64("output_tokens"),
        cache_read_input_tokens: get_u64("cache_read_input_tokens"),
        cache_creation_input_tokens: get_u64("cache_creation_input_tokens"),
        total_cost_usd,
    })
}

/// Concatenate every `{"type":"content",...}` line's `content` field, in
/// file order, to reconstruct the subprocess's reported output text. Falls
/// back to the raw trimmed text when nothing parses as a content line, so
/// callers always get something usable even from a non-JSONL log.
pub fn extract_output_text(text: &str) -> String {
    let mut out = String::new();
    let mut saw_content_line = false;
    for raw_line in text.lines() {
        let line = strip_ansi(raw_line);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
            continue;
        };
        if value.get("type").and_then(|v| v.as_str()) != Some("content") {
            continue;
        }
        saw_content_line = true;
        if let Some(content) = value.get("content").and_then(|v| v.as_str()) {
            out.push_str(content);
        }
    }
    if saw_content_line {
        out
    } else {
        text.trim().to_string()
    }
}

/// Parse an already-read log file's text content.
pub fn parse_output(text: &str) -> ParsedOutput {
    ParsedOutput {
        doc_id: extract_doc_id(text),
        pr_url: extract_pr_url(text),
        token_usage: extract_token_usage(text),
    }
}

/// Read and parse a log file at `path`. On any I/O error, returns an empty
/// result rather than propagating — per the output parser's failure
/// contract, parsing never raises upward.
pub fn parse_log_file(path: &Path) -> ParsedOutput {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_output(&text),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "output parser: log unreadable");
            ParsedOutput::default()
        }
    }
}

#[cfg(test)]
#[path = "output_parser_tests.rs"]
mod tests;
