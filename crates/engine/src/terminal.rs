// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tolerant terminal-marker scanning over an execution's log file. Looks
//! for the `ckb-wrapper` lifecycle "stop" line (always present once the
//! real child's `Command::status()` returns, even on a crash or signal
//! exit) and the subprocess's own terminal `result` line, forward-scanning
//! so the last occurrence of either wins if a log is ever replayed or
//! doubled up.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerminalState {
    pub exit_code: Option<i32>,
    pub is_error: bool,
    pub result_text: Option<String>,
}

impl TerminalState {
    /// Whether the wrapper's own "stop" marker was observed — the signal
    /// that the real child process has exited, independent of whatever
    /// the subprocess itself reported.
    pub fn has_stopped(&self) -> bool {
        self.exit_code.is_some()
    }
}

/// One log line, tolerant of every `type` this module cares about —
/// unrecognized fields and `type` values are simply ignored.
#[derive(Deserialize)]
struct LogLine {
    #[serde(rename = "type")]
    kind: Option<String>,
    event: Option<String>,
    exit_code: Option<i32>,
    is_error: Option<bool>,
    result: Option<String>,
}

/// Read and scan `log_file`. A missing or unreadable file yields an empty
/// (non-terminal) state rather than an error.
pub fn scan(log_file: &Path) -> TerminalState {
    match std::fs::read_to_string(log_file) {
        Ok(text) => scan_text(&text),
        Err(_) => TerminalState::default(),
    }
}

fn scan_text(text: &str) -> TerminalState {
    let mut state = TerminalState::default();
    for raw_line in text.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(parsed) = serde_json::from_str::<LogLine>(trimmed) else {
            continue;
        };
        match parsed.kind.as_deref() {
            Some("lifecycle") if parsed.event.as_deref() == Some("stop") => {
                state.exit_code = parsed.exit_code;
            }
            Some("result") => {
                state.is_error = parsed.is_error.unwrap_or(false);
                state.result_text = parsed.result;
            }
            _ => {}
        }
    }
    state
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
