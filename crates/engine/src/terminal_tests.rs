// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::NamedTempFile;

fn write_log(lines: &[&str]) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), lines.join("\n") + "\n").unwrap();
    file
}

#[test]
fn missing_file_yields_empty_state() {
    let state = scan(Path::new("/no/such/execution.log"));
    assert_eq!(state, TerminalState::default());
    assert!(!state.has_stopped());
}

#[test]
fn captures_stop_exit_code_and_result() {
    let file = write_log(&[
        r#"{"type":"lifecycle","event":"start","execution_id":"1"}"#,
        r#"{"type":"content","content":"working"}"#,
        r#"{"type":"result","is_error":false,"result":"all done"}"#,
        r#"{"type":"lifecycle","event":"stop","execution_id":"1","exit_code":0}"#,
    ]);
    let state = scan(file.path());
    assert_eq!(state.exit_code, Some(0));
    assert!(!state.is_error);
    assert_eq!(state.result_text, Some("all done".to_string()));
    assert!(state.has_stopped());
}

#[test]
fn result_error_flag_is_captured_even_without_a_stop_line() {
    let file = write_log(&[r#"{"type":"result","is_error":true,"result":"boom"}"#]);
    let state = scan(file.path());
    assert!(!state.has_stopped());
    assert!(state.is_error);
    assert_eq!(state.result_text, Some("boom".to_string()));
}

#[test]
fn last_stop_line_wins_when_several_present() {
    let file = write_log(&[
        r#"{"type":"lifecycle","event":"stop","exit_code":1}"#,
        r#"{"type":"lifecycle","event":"stop","exit_code":7}"#,
    ]);
    let state = scan(file.path());
    assert_eq!(state.exit_code, Some(7));
}

#[test]
fn non_json_and_unrelated_lines_are_ignored() {
    let file = write_log(&["not json at all", r#"{"type":"tool_use","name":"bash"}"#]);
    let state = scan(file.path());
    assert_eq!(state, TerminalState::default());
}

#[test]
fn empty_file_yields_empty_state() {
    let file = NamedTempFile::new().unwrap();
    let state = scan(file.path());
    assert_eq!(state, TerminalState::default());
}
