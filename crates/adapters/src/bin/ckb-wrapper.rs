// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle shim spawned by [`ckb_adapters::supervisor::spawn_detached`].
//!
//! Invoked as `ckb-wrapper <execution_id> <log_file> <cmd> [args...]`. Its
//! own stdout/stderr are already the execution's log file (redirected by
//! the supervisor before spawn), so a plain `println!` lands there. Writes
//! a "start" marker, execs the real command inheriting that same stdio, and
//! on exit writes a "stop" marker carrying the exit code — so the log has
//! an unambiguous terminal marker even if the supervisor's own process is
//! killed before the child finishes.

use chrono::Utc;
use serde_json::json;
use std::process::Command;

fn lifecycle_marker(event: &str, execution_id: &str, extra: serde_json::Value) {
    let mut obj = json!({
        "type": "lifecycle",
        "event": event,
        "execution_id": execution_id,
        "timestamp": Utc::now().to_rfc3339(),
    });
    if let (Some(obj), Some(extra)) = (obj.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    println!("{obj}");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("ckb-wrapper: usage: <execution_id> <log_file> <cmd> [args...]");
        std::process::exit(2);
    }
    let execution_id = &args[1];
    let _log_file = &args[2];
    let real_cmd = &args[3];
    let real_args = &args[4..];

    lifecycle_marker("start", execution_id, json!({ "pid": std::process::id() }));

    let exit_code = match Command::new(real_cmd).args(real_args).status() {
        Ok(status) => status.code().unwrap_or(-1),
        Err(e) => {
            lifecycle_marker(
                "stop",
                execution_id,
                json!({ "exit_code": -1, "error": e.to_string() }),
            );
            std::process::exit(-1);
        }
    };

    lifecycle_marker("stop", execution_id, json!({ "exit_code": exit_code }));
    std::process::exit(exit_code);
}
