// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process liveness probing and best-effort termination for the Zombie
//! Reconciler and stage-timeout handling. Shells out to the `kill` binary
//! rather than calling `libc::kill` directly — this workspace forbids
//! unsafe code, and following the teacher's own convention of shelling
//! out for process-lifecycle checks (its tmux/session adapters do the
//! same) keeps this crate's safe-code guarantee uniform with the rest of
//! the stack.

use tokio::process::Command;

/// Whether a process with the given pid currently exists. Uses
/// `kill -0`, which checks for existence/permission without sending a
/// real signal.
pub async fn is_alive(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Send `SIGKILL`. Best-effort: the process may already be gone, and
/// either outcome is fine for a caller that only wants it stopped.
pub async fn kill_best_effort(pid: u32) {
    let _ = Command::new("kill")
        .args(["-KILL", &pid.to_string()])
        .output()
        .await;
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
