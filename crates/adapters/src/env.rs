// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::path::PathBuf;
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Base directory for cascadekb's own state (logs, by default). Override
/// with `CKB_HOME`; defaults to `~/.cascadekb`.
pub fn ckb_home() -> PathBuf {
    std::env::var("CKB_HOME").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cascadekb")
    })
}

/// Per-user execution log directory. Override with `CKB_LOG_DIR`.
pub fn logs_dir() -> PathBuf {
    std::env::var("CKB_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| ckb_home().join("logs"))
}

/// Log Stream Multiplexer tail-poll interval (default: 200ms).
pub fn log_poll_ms() -> Duration {
    parse_duration_ms("CKB_LOG_POLL_MS").unwrap_or(Duration::from_millis(200))
}

/// Zombie Reconciler sweep interval while any execution is running
/// (default: 3000ms, within the spec's recommended 2-5s range).
pub fn reconcile_interval_ms() -> Duration {
    parse_duration_ms("CKB_RECONCILE_INTERVAL_MS").unwrap_or(Duration::from_secs(3))
}

/// Grace window after `create()` during which a `running` record with no
/// `pid` yet is left alone rather than treated as a zombie (default: 5s).
pub fn reconcile_grace_ms() -> Duration {
    parse_duration_ms("CKB_RECONCILE_GRACE_MS").unwrap_or(Duration::from_secs(5))
}

/// Path to the `ckb-wrapper` lifecycle-marker binary. Override with
/// `CKB_WRAPPER_BINARY`; defaults to the sibling of the current executable.
pub fn wrapper_binary_path() -> PathBuf {
    if let Ok(p) = std::env::var("CKB_WRAPPER_BINARY") {
        return PathBuf::from(p);
    }
    let exe_name = format!("ckb-wrapper{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|dir| dir.join(&exe_name)))
        .unwrap_or_else(|| PathBuf::from(exe_name))
}
