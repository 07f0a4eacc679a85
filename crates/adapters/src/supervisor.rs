// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process Supervisor: launches the external AI binary fully detached from
//! the caller, via a small wrapper that stamps lifecycle markers into the
//! execution's log file. No part of this module blocks on the child's I/O.

use ckb_core::CascadeError;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// Everything needed to launch one detached execution.
pub struct SpawnRequest {
    pub execution_id: u64,
    pub cmd: Vec<String>,
    pub log_file: PathBuf,
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
    /// Binaries (beyond `cmd[0]`) the command needs on PATH, e.g. `git`.
    pub required_binaries: Vec<String>,
}

/// Check whether `bin` resolves to an executable on `PATH`. Absolute and
/// relative paths are checked directly; bare names are searched on `PATH`.
fn resolve_on_path(bin: &str) -> bool {
    let candidate = Path::new(bin);
    if candidate.is_absolute() || bin.contains('/') {
        return candidate.is_file();
    }
    std::env::var_os("PATH")
        .into_iter()
        .flat_map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
        .any(|dir| dir.join(bin).is_file())
}

/// Validate that the command binary and any declared sub-binaries resolve
/// on `PATH`, collecting every missing one rather than failing on the first.
fn validate_environment(cmd: &[String], required: &[String]) -> Result<(), CascadeError> {
    let mut missing = Vec::new();
    match cmd.first() {
        Some(bin) if !resolve_on_path(bin) => missing.push(bin.clone()),
        None => missing.push("<empty command>".to_string()),
        _ => {}
    }
    for bin in required {
        if !resolve_on_path(bin) {
            missing.push(bin.clone());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CascadeError::EnvironmentInvalid { missing })
    }
}

fn open_log_file(log_file: &Path) -> Result<File, CascadeError> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(CascadeError::from)
}

/// Spawn `req.cmd` fully detached via the `ckb-wrapper` lifecycle shim.
/// Returns the wrapper's pid immediately; never waits on the child.
pub fn spawn_detached(req: SpawnRequest) -> Result<u32, CascadeError> {
    validate_environment(&req.cmd, &req.required_binaries)?;

    let stdout_file = open_log_file(&req.log_file)?;
    let stderr_file = stdout_file
        .try_clone()
        .map_err(CascadeError::from)?;

    let mut command = Command::new(crate::env::wrapper_binary_path());
    command
        .arg(req.execution_id.to_string())
        .arg(&req.log_file)
        .args(&req.cmd)
        .current_dir(&req.working_dir)
        .envs(req.env)
        // Hint to the child that it should avoid buffering its own output,
        // since the log file is read live by the Log Stream Multiplexer.
        .env("CKB_UNBUFFERED", "1")
        .stdin(Stdio::null())
        .stdout(stdout_file)
        .stderr(stderr_file);

    // New process group: decouples the child from the caller's controlling
    // terminal and pgid without requiring unsafe `pre_exec`.
    #[cfg(unix)]
    command.process_group(0);

    let child = command
        .spawn()
        .map_err(|e| CascadeError::SpawnFailed(e.to_string()))?;

    Ok(child.id())
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
