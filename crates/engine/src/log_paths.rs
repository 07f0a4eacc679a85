// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared path builder for execution log files.
//!
//! Structure: `<logs_dir>/exec-<nonce>.log`. The nonce is minted by the
//! Execution Engine before the store assigns an execution id — the log
//! path is one of `ExecutionRecordStore::create`'s own arguments, so it
//! must exist before that id does.

use std::path::{Path, PathBuf};

pub fn execution_log_path(logs_dir: &Path, nonce: u64) -> PathBuf {
    logs_dir.join(format!("exec-{nonce:x}.log"))
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
