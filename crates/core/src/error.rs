// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across the workspace.
//!
//! Only `StoreError` and `EnvironmentInvalid` cross a façade entry point
//! as a returned `Err`; every other kind is recorded as terminal status on
//! an execution or cascade run and never propagated as an exception.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CascadeError {
    /// Pre-spawn validation failed (binary missing from PATH, required
    /// sub-binaries absent).
    #[error("environment invalid: missing {missing:?}")]
    EnvironmentInvalid { missing: Vec<String> },

    /// The OS refused to start the wrapper process.
    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    /// A sync wait or stage deadline elapsed.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The reconciler found a `running` record whose pid no longer exists.
    #[error("execution {0} is a zombie")]
    Zombie(u64),

    /// The subprocess's terminal JSON line reported `is_error: true`.
    #[error("child reported an error: {0}")]
    ChildError(String),

    /// Document, execution, cascade run, or agent definition not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A requested operation would violate a data-model invariant.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Underlying persistence failure.
    #[error("store error: {0}")]
    StoreError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CascadeResult<T> = Result<T, CascadeError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
