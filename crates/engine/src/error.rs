// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine crate: the Execution Engine, Zombie
//! Reconciler, and Cascade Engine all return `EngineResult`, wrapping the
//! persistence and process-lifecycle error kinds `ckb-core` defines.

use ckb_core::{CascadeError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cascade(#[from] CascadeError),

    /// A requested operation would violate a data-model invariant (e.g.
    /// processing a stage with no matching document, or advancing past
    /// the terminal stage).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
