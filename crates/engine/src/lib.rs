// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ckb-engine: the Execution Engine, Zombie Reconciler, Cascade Engine,
//! and Query/Subscription API that together drive cascadekb's cascade
//! pipeline on top of `ckb-core`'s data model and `ckb-adapters`' process
//! plumbing.

pub mod cascade;
pub mod config;
pub mod error;
pub mod execution_engine;
mod liveness;
mod log_paths;
pub mod query;
pub mod reconciler;
mod terminal;

pub use cascade::{CascadeEngine, ProcessResult};
pub use config::CascadeConfig;
pub use error::{EngineError, EngineResult};
pub use execution_engine::{
    DetachedHandle, ExecutionConfig, ExecutionEngine, SyncExecutionResult,
};
pub use query::QueryApi;
pub use reconciler::reconcile_once;

/// Convenience supertrait bundling every store trait the engine depends
/// on. `ckb_storage::Database` and `ckb_storage::test_support::FakeStore`
/// both satisfy it via the blanket impl below.
pub trait Store:
    ckb_core::DocumentStore
    + ckb_core::ExecutionRecordStore
    + ckb_core::CascadeRunStore
    + ckb_core::AgentDefinitionStore
{
}

impl<T> Store for T where
    T: ckb_core::DocumentStore
        + ckb_core::ExecutionRecordStore
        + ckb_core::CascadeRunStore
        + ckb_core::AgentDefinitionStore
{
}
