// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for cascadekb: a JSONL write-ahead log plus periodic
//! zstd-compressed snapshots of a [`MaterializedState`], and the
//! [`ckb_core`] store trait implementations built on top of them.

pub mod checkpoint;
pub mod event;
pub mod migration;
mod snapshot;
mod state;
mod store;
mod wal;

pub use checkpoint::{
    CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter, Checkpointer,
    FsCheckpointWriter,
};
pub use event::StorageEvent;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use store::Database;
pub use wal::{Wal, WalEntry, WalError};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
