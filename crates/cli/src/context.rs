// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the durable store, the Cascade Engine, and the read-only Query
//! API together the way every command needs them. One `Database` per
//! process invocation — the CLI is a short-lived client over the same
//! embedded store the spec calls "a single embedded relational database".

use ckb_core::SystemClock;
use ckb_engine::{CascadeConfig, CascadeEngine, QueryApi};
use ckb_storage::Database;
use std::sync::Arc;

pub struct Context {
    pub store: Arc<Database>,
    pub engine: CascadeEngine<Database>,
    pub query: QueryApi<Database>,
}

impl Context {
    /// Open (or create) the durable store under `data_dir` and build the
    /// engine/query facades over it.
    pub fn open(data_dir: &std::path::Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let store = Arc::new(Database::open(data_dir)?);
        let config = CascadeConfig::from_env();
        let engine = CascadeEngine::new(store.clone(), Arc::new(SystemClock), config);
        let query = QueryApi::new(store.clone());
        Ok(Self { store, engine, query })
    }

    /// Default data directory: `$CKB_HOME/db`, `$CKB_HOME` itself
    /// defaulting to `~/.cascadekb` (see `ckb_adapters::env::ckb_home`).
    pub fn default_data_dir() -> std::path::PathBuf {
        ckb_adapters::env::ckb_home().join("db")
    }
}
