// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A tagged error carrying the process exit code it should produce.
//! Command handlers raise this via `anyhow::Error::from` when they need a
//! specific code (spec.md §6: 0 success, 1 operational failure, 2 usage
//! error); anything else falls back to the default of 1 in `main`.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn usage(message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(Self { code: 2, message: message.into() })
    }

    pub fn operational(message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(Self { code: 1, message: message.into() })
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
