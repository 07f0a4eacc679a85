// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn store_error_messages_include_context() {
    let err = StoreError::NotFound("document 7".into());
    assert_eq!(err.to_string(), "not found: document 7");

    let err = StoreError::AlreadyExists("agent planner".into());
    assert_eq!(err.to_string(), "already exists: agent planner");
}
