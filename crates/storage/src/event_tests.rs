// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn document_created_roundtrips_through_json() {
    let event = StorageEvent::DocumentCreated {
        id: DocId::new(1),
        title: "X".into(),
        content: "body".into(),
        project: None,
        parent_id: None,
        stage: Some(Stage::Idea),
        created_at: Utc::now(),
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: StorageEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(event, back);
}

#[test]
fn execution_status_set_roundtrips() {
    let event = StorageEvent::ExecutionStatusSet {
        id: ExecutionId::new(3),
        status: ExecutionStatus::Failed,
        exit_code: Some(-1),
        completed_at: Utc::now(),
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: StorageEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(event, back);
}
