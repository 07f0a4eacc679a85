// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::StorageEvent;
use ckb_core::DocId;
use chrono::Utc;

fn sample_event(id: u64) -> StorageEvent {
    StorageEvent::DocumentCreated {
        id: DocId::new(id),
        title: "X".into(),
        content: "body".into(),
        project: None,
        parent_id: None,
        stage: Some(ckb_core::Stage::Idea),
        created_at: Utc::now(),
    }
}

#[test]
fn append_and_flush_then_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&sample_event(1)).unwrap();
    wal.append(&sample_event(2)).unwrap();
    wal.flush().unwrap();

    let first = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(first.seq, 1);
    wal.mark_processed(1);
    let second = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(second.seq, 2);
}

#[test]
fn reopen_resumes_from_processed_seq() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&sample_event(1)).unwrap();
        wal.append(&sample_event(2)).unwrap();
        wal.flush().unwrap();
    }

    let mut wal = Wal::open(&path, 1).unwrap();
    let entry = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry.seq, 2);
}

#[test]
fn entries_after_filters_by_seq() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&sample_event(1)).unwrap();
    wal.append(&sample_event(2)).unwrap();
    wal.append(&sample_event(3)).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries_after(1).unwrap();
    assert_eq!(entries.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn truncate_before_drops_old_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&sample_event(1)).unwrap();
    wal.append(&sample_event(2)).unwrap();
    wal.append(&sample_event(3)).unwrap();
    wal.flush().unwrap();
    wal.mark_processed(2);

    wal.truncate_before(2).unwrap();
    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn corrupt_wal_is_rotated_and_valid_entries_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&sample_event(1)).unwrap();
        wal.flush().unwrap();
    }
    // Append a non-JSON line directly to simulate a torn write.
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "not json at all").unwrap();
    drop(file);

    let wal = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 1);
    assert!(path.with_extension("bak").exists());
}

#[test]
fn needs_flush_after_interval_or_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal = Wal::open(&path, 0).unwrap();
    assert!(!wal.needs_flush());
    wal.append(&sample_event(1)).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(15));
    assert!(wal.needs_flush());
}
