// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::time::{sleep, Duration};

struct RecordingSubscriber {
    received: Mutex<Vec<Vec<u8>>>,
}

impl RecordingSubscriber {
    fn new() -> Arc<Self> {
        Arc::new(Self { received: Mutex::new(Vec::new()) })
    }

    fn snapshot(&self) -> Vec<Vec<u8>> {
        self.received.lock().clone()
    }
}

impl LogSubscriber for RecordingSubscriber {
    fn on_content(&self, bytes: &[u8]) -> Result<(), String> {
        self.received.lock().push(bytes.to_vec());
        Ok(())
    }
}

struct FailingSubscriber;
impl LogSubscriber for FailingSubscriber {
    fn on_content(&self, _bytes: &[u8]) -> Result<(), String> {
        Err("nope".to_string())
    }
}

const POLL_WAIT: Duration = Duration::from_millis(350);

#[tokio::test]
async fn get_initial_content_returns_current_disk_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exec.log");
    std::fs::write(&path, b"hello\n").unwrap();

    let stream = LogStream::open(path);
    assert_eq!(stream.get_initial_content(), b"hello\n");
    stream.close();
}

#[tokio::test]
async fn get_initial_content_on_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("not-yet.log");
    let stream = LogStream::open(path);
    assert!(stream.get_initial_content().is_empty());
    stream.close();
}

#[tokio::test]
async fn subscriber_receives_appended_delta() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exec.log");
    std::fs::write(&path, b"").unwrap();

    let stream = LogStream::open(path.clone());
    let subscriber = RecordingSubscriber::new();
    stream.subscribe(subscriber.clone());

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"line one\n").unwrap();
    drop(file);

    sleep(POLL_WAIT).await;
    let received = subscriber.snapshot();
    assert_eq!(received.concat(), b"line one\n");
    stream.close();
}

#[tokio::test]
async fn unsubscribed_subscriber_receives_no_more_callbacks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exec.log");
    std::fs::write(&path, b"").unwrap();

    let stream = LogStream::open(path.clone());
    let subscriber = RecordingSubscriber::new();
    let id = stream.subscribe(subscriber.clone());
    stream.unsubscribe(id);

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"should not arrive\n").unwrap();
    drop(file);

    sleep(POLL_WAIT).await;
    assert!(subscriber.snapshot().is_empty());
    stream.close();
}

#[tokio::test]
async fn truncation_broadcasts_rotation_notice_and_restarts_from_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exec.log");
    std::fs::write(&path, b"0123456789").unwrap();

    let stream = LogStream::open(path.clone());
    let subscriber = RecordingSubscriber::new();
    stream.subscribe(subscriber.clone());

    sleep(POLL_WAIT).await;
    // Truncate and write fresh, shorter content.
    std::fs::write(&path, b"new\n").unwrap();
    sleep(POLL_WAIT).await;

    let received = subscriber.snapshot();
    assert!(received.iter().any(|chunk| chunk == ROTATION_NOTICE));
    stream.close();
}

#[tokio::test]
async fn failing_subscriber_is_dropped_without_affecting_others() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exec.log");
    std::fs::write(&path, b"").unwrap();

    let stream = LogStream::open(path.clone());
    stream.subscribe(Arc::new(FailingSubscriber));
    let good = RecordingSubscriber::new();
    stream.subscribe(good.clone());

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"abc\n").unwrap();
    drop(file);

    sleep(POLL_WAIT).await;
    assert_eq!(good.snapshot().concat(), b"abc\n");
    stream.close();
}
