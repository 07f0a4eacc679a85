// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log Stream Multiplexer: lets multiple subscribers watch one growing log
//! file without each polling the filesystem independently. Grounded in the
//! teacher's agent watcher (`SessionLogParser`'s incremental, byte-offset
//! tracked re-reads), reshaped from "parse agent state" into "forward raw
//! appended bytes to every subscriber."

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// A subscriber to a [`LogStream`]. Called on the stream's own tailing
/// task, not a thread the subscriber owns — implementations must be cheap
/// or hand off to their own task.
pub trait LogSubscriber: Send + Sync {
    /// Receives a newly appended chunk, or a synthetic rotation notice.
    /// Returning `Err` drops the subscriber; it is not retried.
    fn on_content(&self, bytes: &[u8]) -> Result<(), String>;
}

const ROTATION_NOTICE: &[u8] = b"[log rotated]\n";

struct Shared {
    subscribers: Mutex<HashMap<u64, Arc<dyn LogSubscriber>>>,
    next_id: AtomicU64,
}

/// A live tail of one growing log file.
pub struct LogStream {
    path: PathBuf,
    shared: Arc<Shared>,
    close_tx: watch::Sender<bool>,
}

impl LogStream {
    /// Begin tailing `path`. The file need not exist yet — the stream
    /// becomes active once it appears.
    pub fn open(path: PathBuf) -> Self {
        let shared = Arc::new(Shared {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        });
        let (close_tx, close_rx) = watch::channel(false);
        tokio::spawn(tail_loop(path.clone(), shared.clone(), close_rx));
        Self { path, shared, close_tx }
    }

    /// Whatever is currently on disk, for priming a new viewer.
    pub fn get_initial_content(&self) -> Vec<u8> {
        std::fs::read(&self.path).unwrap_or_default()
    }

    /// Register a subscriber; returns an id usable with [`Self::unsubscribe`].
    pub fn subscribe(&self, subscriber: Arc<dyn LogSubscriber>) -> u64 {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared.subscribers.lock().insert(id, subscriber);
        id
    }

    /// Immediately stop delivering callbacks to this subscriber.
    pub fn unsubscribe(&self, id: u64) {
        self.shared.subscribers.lock().remove(&id);
    }

    /// Stop tailing and release the file handle.
    pub fn close(&self) {
        let _ = self.close_tx.send(true);
    }
}

async fn tail_loop(path: PathBuf, shared: Arc<Shared>, mut close_rx: watch::Receiver<bool>) {
    let mut offset: u64 = 0;
    let mut interval = tokio::time::interval(crate::env::log_poll_ms());
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = close_rx.changed() => {
                if *close_rx.borrow() {
                    return;
                }
                continue;
            }
        }

        let Ok(metadata) = tokio::fs::metadata(&path).await else {
            continue;
        };
        let len = metadata.len();

        if len < offset {
            // Truncation: restart from zero and notify subscribers.
            offset = 0;
            broadcast(&shared, ROTATION_NOTICE);
        }

        if len == offset {
            continue;
        }

        match read_delta(&path, offset, len).await {
            Ok(delta) => {
                offset = len;
                if !delta.is_empty() {
                    broadcast(&shared, &delta);
                }
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "log mux: delta read failed");
            }
        }
    }
}

async fn read_delta(path: &PathBuf, offset: u64, len: u64) -> std::io::Result<Vec<u8>> {
    use tokio::io::{AsyncReadExt, AsyncSeekExt};
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(std::io::SeekFrom::Start(offset)).await?;
    let mut buf = vec![0u8; (len - offset) as usize];
    file.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Deliver `bytes` to every current subscriber in FIFO order; a subscriber
/// that errors is logged and dropped, never retried.
fn broadcast(shared: &Shared, bytes: &[u8]) {
    let dead: Vec<u64> = {
        let subscribers = shared.subscribers.lock();
        let mut dead = Vec::new();
        for (id, subscriber) in subscribers.iter() {
            if let Err(e) = subscriber.on_content(bytes) {
                tracing::warn!(subscriber = id, error = %e, "log mux: subscriber failed, dropping");
                dead.push(*id);
            }
        }
        dead
    };
    if !dead.is_empty() {
        let mut subscribers = shared.subscribers.lock();
        for id in dead {
            subscribers.remove(&id);
        }
    }
}

#[cfg(test)]
#[path = "log_mux_tests.rs"]
mod tests;
