use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::snapshot;
use crate::entities::Place;
use crate::storage::DynStore;

enum Task {
    Write(String),
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
pub struct WriteBackStats {
    completed: AtomicU64,
    failed: AtomicU64,
}

impl WriteBackStats {
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Full-collection writes, applied by a single worker in the order they were enqueued.
pub struct WriteBackQueue {
    tx: Sender<Task>,
    worker: JoinHandle<()>,
    stats: Arc<WriteBackStats>,
}

impl WriteBackQueue {
    pub fn spawn(storage: DynStore, key: String) -> Self {
        let (tx, rx) = async_channel::unbounded();
        let stats = Arc::new(WriteBackStats::default());

        let worker = tokio::spawn(drain(rx, storage, key, stats.clone()));

        Self { tx, worker, stats }
    }

    /// Serializes `places` now and queues the write. Never blocks.
    pub fn enqueue(&self, places: &[Place]) {
        let value = match snapshot::encode(places) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("failed to encode places: {}", err);
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        if self.tx.try_send(Task::Write(value)).is_err() {
            tracing::warn!("write-back queue closed, dropping snapshot");
        }
    }

    /// Resolves once every write enqueued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();

        if self.tx.send(Task::Flush(done_tx)).await.is_err() {
            return;
        }

        let _ = done_rx.await;
    }

    pub fn stats(&self) -> &WriteBackStats {
        &self.stats
    }

    /// Stops accepting writes and waits for the queued ones to finish.
    pub async fn close(self) {
        self.tx.close();

        if let Err(err) = self.worker.await {
            tracing::warn!("write-back worker ended abnormally: {}", err);
        }
    }
}

#[tracing::instrument(skip_all, fields(key = %key))]
async fn drain(rx: Receiver<Task>, storage: DynStore, key: String, stats: Arc<WriteBackStats>) {
    while let Ok(task) = rx.recv().await {
        match task {
            Task::Write(value) => match storage.set(&key, &value).await {
                Ok(()) => {
                    stats.completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    // TODO: surface repeated write failures to the user (retry banner)
                    tracing::warn!(code = err.code, "failed to save places: {}", err);
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                }
            },
            Task::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("write-back queue drained");
}
