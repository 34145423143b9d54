//! Background persistence of the inventory list.
//!
//! Mutations hand a snapshot of the inventory list to a single writer task and
//! return immediately. Each snapshot is the whole list, so when several are
//! queued the writer skips straight to the newest one: the durable copy never
//! moves backwards and a slow backend does not build up a backlog of writes.
//! A failed write is logged and forgotten; the next successful write catches
//! the durable copy up.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use stockbook_inventory::{InventoryItem, encode_inventory_list};

use crate::storage::KeyValueStorage;

/// Outcome counters of background writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistenceStats {
    pub succeeded: u64,
    pub failed: u64,
    /// Snapshots skipped because a newer one was already queued.
    pub superseded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    succeeded: AtomicU64,
    failed: AtomicU64,
    superseded: AtomicU64,
}

enum WriteRequest {
    Save(Vec<InventoryItem>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task. Dropping every handle stops the task once the
/// queue drains. Without a Tokio runtime there is no task: writes are logged
/// and dropped, and `flush` returns at once.
#[derive(Debug)]
pub(crate) struct PersistenceWriter {
    tx: mpsc::UnboundedSender<WriteRequest>,
    counters: Arc<Counters>,
}

impl PersistenceWriter {
    /// Spawn the writer task on the current Tokio runtime.
    pub(crate) fn spawn(storage: Arc<dyn KeyValueStorage>, key: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());

        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(run(rx, storage, key, counters.clone()));
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "no Tokio runtime; inventory changes will not be persisted"
                );
            }
        }
        Self { tx, counters }
    }

    /// Queue a write of `items`. Never blocks, never fails the caller.
    pub(crate) fn schedule(&self, items: Vec<InventoryItem>) {
        if self.tx.send(WriteRequest::Save(items)).is_err() {
            tracing::error!("persistence writer has stopped; inventory write dropped");
        }
    }

    /// Wait until every write scheduled before this call has been attempted.
    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriteRequest::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    pub(crate) fn stats(&self) -> PersistenceStats {
        PersistenceStats {
            succeeded: self.counters.succeeded.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            superseded: self.counters.superseded.load(Ordering::SeqCst),
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    counters: Arc<Counters>,
) {
    tracing::debug!(key = %key, "persistence writer started");

    let mut acks = Vec::new();
    while let Some(request) = rx.recv().await {
        let mut latest = None;
        accept(request, &mut latest, &mut acks, &counters);
        while let Ok(request) = rx.try_recv() {
            accept(request, &mut latest, &mut acks, &counters);
        }

        if let Some(items) = latest {
            if write_snapshot(storage.as_ref(), &key, &items).await {
                counters.succeeded.fetch_add(1, Ordering::SeqCst);
            } else {
                counters.failed.fetch_add(1, Ordering::SeqCst);
            }
        }

        // The snapshot just written is at least as new as anything queued
        // before these flushes.
        for ack in acks.drain(..) {
            let _ = ack.send(());
        }
    }

    tracing::debug!(key = %key, "persistence writer stopped");
}

fn accept(
    request: WriteRequest,
    latest: &mut Option<Vec<InventoryItem>>,
    acks: &mut Vec<oneshot::Sender<()>>,
    counters: &Counters,
) {
    match request {
        WriteRequest::Save(items) => {
            if latest.replace(items).is_some() {
                counters.superseded.fetch_add(1, Ordering::SeqCst);
            }
        }
        WriteRequest::Flush(ack) => acks.push(ack),
    }
}

async fn write_snapshot(storage: &dyn KeyValueStorage, key: &str, items: &[InventoryItem]) -> bool {
    let payload = match encode_inventory_list(items) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode inventory list");
            return false;
        }
    };

    match storage.set(key, &payload).await {
        Ok(()) => {
            tracing::debug!(key = %key, items = items.len(), "saved inventory list");
            true
        }
        Err(err) => {
            tracing::error!(key = %key, error = %err, "failed to save inventory list");
            false
        }
    }
}
