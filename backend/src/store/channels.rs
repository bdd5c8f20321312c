//! Per-collection snapshot channels shared by the store backends

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::{CollectionPath, Snapshot};

/// Buffered snapshots per collection before a receiver lags
const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Default)]
pub struct SnapshotChannels {
    channels: Arc<RwLock<HashMap<CollectionPath, broadcast::Sender<Snapshot>>>>,
}

impl SnapshotChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the channel for `path`
    pub async fn sender(&self, path: CollectionPath) -> broadcast::Sender<Snapshot> {
        {
            let channels = self.channels.read().await;
            if let Some(tx) = channels.get(&path) {
                return tx.clone();
            }
        }
        let mut channels = self.channels.write().await;
        channels
            .entry(path)
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
                tx
            })
            .clone()
    }

    pub async fn subscribe(&self, path: CollectionPath) -> broadcast::Receiver<Snapshot> {
        self.sender(path).await.subscribe()
    }

    /// True when someone is listening on `path`
    pub async fn has_receivers(&self, path: &CollectionPath) -> bool {
        let channels = self.channels.read().await;
        channels
            .get(path)
            .map(|tx| tx.receiver_count() > 0)
            .unwrap_or(false)
    }

    /// Send to current receivers; a channel nobody listens to is dropped
    pub async fn publish(&self, snapshot: Snapshot) {
        let mut channels = self.channels.write().await;
        let Some(tx) = channels.get(&snapshot.path) else {
            return;
        };
        if tx.receiver_count() == 0 {
            channels.remove(&snapshot.path);
            return;
        }
        let path = snapshot.path;
        let documents = snapshot.documents.len();
        if tx.send(snapshot).is_ok() {
            tracing::debug!(path = %path, documents, "Published snapshot");
        }
    }
}
