//! In-process document store for tests and the offline variant

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{
    merge_top_level, CollectionPath, Document, DocumentStore, Snapshot, SnapshotChannels,
    StoreError, WriteBatch, WriteOp,
};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionPath, Vec<Document>>>,
    channels: SnapshotChannels,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with `StoreError::Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }

    /// Send snapshots of `paths` while the caller still holds the write
    /// guard, so subscribers see writes in commit order
    async fn publish(
        &self,
        collections: &HashMap<CollectionPath, Vec<Document>>,
        paths: &[CollectionPath],
    ) {
        for path in paths {
            let snapshot = Snapshot {
                path: *path,
                documents: collections.get(path).cloned().unwrap_or_default(),
            };
            self.channels.publish(snapshot).await;
        }
    }
}

fn apply_op(
    collections: &mut HashMap<CollectionPath, Vec<Document>>,
    op: WriteOp,
) -> Result<(), StoreError> {
    match op {
        WriteOp::Set { path, id, data } => {
            let documents = collections.entry(path).or_default();
            match documents.iter_mut().find(|d| d.id == id) {
                Some(existing) => existing.data = data,
                None => documents.push(Document { id, data }),
            }
        }
        WriteOp::Update { path, id, patch } => {
            let document = collections
                .get_mut(&path)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or(StoreError::NotFound { path, id })?;
            merge_top_level(&mut document.data, patch)?;
        }
        WriteOp::Delete { path, id } => {
            if let Some(documents) = collections.get_mut(&path) {
                documents.retain(|d| d.id != id);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, path: &CollectionPath, data: Value) -> Result<Document, StoreError> {
        self.ensure_online()?;
        if !data.is_object() {
            return Err(StoreError::InvalidDocument(
                "documents must be JSON objects".to_string(),
            ));
        }
        let document = Document {
            id: Uuid::new_v4(),
            data,
        };
        let mut collections = self.collections.write().await;
        collections.entry(*path).or_default().push(document.clone());
        self.publish(&collections, &[*path]).await;
        Ok(document)
    }

    async fn update(&self, path: &CollectionPath, id: Uuid, patch: Value) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        apply_op(
            &mut collections,
            WriteOp::Update {
                path: *path,
                id,
                patch,
            },
        )?;
        self.publish(&collections, &[*path]).await;
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: Uuid) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        apply_op(&mut collections, WriteOp::Delete { path: *path, id })?;
        self.publish(&collections, &[*path]).await;
        Ok(())
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(collections.get(path).cloned().unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.ensure_online()?;
        if batch.is_empty() {
            return Ok(());
        }
        let paths = batch.paths();
        let mut collections = self.collections.write().await;
        // Stage the touched collections; nothing is visible until all ops apply
        let mut staged: HashMap<CollectionPath, Vec<Document>> = paths
            .iter()
            .map(|path| (*path, collections.get(path).cloned().unwrap_or_default()))
            .collect();
        for op in batch.into_ops() {
            apply_op(&mut staged, op)?;
        }
        collections.extend(staged);
        tracing::debug!(collections = paths.len(), "Committed batch");
        self.publish(&collections, &paths).await;
        Ok(())
    }

    async fn watch(&self, path: &CollectionPath) -> Result<broadcast::Receiver<Snapshot>, StoreError> {
        self.ensure_online()?;
        Ok(self.channels.subscribe(*path).await)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_online()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
