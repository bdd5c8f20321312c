//! Document store
//!
//! Per-user collections of JSON documents addressed by
//! `users/{userId}/{collection}`. Every write is followed by a
//! whole-collection snapshot on the collection's broadcast channel.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shared::Collection;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

mod channels;
pub mod codec;
pub mod memory;
pub mod postgres;
pub mod subscription;

pub use channels::SnapshotChannels;
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use subscription::{subscribe, Subscription};

/// Address of one user's collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    pub user_id: Uuid,
    pub collection: Collection,
}

impl CollectionPath {
    pub fn new(user_id: Uuid, collection: Collection) -> Self {
        Self {
            user_id,
            collection,
        }
    }

    /// Parse `users/{uuid}/{collection}`
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("users"), Some(user_id), Some(collection), None) => Some(Self {
                user_id: Uuid::parse_str(user_id).ok()?,
                collection: Collection::from_name(collection)?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "users/{}/{}", self.user_id, self.collection.name())
    }
}

/// A stored record. `data` never carries the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub data: Value,
}

/// Full contents of a collection at one point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: CollectionPath,
    pub documents: Vec<Document>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document {id} not found in {path}")]
    NotFound { path: CollectionPath, id: Uuid },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One pending write inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set {
        path: CollectionPath,
        id: Uuid,
        data: Value,
    },
    Update {
        path: CollectionPath,
        id: Uuid,
        patch: Value,
    },
    Delete {
        path: CollectionPath,
        id: Uuid,
    },
}

impl WriteOp {
    pub fn path(&self) -> CollectionPath {
        match self {
            WriteOp::Set { path, .. } | WriteOp::Update { path, .. } | WriteOp::Delete { path, .. } => {
                *path
            }
        }
    }
}

/// Writes committed together or not at all
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new document; its id is assigned now
    pub fn add(&mut self, path: CollectionPath, data: Value) -> Uuid {
        let id = Uuid::new_v4();
        self.ops.push(WriteOp::Set { path, id, data });
        id
    }

    /// Queue a document under a caller-chosen id, replacing any existing one
    pub fn set(&mut self, path: CollectionPath, id: Uuid, data: Value) {
        self.ops.push(WriteOp::Set { path, id, data });
    }

    /// Queue a top-level merge into an existing document
    pub fn update(&mut self, path: CollectionPath, id: Uuid, patch: Value) {
        self.ops.push(WriteOp::Update { path, id, patch });
    }

    pub fn delete(&mut self, path: CollectionPath, id: Uuid) {
        self.ops.push(WriteOp::Delete { path, id });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Distinct collections touched, in first-touch order
    pub fn paths(&self) -> Vec<CollectionPath> {
        let mut paths: Vec<CollectionPath> = Vec::new();
        for op in &self.ops {
            let path = op.path();
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Backend-agnostic document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document under a fresh id
    async fn add(&self, path: &CollectionPath, data: Value) -> Result<Document, StoreError>;

    /// Merge the top-level keys of `patch` into an existing document
    async fn update(&self, path: &CollectionPath, id: Uuid, patch: Value) -> Result<(), StoreError>;

    /// Deleting a missing document succeeds
    async fn delete(&self, path: &CollectionPath, id: Uuid) -> Result<(), StoreError>;

    /// Documents in insertion order
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// Apply every op of `batch` atomically
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Receiver for snapshots published after each write to `path`
    async fn watch(&self, path: &CollectionPath) -> Result<broadcast::Receiver<Snapshot>, StoreError>;

    /// Liveness check used by `/health`
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Top-level JSON merge used by `update` and batch updates.
///
/// A `null` in the patch removes the key.
pub(crate) fn merge_top_level(target: &mut Value, patch: Value) -> Result<(), StoreError> {
    let (Value::Object(target), Value::Object(patch)) = (target, patch) else {
        return Err(StoreError::InvalidDocument(
            "update patch must be a JSON object".to_string(),
        ));
    };
    for (key, value) in patch {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
    Ok(())
}

/// Split a patch into the keys it removes and the object it merges
pub(crate) fn split_patch(patch: &Value) -> Result<(Vec<String>, Value), StoreError> {
    let Value::Object(fields) = patch else {
        return Err(StoreError::InvalidDocument(
            "update patch must be a JSON object".to_string(),
        ));
    };
    let mut removed = Vec::new();
    let mut merged = serde_json::Map::new();
    for (key, value) in fields {
        if value.is_null() {
            removed.push(key.clone());
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok((removed, Value::Object(merged)))
}
