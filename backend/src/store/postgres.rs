//! PostgreSQL document store
//!
//! Documents live in one JSONB table keyed by `(path, id)`. Every write
//! transaction ends with `pg_notify('document_changes', path)`; a
//! background `PgListener` turns those notifications into snapshots for
//! the local subscribers, so writes from other server processes are seen
//! too.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgListener, PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{
    split_patch, CollectionPath, Document, DocumentStore, Snapshot, SnapshotChannels, StoreError,
    WriteBatch, WriteOp,
};
use crate::config::StoreConfig;

/// NOTIFY channel carrying the path of each changed collection
pub const CHANGE_CHANNEL: &str = "document_changes";

pub struct PgDocumentStore {
    pool: PgPool,
    channels: SnapshotChannels,
    listener: JoinHandle<()>,
}

impl PgDocumentStore {
    /// Connect the pool and start the change listener
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, StoreError> {
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;

        let channels = SnapshotChannels::new();
        let task = tokio::spawn(run_listener(listener, pool.clone(), channels.clone()));

        Ok(Self {
            pool,
            channels,
            listener: task,
        })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Drop for PgDocumentStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn run_listener(mut listener: PgListener, pool: PgPool, channels: SnapshotChannels) {
    loop {
        // recv() reconnects on its own after a dropped connection
        let notification = match listener.recv().await {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(error = %e, "Change listener error, retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        let Some(path) = CollectionPath::parse(notification.payload()) else {
            tracing::warn!(payload = notification.payload(), "Ignoring malformed change notification");
            continue;
        };
        if !channels.has_receivers(&path).await {
            continue;
        }
        match list_documents(&pool, &path).await {
            Ok(documents) => channels.publish(Snapshot { path, documents }).await,
            Err(e) => tracing::error!(path = %path, error = %e, "Failed to load snapshot"),
        }
    }
}

async fn list_documents(pool: &PgPool, path: &CollectionPath) -> Result<Vec<Document>, StoreError> {
    let rows = sqlx::query_as::<_, (Uuid, Json<Value>)>(
        r#"
        SELECT id, data
        FROM documents
        WHERE path = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(path.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, Json(data))| Document { id, data })
        .collect())
}

async fn apply_op(tx: &mut Transaction<'_, Postgres>, op: &WriteOp) -> Result<(), StoreError> {
    match op {
        WriteOp::Set { path, id, data } => {
            if !data.is_object() {
                return Err(StoreError::InvalidDocument(
                    "documents must be JSON objects".to_string(),
                ));
            }
            sqlx::query(
                r#"
                INSERT INTO documents (path, id, data)
                VALUES ($1, $2, $3)
                ON CONFLICT (path, id) DO UPDATE
                SET data = EXCLUDED.data, updated_at = NOW()
                "#,
            )
            .bind(path.to_string())
            .bind(id)
            .bind(Json(data))
            .execute(&mut **tx)
            .await?;
        }
        WriteOp::Update { path, id, patch } => {
            let (removed, merged) = split_patch(patch)?;
            let result = sqlx::query(
                r#"
                UPDATE documents
                SET data = (data - $4::text[]) || $3, updated_at = NOW()
                WHERE path = $1 AND id = $2
                "#,
            )
            .bind(path.to_string())
            .bind(id)
            .bind(Json(merged))
            .bind(removed)
            .execute(&mut **tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound { path: *path, id: *id });
            }
        }
        WriteOp::Delete { path, id } => {
            sqlx::query("DELETE FROM documents WHERE path = $1 AND id = $2")
                .bind(path.to_string())
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }
    }
    Ok(())
}

async fn notify(tx: &mut Transaction<'_, Postgres>, path: &CollectionPath) -> Result<(), StoreError> {
    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(CHANGE_CHANNEL)
        .bind(path.to_string())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn add(&self, path: &CollectionPath, data: Value) -> Result<Document, StoreError> {
        let mut batch = WriteBatch::new();
        let id = batch.add(*path, data.clone());
        self.commit(batch).await?;
        Ok(Document { id, data })
    }

    async fn update(&self, path: &CollectionPath, id: Uuid, patch: Value) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.update(*path, id, patch);
        self.commit(batch).await
    }

    async fn delete(&self, path: &CollectionPath, id: Uuid) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.delete(*path, id);
        self.commit(batch).await
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        list_documents(&self.pool, path).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let paths = batch.paths();
        let mut tx = self.pool.begin().await?;
        for op in batch.ops() {
            apply_op(&mut tx, op).await?;
        }
        // Notifications are delivered only if the transaction commits
        for path in &paths {
            notify(&mut tx, path).await?;
        }
        tx.commit().await?;
        tracing::debug!(ops = batch.len(), collections = paths.len(), "Committed batch");
        Ok(())
    }

    async fn watch(&self, path: &CollectionPath) -> Result<broadcast::Receiver<Snapshot>, StoreError> {
        if self.listener.is_finished() {
            return Err(StoreError::Unavailable(
                "change listener has stopped".to_string(),
            ));
        }
        Ok(self.channels.subscribe(*path).await)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
