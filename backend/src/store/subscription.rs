//! Live collection subscriptions
//!
//! `subscribe` delivers the current contents of a collection, then one
//! snapshot per change, until the returned [`Subscription`] is dropped.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::{CollectionPath, DocumentStore, Snapshot, StoreError};

/// Guard for a live subscription; dropping it stops delivery
pub struct Subscription {
    path: CollectionPath,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn path(&self) -> CollectionPath {
        self.path
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(path = %self.path, "Released subscription");
        }
    }
}

/// Subscribe to `path`.
///
/// The initial snapshot is delivered before this returns. Failures after
/// that go to `on_error`; a receiver that falls behind re-reads the
/// collection instead of replaying missed snapshots.
pub async fn subscribe<F, E>(
    store: Arc<dyn DocumentStore>,
    path: CollectionPath,
    on_snapshot: F,
    on_error: E,
) -> Subscription
where
    F: Fn(Snapshot) + Send + Sync + 'static,
    E: Fn(StoreError) + Send + Sync + 'static,
{
    // Watch first so no write between the initial list and the loop is lost
    let mut rx = match store.watch(&path).await {
        Ok(rx) => rx,
        Err(e) => {
            on_error(e);
            return Subscription { path, task: None };
        }
    };

    match store.list(&path).await {
        Ok(documents) => on_snapshot(Snapshot { path, documents }),
        Err(e) => on_error(e),
    }

    let task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(snapshot) => on_snapshot(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(path = %path, skipped, "Subscriber lagged, re-reading collection");
                    match store.list(&path).await {
                        Ok(documents) => on_snapshot(Snapshot { path, documents }),
                        Err(e) => on_error(e),
                    }
                }
                Err(RecvError::Closed) => {
                    on_error(StoreError::Unavailable(format!(
                        "change feed for {} closed",
                        path
                    )));
                    break;
                }
            }
        }
    });

    tracing::debug!(path = %path, "Subscribed");
    Subscription {
        path,
        task: Some(task),
    }
}
