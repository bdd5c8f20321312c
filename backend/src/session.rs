//! Per-user sessions
//!
//! A session owns the user's `AppData`, the invoice draft, queued notices
//! and one live subscription per collection. Snapshots replace the
//! matching list wholesale. Closing or dropping the session releases the
//! subscriptions.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use shared::fixtures::sample_data;
use shared::{
    AccountsPayableEntry, AppData, Client, Collection, DataStatus, Invoice, InvoiceDraft, Notice,
    Product,
};
use uuid::Uuid;

use crate::store::codec::{decode_all, encode};
use crate::store::{
    subscribe, CollectionPath, DocumentStore, Snapshot, StoreError, Subscription, WriteBatch,
};

/// Oldest notices are dropped past this many
const MAX_QUEUED_NOTICES: usize = 100;

pub struct Session {
    user_id: Uuid,
    data: Arc<RwLock<AppData>>,
    loaded: Arc<Mutex<HashSet<Collection>>>,
    notices: Arc<Mutex<VecDeque<Notice>>>,
    subscriptions: Mutex<Vec<Subscription>>,
    last_seen: Mutex<Instant>,
    /// Held across the generation commit so draft edits serialize
    pub draft: tokio::sync::Mutex<InvoiceDraft>,
}

impl Session {
    /// Subscribe to the user's four collections and wait for their first snapshots
    pub async fn open(store: Arc<dyn DocumentStore>, user_id: Uuid, seed_fixtures: bool) -> Arc<Self> {
        let session = Arc::new(Self {
            user_id,
            data: Arc::new(RwLock::new(AppData::new())),
            loaded: Arc::new(Mutex::new(HashSet::new())),
            notices: Arc::new(Mutex::new(VecDeque::new())),
            subscriptions: Mutex::new(Vec::with_capacity(Collection::ALL.len())),
            last_seen: Mutex::new(Instant::now()),
            draft: tokio::sync::Mutex::new(InvoiceDraft::new()),
        });

        for collection in Collection::ALL {
            let path = CollectionPath::new(user_id, collection);
            let subscription = subscribe(
                store.clone(),
                path,
                snapshot_handler(session.data.clone(), session.loaded.clone(), session.notices.clone()),
                error_handler(path, session.notices.clone()),
            )
            .await;
            lock(&session.subscriptions).push(subscription);
        }

        let needs_seed =
            seed_fixtures && session.status() == DataStatus::Ready && session.read().is_empty();
        if needs_seed {
            if let Err(e) = session.seed(store.as_ref()).await {
                tracing::error!(user_id = %user_id, error = %e, "Failed to seed fixture data");
                session.push_notice(Notice::error(format!("Error al cargar datos de ejemplo: {}", e)));
            }
        }

        tracing::info!(user_id = %user_id, status = ?session.status(), "Session opened");
        session
    }

    async fn seed(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        let fixtures = sample_data();
        let mut batch = WriteBatch::new();
        let path = |collection| CollectionPath::new(self.user_id, collection);
        for client in &fixtures.clients {
            batch.set(path(Collection::Clients), client.id, encode(client)?);
        }
        for product in &fixtures.products {
            batch.set(path(Collection::Products), product.id, encode(product)?);
        }
        for invoice in &fixtures.invoices {
            batch.set(path(Collection::Invoices), invoice.id, encode(invoice)?);
        }
        for entry in &fixtures.accounts_payable {
            batch.set(path(Collection::AccountsPayable), entry.id, encode(entry)?);
        }
        store.commit(batch).await?;
        *self.write() = fixtures;
        tracing::info!(user_id = %self.user_id, "Seeded fixture data");
        Ok(())
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Record a request against this session
    pub fn touch(&self) {
        *lock(&self.last_seen) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        lock(&self.last_seen).elapsed()
    }

    pub fn path(&self, collection: Collection) -> CollectionPath {
        CollectionPath::new(self.user_id, collection)
    }

    /// Never hold the guard across an `.await`
    pub fn read(&self) -> RwLockReadGuard<'_, AppData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, AppData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> DataStatus {
        let subscriptions = lock(&self.subscriptions);
        if subscriptions.len() < Collection::ALL.len() || !subscriptions.iter().all(Subscription::is_active) {
            return DataStatus::NotConnected;
        }
        if lock(&self.loaded).len() < Collection::ALL.len() {
            return DataStatus::Loading;
        }
        DataStatus::Ready
    }

    pub fn push_notice(&self, notice: Notice) {
        push_bounded(&self.notices, notice);
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        lock(&self.notices).drain(..).collect()
    }

    /// Release every subscription; the data stays readable
    pub fn close(&self) {
        let released: Vec<Subscription> = lock(&self.subscriptions).drain(..).collect();
        tracing::info!(user_id = %self.user_id, subscriptions = released.len(), "Session closed");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn push_bounded(notices: &Mutex<VecDeque<Notice>>, notice: Notice) {
    let mut notices = lock(notices);
    if notices.len() >= MAX_QUEUED_NOTICES {
        notices.pop_front();
    }
    notices.push_back(notice);
}

fn snapshot_handler(
    data: Arc<RwLock<AppData>>,
    loaded: Arc<Mutex<HashSet<Collection>>>,
    notices: Arc<Mutex<VecDeque<Notice>>>,
) -> impl Fn(Snapshot) + Send + Sync + 'static {
    move |snapshot: Snapshot| {
        let collection = snapshot.path.collection;
        let failures = apply_snapshot(&data, &snapshot);
        for failure in failures {
            tracing::warn!(path = %snapshot.path, error = %failure, "Skipping undecodable document");
            push_bounded(&notices, Notice::error(format!("Documento inválido: {}", failure)));
        }
        lock(&loaded).insert(collection);
    }
}

fn error_handler(
    path: CollectionPath,
    notices: Arc<Mutex<VecDeque<Notice>>>,
) -> impl Fn(StoreError) + Send + Sync + 'static {
    move |error: StoreError| {
        tracing::error!(path = %path, error = %error, "Subscription error");
        push_bounded(
            &notices,
            Notice::error(format!("Error al cargar {}: {}", collection_label_es(path.collection), error)),
        );
    }
}

/// Decode outside the lock, then swap the list in
fn apply_snapshot(data: &RwLock<AppData>, snapshot: &Snapshot) -> Vec<StoreError> {
    let documents = &snapshot.documents;
    match snapshot.path.collection {
        Collection::Clients => {
            let (records, failures) = decode_all::<Client>(documents);
            data.write().unwrap_or_else(PoisonError::into_inner).replace_clients(records);
            failures
        }
        Collection::Products => {
            let (records, failures) = decode_all::<Product>(documents);
            data.write().unwrap_or_else(PoisonError::into_inner).replace_products(records);
            failures
        }
        Collection::Invoices => {
            let (records, failures) = decode_all::<Invoice>(documents);
            data.write().unwrap_or_else(PoisonError::into_inner).replace_invoices(records);
            failures
        }
        Collection::AccountsPayable => {
            let (records, failures) = decode_all::<AccountsPayableEntry>(documents);
            data.write()
                .unwrap_or_else(PoisonError::into_inner)
                .replace_accounts_payable(records);
            failures
        }
    }
}

fn collection_label_es(collection: Collection) -> &'static str {
    match collection {
        Collection::Clients => "clientes",
        Collection::Products => "productos",
        Collection::Invoices => "facturas",
        Collection::AccountsPayable => "cuentas por pagar",
    }
}

/// Live sessions by user id.
///
/// Sessions idle for longer than `idle_timeout` are closed and dropped.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<tokio::sync::RwLock<HashMap<Uuid, Arc<Session>>>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(&user_id).cloned()?;
        session.touch();
        Some(session)
    }

    /// Return the live session for `user_id`, opening one if needed.
    ///
    /// The session opens without the registry lock held; when two callers
    /// race, the first insert wins and the other session is closed.
    pub async fn get_or_open(
        &self,
        store: Arc<dyn DocumentStore>,
        user_id: Uuid,
        seed_fixtures: bool,
    ) -> Arc<Session> {
        if let Some(session) = self.get(user_id).await {
            return session;
        }
        self.prune_idle().await;

        let opened = Session::open(store, user_id, seed_fixtures).await;
        let mut sessions = self.sessions.write().await;
        match sessions.get(&user_id).cloned() {
            Some(existing) => {
                drop(sessions);
                opened.close();
                existing.touch();
                existing
            }
            None => {
                sessions.insert(user_id, opened.clone());
                opened
            }
        }
    }

    /// Close every session idle past the timeout; returns how many went
    pub async fn prune_idle(&self) -> usize {
        let idle: Vec<Arc<Session>> = {
            let mut sessions = self.sessions.write().await;
            let expired: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, session)| session.idle_for() > self.idle_timeout)
                .map(|(user_id, _)| *user_id)
                .collect();
            expired
                .iter()
                .filter_map(|user_id| sessions.remove(user_id))
                .collect()
        };
        for session in &idle {
            session.close();
        }
        if !idle.is_empty() {
            tracing::info!(closed = idle.len(), "Pruned idle sessions");
        }
        idle.len()
    }

    /// Close and forget the session; false when none was open
    pub async fn close(&self, user_id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&user_id);
        match removed {
            Some(session) => {
                session.close();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
