//! Client registry service

use std::sync::Arc;

use chrono::Utc;
use shared::{Client, ClientInput, Collection};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::store::codec::{encode, patch};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct ClientService {
    store: Arc<dyn DocumentStore>,
    session: Arc<Session>,
}

impl ClientService {
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<Session>) -> Self {
        Self { store, session }
    }

    pub fn list(&self) -> Vec<Client> {
        self.session.read().clients.clone()
    }

    /// Register a client; the stored record is returned and already in local state
    pub async fn create(&self, input: ClientInput) -> AppResult<Client> {
        input.validate()?;

        let mut client = Client::from_input(Uuid::nil(), input, Utc::now());
        let document = self
            .store
            .add(&self.session.path(Collection::Clients), encode(&client)?)
            .await?;
        client.id = document.id;

        self.session.write().upsert_client(client.clone());
        tracing::info!(user_id = %self.session.user_id(), client_id = %client.id, "Client registered");
        Ok(client)
    }

    /// Replace the editable fields; `createdAt` is kept
    pub async fn update(&self, id: Uuid, input: ClientInput) -> AppResult<Client> {
        let created_at = self
            .session
            .read()
            .client(id)
            .map(|c| c.created_at)
            .ok_or(AppError::not_found(Collection::Clients, id))?;
        input.validate()?;

        let client = Client::from_input(id, input, created_at);
        self.store
            .update(
                &self.session.path(Collection::Clients),
                id,
                patch(encode(&client)?)?,
            )
            .await?;

        self.session.write().upsert_client(client.clone());
        tracing::info!(user_id = %self.session.user_id(), client_id = %id, "Client updated");
        Ok(client)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.session.read().client(id).is_none() {
            return Err(AppError::not_found(Collection::Clients, id));
        }
        self.store
            .delete(&self.session.path(Collection::Clients), id)
            .await?;

        self.session.write().remove_client(id);
        tracing::info!(user_id = %self.session.user_id(), client_id = %id, "Client deleted");
        Ok(())
    }
}
