//! Accounts payable: bills owed to suppliers

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use shared::{AccountsPayableEntry, Collection, PayableInput, PaymentStatus, StatusChange};
use uuid::Uuid;
use validator::Validate;

use super::StatusUpdate;
use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::store::codec::encode;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct PayablesService {
    store: Arc<dyn DocumentStore>,
    session: Arc<Session>,
}

impl PayablesService {
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<Session>) -> Self {
        Self { store, session }
    }

    pub fn list(&self) -> Vec<AccountsPayableEntry> {
        self.session.read().accounts_payable.clone()
    }

    pub async fn create(&self, input: PayableInput) -> AppResult<AccountsPayableEntry> {
        input.validate()?;

        let mut entry = AccountsPayableEntry::from_input(Uuid::nil(), input, Utc::now());
        let document = self
            .store
            .add(&self.session.path(Collection::AccountsPayable), encode(&entry)?)
            .await?;
        entry.id = document.id;

        self.session.write().upsert_payable(entry.clone());
        tracing::info!(
            user_id = %self.session.user_id(),
            supplier = %entry.supplier,
            amount = %entry.amount,
            "Payable recorded"
        );
        Ok(entry)
    }

    pub async fn mark_paid(&self, id: Uuid) -> AppResult<StatusUpdate<AccountsPayableEntry>> {
        let mut entry = self
            .session
            .read()
            .payable(id)
            .cloned()
            .ok_or(AppError::not_found(Collection::AccountsPayable, id))?;

        if entry.status == PaymentStatus::Paid {
            return Ok(StatusUpdate {
                record: entry,
                change: StatusChange::AlreadyPaid,
            });
        }

        self.store
            .update(
                &self.session.path(Collection::AccountsPayable),
                id,
                json!({ "status": PaymentStatus::Paid }),
            )
            .await?;

        self.session.write().mark_payable_paid(id);
        let change = entry.mark_paid();
        tracing::info!(user_id = %self.session.user_id(), payable_id = %id, "Payable marked paid");
        Ok(StatusUpdate {
            record: entry,
            change,
        })
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.session.read().payable(id).is_none() {
            return Err(AppError::not_found(Collection::AccountsPayable, id));
        }
        self.store
            .delete(&self.session.path(Collection::AccountsPayable), id)
            .await?;

        self.session.write().remove_payable(id);
        tracing::info!(user_id = %self.session.user_id(), payable_id = %id, "Payable deleted");
        Ok(())
    }
}
