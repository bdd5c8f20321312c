//! Accounts receivable: invoices awaiting payment

use std::sync::Arc;

use serde_json::json;
use shared::{Collection, Invoice, PaymentStatus, StatusChange};
use uuid::Uuid;

use super::StatusUpdate;
use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct ReceivablesService {
    store: Arc<dyn DocumentStore>,
    session: Arc<Session>,
}

impl ReceivablesService {
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<Session>) -> Self {
        Self { store, session }
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.session.read().invoices.clone()
    }

    pub fn pending(&self) -> Vec<Invoice> {
        self.session
            .read()
            .pending_invoices()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Pending -> paid. An already paid invoice is returned untouched.
    pub async fn mark_paid(&self, id: Uuid) -> AppResult<StatusUpdate<Invoice>> {
        let mut invoice = self
            .session
            .read()
            .invoice(id)
            .cloned()
            .ok_or(AppError::not_found(Collection::Invoices, id))?;

        if invoice.status == PaymentStatus::Paid {
            return Ok(StatusUpdate {
                record: invoice,
                change: StatusChange::AlreadyPaid,
            });
        }

        self.store
            .update(
                &self.session.path(Collection::Invoices),
                id,
                json!({ "status": PaymentStatus::Paid }),
            )
            .await?;

        self.session.write().mark_invoice_paid(id);
        let change = invoice.mark_paid();
        tracing::info!(
            user_id = %self.session.user_id(),
            invoice_number = %invoice.invoice_number,
            "Invoice marked paid"
        );
        Ok(StatusUpdate {
            record: invoice,
            change,
        })
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.session.read().invoice(id).is_none() {
            return Err(AppError::not_found(Collection::Invoices, id));
        }
        self.store
            .delete(&self.session.path(Collection::Invoices), id)
            .await?;

        self.session.write().remove_invoice(id);
        tracing::info!(user_id = %self.session.user_id(), invoice_id = %id, "Invoice deleted");
        Ok(())
    }
}
