//! Invoice drafting and generation

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{
    client_suggestions, next_invoice_number, resolve_client, ClientInput, ClientOption,
    ClientResolution, Collection, DraftSummary, Invoice,
};
use uuid::Uuid;

use super::clients::ClientService;
use crate::error::AppResult;
use crate::session::Session;
use crate::store::codec::{encode, patch};
use crate::store::{DocumentStore, WriteBatch};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemInput {
    /// `None` when nothing was picked in the product selector
    #[serde(default, alias = "id")]
    pub product_id: Option<Uuid>,
    pub quantity: i32,
}

/// Free text typed into the client selector
#[derive(Debug, Deserialize)]
pub struct ClientText {
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// Resolution outcome together with the draft it left behind
#[derive(Debug, Serialize)]
pub struct ClientSelection {
    pub resolution: ClientResolution,
    pub draft: DraftSummary,
}

#[derive(Clone)]
pub struct InvoicingService {
    store: Arc<dyn DocumentStore>,
    session: Arc<Session>,
}

impl InvoicingService {
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<Session>) -> Self {
        Self { store, session }
    }

    pub async fn draft(&self) -> DraftSummary {
        self.session.draft.lock().await.summary()
    }

    pub async fn add_item(&self, input: AddItemInput) -> AppResult<DraftSummary> {
        let product = input
            .product_id
            .and_then(|id| self.session.read().product(id).cloned());

        let mut draft = self.session.draft.lock().await;
        draft.add_item(product.as_ref(), input.quantity)?;
        Ok(draft.summary())
    }

    /// Removing a product that is not on the draft leaves it unchanged
    pub async fn remove_item(&self, product_id: Uuid) -> DraftSummary {
        let mut draft = self.session.draft.lock().await;
        draft.remove_item(product_id);
        draft.summary()
    }

    /// Exact name selects; anything else clears the selection
    pub async fn resolve_client(&self, text: &str) -> ClientSelection {
        let resolution = resolve_client(&self.session.read().clients, text);

        let mut draft = self.session.draft.lock().await;
        match &resolution {
            ClientResolution::Selected { client } => draft.select_client(Some(client.clone())),
            ClientResolution::Cleared | ClientResolution::RegisterNew { .. } => {
                draft.select_client(None)
            }
        }
        ClientSelection {
            resolution,
            draft: draft.summary(),
        }
    }

    pub fn suggestions(&self, text: &str) -> Vec<ClientOption> {
        client_suggestions(&self.session.read().clients, text)
    }

    /// Save the pre-filled registration form and select the new client
    pub async fn register_client(&self, input: ClientInput) -> AppResult<ClientSelection> {
        let client = ClientService::new(self.store.clone(), self.session.clone())
            .create(input)
            .await?;

        let mut draft = self.session.draft.lock().await;
        draft.select_client(Some(client.clone()));
        Ok(ClientSelection {
            resolution: ClientResolution::Selected { client },
            draft: draft.summary(),
        })
    }

    /// Turn the draft into a pending invoice.
    ///
    /// The invoice insert and every stock decrement go out as one batch.
    /// Nothing local changes and the draft is kept unless it commits.
    pub async fn generate(&self) -> AppResult<Invoice> {
        let mut draft = self.session.draft.lock().await;
        let now = Utc::now();

        let plan = {
            let data = self.session.read();
            let number = next_invoice_number(now.timestamp_millis(), &data.invoices);
            draft.prepare_invoice(&data.products, number, now)?
        };

        let products = self.session.path(Collection::Products);
        let mut batch = WriteBatch::new();
        let mut invoice = plan.invoice;
        invoice.id = batch.add(self.session.path(Collection::Invoices), encode(&invoice)?);
        for adjustment in &plan.adjustments {
            batch.update(
                products,
                adjustment.product_id,
                patch(json!({ "stockQuantity": adjustment.new_stock }))?,
            );
        }

        if let Err(e) = self.store.commit(batch).await {
            tracing::error!(
                user_id = %self.session.user_id(),
                invoice_number = %invoice.invoice_number,
                error = %e,
                "Invoice generation failed"
            );
            return Err(e.into());
        }

        {
            let mut data = self.session.write();
            data.apply_stock_adjustments(&plan.adjustments);
            data.upsert_invoice(invoice.clone());
        }
        draft.clear();

        tracing::info!(
            user_id = %self.session.user_id(),
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            lines = invoice.items.len(),
            "Invoice generated"
        );
        Ok(invoice)
    }
}
