//! Invoice totals and the in-progress invoice draft
//!
//! Everything here is pure: the draft is mutated in place and generation only
//! produces an [`InvoicePlan`] describing what has to be written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Client, Invoice, InvoiceLineItem, Product};
use crate::types::PaymentStatus;

/// Ecuadorian VAT (IVA), fixed at 12%
pub const VAT_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);

const INVOICE_NUMBER_PREFIX: &str = "INV-";
const INVOICE_NUMBER_MODULUS: i64 = 1_000_000;

/// Subtotal, VAT and total of a list of line items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Fails when any intermediate amount does not fit a `Decimal`
    pub fn compute(items: &[InvoiceLineItem]) -> Result<Self, DraftError> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| {
                item.line_total().and_then(|line| acc.checked_add(line))
            })
            .ok_or(DraftError::AmountTooLarge)?;
        let tax = subtotal
            .checked_mul(VAT_RATE)
            .ok_or(DraftError::AmountTooLarge)?;
        let total = subtotal
            .checked_add(tax)
            .ok_or(DraftError::AmountTooLarge)?;
        Ok(Self {
            subtotal,
            tax,
            total,
        })
    }
}

/// Reasons a draft operation is refused. None of them mutate the draft.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("No product selected")]
    NoProductSelected,

    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,

    #[error("Not enough stock for \"{name}\". Available: {available}")]
    InsufficientStock { name: String, available: i32 },

    #[error("Select or register a client first")]
    NoClientSelected,

    #[error("An invoice needs at least one product")]
    EmptyInvoice,

    #[error("Line quantity is too large")]
    QuantityTooLarge,

    #[error("Invoice amount is too large")]
    AmountTooLarge,
}

impl DraftError {
    /// Spanish message shown by the UI
    pub fn message_es(&self) -> String {
        match self {
            DraftError::NoProductSelected => "Por favor, selecciona un producto.".to_string(),
            DraftError::NonPositiveQuantity => "La cantidad debe ser mayor a cero.".to_string(),
            DraftError::InsufficientStock { name, available } => format!(
                "No hay suficiente stock para \"{}\". Stock disponible: {}",
                name, available
            ),
            DraftError::NoClientSelected => {
                "Por favor, selecciona un cliente o regístralo.".to_string()
            }
            DraftError::EmptyInvoice => {
                "La factura debe tener al menos un producto.".to_string()
            }
            DraftError::QuantityTooLarge => "La cantidad es demasiado grande.".to_string(),
            DraftError::AmountTooLarge => {
                "El monto de la factura es demasiado grande.".to_string()
            }
        }
    }
}

/// A stock level to write back after invoicing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub new_stock: i32,
}

/// Everything invoice generation has to persist, in one unit
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePlan {
    pub invoice: Invoice,
    pub adjustments: Vec<StockAdjustment>,
}

/// The invoice being assembled on the invoicing screen
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub client: Option<Client>,
    pub items: Vec<InvoiceLineItem>,
}

/// Draft plus its running totals, as rendered on screen
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub client: Option<Client>,
    pub items: Vec<InvoiceLineItem>,
    pub totals: InvoiceTotals,
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// The requested quantity alone is checked against current stock. The
    /// draft only changes when the merged lines still total up.
    pub fn add_item(&mut self, product: Option<&Product>, quantity: i32) -> Result<(), DraftError> {
        let product = product.ok_or(DraftError::NoProductSelected)?;
        if quantity <= 0 {
            return Err(DraftError::NonPositiveQuantity);
        }
        if quantity > product.stock_quantity {
            return Err(DraftError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock_quantity,
            });
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.product_id == product.id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(DraftError::QuantityTooLarge)?;
            }
            None => items.push(InvoiceLineItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.unit_price,
                quantity,
            }),
        }
        InvoiceTotals::compute(&items)?;
        self.items = items;
        Ok(())
    }

    /// Drop the line for `product_id`; returns whether a line was removed
    pub fn remove_item(&mut self, product_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    pub fn select_client(&mut self, client: Option<Client>) {
        self.client = client;
    }

    /// Lines are checked on add, so only a hand-built draft falls back to zero
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(&self.items).unwrap_or_default()
    }

    pub fn summary(&self) -> DraftSummary {
        DraftSummary {
            client: self.client.clone(),
            items: self.items.clone(),
            totals: self.totals(),
        }
    }

    pub fn clear(&mut self) {
        self.client = None;
        self.items.clear();
    }

    /// Build the invoice and the stock write-backs without touching the draft.
    ///
    /// Every line is re-checked against `products` as they are now. Lines
    /// whose product no longer exists are invoiced but adjust nothing.
    pub fn prepare_invoice(
        &self,
        products: &[Product],
        invoice_number: String,
        now: DateTime<Utc>,
    ) -> Result<InvoicePlan, DraftError> {
        let client = self.client.as_ref().ok_or(DraftError::NoClientSelected)?;
        if self.items.is_empty() {
            return Err(DraftError::EmptyInvoice);
        }

        let mut adjustments = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let Some(product) = products.iter().find(|p| p.id == item.product_id) else {
                continue;
            };
            if item.quantity > product.stock_quantity {
                return Err(DraftError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock_quantity,
                });
            }
            adjustments.push(StockAdjustment {
                product_id: product.id,
                new_stock: product.stock_quantity - item.quantity,
            });
        }

        let totals = InvoiceTotals::compute(&self.items)?;
        let invoice = Invoice {
            id: Uuid::nil(),
            invoice_number,
            customer_id: client.id,
            customer_name: client.name.clone(),
            customer_tax_id: client.tax_id.clone(),
            customer_address: client.address.clone(),
            items: self.items.clone(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            issue_date: now.date_naive(),
            status: PaymentStatus::Pending,
            created_at: now,
        };

        Ok(InvoicePlan {
            invoice,
            adjustments,
        })
    }
}

/// `INV-` plus the last six digits of the millisecond timestamp
pub fn invoice_number_from_millis(millis: i64) -> String {
    format!(
        "{}{:06}",
        INVOICE_NUMBER_PREFIX,
        millis.rem_euclid(INVOICE_NUMBER_MODULUS)
    )
}

/// Timestamp-derived number, bumped until it is unused in `existing`
pub fn next_invoice_number(millis: i64, existing: &[Invoice]) -> String {
    let mut seed = millis.rem_euclid(INVOICE_NUMBER_MODULUS);
    for _ in 0..INVOICE_NUMBER_MODULUS {
        let candidate = invoice_number_from_millis(seed);
        if !existing.iter().any(|inv| inv.invoice_number == candidate) {
            return candidate;
        }
        seed = (seed + 1).rem_euclid(INVOICE_NUMBER_MODULUS);
    }
    // every six-digit suffix is taken
    invoice_number_from_millis(millis)
}
