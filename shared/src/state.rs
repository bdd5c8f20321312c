//! The application state container
//!
//! One `AppData` holds a user's four lists. Snapshots replace a list
//! wholesale; every other change goes through a named command.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::StockAdjustment;
use crate::models::{AccountsPayableEntry, Client, Invoice, Product};
use crate::types::StatusChange;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub invoices: Vec<Invoice>,
    pub accounts_payable: Vec<AccountsPayableEntry>,
}

impl AppData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offline variant: seeded once, mutated locally afterwards
    pub fn with_fixtures() -> Self {
        crate::fixtures::sample_data()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
            && self.products.is_empty()
            && self.invoices.is_empty()
            && self.accounts_payable.is_empty()
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn replace_clients(&mut self, clients: Vec<Client>) {
        self.clients = clients;
    }

    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn replace_invoices(&mut self, invoices: Vec<Invoice>) {
        self.invoices = invoices;
    }

    pub fn replace_accounts_payable(&mut self, entries: Vec<AccountsPayableEntry>) {
        self.accounts_payable = entries;
    }

    // ------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------

    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Insert or replace by id; new clients append
    pub fn upsert_client(&mut self, client: Client) {
        match self.clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client,
            None => self.clients.push(client),
        }
    }

    pub fn remove_client(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.clients, |c| c.id == id)
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn upsert_product(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
    }

    /// Returns false when the product is unknown
    pub fn set_stock(&mut self, id: Uuid, stock: i32) -> bool {
        match self.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.stock_quantity = stock;
                true
            }
            None => false,
        }
    }

    pub fn apply_stock_adjustments(&mut self, adjustments: &[StockAdjustment]) {
        for adjustment in adjustments {
            self.set_stock(adjustment.product_id, adjustment.new_stock);
        }
    }

    pub fn remove_product(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.products, |p| p.id == id)
    }

    pub fn low_stock_products(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_low_stock()).collect()
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    pub fn invoice(&self, id: Uuid) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    /// Insert or replace by id. A snapshot may already carry the record.
    pub fn upsert_invoice(&mut self, invoice: Invoice) {
        match self.invoices.iter_mut().find(|i| i.id == invoice.id) {
            Some(existing) => *existing = invoice,
            None => self.invoices.push(invoice),
        }
    }

    /// `None` when the invoice is unknown
    pub fn mark_invoice_paid(&mut self, id: Uuid) -> Option<StatusChange> {
        self.invoices
            .iter_mut()
            .find(|i| i.id == id)
            .map(Invoice::mark_paid)
    }

    pub fn remove_invoice(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.invoices, |i| i.id == id)
    }

    pub fn pending_invoices(&self) -> Vec<&Invoice> {
        self.invoices.iter().filter(|i| i.is_pending()).collect()
    }

    // ------------------------------------------------------------------
    // Accounts payable
    // ------------------------------------------------------------------

    pub fn payable(&self, id: Uuid) -> Option<&AccountsPayableEntry> {
        self.accounts_payable.iter().find(|e| e.id == id)
    }

    pub fn upsert_payable(&mut self, entry: AccountsPayableEntry) {
        match self.accounts_payable.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.accounts_payable.push(entry),
        }
    }

    pub fn mark_payable_paid(&mut self, id: Uuid) -> Option<StatusChange> {
        self.accounts_payable
            .iter_mut()
            .find(|e| e.id == id)
            .map(AccountsPayableEntry::mark_paid)
    }

    pub fn remove_payable(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.accounts_payable, |e| e.id == id)
    }
}

fn remove_by<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() != before
}
