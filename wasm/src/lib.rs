//! WebAssembly module for RIMPE Invoice
//!
//! Provides client-side computation for:
//! - Invoice totals with 12% VAT
//! - Line-item merging against stock
//! - Client autocomplete and resolution
//! - View routing and form validation
//!
//! Records cross the boundary as JSON strings. Each export is a thin wrapper
//! over a plain Rust function so the logic is testable off the browser.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::Validate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{
    client_suggestions, first_failure, next_invoice_number, resolve_client, InvoiceDraft,
    InvoiceTotals, View,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("RIMPE Invoice WASM module loaded"));
}

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ============================================================================
// Totals and line items
// ============================================================================

pub fn totals_json(items_json: &str) -> Result<String, String> {
    let items: Vec<InvoiceLineItem> = parse(items_json, "line items")?;
    let totals = InvoiceTotals::compute(&items).map_err(|e| e.message_es())?;
    to_json(&totals)
}

/// Subtotal, VAT and total for a list of line items
#[wasm_bindgen]
pub fn calculate_invoice_totals(items_json: &str) -> Result<String, JsValue> {
    totals_json(items_json).map_err(js_error)
}

/// `product_json` may be empty when nothing is selected. Errors carry the
/// Spanish message shown to the user.
pub fn add_item_json(draft_json: &str, product_json: &str, quantity: i32) -> Result<String, String> {
    let mut draft: InvoiceDraft = parse(draft_json, "draft")?;
    let product: Option<Product> = if product_json.trim().is_empty() {
        None
    } else {
        Some(parse(product_json, "product")?)
    };
    draft
        .add_item(product.as_ref(), quantity)
        .map_err(|e| e.message_es())?;
    to_json(&draft.summary())
}

#[wasm_bindgen]
pub fn add_line_item(draft_json: &str, product_json: &str, quantity: i32) -> Result<String, JsValue> {
    add_item_json(draft_json, product_json, quantity).map_err(js_error)
}

pub fn invoice_number_json(millis: f64, invoices_json: &str) -> Result<String, String> {
    let invoices: Vec<Invoice> = parse(invoices_json, "invoices")?;
    Ok(next_invoice_number(millis as i64, &invoices))
}

/// Invoice number for `Date.now()`, unique among `invoices_json`
#[wasm_bindgen]
pub fn next_invoice_number_for(millis: f64, invoices_json: &str) -> Result<String, JsValue> {
    invoice_number_json(millis, invoices_json).map_err(js_error)
}

// ============================================================================
// Clients
// ============================================================================

pub fn resolve_client_json(clients_json: &str, input: &str) -> Result<String, String> {
    let clients: Vec<Client> = parse(clients_json, "clients")?;
    to_json(&resolve_client(&clients, input))
}

#[wasm_bindgen]
pub fn resolve_client_input(clients_json: &str, input: &str) -> Result<String, JsValue> {
    resolve_client_json(clients_json, input).map_err(js_error)
}

pub fn suggestions_json(clients_json: &str, input: &str) -> Result<String, String> {
    let clients: Vec<Client> = parse(clients_json, "clients")?;
    to_json(&client_suggestions(&clients, input))
}

/// Autocomplete options for the client selector
#[wasm_bindgen]
pub fn client_options(clients_json: &str, input: &str) -> Result<String, JsValue> {
    suggestions_json(clients_json, input).map_err(js_error)
}

/// First failing field of a client form, as a Spanish message
pub fn check_client_form(form_json: &str) -> Result<(), String> {
    let form: ClientInput = parse(form_json, "client form")?;
    match form.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(first_failure(&errors)
            .map(|f| f.message_es())
            .unwrap_or_else(|| "Formulario no válido".to_string())),
    }
}

#[wasm_bindgen]
pub fn validate_client_form(form_json: &str) -> Result<(), JsValue> {
    check_client_form(form_json).map_err(js_error)
}

// ============================================================================
// Views and formatting
// ============================================================================

/// Canonical id for a requested view; unknown ids route to the dashboard
#[wasm_bindgen]
pub fn route_view(view_id: &str) -> String {
    View::from_id(view_id).id().to_string()
}

#[wasm_bindgen]
pub fn view_label(view_id: &str) -> String {
    View::from_id(view_id).label_es().to_string()
}

/// `"112"` -> `"$112.00"`; unparseable input shows as `$0.00`
#[wasm_bindgen]
pub fn format_amount(amount: &str) -> String {
    format_money(Decimal::from_str(amount.trim()).unwrap_or(Decimal::ZERO))
}

#[wasm_bindgen]
pub fn is_low_stock(stock: i32) -> bool {
    stock < LOW_STOCK_THRESHOLD
}
