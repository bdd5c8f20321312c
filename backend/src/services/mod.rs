//! Business logic services for RIMPE Invoice
//!
//! Services act on one user's session: reads come from the session's
//! `AppData`, writes go to the document store first and are mirrored into
//! local state once the store accepts them.

use serde::Serialize;
use shared::StatusChange;

pub mod auth;
pub mod clients;
pub mod inventory;
pub mod invoicing;
pub mod payables;
pub mod receivables;
pub mod views;

pub use auth::AuthService;
pub use clients::ClientService;
pub use inventory::InventoryService;
pub use invoicing::InvoicingService;
pub use payables::PayablesService;
pub use receivables::ReceivablesService;
pub use views::ViewService;

/// Result of a pending -> paid request
#[derive(Debug, Serialize)]
pub struct StatusUpdate<T> {
    pub record: T,
    pub change: StatusChange,
}
