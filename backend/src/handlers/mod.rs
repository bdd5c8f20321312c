//! HTTP handlers

pub mod auth;
pub mod clients;
pub mod health;
pub mod inventory;
pub mod invoicing;
pub mod payables;
pub mod receivables;
pub mod views;

pub use auth::*;
pub use clients::*;
pub use health::*;
pub use inventory::*;
pub use invoicing::*;
pub use payables::*;
pub use receivables::*;
pub use views::*;
