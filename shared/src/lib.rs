//! Shared types and models for RIMPE Invoice
//!
//! This crate contains the domain types and pure business rules shared
//! between the backend, the browser front-end (via WASM) and tests.

pub mod billing;
pub mod dashboard;
pub mod fixtures;
pub mod models;
pub mod resolution;
pub mod state;
pub mod types;
pub mod validation;
pub mod views;

pub use billing::*;
pub use dashboard::*;
pub use models::*;
pub use resolution::*;
pub use state::*;
pub use types::*;
pub use validation::*;
pub use views::*;
