//! Domain models for RIMPE Invoice

mod client;
mod invoice;
mod payable;
mod product;

pub use client::*;
pub use invoice::*;
pub use payable::*;
pub use product::*;
