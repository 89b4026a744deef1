//! Inventory domain module.
//!
//! This crate contains the inventory record model and its business rules,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod record;

pub use record::{
    InventoryDocument, InventoryDraft, InventoryRecord, UPDATED_AT_FIELD, total_value,
};
