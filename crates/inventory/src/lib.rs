//! Inventory domain module.
//!
//! Item catalog and the per-owner stock record, implemented purely as
//! deterministic domain logic (no IO, no storage). Atomicity of stock
//! mutations is the store's job; this crate only defines what a mutation is.

pub mod catalog;
pub mod inventory;

pub use catalog::{Catalog, CatalogEntry, ItemKind};
pub use inventory::{Inventory, InventoryItem};
