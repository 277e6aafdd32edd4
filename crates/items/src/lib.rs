//! Item domain module.
//!
//! This crate contains the business rules for item records, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod validation;

pub use item::{CreateItem, Item, ItemPatch, NewItem, UpdateItem, PROCESSED};
