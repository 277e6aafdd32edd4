//! Item persistence boundary.
//!
//! This module defines an infrastructure-facing abstraction over a key-indexed
//! item collection, with an in-memory implementation (tests/dev) and a Postgres
//! implementation (production).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryItemStore;
pub use postgres::PostgresItemStore;
pub use r#trait::{ItemStore, StoreError, StoreResult};
