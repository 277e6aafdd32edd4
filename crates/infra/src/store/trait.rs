use std::sync::Arc;

use thiserror::Error;

use itemproc_core::ItemId;
use itemproc_items::{Item, NewItem};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence fault raised by an [`ItemStore`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing storage could not be reached (pool closed, lock poisoned, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query or write was rejected by the backing storage.
    #[error("{operation} failed: {message}")]
    Query {
        operation: &'static str,
        message: String,
    },

    /// A stored row could not be mapped back to an [`Item`].
    #[error("failed to decode item row: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn query(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Query {
            operation,
            message: message.into(),
        }
    }
}

/// Key-indexed item collection.
///
/// ## Semantics
///
/// - `create` assigns a fresh identifier; callers never choose ids.
/// - `save` is an upsert keyed by `item.id`. Writes to different ids are
///   independent and may run concurrently.
/// - `find_unprocessed` returns every item whose status is not `PROCESSED`.
/// - `mark_processed` only touches the status of an existing record and
///   returns `None` when the record is gone; it never recreates a row.
/// - `delete` reports whether a record existed.
///
/// Listing order is ascending by id for every implementation.
#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Item>>;

    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>>;

    async fn find_unprocessed(&self) -> StoreResult<Vec<Item>>;

    /// Persist a new item under a store-assigned id.
    async fn create(&self, item: NewItem) -> StoreResult<Item>;

    /// Insert or overwrite the record for `item.id`.
    async fn save(&self, item: Item) -> StoreResult<Item>;

    async fn delete(&self, id: ItemId) -> StoreResult<bool>;

    /// Set the status of an existing record to `PROCESSED`, leaving every
    /// other field as currently stored.
    async fn mark_processed(&self, id: ItemId) -> StoreResult<Option<Item>>;
}

#[async_trait::async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn find_all(&self) -> StoreResult<Vec<Item>> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        (**self).find_by_id(id).await
    }

    async fn find_unprocessed(&self) -> StoreResult<Vec<Item>> {
        (**self).find_unprocessed().await
    }

    async fn create(&self, item: NewItem) -> StoreResult<Item> {
        (**self).create(item).await
    }

    async fn save(&self, item: Item) -> StoreResult<Item> {
        (**self).save(item).await
    }

    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        (**self).delete(id).await
    }

    async fn mark_processed(&self, id: ItemId) -> StoreResult<Option<Item>> {
        (**self).mark_processed(id).await
    }
}
