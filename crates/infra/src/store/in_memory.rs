use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use itemproc_core::ItemId;
use itemproc_items::{Item, NewItem};

use super::r#trait::{ItemStore, StoreError, StoreResult};

/// In-memory item store.
///
/// Intended for tests/dev. Ids are handed out from 1 upwards and never reused.
#[derive(Debug)]
pub struct InMemoryItemStore {
    items: RwLock<BTreeMap<ItemId, Item>>,
    next_id: AtomicI64,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }

    fn scan(&self, keep: impl Fn(&Item) -> bool) -> StoreResult<Vec<Item>> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.values().filter(|i| keep(i)).cloned().collect())
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ItemStore for InMemoryItemStore {
    async fn find_all(&self) -> StoreResult<Vec<Item>> {
        self.scan(|_| true)
    }

    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.get(&id).cloned())
    }

    async fn find_unprocessed(&self) -> StoreResult<Vec<Item>> {
        self.scan(|i| !i.is_processed())
    }

    async fn create(&self, item: NewItem) -> StoreResult<Item> {
        let id = ItemId::from_raw(self.next_id.fetch_add(1, Ordering::SeqCst));
        let item = item.into_item(id);
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn save(&self, item: Item) -> StoreResult<Item> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        // Keep the sequence ahead of explicitly saved ids.
        self.next_id.fetch_max(item.id.get() + 1, Ordering::SeqCst);
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        Ok(items.remove(&id).is_some())
    }

    async fn mark_processed(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        Ok(items.get_mut(&id).map(|item| {
            item.mark_processed();
            item.clone()
        }))
    }
}
