//! In-memory reference implementation of [`ItemStore`].

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::InventoryItem;
use crate::store::{ItemStore, ItemUpdate, StoreError};

/// Item store backed by a shared map.
///
/// A single write guard spans validation and application of a bulk update, so
/// batches are atomic and conditional stock deltas cannot over-commit even
/// when reservation requests race each other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<Uuid, InventoryItem>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item. Seeding helper for tests and embedding
    /// callers; the reservation core itself never creates items.
    pub async fn insert(&self, item: InventoryItem) {
        self.items.write().await.insert(item.id, item);
    }

    pub async fn seed(&self, items: impl IntoIterator<Item = InventoryItem>) {
        let mut guard = self.items.write().await;
        for item in items {
            guard.insert(item.id, item);
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: Uuid) -> Result<InventoryItem, StoreError> {
        self.items
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn get_all(&self) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn bulk_update(
        &self,
        updates: Vec<ItemUpdate>,
    ) -> Result<Vec<InventoryItem>, StoreError> {
        let mut guard = self.items.write().await;

        // Stage every patch against working copies before touching the map.
        // Patches against the same item chain, so a batch cannot sneak past
        // the non-negativity or ledger checks in two steps.
        let now = Utc::now();
        let mut staged: HashMap<Uuid, InventoryItem> = HashMap::new();
        let mut updated = Vec::with_capacity(updates.len());
        for update in &updates {
            let mut item = match staged.get(&update.id) {
                Some(pending) => pending.clone(),
                None => guard
                    .get(&update.id)
                    .cloned()
                    .ok_or(StoreError::NotFound(update.id))?,
            };
            update.patch.apply(&mut item, now)?;
            updated.push(item.clone());
            staged.insert(update.id, item);
        }

        for (id, item) in staged {
            guard.insert(id, item);
        }

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
