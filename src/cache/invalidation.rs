//! Declared invalidation rules for the query cache.
//!
//! Rule set: a successful mutation of an item in category `C` invalidates
//! `{all-items, category C, low-stock, item}`. Low-stock detections refresh
//! only the low-stock view; no stored item state changed.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheKey, QueryCache};
use crate::events::{Event, EventHandler};

/// Cache keys a given event invalidates.
pub fn invalidation_keys(event: &Event) -> Vec<CacheKey> {
    if event.is_mutation() {
        vec![
            CacheKey::AllItems,
            CacheKey::Category(event.category()),
            CacheKey::LowStock,
            CacheKey::Item(event.item_id()),
        ]
    } else {
        vec![CacheKey::LowStock]
    }
}

/// Event handler that applies [`invalidation_keys`] to a [`QueryCache`].
pub struct CacheInvalidator {
    cache: Arc<QueryCache>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl EventHandler for CacheInvalidator {
    async fn handle_event(&self, event: Event) -> Result<(), String> {
        let keys = invalidation_keys(&event);
        debug!(item_id = %event.item_id(), count = keys.len(), "Invalidating cached queries");
        for key in keys {
            self.cache.delete(&key).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCategory, StockStatus};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn mutations_invalidate_list_category_low_stock_and_item() {
        let item_id = Uuid::new_v4();
        let keys = invalidation_keys(&Event::InventoryReserved {
            order_id: "BA-2044".into(),
            item_id,
            category: ItemCategory::RawMaterial,
            quantity: 4,
            remaining_stock: 16,
        });
        assert_eq!(
            keys,
            vec![
                CacheKey::AllItems,
                CacheKey::Category(ItemCategory::RawMaterial),
                CacheKey::LowStock,
                CacheKey::Item(item_id),
            ]
        );
    }

    #[test]
    fn low_stock_detection_only_refreshes_low_stock_view() {
        let keys = invalidation_keys(&Event::LowStockDetected {
            item_id: Uuid::new_v4(),
            category: ItemCategory::Consumable,
            current_stock: 2,
            min_stock: 5,
            status: StockStatus::Critical,
            detected_at: Utc::now(),
        });
        assert_eq!(keys, vec![CacheKey::LowStock]);
    }

    #[tokio::test]
    async fn invalidator_deletes_affected_entries() {
        let cache = Arc::new(QueryCache::new(None));
        cache.set(CacheKey::AllItems, "[]".into()).unwrap();
        cache.set(CacheKey::LowStock, "[]".into()).unwrap();
        cache
            .set(CacheKey::Category(ItemCategory::SparePart), "[]".into())
            .unwrap();

        let item_id = Uuid::new_v4();
        let invalidator = CacheInvalidator::new(cache.clone());
        invalidator
            .handle_event(Event::StockAdjusted {
                item_id,
                category: ItemCategory::RawMaterial,
                old_quantity: 9,
                new_quantity: 11,
            })
            .await
            .unwrap();

        assert_eq!(cache.get(&CacheKey::AllItems).unwrap(), None);
        assert_eq!(cache.get(&CacheKey::LowStock).unwrap(), None);
        // Other categories keep their entries.
        assert!(cache
            .get(&CacheKey::Category(ItemCategory::SparePart))
            .unwrap()
            .is_some());
    }
}
