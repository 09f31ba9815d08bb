//! Stock Mutator: the single authority over `current_stock` arithmetic.

use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::InventoryError;
use crate::events::{Event, EventSender};
use crate::models::InventoryItem;
use crate::services::commit_batch;
use crate::store::{ItemPatch, ItemStore, ItemUpdate};

/// Checked debit: the stock remaining after removing `quantity`, or
/// `InsufficientStock` naming the item and what was available.
pub(crate) fn checked_debit(item: &InventoryItem, quantity: i32) -> Result<i32, InventoryError> {
    let available = item.current_stock;
    if quantity > available {
        return Err(InventoryError::insufficient_stock(
            item.id,
            &item.item_name,
            quantity,
            available,
        ));
    }
    Ok(available - quantity)
}

/// Applies signed stock deltas to single items.
///
/// Touches nothing beyond `current_stock` and `last_updated`; the reservation
/// ledger belongs to [`crate::services::ReservationManager`].
#[derive(Clone)]
pub struct StockMutator {
    store: Arc<dyn ItemStore>,
    event_sender: EventSender,
}

impl StockMutator {
    pub fn new(store: Arc<dyn ItemStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn apply_delta(
        &self,
        item_id: Uuid,
        delta: i32,
    ) -> Result<InventoryItem, InventoryError> {
        if delta == 0 {
            return Err(InventoryError::InvalidQuantity { quantity: 0 });
        }

        let item = self.store.get(item_id).await?;
        if delta < 0 {
            // Pre-check for the caller-facing message; the store re-checks
            // atomically when the patch lands.
            checked_debit(&item, -delta)?;
        }

        let mut updated = commit_batch(
            self.store.as_ref(),
            vec![ItemUpdate::new(item_id, ItemPatch::stock_delta(delta))],
            "stock adjustment",
        )
        .await?;
        let updated = updated
            .pop()
            .ok_or_else(|| InventoryError::validation("store returned empty update result"))?;

        info!(
            item_id = %item_id,
            delta,
            new_stock = updated.current_stock,
            "Adjusted stock"
        );
        self.event_sender
            .send_logged(Event::StockAdjusted {
                item_id,
                category: item.category,
                old_quantity: item.current_stock,
                new_quantity: updated.current_stock,
            })
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_channel;
    use crate::models::ItemCategory;
    use crate::store::InMemoryItemStore;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    async fn mutator_with(stock: i32) -> (StockMutator, Uuid) {
        let store = Arc::new(InMemoryItemStore::new());
        let item = InventoryItem::new(
            "binding glue",
            ItemCategory::Consumable,
            "kg",
            stock,
            4,
            dec!(120.00),
        );
        let id = item.id;
        store.insert(item).await;
        let (sender, _rx) = event_channel(16);
        (StockMutator::new(store, sender), id)
    }

    #[tokio::test]
    async fn positive_delta_credits_stock() {
        let (mutator, id) = mutator_with(10).await;
        let updated = mutator.apply_delta(id, 5).await.unwrap();
        assert_eq!(updated.current_stock, 15);
    }

    #[tokio::test]
    async fn negative_delta_past_zero_is_rejected() {
        let (mutator, id) = mutator_with(10).await;
        let err = mutator.apply_delta(id, -11).await.unwrap_err();
        assert_matches!(
            err,
            InventoryError::InsufficientStock { requested: 11, available: 10, .. }
        );
    }

    #[tokio::test]
    async fn zero_delta_is_invalid() {
        let (mutator, id) = mutator_with(10).await;
        assert_matches!(
            mutator.apply_delta(id, 0).await,
            Err(InventoryError::InvalidQuantity { quantity: 0 })
        );
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let (mutator, _) = mutator_with(10).await;
        let missing = Uuid::new_v4();
        assert_matches!(
            mutator.apply_delta(missing, -1).await,
            Err(InventoryError::NotFound(id)) if id == missing
        );
    }

    #[tokio::test]
    async fn delta_leaves_ledger_untouched() {
        let (mutator, id) = mutator_with(10).await;
        let updated = mutator.apply_delta(id, -3).await.unwrap();
        assert!(updated.reservations.is_empty());
        assert!(updated.consumption_history.is_empty());
    }
}
