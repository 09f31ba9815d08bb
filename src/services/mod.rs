//! Inventory services: the only writers of stock and ledger state.

use tracing::error;

use crate::errors::InventoryError;
use crate::models::InventoryItem;
use crate::store::{ItemStore, ItemUpdate, StoreError};

pub mod classification;
pub mod consumption;
pub mod reservations;
pub mod stock;

pub use classification::StockClassifier;
pub use consumption::ConsumptionRecorder;
pub use reservations::{MaterialRequest, ReservationManager};
pub use stock::StockMutator;

/// Commit a prepared batch against the store.
///
/// A `PartialUpdate` from a non-transactional store implementation is fatal:
/// it is logged for manual reconciliation and never retried, since a retry
/// would double-apply the already-committed patches.
pub(crate) async fn commit_batch(
    store: &dyn ItemStore,
    updates: Vec<ItemUpdate>,
    context: &str,
) -> Result<Vec<InventoryItem>, InventoryError> {
    match store.bulk_update(updates).await {
        Ok(updated) => Ok(updated),
        Err(StoreError::PartialUpdate { applied, failed }) => {
            error!(
                context,
                ?applied,
                failed = %failed,
                "Bulk update partially applied; manual reconciliation required"
            );
            Err(InventoryError::PartialBatchFailure {
                applied,
                message: format!("update of item {} failed during {}", failed, context),
            })
        }
        Err(e) => Err(e.into()),
    }
}
