use serde::Serialize;
use uuid::Uuid;

use crate::store::StoreError;

/// Errors surfaced by the reservation, consumption and stock services.
///
/// Everything here is returned as a typed result to the calling order
/// workflow; nothing is retried automatically. `InsufficientStock` carries the
/// offending item plus requested-vs-available quantities so the caller can
/// render a useful message. `PartialBatchFailure` is fatal and must be logged
/// for manual reconciliation; retrying it risks double-application.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum InventoryError {
    #[error("Item not found: {0}")]
    NotFound(Uuid),

    #[error("Insufficient stock for item {item_id} ({item_name}): requested {requested}, available {available}")]
    InsufficientStock {
        item_id: Uuid,
        item_name: String,
        requested: i32,
        available: i32,
    },

    #[error("Invalid quantity {quantity}: must be greater than zero")]
    InvalidQuantity { quantity: i32 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Order {order_id} already holds an active reservation on item {item_id}")]
    DuplicateReservation { order_id: String, item_id: Uuid },

    #[error("No active reservation for order {order_id} on item {item_id}")]
    ReservationMissing { order_id: String, item_id: Uuid },

    #[error("Consumed quantity {requested} does not match reserved quantity {reserved} for order {order_id} on item {item_id}")]
    QuantityMismatch {
        order_id: String,
        item_id: Uuid,
        reserved: i32,
        requested: i32,
    },

    #[error("Partial batch failure, manual reconciliation required: {message} (applied: {applied:?})")]
    PartialBatchFailure { applied: Vec<Uuid>, message: String },

    #[error("Store error: {0}")]
    Store(#[serde(skip)] StoreError),
}

impl From<StoreError> for InventoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => InventoryError::NotFound(id),
            StoreError::DuplicateReservation { item_id, order_id } => {
                InventoryError::DuplicateReservation { order_id, item_id }
            }
            StoreError::ReservationMissing { item_id, order_id } => {
                InventoryError::ReservationMissing { order_id, item_id }
            }
            StoreError::QuantityMismatch {
                item_id,
                order_id,
                reserved,
                requested,
            } => InventoryError::QuantityMismatch {
                order_id,
                item_id,
                reserved,
                requested,
            },
            StoreError::PartialUpdate { applied, failed } => InventoryError::PartialBatchFailure {
                applied,
                message: format!("update of item {} failed mid-batch", failed),
            },
            other => InventoryError::Store(other),
        }
    }
}

impl InventoryError {
    /// Convenience constructor mirroring the store-level underflow into the
    /// caller-facing taxonomy when the item name is known.
    pub fn insufficient_stock(
        item_id: Uuid,
        item_name: impl Into<String>,
        requested: i32,
        available: i32,
    ) -> Self {
        Self::InsufficientStock {
            item_id,
            item_name: item_name.into(),
            requested,
            available,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}
