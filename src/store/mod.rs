//! Item-store collaborator contract.
//!
//! The services in this crate never talk to a database directly; they go
//! through [`ItemStore`], a key-value view of the SKU collection. The one hard
//! requirement on implementations is that [`ItemStore::bulk_update`] is
//! transactional: either every patch in the batch applies or none does.
//! Stock changes travel as signed deltas and ledger changes as append/remove
//! operations, so the store can enforce the non-negativity and
//! one-active-entry invariants atomically. That closes the window where two
//! concurrent reservations both pass a read-time availability check, and the
//! one where they overwrite each other's ledger entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ConsumptionEntry, InventoryItem, Reservation, StockStatus};

pub mod memory;

pub use memory::InMemoryItemStore;

/// Store-level failures, mapped into [`crate::errors::InventoryError`] at the
/// service boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("item {0} does not exist")]
    NotFound(Uuid),

    #[error("stock underflow on item {item_id}: delta {delta} against available {available}")]
    StockUnderflow {
        item_id: Uuid,
        delta: i32,
        available: i32,
    },

    #[error("order {order_id} already holds an active reservation on item {item_id}")]
    DuplicateReservation { item_id: Uuid, order_id: String },

    #[error("no active reservation for order {order_id} on item {item_id}")]
    ReservationMissing { item_id: Uuid, order_id: String },

    #[error("order {order_id} reserved {reserved} on item {item_id}, not {requested}")]
    QuantityMismatch {
        item_id: Uuid,
        order_id: String,
        reserved: i32,
        requested: i32,
    },

    /// Only reachable through store implementations that cannot provide an
    /// atomic batch. Treated as fatal by every service in this crate.
    #[error("partial update: {applied:?} applied before {failed} failed")]
    PartialUpdate { applied: Vec<Uuid>, failed: Uuid },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Partial-field update for one item.
///
/// `None` fields are left untouched. Everything here is expressed as a delta
/// against the stored state, never an absolute snapshot of it, so the store
/// can validate and apply the whole patch inside one write-guard scope and
/// concurrent commits against the same item cannot overwrite each other's
/// ledger entries. `stock_delta` is conditional: the store rejects the whole
/// batch if applying it would take `current_stock` below zero. The store
/// stamps `last_updated` on every item it patches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub stock_delta: Option<i32>,
    pub status: Option<StockStatus>,
    /// Append a reserved-state ledger entry. Fails if the order already holds
    /// an active reservation on the item.
    pub push_reservation: Option<Reservation>,
    /// Remove the active entry held by this order and credit its quantity
    /// back to stock. Fails if no such entry exists.
    pub release_reservation: Option<String>,
    /// Remove the active entry matching this record's order and quantity and
    /// append the record to the consumption history. Stock does not move.
    pub consume_reservation: Option<ConsumptionEntry>,
    pub min_stock: Option<i32>,
    pub max_stock: Option<i32>,
}

impl ItemPatch {
    pub fn stock_delta(delta: i32) -> Self {
        Self {
            stock_delta: Some(delta),
            ..Self::default()
        }
    }

    /// Validate against the item's current state and apply. Callers stage the
    /// result and commit only when every patch in the batch succeeded.
    pub(crate) fn apply(
        &self,
        item: &mut InventoryItem,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(delta) = self.stock_delta {
            if item.current_stock + delta < 0 {
                return Err(StoreError::StockUnderflow {
                    item_id: item.id,
                    delta,
                    available: item.current_stock,
                });
            }
            item.current_stock += delta;
        }
        if let Some(reservation) = &self.push_reservation {
            if item.active_reservation(&reservation.order_id).is_some() {
                return Err(StoreError::DuplicateReservation {
                    item_id: item.id,
                    order_id: reservation.order_id.clone(),
                });
            }
            item.reservations.push(reservation.clone());
        }
        if let Some(order_id) = &self.release_reservation {
            let Some(held) = item.active_reservation(order_id) else {
                return Err(StoreError::ReservationMissing {
                    item_id: item.id,
                    order_id: order_id.clone(),
                });
            };
            let quantity = held.quantity;
            item.current_stock += quantity;
            item.reservations = item.reservations_without(order_id);
        }
        if let Some(record) = &self.consume_reservation {
            let Some(held) = item.active_reservation(&record.order_id) else {
                return Err(StoreError::ReservationMissing {
                    item_id: item.id,
                    order_id: record.order_id.clone(),
                });
            };
            if held.quantity != record.quantity {
                return Err(StoreError::QuantityMismatch {
                    item_id: item.id,
                    order_id: record.order_id.clone(),
                    reserved: held.quantity,
                    requested: record.quantity,
                });
            }
            item.reservations = item.reservations_without(&record.order_id);
            item.consumption_history.push(record.clone());
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(min_stock) = self.min_stock {
            item.min_stock = min_stock;
        }
        if let Some(max_stock) = self.max_stock {
            item.max_stock = max_stock;
        }
        item.last_updated = now;
        Ok(())
    }
}

/// One entry in a bulk update batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub id: Uuid,
    pub patch: ItemPatch,
}

impl ItemUpdate {
    pub fn new(id: Uuid, patch: ItemPatch) -> Self {
        Self { id, patch }
    }
}

/// Async key-value view of the SKU collection.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch a single item. `NotFound` if the id does not resolve.
    async fn get(&self, id: Uuid) -> Result<InventoryItem, StoreError>;

    /// Fetch every item.
    async fn get_all(&self) -> Result<Vec<InventoryItem>, StoreError>;

    /// Apply every patch or none. Returns the updated items in batch order.
    ///
    /// Validation covers id resolution, stock deltas and ledger operations,
    /// evaluated cumulatively: a later patch against the same item sees the
    /// state left by the earlier ones.
    async fn bulk_update(&self, updates: Vec<ItemUpdate>)
        -> Result<Vec<InventoryItem>, StoreError>;

    /// Remove an item. Not used by the reservation core, present for parity
    /// with the collaborator contract.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
