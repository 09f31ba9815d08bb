//! Reservation Manager: reserve and release material against orders.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::InventoryError;
use crate::events::{Event, EventSender};
use crate::models::{InventoryItem, Reservation, ReservationState};
use crate::services::classification::StockClassifier;
use crate::services::{commit_batch, stock};
use crate::store::{ItemPatch, ItemStore, ItemUpdate};

/// One material line of a reserve or consume request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequest {
    pub item_id: Uuid,
    pub quantity: i32,
}

impl MaterialRequest {
    pub fn new(item_id: Uuid, quantity: i32) -> Self {
        Self { item_id, quantity }
    }
}

/// Validate a material list before any store call: at least one line, every
/// quantity positive, no item listed twice (a duplicate would create two
/// ledger entries for one order on one item).
pub(crate) fn validate_materials(materials: &[MaterialRequest]) -> Result<(), InventoryError> {
    if materials.is_empty() {
        return Err(InventoryError::validation("material list is empty"));
    }
    let mut seen = HashSet::with_capacity(materials.len());
    for material in materials {
        if material.quantity <= 0 {
            return Err(InventoryError::InvalidQuantity {
                quantity: material.quantity,
            });
        }
        if !seen.insert(material.item_id) {
            return Err(InventoryError::validation(format!(
                "item {} listed more than once",
                material.item_id
            )));
        }
    }
    Ok(())
}

/// Orchestrates multi-item reservations with all-or-nothing semantics.
///
/// Reserving debits `current_stock` immediately, so the balance always
/// already reflects outstanding reservations. The availability and duplicate
/// pre-checks here are check-then-act, kept for their caller-facing error
/// messages; the store re-validates the stock delta and ledger operations
/// under its write guard, so a racing commit fails cleanly instead of
/// over-committing stock or clobbering another order's ledger entry.
#[derive(Clone)]
pub struct ReservationManager {
    store: Arc<dyn ItemStore>,
    event_sender: EventSender,
    classifier: StockClassifier,
}

impl ReservationManager {
    pub fn new(
        store: Arc<dyn ItemStore>,
        event_sender: EventSender,
        classifier: StockClassifier,
    ) -> Self {
        Self {
            store,
            event_sender,
            classifier,
        }
    }

    /// Reserve every material for `order_id`, or nothing.
    ///
    /// Fails without mutating any item when a material does not resolve, has
    /// insufficient stock, or already carries an active reservation for this
    /// order.
    #[instrument(skip(self, materials), fields(materials = materials.len()))]
    pub async fn reserve(
        &self,
        order_id: &str,
        materials: &[MaterialRequest],
    ) -> Result<Vec<InventoryItem>, InventoryError> {
        validate_materials(materials)?;

        let now = Utc::now();
        let mut updates = Vec::with_capacity(materials.len());
        let mut events = Vec::with_capacity(materials.len());

        for material in materials {
            let item = self.store.get(material.item_id).await?;
            if item.active_reservation(order_id).is_some() {
                return Err(InventoryError::DuplicateReservation {
                    order_id: order_id.to_string(),
                    item_id: item.id,
                });
            }

            let remaining = stock::checked_debit(&item, material.quantity)?;
            let status = self.classifier.classify_level(remaining, item.min_stock);

            updates.push(ItemUpdate::new(
                item.id,
                ItemPatch {
                    stock_delta: Some(-material.quantity),
                    status: Some(status),
                    push_reservation: Some(Reservation {
                        order_id: order_id.to_string(),
                        quantity: material.quantity,
                        date: now,
                        state: ReservationState::Reserved,
                    }),
                    ..ItemPatch::default()
                },
            ));

            events.push(Event::InventoryReserved {
                order_id: order_id.to_string(),
                item_id: item.id,
                category: item.category,
                quantity: material.quantity,
                remaining_stock: remaining,
            });
            if status.needs_attention() {
                events.push(Event::LowStockDetected {
                    item_id: item.id,
                    category: item.category,
                    current_stock: remaining,
                    min_stock: item.min_stock,
                    status,
                    detected_at: now,
                });
            }
        }

        let updated = commit_batch(self.store.as_ref(), updates, "reservation").await?;

        info!(order_id, count = updated.len(), "Reserved materials for order");
        for event in events {
            self.event_sender.send_logged(event).await;
        }

        Ok(updated)
    }

    /// Release every active reservation held by `order_id`, crediting stock
    /// back. A second release for the same order is a no-op success.
    #[instrument(skip(self))]
    pub async fn release(&self, order_id: &str) -> Result<Vec<InventoryItem>, InventoryError> {
        let items = self.store.get_all().await?;

        let mut updates = Vec::new();
        let mut events = Vec::new();
        for item in items {
            let Some(reservation) = item.active_reservation(order_id) else {
                continue;
            };
            let quantity = reservation.quantity;
            let restored = item.current_stock + quantity;
            let status = self.classifier.classify_level(restored, item.min_stock);

            // The store credits the held quantity back when it removes the
            // entry, so the patch carries no stock delta of its own.
            updates.push(ItemUpdate::new(
                item.id,
                ItemPatch {
                    status: Some(status),
                    release_reservation: Some(order_id.to_string()),
                    ..ItemPatch::default()
                },
            ));
            events.push(Event::ReservationReleased {
                order_id: order_id.to_string(),
                item_id: item.id,
                category: item.category,
                quantity,
            });
        }

        if updates.is_empty() {
            info!(order_id, "No active reservations to release");
            return Ok(Vec::new());
        }

        let updated = commit_batch(self.store.as_ref(), updates, "release").await?;

        info!(order_id, count = updated.len(), "Released reservations for order");
        for event in events {
            self.event_sender.send_logged(event).await;
        }

        Ok(updated)
    }
}
