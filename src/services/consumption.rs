//! Consumption Recorder: closes out reservations at production completion.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::InventoryError;
use crate::events::{Event, EventSender};
use crate::models::{ConsumptionEntry, ConsumptionType, InventoryItem};
use crate::services::commit_batch;
use crate::services::reservations::{validate_materials, MaterialRequest};
use crate::store::{ItemPatch, ItemStore, ItemUpdate};

/// Converts active reservations into permanent consumption-history entries.
///
/// Stock does not move here; it was already debited at reservation time. A
/// consume call must name an existing reservation and match its quantity
/// exactly, so a drifting caller is caught instead of silently corrupting the
/// ledger.
#[derive(Clone)]
pub struct ConsumptionRecorder {
    store: Arc<dyn ItemStore>,
    event_sender: EventSender,
}

impl ConsumptionRecorder {
    pub fn new(store: Arc<dyn ItemStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    #[instrument(skip(self, materials), fields(materials = materials.len()))]
    pub async fn consume(
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
            let reservation =
                item.active_reservation(order_id)
                    .ok_or_else(|| InventoryError::ReservationMissing {
                        order_id: order_id.to_string(),
                        item_id: item.id,
                    })?;
            if reservation.quantity != material.quantity {
                return Err(InventoryError::QuantityMismatch {
                    order_id: order_id.to_string(),
                    item_id: item.id,
                    reserved: reservation.quantity,
                    requested: material.quantity,
                });
            }

            // The store removes the matching entry and appends this record
            // inside the same write-guard scope, re-checking existence and
            // quantity so a racing release or consume fails the batch.
            updates.push(ItemUpdate::new(
                item.id,
                ItemPatch {
                    consume_reservation: Some(ConsumptionEntry {
                        date: now,
                        quantity: material.quantity,
                        order_id: order_id.to_string(),
                        entry_type: ConsumptionType::Production,
                    }),
                    ..ItemPatch::default()
                },
            ));
            events.push(Event::MaterialConsumed {
                order_id: order_id.to_string(),
                item_id: item.id,
                category: item.category,
                quantity: material.quantity,
            });
        }

        let updated = commit_batch(self.store.as_ref(), updates, "consumption").await?;

        info!(order_id, count = updated.len(), "Recorded material consumption for order");
        for event in events {
            self.event_sender.send_logged(event).await;
        }

        Ok(updated)
    }
}
