//! Mutation events emitted by the stock and reservation services.
//!
//! Every successful mutation publishes an event describing what changed.
//! Listeners (the query-cache invalidator, audit logging) consume the stream;
//! a failed or full channel never fails the mutation itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::{ItemCategory, StockStatus};

/// Events that can occur in the inventory subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StockAdjusted {
        item_id: Uuid,
        category: ItemCategory,
        old_quantity: i32,
        new_quantity: i32,
    },
    InventoryReserved {
        order_id: String,
        item_id: Uuid,
        category: ItemCategory,
        quantity: i32,
        remaining_stock: i32,
    },
    ReservationReleased {
        order_id: String,
        item_id: Uuid,
        category: ItemCategory,
        quantity: i32,
    },
    MaterialConsumed {
        order_id: String,
        item_id: Uuid,
        category: ItemCategory,
        quantity: i32,
    },
    LowStockDetected {
        item_id: Uuid,
        category: ItemCategory,
        current_stock: i32,
        min_stock: i32,
        status: StockStatus,
        detected_at: DateTime<Utc>,
    },
}

impl Event {
    /// Item the event concerns.
    pub fn item_id(&self) -> Uuid {
        match self {
            Event::StockAdjusted { item_id, .. }
            | Event::InventoryReserved { item_id, .. }
            | Event::ReservationReleased { item_id, .. }
            | Event::MaterialConsumed { item_id, .. }
            | Event::LowStockDetected { item_id, .. } => *item_id,
        }
    }

    pub fn category(&self) -> ItemCategory {
        match self {
            Event::StockAdjusted { category, .. }
            | Event::InventoryReserved { category, .. }
            | Event::ReservationReleased { category, .. }
            | Event::MaterialConsumed { category, .. }
            | Event::LowStockDetected { category, .. } => *category,
        }
    }

    /// True when the event describes a change to stored item state (as
    /// opposed to an advisory observation like a low-stock detection).
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Event::LowStockDetected { .. })
    }
}

/// Cloneable sending half of the event pipeline.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Publish without failing the surrounding mutation. Losing an event
    /// degrades cache freshness, not ledger correctness.
    pub async fn send_logged(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!(error = %e, "Failed to publish inventory event");
        }
    }
}

/// Create a bounded event channel.
pub fn event_channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Handlers implementing this trait process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

/// Drain the event channel and distribute each event to every handler.
///
/// Handler failures are logged and do not stop the loop; the loop ends when
/// every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, handlers: Vec<Arc<dyn EventHandler>>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!(?event, "Received inventory event");

        for handler in &handlers {
            if let Err(e) = handler.handle_event(event.clone()).await {
                error!(
                    item_id = %event.item_id(),
                    error = %e,
                    "Event handler failed"
                );
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    #[async_trait]
    impl EventHandler for Counter {
        async fn handle_event(&self, _event: Event) -> Result<(), String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn events_reach_every_handler() {
        let (sender, rx) = event_channel(8);
        let first = Arc::new(Counter(AtomicUsize::new(0)));
        let second = Arc::new(Counter(AtomicUsize::new(0)));
        let task = tokio::spawn(process_events(
            rx,
            vec![first.clone() as Arc<dyn EventHandler>, second.clone()],
        ));

        sender
            .send(Event::StockAdjusted {
                item_id: Uuid::new_v4(),
                category: ItemCategory::Consumable,
                old_quantity: 10,
                new_quantity: 8,
            })
            .await
            .unwrap();
        drop(sender);

        task.await.unwrap();
        assert_eq!(first.0.load(Ordering::SeqCst), 1);
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn low_stock_detection_is_not_a_mutation() {
        let event = Event::LowStockDetected {
            item_id: Uuid::new_v4(),
            category: ItemCategory::RawMaterial,
            current_stock: 3,
            min_stock: 10,
            status: StockStatus::Critical,
            detected_at: Utc::now(),
        };
        assert!(!event.is_mutation());
        assert_eq!(event.category(), ItemCategory::RawMaterial);
    }
}
