//! bindery-inventory
//!
//! Inventory reservation and consumption ledger for a notebook manufacturing
//! order workflow: binding advices reserve raw material, cancellations release
//! it, and production completion converts reservations into permanent
//! consumption records, all against a single non-negative stock balance.
//!
//! The surrounding order management (forms, routing, REST transport, auth) is
//! out of scope; this crate is the core the workflow calls into, backed by an
//! [`store::ItemStore`] collaborator.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod cache;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;
use tracing::warn;

use crate::cache::{CacheKey, QueryCache};
use crate::config::AppConfig;
use crate::errors::InventoryError;
use crate::events::EventSender;
use crate::models::InventoryItem;
use crate::services::{
    ConsumptionRecorder, ReservationManager, StockClassifier, StockMutator,
};
use crate::store::ItemStore;

/// Wired-up inventory subsystem: store, services and query cache.
///
/// Embedding callers construct one of these per process; the services share
/// the store and event sender and are individually cloneable.
#[derive(Clone)]
pub struct InventoryApp {
    pub config: AppConfig,
    pub store: Arc<dyn ItemStore>,
    pub event_sender: EventSender,
    pub cache: Arc<QueryCache>,
    pub stock: StockMutator,
    pub reservations: ReservationManager,
    pub consumption: ConsumptionRecorder,
    pub classifier: StockClassifier,
}

impl InventoryApp {
    pub fn new(config: AppConfig, store: Arc<dyn ItemStore>, event_sender: EventSender) -> Self {
        let classifier = StockClassifier::new(config.stock.critical_ratio);
        let cache = Arc::new(QueryCache::new(config.cache.ttl()));
        let stock = StockMutator::new(store.clone(), event_sender.clone());
        let reservations =
            ReservationManager::new(store.clone(), event_sender.clone(), classifier.clone());
        let consumption = ConsumptionRecorder::new(store.clone(), event_sender.clone());

        Self {
            config,
            store,
            event_sender,
            cache,
            stock,
            reservations,
            consumption,
            classifier,
        }
    }

    /// Read-only low-stock query for dashboards, served from the query cache
    /// when fresh.
    pub async fn low_stock_items(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        if self.config.cache.enabled {
            match self.cache.get_json::<Vec<InventoryItem>>(&CacheKey::LowStock) {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Low-stock cache read failed"),
            }
        }

        let items = self.store.get_all().await?;
        let low = self.classifier.low_stock(&items);

        if self.config.cache.enabled {
            if let Err(e) = self.cache.set_json(CacheKey::LowStock, &low) {
                warn!(error = %e, "Failed to cache low-stock view");
            }
        }

        Ok(low)
    }
}
