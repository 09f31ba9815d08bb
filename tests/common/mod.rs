//! Shared harness for integration tests: a wired [`InventoryApp`] over a
//! seeded in-memory store with a live event pipeline.
#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::task::JoinHandle;

use bindery_inventory::cache::CacheInvalidator;
use bindery_inventory::config::AppConfig;
use bindery_inventory::events::{event_channel, process_events, EventHandler};
use bindery_inventory::models::{InventoryItem, ItemCategory};
use bindery_inventory::store::InMemoryItemStore;
use bindery_inventory::InventoryApp;

pub struct TestApp {
    pub app: InventoryApp,
    pub store: Arc<InMemoryItemStore>,
    _event_task: JoinHandle<()>,
}

pub async fn spawn_app() -> TestApp {
    let config = AppConfig::default();
    bindery_inventory::logging::init_tracing(&config);
    let store = Arc::new(InMemoryItemStore::new());
    let (sender, rx) = event_channel(config.events.channel_capacity);
    let app = InventoryApp::new(config, store.clone(), sender);

    let invalidator = Arc::new(CacheInvalidator::new(app.cache.clone()));
    let event_task = tokio::spawn(process_events(
        rx,
        vec![invalidator as Arc<dyn EventHandler>],
    ));

    TestApp {
        app,
        store,
        _event_task: event_task,
    }
}

pub fn raw_material(name: &str, stock: i32, min_stock: i32) -> InventoryItem {
    InventoryItem::new(
        name,
        ItemCategory::RawMaterial,
        "reams",
        stock,
        min_stock,
        dec!(340.00),
    )
}

pub fn consumable(name: &str, stock: i32, min_stock: i32) -> InventoryItem {
    InventoryItem::new(name, ItemCategory::Consumable, "kg", stock, min_stock, dec!(95.00))
}
