mod common;

use std::time::Duration;

use bindery_inventory::models::StockStatus;
use bindery_inventory::services::MaterialRequest;

use common::{consumable, raw_material, spawn_app};

#[tokio::test]
async fn low_stock_view_includes_numerically_low_items() {
    let harness = spawn_app().await;
    let low = raw_material("60gsm newsprint", 15, 20);
    let fine = raw_material("100gsm maplitho", 500, 20);
    harness.store.seed([low.clone(), fine]).await;

    let view = harness.app.low_stock_items().await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, low.id);
}

#[tokio::test]
async fn stored_low_flag_is_surfaced_even_when_numbers_look_fine() {
    let harness = spawn_app().await;
    // A stale status cache from some external writer.
    let stale = consumable("binding glue", 80, 10).with_status(StockStatus::Critical);
    harness.store.insert(stale.clone()).await;

    let view = harness.app.low_stock_items().await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, stale.id);
    assert_eq!(view[0].status, StockStatus::Critical);
}

#[tokio::test]
async fn reservation_event_invalidates_cached_low_stock_view() {
    let harness = spawn_app().await;
    let paper = raw_material("100gsm maplitho", 100, 20);
    harness.store.insert(paper.clone()).await;

    // Prime the cache while nothing is low.
    assert!(harness.app.low_stock_items().await.unwrap().is_empty());

    harness
        .app
        .reservations
        .reserve("O1", &[MaterialRequest::new(paper.id, 85)])
        .await
        .unwrap();

    // Give the invalidation listener a moment to drain the event channel.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let view = harness.app.low_stock_items().await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, paper.id);
    assert_eq!(view[0].current_stock, 15);
}

#[tokio::test]
async fn released_items_drop_back_out_of_the_low_stock_view() {
    let harness = spawn_app().await;
    let paper = raw_material("100gsm maplitho", 100, 20);
    harness.store.insert(paper.clone()).await;

    harness
        .app
        .reservations
        .reserve("O2", &[MaterialRequest::new(paper.id, 90)])
        .await
        .unwrap();
    harness.app.reservations.release("O2").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(harness.app.low_stock_items().await.unwrap().is_empty());
}
