//! Property tests: no sequence of reserve/release/consume operations can
//! drive stock negative or desynchronize the ledger from the balance.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal_macros::dec;

use bindery_inventory::config::AppConfig;
use bindery_inventory::events::{event_channel, process_events};
use bindery_inventory::models::{InventoryItem, ItemCategory};
use bindery_inventory::services::MaterialRequest;
use bindery_inventory::store::{InMemoryItemStore, ItemStore};
use bindery_inventory::InventoryApp;

const INITIAL_STOCK: i32 = 100;

#[derive(Debug, Clone)]
enum Op {
    Reserve { order: u8, quantity: i32 },
    Release { order: u8 },
    Consume { order: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 1i32..40).prop_map(|(order, quantity)| Op::Reserve { order, quantity }),
        (0u8..6).prop_map(|order| Op::Release { order }),
        (0u8..6).prop_map(|order| Op::Consume { order }),
    ]
}

fn order_name(order: u8) -> String {
    format!("BA-{}", order)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ledger_and_balance_stay_consistent(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async move {
            let store = Arc::new(InMemoryItemStore::new());
            let item = InventoryItem::new(
                "100gsm maplitho",
                ItemCategory::RawMaterial,
                "reams",
                INITIAL_STOCK,
                20,
                dec!(340.00),
            );
            let item_id = item.id;
            store.insert(item).await;

            let (sender, rx) = event_channel(1024);
            let app = InventoryApp::new(AppConfig::default(), store.clone(), sender);
            tokio::spawn(process_events(rx, Vec::new()));

            // Reference model: active reservations and total consumed.
            let mut reserved: HashMap<u8, i32> = HashMap::new();
            let mut consumed_total = 0i32;

            for op in ops {
                match op {
                    Op::Reserve { order, quantity } => {
                        let expected_stock = INITIAL_STOCK
                            - reserved.values().sum::<i32>()
                            - consumed_total;
                        let result = app
                            .reservations
                            .reserve(&order_name(order), &[MaterialRequest::new(item_id, quantity)])
                            .await;
                        if reserved.contains_key(&order) || quantity > expected_stock {
                            prop_assert!(result.is_err());
                        } else {
                            prop_assert!(result.is_ok());
                            reserved.insert(order, quantity);
                        }
                    }
                    Op::Release { order } => {
                        let result = app.reservations.release(&order_name(order)).await;
                        prop_assert!(result.is_ok());
                        reserved.remove(&order);
                    }
                    Op::Consume { order } => {
                        let quantity = reserved.get(&order).copied().unwrap_or(1);
                        let result = app
                            .consumption
                            .consume(&order_name(order), &[MaterialRequest::new(item_id, quantity)])
                            .await;
                        if reserved.remove(&order).is_some() {
                            prop_assert!(result.is_ok());
                            consumed_total += quantity;
                        } else {
                            prop_assert!(result.is_err());
                        }
                    }
                }

                let current = store.get(item_id).await.unwrap();
                prop_assert!(current.current_stock >= 0);
                prop_assert_eq!(
                    current.current_stock,
                    INITIAL_STOCK - reserved.values().sum::<i32>() - consumed_total
                );
                prop_assert_eq!(current.reserved_total(), reserved.values().sum::<i32>());
                prop_assert_eq!(current.reservations.len(), reserved.len());
            }

            let final_item = store.get(item_id).await.unwrap();
            let consumed_in_history: i32 = final_item
                .consumption_history
                .iter()
                .map(|entry| entry.quantity)
                .sum();
            prop_assert_eq!(consumed_in_history, consumed_total);
            Ok(())
        })?;
    }
}
