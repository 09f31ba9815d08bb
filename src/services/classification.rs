//! Stock Classifier: advisory low/critical derivation.

use tracing::warn;

use crate::models::{InventoryItem, StockStatus};

/// Derives a [`StockStatus`] from stock levels. Read-only and advisory; never
/// authoritative over the stock invariants.
#[derive(Debug, Clone)]
pub struct StockClassifier {
    critical_ratio: f64,
}

impl Default for StockClassifier {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl StockClassifier {
    /// `critical_ratio` is the fraction of `min_stock` at or below which an
    /// item is critical. Configured via `StockConfig`, validated there.
    pub fn new(critical_ratio: f64) -> Self {
        Self { critical_ratio }
    }

    pub fn classify(&self, item: &InventoryItem) -> StockStatus {
        self.classify_level(item.current_stock, item.min_stock)
    }

    pub fn classify_level(&self, current_stock: i32, min_stock: i32) -> StockStatus {
        if f64::from(current_stock) <= f64::from(min_stock) * self.critical_ratio {
            StockStatus::Critical
        } else if current_stock <= min_stock {
            StockStatus::Low
        } else {
            StockStatus::Good
        }
    }

    /// Items for the replenishment dashboard.
    ///
    /// An item qualifies when its computed status needs attention or when its
    /// stored status already says so. The stored field is a cache that can
    /// diverge from the numbers; the divergence is surfaced in the log and the
    /// stored flag is honored rather than overridden.
    pub fn low_stock(&self, items: &[InventoryItem]) -> Vec<InventoryItem> {
        items
            .iter()
            .filter(|item| {
                let computed = self.classify(item);
                if computed != item.status {
                    warn!(
                        item_id = %item.id,
                        stored = item.status.as_str(),
                        computed = computed.as_str(),
                        current_stock = item.current_stock,
                        min_stock = item.min_stock,
                        "Stored stock status diverges from computed status"
                    );
                }
                computed.needs_attention() || item.status.needs_attention()
            })
            .cloned()
            .collect()
    }
}
