use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Category of a stock-keeping unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    RawMaterial,
    FinishedProduct,
    Consumable,
    SparePart,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::RawMaterial => "raw_material",
            ItemCategory::FinishedProduct => "finished_product",
            ItemCategory::Consumable => "consumable",
            ItemCategory::SparePart => "spare_part",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "raw_material" => Some(ItemCategory::RawMaterial),
            "finished_product" => Some(ItemCategory::FinishedProduct),
            "consumable" => Some(ItemCategory::Consumable),
            "spare_part" => Some(ItemCategory::SparePart),
            _ => None,
        }
    }
}

/// Advisory stock classification.
///
/// The stored value on an item is a cache of the last computed classification
/// and is allowed to diverge from what the classifier would derive right now;
/// it is never authoritative over the stock invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Good,
    Low,
    Critical,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Good => "good",
            StockStatus::Low => "low",
            StockStatus::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "good" => Some(StockStatus::Good),
            "low" => Some(StockStatus::Low),
            "critical" => Some(StockStatus::Critical),
            _ => None,
        }
    }

    /// True for the classifications the replenishment dashboard surfaces.
    pub fn needs_attention(&self) -> bool {
        matches!(self, StockStatus::Low | StockStatus::Critical)
    }
}

/// State of a ledger entry tied to an originating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Reserved,
    Consumed,
    Released,
}

impl ReservationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Reserved => "reserved",
            ReservationState::Consumed => "consumed",
            ReservationState::Released => "released",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "reserved" => Some(ReservationState::Reserved),
            "consumed" => Some(ReservationState::Consumed),
            "released" => Some(ReservationState::Released),
            _ => None,
        }
    }
}

/// One ledger entry: stock debited against a binding advice.
///
/// At most one `reserved`-state entry may exist per `(order_id, item)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub order_id: String,
    pub quantity: i32,
    pub date: DateTime<Utc>,
    pub state: ReservationState,
}

/// Kind of consumption recorded against an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionType {
    Production,
    Wastage,
    Adjustment,
}

/// Append-only record that reserved material was actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionEntry {
    pub date: DateTime<Utc>,
    pub quantity: i32,
    pub order_id: String,
    #[serde(rename = "type")]
    pub entry_type: ConsumptionType,
}

/// Append-only record of received stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEntry {
    pub date: DateTime<Utc>,
    pub quantity: i32,
    pub supplier: Option<String>,
    pub cost_per_unit: Option<Decimal>,
}

/// Append-only record of produced finished goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEntry {
    pub date: DateTime<Utc>,
    pub quantity: i32,
    pub order_id: Option<String>,
}

/// Typed attribute value for item specifications.
///
/// Known attribute kinds get a tagged representation; anything the front end
/// invents later still round-trips as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SpecValue {
    Text(String),
    Number(Decimal),
    Flag(bool),
}

/// One stock-keeping unit. The system of record for `current_stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub item_name: String,
    pub category: ItemCategory,
    pub subcategory: Option<String>,
    /// Unit of measure for the stock quantities (reams, kg, pieces).
    pub unit: String,
    /// Never negative. Already reflects outstanding reservations: reserving
    /// debits this immediately.
    pub current_stock: i32,
    pub min_stock: i32,
    /// Zero means "no ceiling configured".
    pub max_stock: i32,
    pub cost_per_unit: Decimal,
    /// Finished products only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<Decimal>,
    pub status: StockStatus,
    pub reservations: Vec<Reservation>,
    #[serde(default)]
    pub purchase_history: Vec<PurchaseEntry>,
    #[serde(default)]
    pub production_history: Vec<ProductionEntry>,
    #[serde(default)]
    pub consumption_history: Vec<ConsumptionEntry>,
    #[serde(default)]
    pub specifications: HashMap<String, SpecValue>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        item_name: impl Into<String>,
        category: ItemCategory,
        unit: impl Into<String>,
        current_stock: i32,
        min_stock: i32,
        cost_per_unit: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_name: item_name.into(),
            category,
            subcategory: None,
            unit: unit.into(),
            current_stock,
            min_stock,
            max_stock: 0,
            cost_per_unit,
            production_cost: None,
            selling_price: None,
            status: StockStatus::Good,
            reservations: Vec::new(),
            purchase_history: Vec::new(),
            production_history: Vec::new(),
            consumption_history: Vec::new(),
            specifications: HashMap::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_max_stock(mut self, max_stock: i32) -> Self {
        self.max_stock = max_stock;
        self
    }

    pub fn with_status(mut self, status: StockStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_pricing(mut self, production_cost: Decimal, selling_price: Decimal) -> Self {
        self.production_cost = Some(production_cost);
        self.selling_price = Some(selling_price);
        self
    }

    pub fn with_specification(mut self, name: impl Into<String>, value: SpecValue) -> Self {
        self.specifications.insert(name.into(), value);
        self
    }

    /// The `reserved`-state ledger entry held by `order_id`, if any.
    pub fn active_reservation(&self, order_id: &str) -> Option<&Reservation> {
        self.reservations
            .iter()
            .find(|r| r.state == ReservationState::Reserved && r.order_id == order_id)
    }

    /// Sum of quantities across all active reservations.
    pub fn reserved_total(&self) -> i32 {
        self.reservations
            .iter()
            .filter(|r| r.state == ReservationState::Reserved)
            .map(|r| r.quantity)
            .sum()
    }

    /// Ledger with the active entry for `order_id` removed. Entries for other
    /// orders and non-active states keep their insertion order.
    pub fn reservations_without(&self, order_id: &str) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| !(r.state == ReservationState::Reserved && r.order_id == order_id))
            .cloned()
            .collect()
    }
}
