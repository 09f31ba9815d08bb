pub mod inventory_item;

pub use inventory_item::{
    ConsumptionEntry, ConsumptionType, InventoryItem, ItemCategory, ProductionEntry,
    PurchaseEntry, Reservation, ReservationState, SpecValue, StockStatus,
};
