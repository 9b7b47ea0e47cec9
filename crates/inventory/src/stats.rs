use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary figures over the current inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_items: usize,
    pub total_quantity: u64,
    pub low_stock_count: usize,
    pub low_stock_threshold: u32,
    /// Σ quantity × price over items with a numeric price; `None` when the
    /// total is too large for a `Decimal`.
    pub stock_value: Option<Decimal>,
    pub computed_at: DateTime<Local>,
}
