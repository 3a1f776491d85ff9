use std::fmt;

use serde::{Deserialize, Serialize};

/// Default quantity under which a product counts as running low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 20;

/// Display tier derived from a stock quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    pub fn label(self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }

    /// Badge class for the list card.
    pub fn badge_class(self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "badge-error",
            StockStatus::LowStock => "badge-warning",
            StockStatus::InStock => "badge-success",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps stock quantities to display tiers.
///
/// Zero is always out of stock; anything below `low_stock_threshold` is low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPolicy {
    pub low_stock_threshold: u32,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl StockPolicy {
    pub fn new(low_stock_threshold: u32) -> Self {
        Self {
            low_stock_threshold,
        }
    }

    pub fn status(&self, stock: u32) -> StockStatus {
        if stock == 0 {
            StockStatus::OutOfStock
        } else if stock < self.low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}
