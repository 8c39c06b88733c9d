//! Cart Models

use super::product::Product;
use crate::utils::time::{now_millis, snowflake_id};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One pending cart row. At most one row exists per (user, product) pair;
/// repeat adds merge into it. Quantity never drops below 1 in storage, a
/// decrement to 0 removes the row instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub created_at: i64,
}

impl CartItem {
    pub fn new(user_id: i64, product_id: i64, quantity: u32) -> Self {
        Self {
            id: snowflake_id(),
            user_id,
            product_id,
            quantity,
            created_at: now_millis(),
        }
    }
}

/// Cart row with its product loaded, for rendering a cart listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

/// Aggregate over current cart rows and live product prices. Unlike order
/// totals these are not frozen; they track price changes until checkout.
/// The quantity sum is u64 so it holds any number of capped u32 rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub total_quantity: u64,
    pub total_amount: Decimal,
}
