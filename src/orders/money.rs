//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary values are `Decimal` end to end; nothing in the crate touches
//! floating point. Prices are normalized to two decimal places when they
//! enter the catalog, so sums over stored prices stay exact.

use rust_decimal::prelude::*;

/// Monetary values carry 2 decimal places
const DECIMAL_PLACES: u32 = 2;

/// Round a monetary amount to 2 decimal places, half away from zero.
///
/// 0.005 becomes 0.01, not 0.00.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total for a cart or order line.
///
/// Formula: unit_price * quantity
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_amount(unit_price * Decimal::from(quantity))
}
