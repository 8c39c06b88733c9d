//! Order Models
//!
//! An [`Order`] is immutable once created except for `status` and
//! `updated_at`. Its [`OrderItem`] lines freeze the unit price at the
//! moment of purchase; later product edits never reach back into them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle states.
///
/// ```text
/// PENDING --(confirm)--> CONFIRMED --(ship)--> SHIPPED --(deliver)--> DELIVERED
/// PENDING/CONFIRMED/SHIPPED --(cancel)--> CANCELLED
/// ```
///
/// DELIVERED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether `next` is a legal transition from this status.
    ///
    /// Only the forward edges above plus cancellation from a non-terminal
    /// state are allowed; setting the current status again is rejected.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!((self, next), (Pending, Confirmed) | (Confirmed, Shipped) | (Shipped, Delivered))
            || (!self.is_terminal() && next == Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

const COURIER_FEE: i64 = 300;
const COURIER_FREE_FROM: i64 = 2000;
const POSTAL_FEE: i64 = 200;
const POSTAL_FREE_FROM: i64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
    Pickup,
    Courier,
    Postal,
}

impl DeliveryMethod {
    /// Delivery fee for a given merchandise subtotal.
    ///
    /// Informational for the checkout summary only. Order totals stay
    /// merchandise-only and never include this fee.
    pub fn fee(self, subtotal: Decimal) -> Decimal {
        match self {
            DeliveryMethod::Pickup => Decimal::ZERO,
            DeliveryMethod::Courier => {
                if subtotal >= Decimal::from(COURIER_FREE_FROM) {
                    Decimal::ZERO
                } else {
                    Decimal::from(COURIER_FEE)
                }
            }
            DeliveryMethod::Postal => {
                if subtotal >= Decimal::from(POSTAL_FREE_FROM) {
                    Decimal::ZERO
                } else {
                    Decimal::from(POSTAL_FEE)
                }
            }
        }
    }

    /// Static fulfilment estimate for the checkout summary.
    pub fn estimate(self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "ready for pickup in 1-2 hours",
            DeliveryMethod::Courier => "courier delivery in 1-3 days",
            DeliveryMethod::Postal => "postal delivery in 3-7 days",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeliveryMethod::Pickup => "PICKUP",
            DeliveryMethod::Courier => "COURIER",
            DeliveryMethod::Postal => "POSTAL",
        };
        write!(f, "{s}")
    }
}

/// Placed order. `total_amount` is frozen at creation; contact fields are
/// captured at checkout and stay independent of later User profile edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Frozen snapshot of one cart line at order time. `price` is the unit
/// price copied from the product at that instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub price: Decimal,
}

/// Checkout input collected by the conversation layer: delivery choice plus
/// the already-split contact fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub delivery_method: DeliveryMethod,
    pub delivery_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub notes: Option<String>,
}
