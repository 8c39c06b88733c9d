//! Order lifecycle events
//!
//! Emitted by [`crate::orders::OrderService`] after the owning storage
//! transaction has committed, so subscribers never see an event for state
//! that could still roll back.

use crate::db::models::{Order, OrderStatus};
use crate::utils::time::now_millis;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One order lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_id: String,
    pub order_id: i64,
    pub order_number: String,
    #[serde(flatten)]
    pub kind: OrderEventKind,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventKind {
    Created {
        user_id: i64,
        total_amount: Decimal,
    },
    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
    },
}

impl OrderEvent {
    pub fn created(order: &Order) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            order_id: order.id,
            order_number: order.order_number.clone(),
            kind: OrderEventKind::Created {
                user_id: order.user_id,
                total_amount: order.total_amount,
            },
            timestamp: now_millis(),
        }
    }

    pub fn status_changed(order: &Order, previous: OrderStatus) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            order_id: order.id,
            order_number: order.order_number.clone(),
            kind: OrderEventKind::StatusChanged {
                from: previous,
                to: order.status,
            },
            timestamp: now_millis(),
        }
    }
}
