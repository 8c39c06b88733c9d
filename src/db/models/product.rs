//! Product Model

use crate::utils::time::{now_millis, snowflake_id};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product model
///
/// `price` is stored normalized to 2 decimal places; `stock_quantity` is a
/// display/availability figure only and is never decremented by checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn new(request: ProductCreate) -> Self {
        Self {
            id: snowflake_id(),
            category_id: request.category_id,
            name: request.name,
            description: request.description,
            price: request.price,
            photo_url: request.photo_url,
            stock_quantity: request.stock_quantity,
            is_active: true,
            created_at: now_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
