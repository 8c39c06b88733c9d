//! Application error types
//!
//! Two layers: [`crate::db::storage::StorageError`] wraps redb/serde failures
//! plus the transactional outcomes the storage methods can surface, while
//! [`AppError`] is the public taxonomy callers (and the chat transport) see.
//! `Database` and `Internal` messages are for logs, never for end users.

use crate::db::storage::StorageError;
use thiserror::Error;

/// Application error taxonomy
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

// ========== Constructor Helpers ==========

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        AppError::Unavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Message safe to render to an end user.
    ///
    /// Domain errors carry their own wording; storage and internal failures
    /// collapse to a generic line so no backend detail leaks into the chat.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Unavailable(msg) => {
                msg.clone()
            }
            AppError::EmptyCart => "Your cart is empty".to_string(),
            AppError::Database(_) | AppError::Internal(_) => {
                "Something went wrong, please try again later".to_string()
            }
        }
    }
}

// ========== Storage Error Mapping ==========

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyCart(_) => AppError::EmptyCart,
            StorageError::OrderNotFound(order_id) => {
                AppError::NotFound(format!("Order not found: {order_id}"))
            }
            StorageError::InvalidTransition { from, to } => {
                AppError::Validation(format!("Illegal status transition: {from} -> {to}"))
            }
            StorageError::DuplicateCategoryName(name) => {
                AppError::Validation(format!("Category name already in use: {name}"))
            }
            StorageError::QuantityLimit { requested, max } => {
                AppError::Validation(format!(
                    "Quantity exceeds maximum allowed ({max}), got {requested}"
                ))
            }
            StorageError::Inconsistent(msg) => AppError::Internal(msg),
            // Exhausting the candidate batch means the generator is broken,
            // not the database
            StorageError::OrderNumberExhausted(count) => {
                AppError::Internal(format!("No unique order number in {count} candidates"))
            }
            other => AppError::Database(other.to_string()),
        }
    }
}
