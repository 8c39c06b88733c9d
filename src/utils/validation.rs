//! Input validation helpers
//!
//! Centralized limit constants and validation functions.
//! Limits mirror the storefront schema: category names cap at 100 chars,
//! product names at 200, and free-text checkout fields stay within
//! reasonable UX bounds. Text limits count Unicode characters, not UTF-8
//! bytes, so multibyte names measure the way users see them.

use crate::utils::AppError;
use rust_decimal::Decimal;

// ── Text length limits ──────────────────────────────────────────────

/// Category names
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Product names
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Short contact fields: customer name, phone
pub const MAX_CONTACT_TEXT_LEN: usize = 100;

/// Delivery addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Order notes
pub const MAX_NOTE_LEN: usize = 500;

// ── Quantity limits ─────────────────────────────────────────────────

/// Maximum quantity a single cart row may hold, merged adds included
pub const MAX_CART_QUANTITY: u32 = 9999;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    let chars = value.chars().count();
    if chars > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({chars} chars, max {max_len})"
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// Validate that a price is strictly positive.
pub fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "Price must be greater than zero, got {price}"
        )));
    }
    Ok(())
}

/// Validate that a stock quantity is not negative.
pub fn validate_stock(stock_quantity: i32) -> Result<(), AppError> {
    if stock_quantity < 0 {
        return Err(AppError::validation(format!(
            "Stock quantity must not be negative, got {stock_quantity}"
        )));
    }
    Ok(())
}

/// Validate that a cart quantity is at least 1 and within the row cap.
///
/// Going below 1 is never a quantity update; callers remove the row instead.
pub fn validate_quantity(quantity: u32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation("Quantity must be at least 1"));
    }
    if quantity > MAX_CART_QUANTITY {
        return Err(AppError::validation(format!(
            "Quantity exceeds maximum allowed ({MAX_CART_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}
