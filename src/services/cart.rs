//! Cart Service - Pending selections per user
//!
//! Availability (product exists, active, in stock) is checked once, at add
//! time. A product pulled from the catalog afterwards stays in the cart and
//! keeps rendering in the cart view; it simply cannot be added again.

use crate::db::ShopStorage;
use crate::db::models::{CartItem, CartLine, CartTotals};
use crate::orders::money;
use crate::utils::validation;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct CartService {
    storage: ShopStorage,
}

impl CartService {
    pub fn new(storage: ShopStorage) -> Self {
        Self { storage }
    }

    /// Add a product to a user's cart, merging into an existing row for the
    /// same product. The add is refused for unknown, deactivated or
    /// out-of-stock products.
    pub fn add_to_cart(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: u32,
    ) -> AppResult<CartItem> {
        validation::validate_quantity(quantity)?;
        let product = self
            .storage
            .get_product(product_id)?
            .ok_or_else(|| AppError::not_found(format!("Product not found: {product_id}")))?;
        if !product.is_active {
            return Err(AppError::unavailable(format!(
                "Product is no longer available: {}",
                product.name
            )));
        }
        if product.stock_quantity <= 0 {
            return Err(AppError::unavailable(format!(
                "Product is out of stock: {}",
                product.name
            )));
        }
        let item = self.storage.add_cart_item(user_id, product_id, quantity)?;
        tracing::debug!(user_id, product_id, quantity = item.quantity, "Cart item upserted");
        Ok(item)
    }

    /// Set a cart row to an exact quantity.
    pub fn update_quantity(&self, cart_item_id: i64, quantity: u32) -> AppResult<CartItem> {
        validation::validate_quantity(quantity)?;
        self.storage
            .update_cart_quantity(cart_item_id, quantity)?
            .ok_or_else(|| AppError::not_found(format!("Cart item not found: {cart_item_id}")))
    }

    /// Remove one row. Returns whether it was present; removing an already
    /// removed row succeeds with `false`.
    pub fn remove_from_cart(&self, cart_item_id: i64) -> AppResult<bool> {
        Ok(self.storage.remove_cart_item(cart_item_id)?)
    }

    /// Empty the cart. Returns how many rows were dropped.
    pub fn clear_cart(&self, user_id: i64) -> AppResult<usize> {
        let removed = self.storage.clear_cart(user_id)?;
        if removed > 0 {
            tracing::debug!(user_id, removed, "Cart cleared");
        }
        Ok(removed)
    }

    /// Cart rows joined with their product records, oldest added first.
    pub fn get_cart_items(&self, user_id: i64) -> AppResult<Vec<CartLine>> {
        let items = self.storage.list_cart_items(user_id)?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = self.storage.get_product(item.product_id)?.ok_or_else(|| {
                AppError::internal(format!(
                    "cart row references missing product {}",
                    item.product_id
                ))
            })?;
            lines.push(CartLine { item, product });
        }
        Ok(lines)
    }

    /// Total item count and merchandise amount of a cart.
    pub fn get_cart_total(&self, user_id: i64) -> AppResult<CartTotals> {
        let mut totals = CartTotals::default();
        for line in self.get_cart_items(user_id)? {
            totals.total_quantity += u64::from(line.item.quantity);
            totals.total_amount += money::line_total(line.product.price, line.item.quantity);
        }
        Ok(totals)
    }
}
