//! redb-based storage layer for the storefront
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `categories` | `id` | `Category` | Catalog sections |
//! | `products` | `id` | `Product` | Catalog entries |
//! | `users` | `id` | `User` | Customer records |
//! | `users_by_chat` | `chat_id` | `user id` | Chat identity index |
//! | `cart_items` | `(user_id, product_id)` | `CartItem` | Pending cart rows |
//! | `cart_index` | `item id` | `(user_id, product_id)` | Item-id lookup |
//! | `orders` | `id` | `Order` | Placed orders |
//! | `orders_by_number` | `order_number` | `order id` | Number uniqueness index |
//! | `order_items` | `(order_id, line)` | `OrderItem` | Frozen order lines |
//!
//! The composite `cart_items` key makes the one-row-per-(user, product)
//! rule a property of the keyspace instead of a checked constraint.
//!
//! # Atomicity
//!
//! redb write transactions are exclusive (single writer), so every method
//! here is a serializable critical section. Checkout reads the cart, writes
//! the order, its number index and its lines, and deletes the cart rows in
//! one transaction; concurrent same-user operations cannot observe a half
//! placed order or duplicate a cart row.

use crate::db::models::{
    CartItem, Category, CategoryUpdate, Order, OrderDraft, OrderItem, OrderStatus, Product,
    ProductUpdate, User, UserUpdate,
};
use crate::utils::time::{now_millis, snowflake_id};
use crate::utils::validation::MAX_CART_QUANTITY;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Catalog categories: key = id, value = JSON-serialized Category
const CATEGORIES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("categories");

/// Catalog products: key = id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

/// Customer records: key = id, value = JSON-serialized User
const USERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

/// Chat identity index: key = chat_id, value = user id
const USERS_BY_CHAT_TABLE: TableDefinition<i64, i64> = TableDefinition::new("users_by_chat");

/// Cart rows: key = (user_id, product_id), value = JSON-serialized CartItem
const CART_ITEMS_TABLE: TableDefinition<(i64, i64), &[u8]> = TableDefinition::new("cart_items");

/// Cart item-id lookup: key = item id, value = (user_id, product_id)
const CART_INDEX_TABLE: TableDefinition<i64, (i64, i64)> = TableDefinition::new("cart_index");

/// Placed orders: key = id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

/// Order number uniqueness index: key = order_number, value = order id
const ORDERS_BY_NUMBER_TABLE: TableDefinition<&str, i64> =
    TableDefinition::new("orders_by_number");

/// Frozen order lines: key = (order_id, line), value = JSON-serialized OrderItem
const ORDER_ITEMS_TABLE: TableDefinition<(i64, u32), &[u8]> = TableDefinition::new("order_items");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Category name already in use: {0}")]
    DuplicateCategoryName(String),

    #[error("Cart is empty for user: {0}")]
    EmptyCart(i64),

    #[error("Cart quantity above limit: {requested} (max {max})")]
    QuantityLimit { requested: u64, max: u32 },

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Illegal status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("No unique order number in {0} candidates")]
    OrderNumberExhausted(usize),

    #[error("Storage inconsistency: {0}")]
    Inconsistent(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storefront storage backed by redb
#[derive(Clone)]
pub struct ShopStorage {
    db: Arc<Database>,
}

impl ShopStorage {
    /// Open or create the database at the given path.
    ///
    /// redb commits with immediate durability by default; a successful
    /// checkout survives a process kill right after the call returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CATEGORIES_TABLE)?;
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(USERS_BY_CHAT_TABLE)?;
            let _ = write_txn.open_table(CART_ITEMS_TABLE)?;
            let _ = write_txn.open_table(CART_INDEX_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_BY_NUMBER_TABLE)?;
            let _ = write_txn.open_table(ORDER_ITEMS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CATEGORIES_TABLE)?;
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(USERS_BY_CHAT_TABLE)?;
            let _ = write_txn.open_table(CART_ITEMS_TABLE)?;
            let _ = write_txn.open_table(CART_INDEX_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_BY_NUMBER_TABLE)?;
            let _ = write_txn.open_table(ORDER_ITEMS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Categories ==========

    /// Insert a new category. Names are unique across the table; the scan
    /// runs inside the write transaction so concurrent creates cannot both
    /// pass the check.
    pub fn insert_category(&self, category: &Category) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CATEGORIES_TABLE)?;
            for entry in table.iter()? {
                let (_, value) = entry?;
                let existing: Category = serde_json::from_slice(value.value())?;
                if existing.name == category.name {
                    return Err(StorageError::DuplicateCategoryName(category.name.clone()));
                }
            }
            table.insert(category.id, serde_json::to_vec(category)?.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_category(&self, category_id: i64) -> StorageResult<Option<Category>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CATEGORIES_TABLE)?;
        match table.get(category_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All categories in id order. Snowflake ids are time-ordered, so this
    /// is insertion order.
    pub fn list_categories(&self) -> StorageResult<Vec<Category>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CATEGORIES_TABLE)?;
        let mut categories = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            categories.push(serde_json::from_slice(value.value())?);
        }
        Ok(categories)
    }

    /// Apply a partial update. Returns `None` when the id is unknown.
    /// A rename re-checks name uniqueness against every other row.
    pub fn update_category(
        &self,
        category_id: i64,
        update: &CategoryUpdate,
    ) -> StorageResult<Option<Category>> {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(CATEGORIES_TABLE)?;
            let current = match table.get(category_id)? {
                Some(guard) => Some(serde_json::from_slice::<Category>(guard.value())?),
                None => None,
            };
            match current {
                None => None,
                Some(mut category) => {
                    if let Some(name) = &update.name {
                        if *name != category.name {
                            for entry in table.iter()? {
                                let (key, value) = entry?;
                                if key.value() == category_id {
                                    continue;
                                }
                                let other: Category = serde_json::from_slice(value.value())?;
                                if other.name == *name {
                                    return Err(StorageError::DuplicateCategoryName(name.clone()));
                                }
                            }
                        }
                        category.name = name.clone();
                    }
                    if let Some(description) = &update.description {
                        category.description = Some(description.clone());
                    }
                    if let Some(is_active) = update.is_active {
                        category.is_active = is_active;
                    }
                    table.insert(category_id, serde_json::to_vec(&category)?.as_slice())?;
                    Some(category)
                }
            }
        };
        txn.commit()?;
        Ok(updated)
    }

    // ========== Products ==========

    pub fn insert_product(&self, product: &Product) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            table.insert(product.id, serde_json::to_vec(product)?.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_product(&self, product_id: i64) -> StorageResult<Option<Product>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(product_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_products(&self) -> StorageResult<Vec<Product>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PRODUCTS_TABLE)?;
        let mut products = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            products.push(serde_json::from_slice(value.value())?);
        }
        Ok(products)
    }

    pub fn list_products_by_category(&self, category_id: i64) -> StorageResult<Vec<Product>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PRODUCTS_TABLE)?;
        let mut products = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let product: Product = serde_json::from_slice(value.value())?;
            if product.category_id == category_id {
                products.push(product);
            }
        }
        Ok(products)
    }

    /// Apply a partial update. Returns `None` when the id is unknown.
    pub fn update_product(
        &self,
        product_id: i64,
        update: &ProductUpdate,
    ) -> StorageResult<Option<Product>> {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            let current = match table.get(product_id)? {
                Some(guard) => Some(serde_json::from_slice::<Product>(guard.value())?),
                None => None,
            };
            match current {
                None => None,
                Some(mut product) => {
                    if let Some(category_id) = update.category_id {
                        product.category_id = category_id;
                    }
                    if let Some(name) = &update.name {
                        product.name = name.clone();
                    }
                    if let Some(description) = &update.description {
                        product.description = Some(description.clone());
                    }
                    if let Some(price) = update.price {
                        product.price = price;
                    }
                    if let Some(photo_url) = &update.photo_url {
                        product.photo_url = Some(photo_url.clone());
                    }
                    if let Some(stock_quantity) = update.stock_quantity {
                        product.stock_quantity = stock_quantity;
                    }
                    if let Some(is_active) = update.is_active {
                        product.is_active = is_active;
                    }
                    table.insert(product_id, serde_json::to_vec(&product)?.as_slice())?;
                    Some(product)
                }
            }
        };
        txn.commit()?;
        Ok(updated)
    }

    // ========== Users ==========

    /// Create-or-fetch by chat identity. The lookup and the insert share one
    /// write transaction, so two first contacts racing each other still end
    /// up with a single record. An existing record is returned untouched;
    /// the supplied profile is dropped (identity resolution never
    /// overwrites).
    pub fn create_user_if_absent(&self, user: User) -> StorageResult<(User, bool)> {
        let txn = self.db.begin_write()?;
        let result = {
            let mut users = txn.open_table(USERS_TABLE)?;
            let mut by_chat = txn.open_table(USERS_BY_CHAT_TABLE)?;
            let existing_id = by_chat.get(user.chat_id)?.map(|guard| guard.value());
            match existing_id {
                Some(user_id) => {
                    let existing: User = {
                        let guard = users.get(user_id)?.ok_or_else(|| {
                            StorageError::Inconsistent(format!(
                                "users_by_chat points at missing user {user_id}"
                            ))
                        })?;
                        serde_json::from_slice(guard.value())?
                    };
                    (existing, false)
                }
                None => {
                    users.insert(user.id, serde_json::to_vec(&user)?.as_slice())?;
                    by_chat.insert(user.chat_id, user.id)?;
                    (user, true)
                }
            }
        };
        txn.commit()?;
        Ok(result)
    }

    pub fn get_user(&self, user_id: i64) -> StorageResult<Option<User>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(USERS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_chat(&self, chat_id: i64) -> StorageResult<Option<User>> {
        let txn = self.db.begin_read()?;
        let by_chat = txn.open_table(USERS_BY_CHAT_TABLE)?;
        let Some(user_id) = by_chat.get(chat_id)?.map(|guard| guard.value()) else {
            return Ok(None);
        };
        let users = txn.open_table(USERS_TABLE)?;
        match users.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Err(StorageError::Inconsistent(format!(
                "users_by_chat points at missing user {user_id}"
            ))),
        }
    }

    /// Apply a partial profile update. Returns `None` when the id is unknown.
    pub fn update_user(&self, user_id: i64, update: &UserUpdate) -> StorageResult<Option<User>> {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut users = txn.open_table(USERS_TABLE)?;
            let current = match users.get(user_id)? {
                Some(guard) => Some(serde_json::from_slice::<User>(guard.value())?),
                None => None,
            };
            match current {
                None => None,
                Some(mut user) => {
                    if let Some(username) = &update.username {
                        user.username = Some(username.clone());
                    }
                    if let Some(first_name) = &update.first_name {
                        user.first_name = Some(first_name.clone());
                    }
                    if let Some(last_name) = &update.last_name {
                        user.last_name = Some(last_name.clone());
                    }
                    if let Some(phone) = &update.phone {
                        user.phone = Some(phone.clone());
                    }
                    if let Some(address) = &update.address {
                        user.address = Some(address.clone());
                    }
                    users.insert(user_id, serde_json::to_vec(&user)?.as_slice())?;
                    Some(user)
                }
            }
        };
        txn.commit()?;
        Ok(updated)
    }

    // ========== Cart ==========

    /// Upsert one cart row inside a single write transaction: an existing
    /// (user, product) row has its quantity incremented, otherwise a fresh
    /// row is created. Concurrent adds for the same pair serialize on the
    /// exclusive writer and merge instead of duplicating.
    ///
    /// The merged quantity may not exceed [`MAX_CART_QUANTITY`]; an add
    /// that would push a row past the cap is rejected whole, the row keeps
    /// its prior quantity. The check runs inside the transaction, so
    /// concurrent adds cannot race past the cap together.
    pub fn add_cart_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: u32,
    ) -> StorageResult<CartItem> {
        let txn = self.db.begin_write()?;
        let item = {
            let mut items = txn.open_table(CART_ITEMS_TABLE)?;
            let mut index = txn.open_table(CART_INDEX_TABLE)?;
            let existing = match items.get((user_id, product_id))? {
                Some(guard) => Some(serde_json::from_slice::<CartItem>(guard.value())?),
                None => None,
            };
            // Widened sum: two u32 quantities cannot overflow a u64
            let current = existing.as_ref().map_or(0, |item| item.quantity);
            let merged = u64::from(current) + u64::from(quantity);
            if merged > u64::from(MAX_CART_QUANTITY) {
                return Err(StorageError::QuantityLimit {
                    requested: merged,
                    max: MAX_CART_QUANTITY,
                });
            }
            let (item, created) = match existing {
                Some(mut item) => {
                    item.quantity = merged as u32;
                    (item, false)
                }
                None => (CartItem::new(user_id, product_id, quantity), true),
            };
            items.insert((user_id, product_id), serde_json::to_vec(&item)?.as_slice())?;
            if created {
                index.insert(item.id, (user_id, product_id))?;
            }
            item
        };
        txn.commit()?;
        Ok(item)
    }

    /// Set a row's quantity directly, subject to the same row cap as
    /// [`Self::add_cart_item`]. Returns `None` when the item id is unknown
    /// (already removed is not an error).
    pub fn update_cart_quantity(
        &self,
        cart_item_id: i64,
        quantity: u32,
    ) -> StorageResult<Option<CartItem>> {
        if quantity > MAX_CART_QUANTITY {
            return Err(StorageError::QuantityLimit {
                requested: u64::from(quantity),
                max: MAX_CART_QUANTITY,
            });
        }
        let txn = self.db.begin_write()?;
        let updated = {
            let index = txn.open_table(CART_INDEX_TABLE)?;
            let key = index.get(cart_item_id)?.map(|guard| guard.value());
            drop(index);
            match key {
                None => None,
                Some(key) => {
                    let mut items = txn.open_table(CART_ITEMS_TABLE)?;
                    let mut item: CartItem = {
                        let guard = items.get(key)?.ok_or_else(|| {
                            StorageError::Inconsistent(format!(
                                "cart index points at missing row for item {cart_item_id}"
                            ))
                        })?;
                        serde_json::from_slice(guard.value())?
                    };
                    item.quantity = quantity;
                    items.insert(key, serde_json::to_vec(&item)?.as_slice())?;
                    Some(item)
                }
            }
        };
        txn.commit()?;
        Ok(updated)
    }

    /// Delete one row by item id. Returns whether it existed; a double
    /// removal from two taps is expected and harmless.
    pub fn remove_cart_item(&self, cart_item_id: i64) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut index = txn.open_table(CART_INDEX_TABLE)?;
            let mut items = txn.open_table(CART_ITEMS_TABLE)?;
            match index.remove(cart_item_id)? {
                Some(guard) => {
                    let key = guard.value();
                    drop(guard);
                    items.remove(key)?;
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Delete every cart row of one user. Idempotent; returns the count.
    pub fn clear_cart(&self, user_id: i64) -> StorageResult<usize> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut items = txn.open_table(CART_ITEMS_TABLE)?;
            let mut index = txn.open_table(CART_INDEX_TABLE)?;
            let mut rows = Vec::new();
            for entry in items.range((user_id, i64::MIN)..=(user_id, i64::MAX))? {
                let (key, value) = entry?;
                let item: CartItem = serde_json::from_slice(value.value())?;
                rows.push((key.value(), item.id));
            }
            for (key, item_id) in &rows {
                items.remove(*key)?;
                index.remove(*item_id)?;
            }
            rows.len()
        };
        txn.commit()?;
        Ok(removed)
    }

    /// One user's cart rows, oldest added first.
    pub fn list_cart_items(&self, user_id: i64) -> StorageResult<Vec<CartItem>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CART_ITEMS_TABLE)?;
        let mut items: Vec<CartItem> = Vec::new();
        for entry in table.range((user_id, i64::MIN)..=(user_id, i64::MAX))? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    // ========== Orders ==========

    /// Checkout: convert a non-empty cart into an Order plus its frozen
    /// lines, assign the first unused number among `number_candidates`, and
    /// clear the cart. All of it commits or none of it does.
    ///
    /// Unit prices are copied from the product rows as read inside this
    /// transaction; the total is the sum over `quantity * price`.
    pub fn create_order_from_cart(
        &self,
        user_id: i64,
        draft: &OrderDraft,
        number_candidates: &[String],
    ) -> StorageResult<(Order, Vec<OrderItem>)> {
        let txn = self.db.begin_write()?;
        let (order, lines) = {
            let mut cart = txn.open_table(CART_ITEMS_TABLE)?;
            let mut cart_index = txn.open_table(CART_INDEX_TABLE)?;
            let products = txn.open_table(PRODUCTS_TABLE)?;
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let mut by_number = txn.open_table(ORDERS_BY_NUMBER_TABLE)?;
            let mut order_items = txn.open_table(ORDER_ITEMS_TABLE)?;

            let mut rows = Vec::new();
            for entry in cart.range((user_id, i64::MIN)..=(user_id, i64::MAX))? {
                let (key, value) = entry?;
                let item: CartItem = serde_json::from_slice(value.value())?;
                rows.push((key.value(), item));
            }
            if rows.is_empty() {
                return Err(StorageError::EmptyCart(user_id));
            }
            // Stable line numbering: oldest cart row becomes line 1
            rows.sort_by(|a, b| a.1.created_at.cmp(&b.1.created_at).then(a.1.id.cmp(&b.1.id)));

            let order_id = snowflake_id();
            let now = now_millis();

            let mut total_amount = Decimal::ZERO;
            let mut lines = Vec::with_capacity(rows.len());
            for (_, item) in &rows {
                let product: Product = {
                    let guard = products.get(item.product_id)?.ok_or_else(|| {
                        StorageError::Inconsistent(format!(
                            "cart row references missing product {}",
                            item.product_id
                        ))
                    })?;
                    serde_json::from_slice(guard.value())?
                };
                total_amount += product.price * Decimal::from(item.quantity);
                lines.push(OrderItem {
                    order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: product.price,
                });
            }

            let mut order_number = None;
            for candidate in number_candidates {
                if by_number.get(candidate.as_str())?.is_none() {
                    order_number = Some(candidate.clone());
                    break;
                }
            }
            let Some(order_number) = order_number else {
                return Err(StorageError::OrderNumberExhausted(number_candidates.len()));
            };

            let order = Order {
                id: order_id,
                order_number,
                user_id,
                total_amount,
                status: OrderStatus::Pending,
                delivery_method: draft.delivery_method,
                delivery_address: draft.delivery_address.clone(),
                customer_name: draft.customer_name.clone(),
                customer_phone: draft.customer_phone.clone(),
                notes: draft.notes.clone(),
                created_at: now,
                updated_at: now,
            };

            orders.insert(order_id, serde_json::to_vec(&order)?.as_slice())?;
            by_number.insert(order.order_number.as_str(), order_id)?;
            for (line_no, line) in lines.iter().enumerate() {
                order_items.insert(
                    (order_id, line_no as u32 + 1),
                    serde_json::to_vec(line)?.as_slice(),
                )?;
            }
            for (key, item) in &rows {
                cart.remove(*key)?;
                cart_index.remove(item.id)?;
            }
            (order, lines)
        };
        txn.commit()?;
        Ok((order, lines))
    }

    /// Load, guard and set the status in one write transaction. Returns the
    /// updated order and the status it moved from.
    pub fn update_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
    ) -> StorageResult<(Order, OrderStatus)> {
        let txn = self.db.begin_write()?;
        let (order, previous) = {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let mut order: Order = {
                let guard = orders
                    .get(order_id)?
                    .ok_or(StorageError::OrderNotFound(order_id))?;
                serde_json::from_slice(guard.value())?
            };
            let previous = order.status;
            if !previous.can_transition_to(new_status) {
                return Err(StorageError::InvalidTransition {
                    from: previous,
                    to: new_status,
                });
            }
            order.status = new_status;
            order.updated_at = now_millis();
            orders.insert(order_id, serde_json::to_vec(&order)?.as_slice())?;
            (order, previous)
        };
        txn.commit()?;
        Ok((order, previous))
    }

    pub fn get_order(&self, order_id: i64) -> StorageResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_order_by_number(&self, order_number: &str) -> StorageResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let by_number = txn.open_table(ORDERS_BY_NUMBER_TABLE)?;
        let Some(order_id) = by_number.get(order_number)?.map(|guard| guard.value()) else {
            return Ok(None);
        };
        let orders = txn.open_table(ORDERS_TABLE)?;
        match orders.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Err(StorageError::Inconsistent(format!(
                "orders_by_number points at missing order {order_id}"
            ))),
        }
    }

    /// One user's orders, newest first.
    pub fn list_user_orders(&self, user_id: i64) -> StorageResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .list_orders()?
            .into_iter()
            .filter(|order| order.user_id == user_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    /// Every order, newest first.
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;
        let mut orders: Vec<Order> = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    /// Frozen lines of one order, in line order.
    pub fn list_order_items(&self, order_id: i64) -> StorageResult<Vec<OrderItem>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDER_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for entry in table.range((order_id, 0)..=(order_id, u32::MAX))? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }
}
