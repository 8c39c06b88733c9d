//! Order Service - Checkout and order lifecycle
//!
//! # Checkout Flow
//!
//! ```text
//! create_order(user_id, draft)
//!     ├─ 1. Validate contact fields
//!     ├─ 2. Pre-generate order number candidates
//!     ├─ 3. Storage transaction: cart -> Order + frozen lines, cart cleared
//!     ├─ 4. Broadcast OrderEvent (after commit)
//!     └─ 5. Return the order
//! ```
//!
//! Events are broadcast best-effort: no subscriber, or a lagging one, never
//! fails or delays the checkout itself.

use crate::db::ShopStorage;
use crate::db::models::{Order, OrderDraft, OrderItem, OrderStatus};
use crate::orders::events::OrderEvent;
use crate::orders::number;
use crate::utils::validation::{self, MAX_ADDRESS_LEN, MAX_CONTACT_TEXT_LEN, MAX_NOTE_LEN};
use crate::utils::{AppError, AppResult};
use tokio::sync::broadcast;

/// Buffered events per subscriber before lag kicks in
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Number candidates pre-generated per checkout. With 36^4 suffixes per
/// second-resolution timestamp, eight misses in a row means something is
/// deeply wrong, and checkout fails rather than retrying forever.
const ORDER_NUMBER_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct OrderService {
    storage: ShopStorage,
    event_tx: broadcast::Sender<OrderEvent>,
}

impl OrderService {
    pub fn new(storage: ShopStorage) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { storage, event_tx }
    }

    /// Subscribe to order lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Place an order from the user's cart.
    ///
    /// The cart snapshot, number assignment and cart clearing are one
    /// storage transaction; on any error the cart is left as it was.
    pub fn create_order(&self, user_id: i64, draft: OrderDraft) -> AppResult<Order> {
        validation::validate_required_text(
            &draft.customer_name,
            "Customer name",
            MAX_CONTACT_TEXT_LEN,
        )?;
        validation::validate_required_text(
            &draft.customer_phone,
            "Customer phone",
            MAX_CONTACT_TEXT_LEN,
        )?;
        validation::validate_required_text(
            &draft.delivery_address,
            "Delivery address",
            MAX_ADDRESS_LEN,
        )?;
        validation::validate_optional_text(&draft.notes, "Notes", MAX_NOTE_LEN)?;

        let candidates = number::generate_candidates(ORDER_NUMBER_ATTEMPTS);
        let (order, lines) = self
            .storage
            .create_order_from_cart(user_id, &draft, &candidates)?;
        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            user_id,
            total_amount = %order.total_amount,
            lines = lines.len(),
            "Order placed"
        );
        let _ = self.event_tx.send(OrderEvent::created(&order));
        Ok(order)
    }

    /// Move an order through its lifecycle. Illegal transitions are
    /// rejected without touching the record.
    pub fn update_order_status(&self, order_id: i64, new_status: OrderStatus) -> AppResult<Order> {
        let (order, previous) = self.storage.update_order_status(order_id, new_status)?;
        tracing::info!(order_id, from = %previous, to = %new_status, "Order status changed");
        let _ = self.event_tx.send(OrderEvent::status_changed(&order, previous));
        Ok(order)
    }

    pub fn get_order(&self, order_id: i64) -> AppResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order not found: {order_id}")))
    }

    pub fn get_order_by_number(&self, order_number: &str) -> AppResult<Order> {
        self.storage
            .get_order_by_number(order_number)?
            .ok_or_else(|| AppError::not_found(format!("Order not found: {order_number}")))
    }

    /// Frozen lines of one order, in line order.
    pub fn get_order_items(&self, order_id: i64) -> AppResult<Vec<OrderItem>> {
        Ok(self.storage.list_order_items(order_id)?)
    }

    /// One user's order history, newest first.
    pub fn get_user_orders(&self, user_id: i64) -> AppResult<Vec<Order>> {
        Ok(self.storage.list_user_orders(user_id)?)
    }

    /// Every order, newest first (admin view).
    pub fn get_all_orders(&self) -> AppResult<Vec<Order>> {
        Ok(self.storage.list_orders()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Category, DeliveryMethod, Product, ProductCreate};
    use crate::orders::events::OrderEventKind;
    use rust_decimal::Decimal;

    fn create_test_service() -> (OrderService, ShopStorage) {
        let storage = ShopStorage::open_in_memory().unwrap();
        (OrderService::new(storage.clone()), storage)
    }

    fn seed_cart(storage: &ShopStorage, user_id: i64, price: i64, quantity: u32) -> Product {
        let category = Category::new(format!("Tea {user_id} {price}"), None);
        storage.insert_category(&category).unwrap();
        let product = Product::new(ProductCreate {
            category_id: category.id,
            name: "Sencha".to_string(),
            description: None,
            price: Decimal::from(price),
            photo_url: None,
            stock_quantity: 10,
        });
        storage.insert_product(&product).unwrap();
        storage.add_cart_item(user_id, product.id, quantity).unwrap();
        product
    }

    fn create_test_draft() -> OrderDraft {
        OrderDraft {
            delivery_method: DeliveryMethod::Courier,
            delivery_address: "1 Main Street".to_string(),
            customer_name: "Alice".to_string(),
            customer_phone: "+34600000001".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_create_order_validates_contact_fields() {
        let (service, storage) = create_test_service();
        seed_cart(&storage, 1, 100, 1);

        let mut draft = create_test_draft();
        draft.customer_name = "  ".to_string();
        assert!(matches!(
            service.create_order(1, draft).unwrap_err(),
            AppError::Validation(_)
        ));

        let mut draft = create_test_draft();
        draft.delivery_address = String::new();
        assert!(matches!(
            service.create_order(1, draft).unwrap_err(),
            AppError::Validation(_)
        ));

        // Cart untouched by the failed attempts
        assert_eq!(storage.list_cart_items(1).unwrap().len(), 1);
    }

    #[test]
    fn test_create_order_assigns_number_and_emits_event() {
        let (service, storage) = create_test_service();
        seed_cart(&storage, 1, 100, 3);
        let mut rx = service.subscribe();

        let order = service.create_order(1, create_test_draft()).unwrap();
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.total_amount, Decimal::from(300));
        assert_eq!(order.status, OrderStatus::Pending);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.order_id, order.id);
        assert_eq!(event.order_number, order.order_number);
        assert!(matches!(
            event.kind,
            OrderEventKind::Created { user_id: 1, .. }
        ));
    }

    #[test]
    fn test_empty_cart_checkout_fails() {
        let (service, _storage) = create_test_service();
        let err = service.create_order(1, create_test_draft()).unwrap_err();
        assert!(matches!(err, AppError::EmptyCart));
    }

    #[test]
    fn test_status_change_emits_event() {
        let (service, storage) = create_test_service();
        seed_cart(&storage, 1, 100, 1);
        let order = service.create_order(1, create_test_draft()).unwrap();

        let mut rx = service.subscribe();
        let updated = service
            .update_order_status(order.id, OrderStatus::Confirmed)
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);

        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event.kind,
            OrderEventKind::StatusChanged {
                from: OrderStatus::Pending,
                to: OrderStatus::Confirmed,
            }
        ));

        // Illegal transition leaves the order alone and emits nothing
        assert!(matches!(
            service
                .update_order_status(order.id, OrderStatus::Pending)
                .unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(rx.try_recv().is_err());
        assert_eq!(
            service.get_order(order.id).unwrap().status,
            OrderStatus::Confirmed
        );
    }

    #[test]
    fn test_lookup_by_number_and_history() {
        let (service, storage) = create_test_service();
        seed_cart(&storage, 1, 100, 2);
        let order = service.create_order(1, create_test_draft()).unwrap();

        let found = service.get_order_by_number(&order.order_number).unwrap();
        assert_eq!(found.id, order.id);
        assert!(matches!(
            service.get_order_by_number("ORD-NOPE").unwrap_err(),
            AppError::NotFound(_)
        ));

        let history = service.get_user_orders(1).unwrap();
        assert_eq!(history.len(), 1);
        assert!(service.get_user_orders(2).unwrap().is_empty());

        let items = service.get_order_items(order.id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }
}
