//! End-to-end storefront flows over a real on-disk database
//!
//! Every test initializes a full StoreState in a temp dir, the same way a
//! deployment would, and drives it through the public service API only.

use rust_decimal::Decimal;
use shopfront::db::models::{
    CategoryCreate, DeliveryMethod, OrderDraft, OrderStatus, Product, ProductCreate,
    ProductUpdate, User, UserCreate,
};
use shopfront::{AppError, CheckoutState, Config, OrderEventKind, StoreState};
use std::sync::{Arc, Barrier};

fn create_test_state(dir: &tempfile::TempDir) -> StoreState {
    let config = Config::with_overrides(dir.path(), "test");
    StoreState::initialize(&config).unwrap()
}

fn seed_product(state: &StoreState, name: &str, price: i64, stock: i32) -> Product {
    let categories = state.catalog.get_categories().unwrap();
    let category = match categories.first() {
        Some(category) => category.clone(),
        None => state
            .catalog
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: Some("Loose leaf tea".to_string()),
            })
            .unwrap(),
    };
    state
        .catalog
        .create_product(ProductCreate {
            category_id: category.id,
            name: name.to_string(),
            description: None,
            price: Decimal::from(price),
            photo_url: None,
            stock_quantity: stock,
        })
        .unwrap()
}

fn register_user(state: &StoreState, chat_id: i64, username: &str) -> User {
    state
        .identity
        .ensure_user(UserCreate {
            chat_id,
            username: Some(username.to_string()),
            first_name: None,
            last_name: None,
        })
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn full_storefront_flow() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);

    // Admin seeds the catalog
    let product = seed_product(&state, "Sencha", 100, 10);

    // First contact registers the customer
    let user = register_user(&state, 777, "alice");
    let again = register_user(&state, 777, "alice_renamed");
    assert_eq!(again.id, user.id);
    assert_eq!(again.username.as_deref(), Some("alice"));

    let mut events = state.orders.subscribe();

    // Two adds of the same product merge into one row
    state.cart.add_to_cart(user.id, product.id, 2).unwrap();
    state.cart.add_to_cart(user.id, product.id, 3).unwrap();
    let lines = state.cart.get_cart_items(user.id).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item.quantity, 5);
    assert_eq!(lines[0].product.name, "Sencha");

    let totals = state.cart.get_cart_total(user.id).unwrap();
    assert_eq!(totals.total_quantity, 5);
    assert_eq!(totals.total_amount, Decimal::from(500));

    // Checkout dialog: method choice, then contact details
    state.dialog.begin_checkout(user.id);
    assert_eq!(
        state.dialog.get(user.id),
        Some(CheckoutState::AwaitingDeliveryMethod)
    );
    state.dialog.delivery_chosen(user.id, DeliveryMethod::Courier);
    let Some(CheckoutState::AwaitingContactInfo { delivery_method }) = state.dialog.get(user.id)
    else {
        panic!("dialog did not advance to contact entry");
    };

    let order = state
        .orders
        .create_order(
            user.id,
            OrderDraft {
                delivery_method,
                delivery_address: "1 Main Street".to_string(),
                customer_name: "Alice".to_string(),
                customer_phone: "+34600000001".to_string(),
                notes: Some("Ring twice".to_string()),
            },
        )
        .unwrap();
    state.dialog.clear(user.id);

    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(order.total_amount, Decimal::from(500));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.delivery_method, DeliveryMethod::Courier);
    assert!(state.cart.get_cart_items(user.id).unwrap().is_empty());
    assert!(state.dialog.get(user.id).is_none());

    let event = events.recv().await.unwrap();
    assert_eq!(event.order_id, order.id);
    assert_eq!(event.order_number, order.order_number);
    assert!(matches!(event.kind, OrderEventKind::Created { .. }));

    // Order lines froze the unit price; later catalog edits change nothing
    let items = state.orders.get_order_items(order.id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
    assert_eq!(items[0].price, Decimal::from(100));

    state
        .catalog
        .update_product(
            product.id,
            ProductUpdate {
                price: Some(Decimal::from(250)),
                ..Default::default()
            },
        )
        .unwrap();
    let reloaded = state.orders.get_order(order.id).unwrap();
    assert_eq!(reloaded.total_amount, Decimal::from(500));
    assert_eq!(
        state.orders.get_order_items(order.id).unwrap()[0].price,
        Decimal::from(100)
    );

    // Lifecycle: confirm, ship, deliver; terminal orders stay put
    state
        .orders
        .update_order_status(order.id, OrderStatus::Confirmed)
        .unwrap();
    let event = events.recv().await.unwrap();
    assert!(matches!(
        event.kind,
        OrderEventKind::StatusChanged {
            from: OrderStatus::Pending,
            to: OrderStatus::Confirmed,
        }
    ));
    state
        .orders
        .update_order_status(order.id, OrderStatus::Shipped)
        .unwrap();
    let delivered = state
        .orders
        .update_order_status(order.id, OrderStatus::Delivered)
        .unwrap();
    assert!(delivered.updated_at >= delivered.created_at);

    let err = state
        .orders
        .update_order_status(order.id, OrderStatus::Cancelled)
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // History and number lookup
    let history = state.orders.get_user_orders(user.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        state
            .orders
            .get_order_by_number(&order.order_number)
            .unwrap()
            .id,
        order.id
    );

    // A user with an empty cart cannot check out
    let other = register_user(&state, 888, "bob");
    let err = state
        .orders
        .create_order(
            other.id,
            OrderDraft {
                delivery_method: DeliveryMethod::Pickup,
                delivery_address: "Store counter".to_string(),
                customer_name: "Bob".to_string(),
                customer_phone: "+34600000002".to_string(),
                notes: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));
}

#[test]
fn concurrent_adds_merge_into_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);
    let product = seed_product(&state, "Sencha", 100, 10);
    let user = register_user(&state, 1, "alice");

    let barrier = Arc::new(Barrier::new(8));
    let mut handles = Vec::new();
    for i in 0..8u32 {
        let cart = state.cart.clone();
        let barrier = barrier.clone();
        let product_id = product.id;
        let user_id = user.id;
        handles.push(std::thread::spawn(move || {
            barrier.wait();
            cart.add_to_cart(user_id, product_id, i + 1).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = state.cart.get_cart_items(user.id).unwrap();
    assert_eq!(lines.len(), 1);
    // 1 + 2 + ... + 8
    assert_eq!(lines[0].item.quantity, 36);
    assert_eq!(
        state.cart.get_cart_total(user.id).unwrap().total_amount,
        Decimal::from(3600)
    );
}

#[test]
fn concurrent_checkout_places_exactly_one_order() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);
    let product = seed_product(&state, "Sencha", 100, 10);
    let user = register_user(&state, 1, "alice");
    state.cart.add_to_cart(user.id, product.id, 2).unwrap();

    let draft = OrderDraft {
        delivery_method: DeliveryMethod::Postal,
        delivery_address: "1 Main Street".to_string(),
        customer_name: "Alice".to_string(),
        customer_phone: "+34600000001".to_string(),
        notes: None,
    };

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let orders = state.orders.clone();
        let draft = draft.clone();
        let barrier = barrier.clone();
        let user_id = user.id;
        handles.push(std::thread::spawn(move || {
            barrier.wait();
            orders.create_order(user_id, draft)
        }));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // The double tap races two checkouts; exactly one wins, the other
    // finds the cart already cleared.
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AppError::EmptyCart)))
            .count(),
        1
    );
    assert_eq!(state.orders.get_all_orders().unwrap().len(), 1);
    assert!(state.cart.get_cart_items(user.id).unwrap().is_empty());
}

#[test]
fn cart_add_remove_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);
    let product = seed_product(&state, "Sencha", 100, 10);
    let user = register_user(&state, 1, "alice");

    let item = state.cart.add_to_cart(user.id, product.id, 1).unwrap();
    assert!(state.cart.remove_from_cart(item.id).unwrap());
    assert!(!state.cart.remove_from_cart(item.id).unwrap());

    assert!(state.cart.get_cart_items(user.id).unwrap().is_empty());
    let totals = state.cart.get_cart_total(user.id).unwrap();
    assert_eq!(totals.total_quantity, 0);
    assert_eq!(totals.total_amount, Decimal::ZERO);
}
