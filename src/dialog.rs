//! Conversation state for the checkout dialog
//!
//! Chat transports are stateless between messages; this map remembers
//! where each user is in the two-step checkout (pick a delivery method,
//! then send contact details). The state is deliberately volatile: a
//! restart drops it and the user restarts checkout. Carts and orders live
//! in storage and are unaffected.

use crate::db::models::DeliveryMethod;
use dashmap::DashMap;

/// Where a user currently is in the checkout dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Checkout started, waiting for the delivery method choice
    AwaitingDeliveryMethod,
    /// Method chosen, waiting for name, phone and address
    AwaitingContactInfo { delivery_method: DeliveryMethod },
}

/// Per-user dialog state, keyed by user id
#[derive(Debug, Default)]
pub struct DialogStore {
    states: DashMap<i64, CheckoutState>,
}

impl DialogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter checkout. Any previous state for the user is replaced, so a
    /// user who types the checkout command twice simply starts over.
    pub fn begin_checkout(&self, user_id: i64) {
        self.states
            .insert(user_id, CheckoutState::AwaitingDeliveryMethod);
    }

    /// Record the chosen delivery method and advance to contact entry.
    pub fn delivery_chosen(&self, user_id: i64, delivery_method: DeliveryMethod) {
        self.states
            .insert(user_id, CheckoutState::AwaitingContactInfo { delivery_method });
    }

    pub fn get(&self, user_id: i64) -> Option<CheckoutState> {
        self.states.get(&user_id).map(|entry| *entry.value())
    }

    /// Drop a user's dialog state (checkout finished or cancelled).
    /// Returns whether there was one.
    pub fn clear(&self, user_id: i64) -> bool {
        self.states.remove(&user_id).is_some()
    }
}
