//! Shopfront - conversational storefront core
//!
//! # Architecture Overview
//!
//! The crate is the backend of a chat-driven shop: customers browse a
//! catalog, collect products in a cart and place orders; staff manage the
//! catalog and walk orders through their lifecycle. Everything persists in
//! an embedded redb database; the chat transport sits on top and is not
//! part of this crate.
//!
//! - **Catalog** (`services::catalog`): categories and products, soft-delete
//! - **Identity** (`services::identity`): create-or-fetch users by chat id
//! - **Cart** (`services::cart`): one merged row per (user, product)
//! - **Orders** (`orders`): atomic checkout, frozen prices, status machine
//! - **Dialog** (`dialog`): in-memory checkout conversation state
//!
//! # Module Structure
//!
//! ```text
//! src/
//! ├── core/          # Configuration, shared state
//! ├── db/            # Models and redb storage
//! ├── services/      # Catalog, identity, cart
//! ├── orders/        # Checkout, numbers, money, events
//! ├── dialog.rs      # Checkout dialog state
//! └── utils/         # Errors, logging, time, validation
//! ```

pub mod core;
pub mod db;
pub mod dialog;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, StoreState};
pub use crate::db::{ShopStorage, StorageError, StorageResult};
pub use crate::dialog::{CheckoutState, DialogStore};
pub use crate::orders::{OrderEvent, OrderEventKind, OrderService};
pub use crate::services::{CartService, CatalogService, IdentityService};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};
