use std::sync::Arc;

use crate::core::Config;
use crate::db::ShopStorage;
use crate::dialog::DialogStore;
use crate::orders::OrderService;
use crate::services::{CartService, CatalogService, IdentityService};
use crate::utils::{AppError, AppResult};

/// Shared handle over every storefront service
///
/// Cloning is shallow: all clones talk to the same database and the same
/// dialog map, so one `StoreState` can be handed to every chat worker.
///
/// | Field | Purpose |
/// |-------|---------|
/// | `catalog` | Category and product management |
/// | `identity` | Chat-identity resolution |
/// | `cart` | Pending selections per user |
/// | `orders` | Checkout and order lifecycle |
/// | `dialog` | In-memory checkout dialog state |
#[derive(Clone)]
pub struct StoreState {
    pub catalog: CatalogService,
    pub identity: IdentityService,
    pub cart: CartService,
    pub orders: OrderService,
    pub dialog: Arc<DialogStore>,
}

impl StoreState {
    /// Create the work dir, open the database and wire up all services.
    pub fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir.display()
            ))
        })?;
        let storage = ShopStorage::open(config.store_db_path())?;
        tracing::info!(db_path = %config.store_db_path().display(), "Storage opened");
        Ok(Self::with_storage(storage))
    }

    /// Wire services over an existing storage handle.
    pub fn with_storage(storage: ShopStorage) -> Self {
        Self {
            catalog: CatalogService::new(storage.clone()),
            identity: IdentityService::new(storage.clone()),
            cart: CartService::new(storage.clone()),
            orders: OrderService::new(storage),
            dialog: Arc::new(DialogStore::new()),
        }
    }
}
