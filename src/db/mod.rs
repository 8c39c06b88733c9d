//! Data layer: domain models and the redb storage engine

pub mod models;
pub mod storage;

// Re-exports
pub use storage::{ShopStorage, StorageError, StorageResult};
