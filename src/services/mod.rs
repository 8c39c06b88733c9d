//! Business services
//!
//! Stateless facades over [`crate::db::ShopStorage`]. Each service holds a
//! cheap clone of the storage handle and can itself be cloned freely across
//! tasks.

pub mod cart;
pub mod catalog;
pub mod identity;

// Re-exports
pub use cart::CartService;
pub use catalog::CatalogService;
pub use identity::IdentityService;
