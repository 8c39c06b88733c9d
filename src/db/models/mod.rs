//! Database Models

// Catalog
pub mod category;
pub mod product;

// Customers
pub mod user;

// Cart
pub mod cart;

// Orders
pub mod order;

// Re-exports
pub use cart::{CartItem, CartLine, CartTotals};
pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use order::{DeliveryMethod, Order, OrderDraft, OrderItem, OrderStatus};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use user::{User, UserCreate, UserUpdate};
