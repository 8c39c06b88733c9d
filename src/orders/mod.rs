//! Order Module
//!
//! Checkout and order lifecycle on top of the storage layer:
//!
//! - **service**: OrderService, the checkout entry point and status machine
//! - **number**: human-readable order number generation
//! - **money**: precise Decimal rounding and line totals
//! - **events**: lifecycle events broadcast to subscribers
//!
//! # Data Flow
//!
//! ```text
//! create_order → validate draft → storage txn (cart → order, cart cleared)
//!       ↓                                   ↓
//!   broadcast OrderEvent ←───────────── commit
//!       ↓
//!  all subscribers
//! ```

pub mod events;
pub mod money;
pub mod number;
pub mod service;

// Re-exports
pub use events::{OrderEvent, OrderEventKind};
pub use service::OrderService;
