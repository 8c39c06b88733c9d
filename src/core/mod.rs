//! Core application plumbing: configuration and shared state

pub mod config;
pub mod state;

// Re-exports
pub use config::Config;
pub use state::StoreState;
