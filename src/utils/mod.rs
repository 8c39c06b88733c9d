//! Utility module - shared helpers and types
//!
//! # Contents
//!
//! - [`AppError`] / [`AppResult`] - application error taxonomy
//! - [`logger`] - tracing subscriber setup
//! - [`time`] - millisecond timestamps and snowflake IDs
//! - [`validation`] - field validators and length limits

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResult};
pub use time::{now_millis, snowflake_id};
