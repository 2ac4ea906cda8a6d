//! Utility module - shared helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error type and result alias
//! - [`validation`] - field-format and text-length validation
//! - [`logger`] - tracing setup

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::AppError;
pub use result::AppResult;

/// Current time as Unix milliseconds. Persisted records store timestamps
/// in this form; conversion to calendar types happens at the edges.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
