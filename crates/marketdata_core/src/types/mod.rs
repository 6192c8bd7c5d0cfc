//! Core time and currency types.
//!
//! This module provides:
//! - `time`: `Date`, a type-safe wrapper around `chrono::NaiveDate`
//! - `currency`: ISO 4217 currency codes
//! - `error`: Structured error types for date and currency parsing
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`Date`] from `time`
//! - [`Currency`] from `currency`
//! - [`DateError`], [`CurrencyError`] from `error`

pub mod currency;
pub mod error;
pub mod time;

// Re-export commonly used types at module level
pub use currency::Currency;
pub use error::{CurrencyError, DateError};
pub use time::Date;
