//! Market data error types.
//!
//! These errors describe misuse of environments and value types, such as
//! looking up an id that was never built or inserting a value of the wrong
//! type. Expected per-id build failures are not errors; they are
//! [`Failure`](crate::failure::Failure) values.

use thiserror::Error;

use super::ids::{MarketDataId, ObservableId};
use super::keys::MarketDataKey;
use super::value::ValueType;

/// Market data operation errors.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::{MarketDataError, QuoteId};
///
/// let err = MarketDataError::NotFound { id: QuoteId::of("USD-3M").into() };
/// assert_eq!(err.to_string(), "No market data for QuoteId(USD-3M)");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// No value for the id.
    #[error("No market data for {id}")]
    NotFound {
        /// The id that was looked up
        id: MarketDataId,
    },

    /// No time series for the id.
    #[error("No time series for {id}")]
    TimeSeriesNotFound {
        /// The id that was looked up
        id: ObservableId,
    },

    /// Value type does not match the type declared by the id.
    #[error("Type mismatch for {id}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The id the value was stored under
        id: MarketDataId,
        /// Type declared by the id
        expected: ValueType,
        /// Type of the supplied value
        actual: ValueType,
    },

    /// A per-scenario sequence has the wrong length.
    #[error("Scenario count mismatch for {what}: expected {expected}, got {actual}")]
    ScenarioCountMismatch {
        /// What had the wrong length
        what: String,
        /// Scenario count of the environment
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// Scenario count must be at least one.
    #[error("Invalid scenario count: {0}")]
    InvalidScenarioCount(usize),

    /// Scenario index outside `0..count`.
    #[error("Scenario index {index} out of range for {count} scenarios")]
    ScenarioOutOfRange {
        /// The requested index
        index: usize,
        /// Number of scenarios
        count: usize,
    },

    /// A global value was requested for a scenario-specific id.
    #[error("Market data for {id} is not global")]
    NotGlobal {
        /// The scenario-specific id
        id: MarketDataId,
    },

    /// Scenario values were added for an id already held as a global value.
    #[error("Market data for {id} is already global")]
    AlreadyGlobal {
        /// The global id
        id: MarketDataId,
    },

    /// A global value was added for an id already held per scenario.
    #[error("Market data for {id} is already scenario-specific")]
    AlreadyScenarioSpecific {
        /// The scenario-specific id
        id: MarketDataId,
    },

    /// The key is not observable, so it cannot have a time series.
    #[error("Key is not observable: {key}")]
    NotObservable {
        /// The key that was queried
        key: MarketDataKey,
    },

    /// Invalid maturity (non-positive or out of order tenor).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Rate at a pillar is NaN or infinite.
    #[error("Invalid rate at t = {t}: {rate}")]
    InvalidRate {
        /// Tenor of the pillar
        t: f64,
        /// The rate supplied
        rate: f64,
    },

    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Number of points required
        need: usize,
    },
}
