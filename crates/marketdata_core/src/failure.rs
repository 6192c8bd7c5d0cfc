//! Typed failures for expected market data problems.
//!
//! Building market data can fail for ordinary reasons: a quote is missing,
//! a key has no mapping rule, a curve cannot be calibrated from its inputs.
//! These are reported as [`Failure`] values inside a `Result` and recorded
//! per id; they never abort a build.

use std::fmt;
use thiserror::Error;

/// Category of a market data failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureReason {
    /// No data, mapping rule or function was available
    MissingData,
    /// A function failed while building a value
    CalculationFailed,
    /// An id or value was malformed for its kind
    InvalidInput,
    /// A prerequisite failed, so the value was not built
    UpstreamFailed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::MissingData => "MissingData",
            FailureReason::CalculationFailed => "CalculationFailed",
            FailureReason::InvalidInput => "InvalidInput",
            FailureReason::UpstreamFailed => "UpstreamFailed",
        };
        write!(f, "{}", name)
    }
}

/// A failure with its reason and a human-readable message.
///
/// # Examples
///
/// ```
/// use marketdata_core::failure::{Failure, FailureReason};
///
/// let failure = Failure::missing_data("No quote for USD-3M");
/// assert_eq!(failure.reason(), FailureReason::MissingData);
/// assert_eq!(failure.to_string(), "[MissingData] No quote for USD-3M");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("[{reason}] {message}")]
pub struct Failure {
    reason: FailureReason,
    message: String,
}

/// Result of a market data operation that can fail in an expected way.
pub type MarketDataResult<T> = Result<T, Failure>;

impl Failure {
    /// Create a failure.
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// Create a missing-data failure.
    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::new(FailureReason::MissingData, message)
    }

    /// Create a calculation-failed failure.
    pub fn calculation_failed(message: impl Into<String>) -> Self {
        Self::new(FailureReason::CalculationFailed, message)
    }

    /// Create an invalid-input failure.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureReason::InvalidInput, message)
    }

    /// Create an upstream-failed failure.
    pub fn upstream_failed(message: impl Into<String>) -> Self {
        Self::new(FailureReason::UpstreamFailed, message)
    }

    /// The failure category.
    #[inline]
    pub fn reason(&self) -> FailureReason {
        self.reason
    }

    /// The failure message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns a failure with the same reason and `context` prefixed to the message.
    pub fn with_context(&self, context: impl fmt::Display) -> Self {
        Self::new(self.reason, format!("{}: {}", context, self.message))
    }
}
