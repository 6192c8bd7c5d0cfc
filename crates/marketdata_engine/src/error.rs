//! Engine error types.
//!
//! Per-id problems are recorded as [`Failure`](marketdata_core::failure::Failure)
//! values and never abort a build. [`EngineError`] covers the problems that
//! leave the engine unable to produce any result.

use marketdata_core::market_data::{MarketDataError, MarketDataId};
use thiserror::Error;

/// Errors that stop a build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The requirements of some ids depend on each other in a cycle.
    #[error("Dependency cycle between market data: {}", join_ids(.ids))]
    DependencyCycle {
        /// Ids that could not be ordered, sorted
        ids: Vec<MarketDataId>,
    },

    /// The perturbations of a scenario definition disagree on the scenario count.
    #[error("Scenario count mismatch: {what} has {actual} scenarios, expected {expected}")]
    ScenarioCountMismatch {
        /// What has the wrong count
        what: String,
        /// Scenario count of the definition
        expected: usize,
        /// Count found
        actual: usize,
    },

    /// Assembling an environment failed.
    #[error(transparent)]
    Environment(#[from] MarketDataError),
}

fn join_ids(ids: &[MarketDataId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
