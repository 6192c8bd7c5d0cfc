//! Results of a build: the environment plus every recorded failure.

use std::collections::HashMap;

use marketdata_core::environment::{MarketEnvironment, ScenarioMarketEnvironment};
use marketdata_core::failure::{Failure, FailureReason};
use marketdata_core::market_data::{MarketDataId, ObservableId};
use marketdata_core::requirements::MarketDataRequirements;

use crate::error::EngineError;

/// One line of a failure report.
pub type FailureRecord = (MarketDataId, FailureReason, String);

fn report(failures: &HashMap<MarketDataId, Failure>) -> Vec<FailureRecord> {
    let mut records: Vec<FailureRecord> = failures
        .iter()
        .map(|(id, f)| (id.clone(), f.reason(), f.message().to_string()))
        .collect();
    records.sort_by(|a, b| a.0.cmp(&b.0));
    records
}

fn failures_for(
    failures: &HashMap<MarketDataId, Failure>,
    time_series_failures: &HashMap<ObservableId, Failure>,
    requirements: &MarketDataRequirements,
) -> Vec<(MarketDataId, Failure)> {
    let mut found: Vec<(MarketDataId, Failure)> = requirements
        .value_ids()
        .filter_map(|id| failures.get(&id).map(|f| (id, f.clone())))
        .collect();
    found.extend(requirements.time_series().iter().filter_map(|id| {
        time_series_failures
            .get(id)
            .map(|f| (MarketDataId::Quote(id.clone()), f.with_context("time series")))
    }));
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

/// Market data for one valuation date, with the failures of the build.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    environment: MarketEnvironment,
    failures: HashMap<MarketDataId, Failure>,
    time_series_failures: HashMap<ObservableId, Failure>,
}

impl BuildOutcome {
    /// The built environment, including supplied data.
    pub fn environment(&self) -> &MarketEnvironment {
        &self.environment
    }

    /// Consumes the outcome, returning the environment.
    pub fn into_environment(self) -> MarketEnvironment {
        self.environment
    }

    /// Failures keyed by id.
    pub fn failures(&self) -> &HashMap<MarketDataId, Failure> {
        &self.failures
    }

    /// The failure for an id, if it could not be built.
    pub fn failure(&self, id: &MarketDataId) -> Option<&Failure> {
        self.failures.get(id)
    }

    /// Failures of time series, keyed by id.
    pub fn time_series_failures(&self) -> &HashMap<ObservableId, Failure> {
        &self.time_series_failures
    }

    /// Returns true if nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.time_series_failures.is_empty()
    }

    /// `(id, reason, message)` for every failed id, sorted by id.
    pub fn failure_report(&self) -> Vec<FailureRecord> {
        report(&self.failures)
    }

    /// Failures of the ids in `requirements`, sorted by id.
    ///
    /// A failed time series is reported under the quote id of its observable.
    pub fn failures_for(&self, requirements: &MarketDataRequirements) -> Vec<(MarketDataId, Failure)> {
        failures_for(&self.failures, &self.time_series_failures, requirements)
    }
}

/// Market data for every scenario, with the failures of the build.
///
/// An id fails as a whole: if building it fails in any scenario it has no
/// value in any scenario.
#[derive(Clone, Debug)]
pub struct ScenarioBuildOutcome {
    environment: ScenarioMarketEnvironment,
    failures: HashMap<MarketDataId, Failure>,
    time_series_failures: HashMap<ObservableId, Failure>,
}

impl ScenarioBuildOutcome {
    pub(crate) fn new(
        environment: ScenarioMarketEnvironment,
        failures: HashMap<MarketDataId, Failure>,
        time_series_failures: HashMap<ObservableId, Failure>,
    ) -> Self {
        Self {
            environment,
            failures,
            time_series_failures,
        }
    }

    /// The built environment, including supplied data.
    pub fn environment(&self) -> &ScenarioMarketEnvironment {
        &self.environment
    }

    /// Consumes the outcome, returning the environment.
    pub fn into_environment(self) -> ScenarioMarketEnvironment {
        self.environment
    }

    /// Failures keyed by id.
    pub fn failures(&self) -> &HashMap<MarketDataId, Failure> {
        &self.failures
    }

    /// The failure for an id, if it could not be built.
    pub fn failure(&self, id: &MarketDataId) -> Option<&Failure> {
        self.failures.get(id)
    }

    /// Failures of time series, keyed by id.
    pub fn time_series_failures(&self) -> &HashMap<ObservableId, Failure> {
        &self.time_series_failures
    }

    /// Returns true if nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.time_series_failures.is_empty()
    }

    /// `(id, reason, message)` for every failed id, sorted by id.
    pub fn failure_report(&self) -> Vec<FailureRecord> {
        report(&self.failures)
    }

    /// Failures of the ids in `requirements`, sorted by id.
    pub fn failures_for(&self, requirements: &MarketDataRequirements) -> Vec<(MarketDataId, Failure)> {
        failures_for(&self.failures, &self.time_series_failures, requirements)
    }

    /// The outcome of the first scenario as a single-date outcome.
    pub fn into_single(self) -> Result<BuildOutcome, EngineError> {
        let environment = self.environment.scenario(0)?;
        Ok(BuildOutcome {
            environment,
            failures: self.failures,
            time_series_failures: self.time_series_failures,
        })
    }
}
