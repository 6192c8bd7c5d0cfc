//! Time series of observables.
//!
//! Time series have no dependencies, so the engine resolves every required
//! series through a [`TimeSeriesProvider`] before building the first layer.

use std::collections::HashMap;

use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{DateTimeSeries, ObservableId};

/// Source of time series for observable ids.
pub trait TimeSeriesProvider: Send + Sync {
    /// The time series for an id.
    fn time_series(&self, id: &ObservableId) -> MarketDataResult<DateTimeSeries>;
}

/// Time series held in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryTimeSeriesProvider {
    series: HashMap<ObservableId, DateTimeSeries>,
}

impl InMemoryTimeSeriesProvider {
    /// A provider with no series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series, replacing any existing series for the id.
    pub fn insert(&mut self, id: ObservableId, series: DateTimeSeries) -> &mut Self {
        self.series.insert(id, series);
        self
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if there are no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl TimeSeriesProvider for InMemoryTimeSeriesProvider {
    fn time_series(&self, id: &ObservableId) -> MarketDataResult<DateTimeSeries> {
        self.series
            .get(id)
            .cloned()
            .ok_or_else(|| Failure::missing_data(format!("No time series available for {}", id)))
    }
}
