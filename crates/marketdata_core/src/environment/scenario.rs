//! Market data for many scenarios at once.
//!
//! A [`ScenarioMarketEnvironment`] holds N parallel environments. Values that
//! do not depend on the scenario are stored once ("global") and broadcast to
//! every scenario on lookup; scenario-specific values are stored as a
//! sequence of exactly N values aligned by scenario index.

use std::collections::HashMap;

use super::market::{check_value_type, MarketEnvironment};
use crate::market_data::{DateTimeSeries, MarketDataError, MarketDataId, MarketDataValue, ObservableId};
use crate::types::Date;

/// Immutable market data for a set of scenarios.
///
/// # Examples
///
/// ```
/// use marketdata_core::environment::ScenarioMarketEnvironment;
/// use marketdata_core::market_data::{MarketDataValue, QuoteId};
/// use marketdata_core::types::Date;
///
/// let date = Date::from_ymd(2024, 6, 28).unwrap();
/// let mut builder = ScenarioMarketEnvironment::builder(date, 3).unwrap();
/// builder.add_global_value(QuoteId::of("G"), MarketDataValue::Quote(1.0)).unwrap();
/// let env = builder.build();
///
/// let values = env.values(&QuoteId::of("G").into()).unwrap();
/// assert_eq!(values.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioMarketEnvironment {
    /// One date shared by all scenarios, or one per scenario
    valuation_dates: Vec<Date>,
    scenario_count: usize,
    global_values: HashMap<MarketDataId, MarketDataValue>,
    scenario_values: HashMap<MarketDataId, Vec<MarketDataValue>>,
    time_series: HashMap<ObservableId, DateTimeSeries>,
}

impl ScenarioMarketEnvironment {
    /// Returns a builder for `scenario_count` scenarios sharing one valuation date.
    ///
    /// # Errors
    ///
    /// `MarketDataError::InvalidScenarioCount` if `scenario_count` is zero.
    pub fn builder(
        valuation_date: Date,
        scenario_count: usize,
    ) -> Result<ScenarioMarketEnvironmentBuilder, MarketDataError> {
        ScenarioMarketEnvironmentBuilder::new(valuation_date, scenario_count)
    }

    /// Number of scenarios.
    #[inline]
    pub fn scenario_count(&self) -> usize {
        self.scenario_count
    }

    /// Valuation dates: one shared by all scenarios, or one per scenario.
    #[inline]
    pub fn valuation_dates(&self) -> &[Date] {
        &self.valuation_dates
    }

    /// The valuation date of one scenario.
    pub fn valuation_date(&self, scenario: usize) -> Result<Date, MarketDataError> {
        self.check_scenario(scenario)?;
        Ok(if self.valuation_dates.len() == 1 {
            self.valuation_dates[0]
        } else {
            self.valuation_dates[scenario]
        })
    }

    /// The values of an id in every scenario.
    ///
    /// A global value is repeated once per scenario.
    pub fn values(&self, id: &MarketDataId) -> Result<Vec<&MarketDataValue>, MarketDataError> {
        if let Some(value) = self.global_values.get(id) {
            return Ok(vec![value; self.scenario_count]);
        }
        self.scenario_values
            .get(id)
            .map(|values| values.iter().collect())
            .ok_or_else(|| MarketDataError::NotFound { id: id.clone() })
    }

    /// The value of an id in one scenario.
    pub fn scenario_value(
        &self,
        id: &MarketDataId,
        scenario: usize,
    ) -> Result<&MarketDataValue, MarketDataError> {
        self.check_scenario(scenario)?;
        if let Some(value) = self.global_values.get(id) {
            return Ok(value);
        }
        self.scenario_values
            .get(id)
            .map(|values| &values[scenario])
            .ok_or_else(|| MarketDataError::NotFound { id: id.clone() })
    }

    /// The single value shared by all scenarios.
    ///
    /// # Errors
    ///
    /// `MarketDataError::NotGlobal` if the id has per-scenario values.
    pub fn global_value(&self, id: &MarketDataId) -> Result<&MarketDataValue, MarketDataError> {
        if let Some(value) = self.global_values.get(id) {
            return Ok(value);
        }
        if self.scenario_values.contains_key(id) {
            Err(MarketDataError::NotGlobal { id: id.clone() })
        } else {
            Err(MarketDataError::NotFound { id: id.clone() })
        }
    }

    /// The time series for an observable id.
    pub fn time_series(&self, id: &ObservableId) -> Result<&DateTimeSeries, MarketDataError> {
        self.time_series
            .get(id)
            .ok_or_else(|| MarketDataError::TimeSeriesNotFound { id: id.clone() })
    }

    /// Returns true if the id has a single shared value.
    #[inline]
    pub fn is_global(&self, id: &MarketDataId) -> bool {
        self.global_values.contains_key(id)
    }

    /// Returns true if the id has a value, global or per scenario.
    pub fn contains_value(&self, id: &MarketDataId) -> bool {
        self.global_values.contains_key(id) || self.scenario_values.contains_key(id)
    }

    /// Ids with a single shared value.
    pub fn global_ids(&self) -> impl Iterator<Item = &MarketDataId> {
        self.global_values.keys()
    }

    /// Ids with per-scenario values.
    pub fn scenario_ids(&self) -> impl Iterator<Item = &MarketDataId> {
        self.scenario_values.keys()
    }

    /// The market data seen by one scenario, as a single environment.
    pub fn scenario(&self, scenario: usize) -> Result<MarketEnvironment, MarketDataError> {
        let mut builder = MarketEnvironment::builder(self.valuation_date(scenario)?);
        builder.add_all_values(
            self.global_values
                .iter()
                .map(|(id, value)| (id.clone(), value.clone())),
        )?;
        builder.add_all_values(
            self.scenario_values
                .iter()
                .map(|(id, values)| (id.clone(), values[scenario].clone())),
        )?;
        builder.add_all_time_series(
            self.time_series
                .iter()
                .map(|(id, series)| (id.clone(), series.clone())),
        );
        Ok(builder.build())
    }

    fn check_scenario(&self, scenario: usize) -> Result<(), MarketDataError> {
        if scenario < self.scenario_count {
            Ok(())
        } else {
            Err(MarketDataError::ScenarioOutOfRange {
                index: scenario,
                count: self.scenario_count,
            })
        }
    }
}

/// Mutable builder for [`ScenarioMarketEnvironment`].
///
/// Re-adding a value with the same designation replaces it. An id cannot be
/// both global and scenario-specific.
#[derive(Debug, Clone)]
pub struct ScenarioMarketEnvironmentBuilder {
    valuation_dates: Vec<Date>,
    scenario_count: usize,
    global_values: HashMap<MarketDataId, MarketDataValue>,
    scenario_values: HashMap<MarketDataId, Vec<MarketDataValue>>,
    time_series: HashMap<ObservableId, DateTimeSeries>,
}

impl ScenarioMarketEnvironmentBuilder {
    /// Creates a builder for `scenario_count` scenarios sharing one valuation date.
    pub fn new(valuation_date: Date, scenario_count: usize) -> Result<Self, MarketDataError> {
        if scenario_count == 0 {
            return Err(MarketDataError::InvalidScenarioCount(scenario_count));
        }
        Ok(Self {
            valuation_dates: vec![valuation_date],
            scenario_count,
            global_values: HashMap::new(),
            scenario_values: HashMap::new(),
            time_series: HashMap::new(),
        })
    }

    /// Number of scenarios.
    #[inline]
    pub fn scenario_count(&self) -> usize {
        self.scenario_count
    }

    /// Replaces the valuation dates: either one shared date or one per scenario.
    pub fn valuation_dates(&mut self, dates: Vec<Date>) -> Result<&mut Self, MarketDataError> {
        if dates.len() != 1 && dates.len() != self.scenario_count {
            return Err(MarketDataError::ScenarioCountMismatch {
                what: "valuation dates".to_string(),
                expected: self.scenario_count,
                actual: dates.len(),
            });
        }
        self.valuation_dates = dates;
        Ok(self)
    }

    /// Adds a value shared by all scenarios.
    pub fn add_global_value(
        &mut self,
        id: impl Into<MarketDataId>,
        value: MarketDataValue,
    ) -> Result<&mut Self, MarketDataError> {
        let id = id.into();
        if self.scenario_values.contains_key(&id) {
            return Err(MarketDataError::AlreadyScenarioSpecific { id });
        }
        check_value_type(&id, &value)?;
        self.global_values.insert(id, value);
        Ok(self)
    }

    /// Adds one value per scenario.
    pub fn add_scenario_values(
        &mut self,
        id: impl Into<MarketDataId>,
        values: Vec<MarketDataValue>,
    ) -> Result<&mut Self, MarketDataError> {
        let id = id.into();
        if self.global_values.contains_key(&id) {
            return Err(MarketDataError::AlreadyGlobal { id });
        }
        if values.len() != self.scenario_count {
            return Err(MarketDataError::ScenarioCountMismatch {
                what: id.to_string(),
                expected: self.scenario_count,
                actual: values.len(),
            });
        }
        for value in &values {
            check_value_type(&id, value)?;
        }
        self.scenario_values.insert(id, values);
        Ok(self)
    }

    /// Adds a time series, replacing any existing series for the id.
    pub fn add_time_series(&mut self, id: ObservableId, series: DateTimeSeries) -> &mut Self {
        self.time_series.insert(id, series);
        self
    }

    /// Builds a snapshot of the data added so far.
    pub fn build(&self) -> ScenarioMarketEnvironment {
        ScenarioMarketEnvironment {
            valuation_dates: self.valuation_dates.clone(),
            scenario_count: self.scenario_count,
            global_values: self.global_values.clone(),
            scenario_values: self.scenario_values.clone(),
            time_series: self.time_series.clone(),
        }
    }
}
