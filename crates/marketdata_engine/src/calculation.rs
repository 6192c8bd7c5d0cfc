//! The calculation-facing side of the engine.
//!
//! Calculations declare what they need as [`CalculationRequirements`] (keys,
//! not ids). The requirements of many calculations are mapped through the
//! market data rules and unioned into one set for the engine. After the
//! build, each calculation reads its data through [`CalculationMarketData`],
//! again by key.

use std::collections::BTreeSet;
use std::sync::Arc;

use marketdata_core::environment::ScenarioMarketEnvironment;
use marketdata_core::market_data::{
    DateTimeSeries, MarketDataError, MarketDataKey, MarketDataValue, ValueType,
};
use marketdata_core::requirements::MarketDataRequirements;
use marketdata_core::types::Date;

use crate::mapping::{MarketDataMappings, MarketDataRules};

/// Keys needed by one calculation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalculationRequirements {
    keys: BTreeSet<MarketDataKey>,
    time_series_keys: BTreeSet<MarketDataKey>,
}

impl CalculationRequirements {
    /// Requirements with no keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single-value key.
    pub fn with_key(mut self, key: MarketDataKey) -> Self {
        self.keys.insert(key);
        self
    }

    /// Adds a time series key.
    pub fn with_time_series_key(mut self, key: MarketDataKey) -> Self {
        self.time_series_keys.insert(key);
        self
    }

    /// Keys of single values.
    pub fn keys(&self) -> &BTreeSet<MarketDataKey> {
        &self.keys
    }

    /// Keys of time series.
    pub fn time_series_keys(&self) -> &BTreeSet<MarketDataKey> {
        &self.time_series_keys
    }
}

/// A calculation as seen by the market data layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calculation {
    name: String,
    target_type: String,
    requirements: CalculationRequirements,
}

impl Calculation {
    /// Creates a calculation.
    pub fn new(
        name: impl Into<String>,
        target_type: impl Into<String>,
        requirements: CalculationRequirements,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            requirements,
        }
    }

    /// The calculation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of the calculation target, used to select mappings.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// The keys needed.
    pub fn requirements(&self) -> &CalculationRequirements {
        &self.requirements
    }

    /// The market data requirements under `rules`.
    pub fn market_data_requirements(&self, rules: &MarketDataRules) -> MarketDataRequirements {
        rules
            .mappings_for(&self.target_type)
            .requirements_for(&self.requirements)
    }
}

/// The union of the market data requirements of every calculation.
pub fn aggregate_requirements<'a>(
    calculations: impl IntoIterator<Item = &'a Calculation>,
    rules: &MarketDataRules,
) -> MarketDataRequirements {
    let mut builder = MarketDataRequirements::builder();
    for calculation in calculations {
        builder.add_requirements(&calculation.market_data_requirements(rules));
    }
    builder.build()
}

/// Market data for a calculation, queried by key across all scenarios.
pub trait CalculationMarketData {
    /// Valuation dates: one shared by all scenarios, or one per scenario.
    fn valuation_dates(&self) -> &[Date];

    /// Number of scenarios.
    fn scenario_count(&self) -> usize;

    /// The value for a key in every scenario.
    fn values(&self, key: &MarketDataKey) -> Result<Vec<&MarketDataValue>, MarketDataError>;

    /// The time series for a key.
    fn time_series(&self, key: &MarketDataKey) -> Result<&DateTimeSeries, MarketDataError>;

    /// The value for a key that is the same in every scenario.
    fn global_value(&self, key: &MarketDataKey) -> Result<&MarketDataValue, MarketDataError>;
}

/// [`CalculationMarketData`] over a built scenario environment.
///
/// The environment is shared; each calculation holds its own mappings.
#[derive(Clone, Debug)]
pub struct DefaultCalculationMarketData {
    environment: Arc<ScenarioMarketEnvironment>,
    mappings: MarketDataMappings,
}

impl DefaultCalculationMarketData {
    /// Creates a data source for one calculation.
    pub fn new(environment: Arc<ScenarioMarketEnvironment>, mappings: MarketDataMappings) -> Self {
        Self {
            environment,
            mappings,
        }
    }

    /// The shared environment.
    pub fn environment(&self) -> &Arc<ScenarioMarketEnvironment> {
        &self.environment
    }

    /// The mappings from keys to ids.
    pub fn mappings(&self) -> &MarketDataMappings {
        &self.mappings
    }

    /// A view of one scenario.
    pub fn scenario(&self, scenario: usize) -> Result<SingleCalculationMarketData<'_>, MarketDataError> {
        if scenario >= self.environment.scenario_count() {
            return Err(MarketDataError::ScenarioOutOfRange {
                index: scenario,
                count: self.environment.scenario_count(),
            });
        }
        Ok(SingleCalculationMarketData {
            data: self,
            scenario,
        })
    }
}

impl CalculationMarketData for DefaultCalculationMarketData {
    fn valuation_dates(&self) -> &[Date] {
        self.environment.valuation_dates()
    }

    fn scenario_count(&self) -> usize {
        self.environment.scenario_count()
    }

    fn values(&self, key: &MarketDataKey) -> Result<Vec<&MarketDataValue>, MarketDataError> {
        self.environment.values(&self.mappings.id_for_key(key))
    }

    fn time_series(&self, key: &MarketDataKey) -> Result<&DateTimeSeries, MarketDataError> {
        let id = self.mappings.id_for_key(key);
        let observable = id
            .as_observable()
            .ok_or_else(|| MarketDataError::NotObservable { key: key.clone() })?;
        self.environment.time_series(observable)
    }

    fn global_value(&self, key: &MarketDataKey) -> Result<&MarketDataValue, MarketDataError> {
        self.environment.global_value(&self.mappings.id_for_key(key))
    }
}

/// Market data for a calculation in one scenario.
#[derive(Clone, Copy, Debug)]
pub struct SingleCalculationMarketData<'a> {
    data: &'a DefaultCalculationMarketData,
    scenario: usize,
}

impl<'a> SingleCalculationMarketData<'a> {
    /// The scenario index.
    pub fn scenario_index(&self) -> usize {
        self.scenario
    }

    /// The valuation date of the scenario.
    pub fn valuation_date(&self) -> Result<Date, MarketDataError> {
        self.data.environment.valuation_date(self.scenario)
    }

    /// The value for a key.
    pub fn value(&self, key: &MarketDataKey) -> Result<&'a MarketDataValue, MarketDataError> {
        let id = self.data.mappings.id_for_key(key);
        self.data.environment.scenario_value(&id, self.scenario)
    }

    /// The number for a quote key.
    pub fn quote(&self, key: &MarketDataKey) -> Result<f64, MarketDataError> {
        let value = self.value(key)?;
        value
            .as_quote()
            .ok_or_else(|| MarketDataError::TypeMismatch {
                id: self.data.mappings.id_for_key(key),
                expected: ValueType::Quote,
                actual: value.value_type(),
            })
    }

    /// The time series for a key.
    pub fn time_series(&self, key: &MarketDataKey) -> Result<&'a DateTimeSeries, MarketDataError> {
        self.data.time_series(key)
    }
}
