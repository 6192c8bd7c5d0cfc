//! The market data build engine.
//!
//! [`MarketDataEngine`] turns aggregated requirements into built market data:
//!
//! 1. A [`BuildPlan`] discovers every id needed and orders them into layers.
//! 2. Required time series are fetched from the [`TimeSeriesProvider`].
//! 3. Layers are built in order. Ids within a layer are built in parallel and
//!    their results merged once the whole layer is done.
//!
//! Failures never stop the build. An id whose prerequisite failed is recorded
//! as [`UpstreamFailed`](marketdata_core::failure::FailureReason::UpstreamFailed)
//! without calling its function.
//!
//! # Scenarios
//!
//! With a [`ScenarioDefinition`], ids that do not depend on a perturbed quote
//! are built once and stored as global values. Perturbed quotes are built once
//! and shifted per scenario; anything depending on scenario-specific data is
//! built once per scenario.

use std::collections::HashMap;
use std::sync::Arc;

use marketdata_core::environment::{MarketEnvironment, ScenarioMarketEnvironment};
use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{
    DateTimeSeries, MarketDataId, MarketDataValue, ObservableId, QuoteId,
};
use marketdata_core::requirements::MarketDataRequirements;
use marketdata_core::types::Date;

use crate::config::{EngineConfig, MarketDataConfig};
use crate::error::EngineError;
use crate::function::{MarketDataFunction, MarketDataLookup};
use crate::functions::{InMemoryTimeSeriesProvider, TimeSeriesProvider};
use crate::outcome::{BuildOutcome, ScenarioBuildOutcome};
use crate::parallel::map_jobs;
use crate::plan::BuildPlan;
use crate::registry::FunctionRegistry;
use crate::scenario::ScenarioDefinition;

/// Builds market data from requirements.
///
/// # Examples
///
/// ```
/// use marketdata_core::environment::MarketEnvironment;
/// use marketdata_core::market_data::{MarketDataId, QuoteId};
/// use marketdata_core::requirements::MarketDataRequirements;
/// use marketdata_core::types::Date;
/// use marketdata_engine::config::MarketDataConfig;
/// use marketdata_engine::engine::MarketDataEngine;
/// use marketdata_engine::functions::QuoteStore;
/// use marketdata_engine::registry::FunctionRegistry;
///
/// let quotes = QuoteStore::new().with_quote("USD-3M", 0.0531);
/// let engine = MarketDataEngine::new(FunctionRegistry::with_defaults(quotes));
///
/// let reqs = MarketDataRequirements::of([MarketDataId::from(QuoteId::of("USD-3M"))]);
/// let date = Date::from_ymd(2024, 6, 28).unwrap();
/// let outcome = engine
///     .build(&reqs, &MarketEnvironment::empty(date), &MarketDataConfig::new())
///     .unwrap();
///
/// assert_eq!(outcome.environment().quote(&QuoteId::of("USD-3M")).unwrap(), 0.0531);
/// assert!(outcome.is_complete());
/// ```
#[derive(Clone)]
pub struct MarketDataEngine {
    registry: FunctionRegistry,
    time_series: Arc<dyn TimeSeriesProvider>,
    config: EngineConfig,
}

/// Values and failures accumulated while building.
struct Staged {
    global: HashMap<MarketDataId, MarketDataValue>,
    scenario: HashMap<MarketDataId, Vec<MarketDataValue>>,
    failures: HashMap<MarketDataId, Failure>,
}

/// A successfully built id.
enum Built {
    Global(MarketDataValue),
    Scenario(Vec<MarketDataValue>),
}

/// Everything a job in a layer reads.
struct LayerContext<'a> {
    plan: &'a BuildPlan,
    staged: &'a Staged,
    time_series: &'a HashMap<ObservableId, DateTimeSeries>,
    time_series_failures: &'a HashMap<ObservableId, Failure>,
    valuation_date: Date,
    market_config: &'a MarketDataConfig,
    scenarios: &'a ScenarioDefinition,
}

/// Lookup over staged data, seen from one scenario or from none.
struct StagedLookup<'a> {
    ctx: &'a LayerContext<'a>,
    scenario: Option<usize>,
}

impl MarketDataLookup for StagedLookup<'_> {
    fn valuation_date(&self) -> Date {
        self.ctx.valuation_date
    }

    fn value(&self, id: &MarketDataId) -> Option<&MarketDataValue> {
        if let Some(value) = self.ctx.staged.global.get(id) {
            return Some(value);
        }
        let scenario = self.scenario?;
        self.ctx
            .staged
            .scenario
            .get(id)
            .and_then(|values| values.get(scenario))
    }

    fn failure(&self, id: &MarketDataId) -> Option<&Failure> {
        self.ctx.staged.failures.get(id)
    }

    fn time_series(&self, id: &ObservableId) -> Option<&DateTimeSeries> {
        self.ctx.time_series.get(id)
    }
}

fn record_failure(failures: &mut HashMap<MarketDataId, Failure>, id: MarketDataId, failure: Failure) {
    tracing::warn!(id = %id, reason = %failure.reason(), "{}", failure.message());
    failures.insert(id, failure);
}

fn quote_values(values: Vec<f64>) -> Vec<MarketDataValue> {
    values.into_iter().map(MarketDataValue::Quote).collect()
}

impl MarketDataEngine {
    /// Creates an engine with no time series and the default configuration.
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            time_series: Arc::new(InMemoryTimeSeriesProvider::new()),
            config: EngineConfig::default(),
        }
    }

    /// Uses `provider` for time series.
    pub fn with_time_series_provider(mut self, provider: impl TimeSeriesProvider + 'static) -> Self {
        self.time_series = Arc::new(provider);
        self
    }

    /// Uses `config` for execution settings.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The function registry.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// The execution settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discovers and orders everything needed for `requirements`.
    pub fn plan(
        &self,
        requirements: &MarketDataRequirements,
        supplied: &MarketEnvironment,
        market_config: &MarketDataConfig,
    ) -> Result<BuildPlan, EngineError> {
        BuildPlan::new(
            requirements,
            supplied,
            &self.registry,
            market_config,
            &self.config,
        )
    }

    /// Builds market data for one valuation date.
    ///
    /// The result contains the supplied data plus everything built.
    ///
    /// # Errors
    ///
    /// `EngineError::DependencyCycle` if the requirements cannot be ordered.
    pub fn build(
        &self,
        requirements: &MarketDataRequirements,
        supplied: &MarketEnvironment,
        market_config: &MarketDataConfig,
    ) -> Result<BuildOutcome, EngineError> {
        self.build_scenarios(
            requirements,
            supplied,
            market_config,
            &ScenarioDefinition::empty(),
        )?
        .into_single()
    }

    /// Builds market data for every scenario of `scenarios`.
    ///
    /// Supplied quotes matched by a perturbation become scenario-specific.
    pub fn build_scenarios(
        &self,
        requirements: &MarketDataRequirements,
        supplied: &MarketEnvironment,
        market_config: &MarketDataConfig,
        scenarios: &ScenarioDefinition,
    ) -> Result<ScenarioBuildOutcome, EngineError> {
        let scenario_count = scenarios.scenario_count();
        tracing::info!(
            values = requirements.value_count(),
            time_series = requirements.time_series().len(),
            scenarios = scenario_count,
            "Building market data"
        );

        let plan = self.plan(requirements, supplied, market_config)?;
        tracing::debug!(
            planned = plan.planned_count(),
            layers = plan.layers().len(),
            "Market data build plan ready"
        );

        let mut staged = Self::stage_supplied(supplied, scenarios);
        for (id, failure) in plan.discovery_failures() {
            record_failure(&mut staged.failures, id.clone(), failure.clone());
        }

        let mut time_series: HashMap<ObservableId, DateTimeSeries> = supplied
            .all_time_series()
            .map(|(id, series)| (id.clone(), series.clone()))
            .collect();
        let mut time_series_failures = HashMap::new();
        for id in plan.time_series() {
            match self.time_series.time_series(id) {
                Ok(series) => {
                    time_series.insert(id.clone(), series);
                }
                Err(failure) => {
                    tracing::warn!(id = %id, reason = %failure.reason(), "{}", failure.message());
                    time_series_failures.insert(id.clone(), failure);
                }
            }
        }

        let valuation_date = supplied.valuation_date();
        for (index, layer) in plan.layers().iter().enumerate() {
            tracing::debug!(layer = index, ids = layer.len(), "Building market data layer");
            let results = {
                let ctx = LayerContext {
                    plan: &plan,
                    staged: &staged,
                    time_series: &time_series,
                    time_series_failures: &time_series_failures,
                    valuation_date,
                    market_config,
                    scenarios,
                };
                map_jobs(layer, &self.config, |id| self.build_one(id, &ctx))
            };
            for (id, result) in layer.iter().zip(results) {
                match result {
                    Ok(Built::Global(value)) => {
                        staged.global.insert(id.clone(), value);
                    }
                    Ok(Built::Scenario(values)) => {
                        staged.scenario.insert(id.clone(), values);
                    }
                    Err(failure) => record_failure(&mut staged.failures, id.clone(), failure),
                }
            }
        }

        let mut builder = ScenarioMarketEnvironment::builder(valuation_date, scenario_count)?;
        for (id, value) in staged.global {
            builder.add_global_value(id, value)?;
        }
        for (id, values) in staged.scenario {
            builder.add_scenario_values(id, values)?;
        }
        for (id, series) in time_series {
            builder.add_time_series(id, series);
        }
        let environment = builder.build();

        tracing::info!(
            planned = plan.planned_count(),
            failures = staged.failures.len(),
            time_series_failures = time_series_failures.len(),
            "Market data build complete"
        );
        Ok(ScenarioBuildOutcome::new(
            environment,
            staged.failures,
            time_series_failures,
        ))
    }

    fn stage_supplied(supplied: &MarketEnvironment, scenarios: &ScenarioDefinition) -> Staged {
        let mut staged = Staged {
            global: HashMap::new(),
            scenario: HashMap::new(),
            failures: HashMap::new(),
        };
        for (id, value) in supplied.values() {
            match (id, value) {
                (MarketDataId::Quote(quote), MarketDataValue::Quote(v)) if scenarios.perturbs(quote) => {
                    staged
                        .scenario
                        .insert(id.clone(), quote_values(scenarios.apply(quote, *v)));
                }
                _ => {
                    staged.global.insert(id.clone(), value.clone());
                }
            }
        }
        staged
    }

    fn build_one(&self, id: &MarketDataId, ctx: &LayerContext<'_>) -> MarketDataResult<Built> {
        let dependencies = ctx.plan.dependencies(id).ok_or_else(|| {
            Failure::invalid_input(format!("{} is not part of the build plan", id))
        })?;
        let mut dependency_ids: Vec<MarketDataId> = dependencies.value_ids().collect();
        dependency_ids.sort();

        if let Some((dep, failure)) = dependency_ids
            .iter()
            .find_map(|dep| ctx.staged.failures.get(dep).map(|f| (dep, f)))
        {
            return Err(Failure::upstream_failed(format!(
                "Failed to build {} because {} failed: {}",
                id,
                dep,
                failure.message()
            )));
        }
        let mut series_ids: Vec<&ObservableId> = dependencies.time_series().iter().collect();
        series_ids.sort();
        if let Some((series, failure)) = series_ids
            .into_iter()
            .find_map(|series| ctx.time_series_failures.get(series).map(|f| (series, f)))
        {
            return Err(Failure::upstream_failed(format!(
                "Failed to build {} because time series {} failed: {}",
                id,
                series,
                failure.message()
            )));
        }

        let function = self.registry.function_for(id)?;
        let perturbed: Option<&QuoteId> = match id {
            MarketDataId::Quote(quote) if ctx.scenarios.perturbs(quote) => Some(quote),
            _ => None,
        };
        let scenario_specific = dependency_ids
            .iter()
            .any(|dep| ctx.staged.scenario.contains_key(dep));

        if !scenario_specific {
            let lookup = StagedLookup { ctx, scenario: None };
            let value = checked_build(function, id, &lookup, ctx.market_config)?;
            return Ok(match (perturbed, value) {
                (Some(quote), MarketDataValue::Quote(v)) => {
                    Built::Scenario(quote_values(ctx.scenarios.apply(quote, v)))
                }
                (_, value) => Built::Global(value),
            });
        }

        let scenario_count = ctx.scenarios.scenario_count();
        let mut values = Vec::with_capacity(scenario_count);
        for scenario in 0..scenario_count {
            let lookup = StagedLookup {
                ctx,
                scenario: Some(scenario),
            };
            let value = checked_build(function, id, &lookup, ctx.market_config)
                .map_err(|failure| failure.with_context(format!("scenario {}", scenario)))?;
            values.push(match (perturbed, value) {
                (Some(quote), MarketDataValue::Quote(v)) => {
                    MarketDataValue::Quote(ctx.scenarios.apply_to_scenario(quote, v, scenario))
                }
                (_, value) => value,
            });
        }
        Ok(Built::Scenario(values))
    }
}

/// Builds a value and checks it has the type its id declares.
fn checked_build(
    function: &dyn MarketDataFunction,
    id: &MarketDataId,
    lookup: &dyn MarketDataLookup,
    config: &MarketDataConfig,
) -> MarketDataResult<MarketDataValue> {
    let value = function.build(id, lookup, config)?;
    if value.value_type() != id.value_type() {
        return Err(Failure::calculation_failed(format!(
            "{} function returned a {} value for {}, expected {}",
            id.kind(),
            value.value_type(),
            id,
            id.value_type()
        )));
    }
    Ok(value)
}

impl std::fmt::Debug for MarketDataEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::QuoteStore;
    use crate::scenario::{QuoteFilter, QuotePerturbation};
    use marketdata_core::failure::FailureReason;
    use marketdata_core::market_data::{MarketDataKind, ValueType};

    fn date() -> Date {
        Date::from_ymd(2024, 6, 28).unwrap()
    }

    fn quote(t: &str) -> MarketDataId {
        QuoteId::of(t).into()
    }

    /// Returns a curve group value for a quote id.
    struct WrongTypeFunction;

    impl MarketDataFunction for WrongTypeFunction {
        fn kind(&self) -> MarketDataKind {
            MarketDataKind::Quote
        }

        fn requirements(
            &self,
            _id: &MarketDataId,
            _config: &MarketDataConfig,
        ) -> MarketDataResult<MarketDataRequirements> {
            Ok(MarketDataRequirements::empty())
        }

        fn build(
            &self,
            _id: &MarketDataId,
            _lookup: &dyn MarketDataLookup,
            _config: &MarketDataConfig,
        ) -> MarketDataResult<MarketDataValue> {
            Ok(MarketDataValue::CurveGroup(
                marketdata_core::market_data::CurveGroup::new("G"),
            ))
        }
    }

    /// Quotes taken from the latest fixing of the SOFR series.
    struct FixingFunction;

    impl MarketDataFunction for FixingFunction {
        fn kind(&self) -> MarketDataKind {
            MarketDataKind::Quote
        }

        fn requirements(
            &self,
            _id: &MarketDataId,
            _config: &MarketDataConfig,
        ) -> MarketDataResult<MarketDataRequirements> {
            Ok(MarketDataRequirements::builder()
                .add_time_series([QuoteId::of("SOFR")])
                .build())
        }

        fn build(
            &self,
            _id: &MarketDataId,
            lookup: &dyn MarketDataLookup,
            _config: &MarketDataConfig,
        ) -> MarketDataResult<MarketDataValue> {
            let series = lookup.require_time_series(&QuoteId::of("SOFR"))?;
            series
                .latest()
                .map(|(_, v)| MarketDataValue::Quote(v))
                .ok_or_else(|| Failure::missing_data("SOFR has no fixings"))
        }
    }

    fn fixing_engine(provider: InMemoryTimeSeriesProvider) -> MarketDataEngine {
        let mut registry = FunctionRegistry::new();
        registry.register(FixingFunction);
        MarketDataEngine::new(registry).with_time_series_provider(provider)
    }

    #[test]
    fn test_time_series_from_function_requirements() {
        let mut provider = InMemoryTimeSeriesProvider::new();
        provider.insert(QuoteId::of("SOFR"), [(date(), 0.0533)].into_iter().collect());
        let engine = fixing_engine(provider);
        let reqs = MarketDataRequirements::of([quote("FIX")]);
        let env = MarketEnvironment::empty(date());
        let config = MarketDataConfig::new();

        let plan = engine.plan(&reqs, &env, &config).unwrap();
        assert_eq!(plan.time_series(), &[QuoteId::of("SOFR")]);

        let outcome = engine.build(&reqs, &env, &config).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.environment().quote(&QuoteId::of("FIX")).unwrap(), 0.0533);
        assert!(outcome
            .environment()
            .contains_time_series(&QuoteId::of("SOFR")));
    }

    #[test]
    fn test_failed_time_series_is_upstream_failure() {
        let engine = fixing_engine(InMemoryTimeSeriesProvider::new());
        let outcome = engine
            .build(
                &MarketDataRequirements::of([quote("FIX")]),
                &MarketEnvironment::empty(date()),
                &MarketDataConfig::new(),
            )
            .unwrap();

        assert!(outcome.time_series_failures().contains_key(&QuoteId::of("SOFR")));
        let failure = outcome.failure(&quote("FIX")).unwrap();
        assert_eq!(failure.reason(), FailureReason::UpstreamFailed);
        assert!(failure.message().contains("time series QuoteId(SOFR)"));
        assert!(failure.message().contains("No time series available"));
    }

    #[test]
    fn test_wrong_value_type_is_calculation_failure() {
        let mut registry = FunctionRegistry::new();
        registry.register(WrongTypeFunction);
        let engine = MarketDataEngine::new(registry);
        let outcome = engine
            .build(
                &MarketDataRequirements::of([quote("A")]),
                &MarketEnvironment::empty(date()),
                &MarketDataConfig::new(),
            )
            .unwrap();
        let failure = outcome.failure(&quote("A")).unwrap();
        assert_eq!(failure.reason(), FailureReason::CalculationFailed);
        assert!(failure.message().contains(&ValueType::CurveGroup.to_string()));
    }

    #[test]
    fn test_supplied_values_kept() {
        let engine = MarketDataEngine::new(FunctionRegistry::with_defaults(QuoteStore::new()));
        let supplied = MarketEnvironment::builder(date())
            .add_value(QuoteId::of("A"), MarketDataValue::Quote(1.0))
            .unwrap()
            .build();
        let outcome = engine
            .build(
                &MarketDataRequirements::of([quote("A")]),
                &supplied,
                &MarketDataConfig::new(),
            )
            .unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.environment(), &supplied);
    }

    #[test]
    fn test_supplied_quote_perturbed() {
        let engine = MarketDataEngine::new(FunctionRegistry::new());
        let supplied = MarketEnvironment::builder(date())
            .add_value(QuoteId::of("A"), MarketDataValue::Quote(1.0))
            .unwrap()
            .add_value(QuoteId::of("B"), MarketDataValue::Quote(2.0))
            .unwrap()
            .build();
        let scenarios = ScenarioDefinition::new(vec![QuotePerturbation::absolute(
            QuoteFilter::Ticker("A".to_string()),
            vec![0.0, 0.5],
        )])
        .unwrap();
        let outcome = engine
            .build_scenarios(
                &MarketDataRequirements::empty(),
                &supplied,
                &MarketDataConfig::new(),
                &scenarios,
            )
            .unwrap();
        let env = outcome.environment();
        assert!(!env.is_global(&quote("A")));
        assert!(env.is_global(&quote("B")));
        assert_eq!(
            env.scenario_value(&quote("A"), 1).unwrap(),
            &MarketDataValue::Quote(1.5)
        );
    }

    #[test]
    fn test_time_series_fetched() {
        let mut provider = InMemoryTimeSeriesProvider::new();
        provider.insert(QuoteId::of("SOFR"), [(date(), 0.0533)].into_iter().collect());
        let engine = MarketDataEngine::new(FunctionRegistry::new()).with_time_series_provider(provider);
        let reqs = MarketDataRequirements::builder()
            .add_time_series([QuoteId::of("SOFR"), QuoteId::of("ESTR")])
            .build();
        let outcome = engine
            .build(&reqs, &MarketEnvironment::empty(date()), &MarketDataConfig::new())
            .unwrap();

        assert!(outcome
            .environment()
            .contains_time_series(&QuoteId::of("SOFR")));
        assert_eq!(
            outcome.time_series_failures()[&QuoteId::of("ESTR")].reason(),
            FailureReason::MissingData
        );
        assert!(outcome.failures().is_empty());
    }
}
