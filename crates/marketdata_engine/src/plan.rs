//! Dependency discovery and layering.
//!
//! A [`BuildPlan`] is computed before anything is built:
//!
//! 1. Starting from the requested ids, each function is asked for the
//!    requirements of its id. New ids join the frontier until no new ids
//!    appear. Supplied ids are neither expanded nor built.
//! 2. The discovered ids are sorted into layers (Kahn's algorithm). Every id
//!    in a layer depends only on ids in earlier layers, so a layer can be
//!    built in parallel once the previous layers are done.
//!
//! An id whose requirements cannot be determined is recorded as a failure and
//! left out of the layers; ids depending on it fail when they are built.

use std::collections::{HashMap, HashSet};

use marketdata_core::environment::MarketEnvironment;
use marketdata_core::failure::Failure;
use marketdata_core::market_data::{MarketDataId, ObservableId};
use marketdata_core::requirements::MarketDataRequirements;

use crate::config::{EngineConfig, MarketDataConfig};
use crate::error::EngineError;
use crate::parallel::map_jobs;
use crate::registry::FunctionRegistry;

/// The ids to build, their dependencies and their build order.
#[derive(Clone, Debug)]
pub struct BuildPlan {
    layers: Vec<Vec<MarketDataId>>,
    dependencies: HashMap<MarketDataId, MarketDataRequirements>,
    failures: HashMap<MarketDataId, Failure>,
    time_series: Vec<ObservableId>,
}

struct Discovery {
    dependencies: HashMap<MarketDataId, MarketDataRequirements>,
    failures: HashMap<MarketDataId, Failure>,
    time_series: HashSet<ObservableId>,
}

impl BuildPlan {
    /// Discovers everything needed for `requirements` and orders it.
    ///
    /// # Errors
    ///
    /// `EngineError::DependencyCycle` if some ids depend on each other.
    pub fn new(
        requirements: &MarketDataRequirements,
        supplied: &MarketEnvironment,
        registry: &FunctionRegistry,
        market_config: &MarketDataConfig,
        engine_config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let discovery = discover(requirements, supplied, registry, market_config, engine_config);
        let layers = layer(&discovery.dependencies)?;

        let mut time_series: Vec<ObservableId> = discovery.time_series.into_iter().collect();
        time_series.sort();

        Ok(Self {
            layers,
            dependencies: discovery.dependencies,
            failures: discovery.failures,
            time_series,
        })
    }

    /// Ids to build, layer by layer, each layer sorted.
    pub fn layers(&self) -> &[Vec<MarketDataId>] {
        &self.layers
    }

    /// The requirements of a planned id.
    pub fn dependencies(&self, id: &MarketDataId) -> Option<&MarketDataRequirements> {
        self.dependencies.get(id)
    }

    /// Returns true if the id will be built.
    pub fn contains(&self, id: &MarketDataId) -> bool {
        self.dependencies.contains_key(id)
    }

    /// Number of ids to build.
    pub fn planned_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Ids whose requirements could not be determined.
    pub fn discovery_failures(&self) -> &HashMap<MarketDataId, Failure> {
        &self.failures
    }

    /// Time series to fetch, sorted.
    pub fn time_series(&self) -> &[ObservableId] {
        &self.time_series
    }
}

fn discover(
    requirements: &MarketDataRequirements,
    supplied: &MarketEnvironment,
    registry: &FunctionRegistry,
    market_config: &MarketDataConfig,
    engine_config: &EngineConfig,
) -> Discovery {
    let mut dependencies = HashMap::new();
    let mut failures = HashMap::new();
    let mut time_series: HashSet<ObservableId> = requirements
        .time_series()
        .iter()
        .filter(|id| !supplied.contains_time_series(id))
        .cloned()
        .collect();

    let mut frontier: Vec<MarketDataId> = requirements
        .value_ids()
        .filter(|id| !supplied.contains_value(id))
        .collect();
    frontier.sort();
    let mut seen: HashSet<MarketDataId> = frontier.iter().cloned().collect();

    let mut round = 0;
    while !frontier.is_empty() {
        round += 1;
        tracing::debug!(round, ids = frontier.len(), "Discovering market data requirements");

        let results = map_jobs(&frontier, engine_config, |id| {
            registry
                .function_for(id)
                .and_then(|function| function.requirements(id, market_config))
        });

        let mut next = Vec::new();
        for (id, result) in frontier.into_iter().zip(results) {
            match result {
                Ok(reqs) => {
                    time_series.extend(
                        reqs.time_series()
                            .iter()
                            .filter(|ts| !supplied.contains_time_series(ts))
                            .cloned(),
                    );
                    for dep in reqs.value_ids() {
                        if !supplied.contains_value(&dep) && seen.insert(dep.clone()) {
                            next.push(dep);
                        }
                    }
                    dependencies.insert(id, reqs);
                }
                Err(failure) => {
                    failures.insert(id, failure);
                }
            }
        }
        next.sort();
        frontier = next;
    }

    Discovery {
        dependencies,
        failures,
        time_series,
    }
}

fn layer(
    dependencies: &HashMap<MarketDataId, MarketDataRequirements>,
) -> Result<Vec<Vec<MarketDataId>>, EngineError> {
    // Unresolved in-plan dependencies per id, and the reverse edges
    let mut pending: HashMap<&MarketDataId, usize> = HashMap::with_capacity(dependencies.len());
    let mut dependents: HashMap<&MarketDataId, Vec<&MarketDataId>> = HashMap::new();
    for (id, reqs) in dependencies {
        let mut count = 0;
        for dep in reqs.value_ids() {
            if let Some((dep, _)) = dependencies.get_key_value(&dep) {
                count += 1;
                dependents.entry(dep).or_default().push(id);
            }
        }
        pending.insert(id, count);
    }

    let mut current: Vec<&MarketDataId> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut layers = Vec::new();
    let mut placed = 0;

    while !current.is_empty() {
        current.sort();
        let mut next = Vec::new();
        for id in &current {
            for dependent in dependents.get(*id).into_iter().flatten() {
                if let Some(count) = pending.get_mut(*dependent) {
                    *count -= 1;
                    if *count == 0 {
                        next.push(*dependent);
                    }
                }
            }
        }
        placed += current.len();
        layers.push(current.into_iter().cloned().collect());
        current = next;
    }

    if placed < dependencies.len() {
        let mut ids: Vec<MarketDataId> = pending
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        tracing::error!(ids = ids.len(), "Dependency cycle between market data");
        return Err(EngineError::DependencyCycle { ids });
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CurveDefinition, CurveGroupDefinition, CurveNode};
    use crate::functions::QuoteStore;
    use marketdata_core::failure::{FailureReason, MarketDataResult};
    use marketdata_core::market_data::{
        CurveGroupId, CurveId, DateTimeSeries, MarketDataFeed, MarketDataKind, MarketDataValue,
        QuoteId,
    };
    use marketdata_core::types::Date;

    use crate::function::{MarketDataFunction, MarketDataLookup};

    fn date() -> Date {
        Date::from_ymd(2024, 6, 28).unwrap()
    }

    fn config() -> MarketDataConfig {
        MarketDataConfig::new().with_curve_group(CurveGroupDefinition::new(
            "USD-Disc",
            vec![CurveDefinition::new(
                "USD-Disc",
                vec![CurveNode::new("USD-3M", 0.25), CurveNode::new("USD-1Y", 1.0)],
            )],
        ))
    }

    fn plan(reqs: &MarketDataRequirements, supplied: &MarketEnvironment) -> BuildPlan {
        BuildPlan::new(
            reqs,
            supplied,
            &FunctionRegistry::with_defaults(QuoteStore::new()),
            &config(),
            &EngineConfig::default(),
        )
        .unwrap()
    }

    fn quote(t: &str) -> MarketDataId {
        QuoteId::of(t).into()
    }

    fn curve_id() -> MarketDataId {
        CurveId::new("USD-Disc", "USD-Disc", MarketDataFeed::none()).into()
    }

    #[test]
    fn test_layers_follow_dependencies() {
        let reqs = MarketDataRequirements::of([curve_id()]);
        let plan = plan(&reqs, &MarketEnvironment::empty(date()));

        assert_eq!(plan.layers().len(), 3);
        assert_eq!(
            plan.layers()[0],
            vec![quote("USD-1Y"), quote("USD-3M")]
        );
        assert_eq!(
            plan.layers()[1],
            vec![MarketDataId::from(CurveGroupId::of("USD-Disc"))]
        );
        assert_eq!(plan.layers()[2], vec![curve_id()]);
        assert_eq!(plan.planned_count(), 4);
    }

    #[test]
    fn test_supplied_ids_are_not_planned() {
        let supplied = MarketEnvironment::builder(date())
            .add_value(QuoteId::of("USD-3M"), MarketDataValue::Quote(0.05))
            .unwrap()
            .build();
        let reqs = MarketDataRequirements::of([CurveGroupId::of("USD-Disc").into()]);
        let plan = plan(&reqs, &supplied);

        assert!(!plan.contains(&QuoteId::of("USD-3M").into()));
        assert!(plan.contains(&QuoteId::of("USD-1Y").into()));
        assert_eq!(plan.layers().len(), 2);
    }

    #[test]
    fn test_discovery_failure_excluded_from_layers() {
        let reqs = MarketDataRequirements::of([
            CurveGroupId::of("EUR-Disc").into(),
            QuoteId::of("A").into(),
        ]);
        let plan = plan(&reqs, &MarketEnvironment::empty(date()));

        let failure = &plan.discovery_failures()[&MarketDataId::from(CurveGroupId::of("EUR-Disc"))];
        assert_eq!(failure.reason(), FailureReason::MissingData);
        assert_eq!(plan.layers(), &[vec![quote("A")]]);
    }

    #[test]
    fn test_missing_function_recorded_at_discovery() {
        let reqs = MarketDataRequirements::of([QuoteId::of("A").into()]);
        let plan = BuildPlan::new(
            &reqs,
            &MarketEnvironment::empty(date()),
            &FunctionRegistry::new(),
            &config(),
            &EngineConfig::default(),
        )
        .unwrap();
        assert!(plan.layers().is_empty());
        assert_eq!(plan.discovery_failures().len(), 1);
    }

    #[test]
    fn test_time_series_collected() {
        let reqs = MarketDataRequirements::builder()
            .add_time_series([QuoteId::of("SOFR"), QuoteId::of("ESTR")])
            .build();
        let supplied = MarketEnvironment::builder(date())
            .add_time_series(QuoteId::of("ESTR"), DateTimeSeries::new())
            .build();
        let plan = plan(&reqs, &supplied);
        assert_eq!(plan.time_series(), &[QuoteId::of("SOFR")]);
        assert!(plan.layers().is_empty());
    }

    /// Curve groups that require each other by name.
    struct CyclicFunction;

    impl MarketDataFunction for CyclicFunction {
        fn kind(&self) -> MarketDataKind {
            MarketDataKind::CurveGroup
        }

        fn requirements(
            &self,
            id: &MarketDataId,
            _config: &MarketDataConfig,
        ) -> MarketDataResult<MarketDataRequirements> {
            let other = if *id == MarketDataId::from(CurveGroupId::of("A")) {
                "B"
            } else {
                "A"
            };
            Ok(MarketDataRequirements::of([CurveGroupId::of(other).into()]))
        }

        fn build(
            &self,
            _id: &MarketDataId,
            _lookup: &dyn MarketDataLookup,
            _config: &MarketDataConfig,
        ) -> MarketDataResult<MarketDataValue> {
            Err(Failure::calculation_failed("never built"))
        }
    }

    #[test]
    fn test_cycle_detected() {
        let mut registry = FunctionRegistry::new();
        registry.register(CyclicFunction);
        let reqs = MarketDataRequirements::of([CurveGroupId::of("A").into()]);
        let result = BuildPlan::new(
            &reqs,
            &MarketEnvironment::empty(date()),
            &registry,
            &MarketDataConfig::new(),
            &EngineConfig::default(),
        );
        assert_eq!(
            result.err(),
            Some(EngineError::DependencyCycle {
                ids: vec![CurveGroupId::of("A").into(), CurveGroupId::of("B").into()],
            })
        );
    }
}
