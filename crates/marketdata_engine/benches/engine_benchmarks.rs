//! Criterion benchmarks for the market data build engine.
//!
//! Benchmarks cover:
//! - Single-date builds of many curve groups, sequential and parallel
//! - Scenario builds with a growing number of perturbed scenarios
//! - Requirement aggregation across calculations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marketdata_core::environment::MarketEnvironment;
use marketdata_core::market_data::{CurveGroupId, MarketDataId, MarketDataKey, QuoteId};
use marketdata_core::requirements::MarketDataRequirements;
use marketdata_core::types::{Currency, Date};
use marketdata_engine::calculation::{aggregate_requirements, Calculation, CalculationRequirements};
use marketdata_engine::config::{
    CurveDefinition, CurveGroupDefinition, CurveNode, EngineConfig, MarketDataConfig,
};
use marketdata_engine::mapping::{MarketDataMappings, MarketDataRules};
use marketdata_engine::scenario::{QuoteFilter, QuotePerturbation, ScenarioDefinition};
use marketdata_engine::{FunctionRegistry, MarketDataEngine, QuoteStore};

const TENORS: [f64; 8] = [0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0];

/// Curve groups `G0..Gn`, each with one curve over eight quotes.
fn setup(n_groups: usize) -> (MarketDataConfig, QuoteStore, MarketDataRequirements) {
    let mut config = MarketDataConfig::new();
    let mut quotes = QuoteStore::new();
    let mut ids = Vec::with_capacity(n_groups);

    for g in 0..n_groups {
        let name = format!("G{}", g);
        let nodes = TENORS
            .iter()
            .map(|&tenor| {
                let ticker = format!("{}-{}", name, tenor);
                quotes.insert(QuoteId::of(ticker.as_str()), 0.03 + 0.001 * tenor);
                CurveNode::new(ticker, tenor)
            })
            .collect();
        config = config.with_curve_group(CurveGroupDefinition::new(
            name.as_str(),
            vec![CurveDefinition::new("Discount", nodes)],
        ));
        ids.push(MarketDataId::from(CurveGroupId::of(name.as_str())));
    }

    (config, quotes, MarketDataRequirements::of(ids))
}

fn date() -> Date {
    Date::from_ymd(2024, 6, 28).expect("valid date")
}

fn bench_single_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_build");

    for n_groups in [10, 100, 500] {
        let (config, quotes, reqs) = setup(n_groups);
        let registry = FunctionRegistry::with_defaults(quotes);
        let supplied = MarketEnvironment::empty(date());

        let sequential =
            MarketDataEngine::new(registry.clone()).with_config(EngineConfig::sequential());
        group.bench_with_input(
            BenchmarkId::new("sequential", n_groups),
            &reqs,
            |b, reqs| b.iter(|| sequential.build(black_box(reqs), &supplied, &config)),
        );

        let parallel = MarketDataEngine::new(registry).with_config(EngineConfig::new(1));
        group.bench_with_input(BenchmarkId::new("parallel", n_groups), &reqs, |b, reqs| {
            b.iter(|| parallel.build(black_box(reqs), &supplied, &config))
        });
    }

    group.finish();
}

fn bench_scenario_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario_build");
    group.sample_size(30);

    let (config, quotes, reqs) = setup(50);
    let engine = MarketDataEngine::new(FunctionRegistry::with_defaults(quotes));
    let supplied = MarketEnvironment::empty(date());

    for n_scenarios in [1, 10, 100] {
        let shifts = (0..n_scenarios).map(|s| s as f64 * 0.0001).collect();
        // Affects G1 and G10..G19
        let scenarios = ScenarioDefinition::new(vec![QuotePerturbation::absolute(
            QuoteFilter::Prefix("G1".to_string()),
            shifts,
        )])
        .expect("valid scenarios");

        group.bench_with_input(
            BenchmarkId::new("perturbed", n_scenarios),
            &scenarios,
            |b, scenarios| {
                b.iter(|| engine.build_scenarios(black_box(&reqs), &supplied, &config, scenarios))
            },
        );
    }

    group.finish();
}

fn bench_aggregate_requirements(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_requirements");

    let mappings = MarketDataMappings::new(Default::default())
        .with_discount_curve_group(Currency::USD, "USD-Disc")
        .with_discount_curve_group(Currency::EUR, "EUR-Disc");
    let rules = MarketDataRules::any(mappings);

    for n_calcs in [100, 10_000] {
        let calcs: Vec<Calculation> = (0..n_calcs)
            .map(|i| {
                let ccy = if i % 2 == 0 { Currency::USD } else { Currency::EUR };
                Calculation::new(
                    format!("trade-{}", i),
                    "Swap",
                    CalculationRequirements::new()
                        .with_key(MarketDataKey::DiscountCurve(ccy))
                        .with_key(MarketDataKey::Quote(format!("Q{}", i % 50))),
                )
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("calculations", n_calcs), &calcs, |b, calcs| {
            b.iter(|| aggregate_requirements(black_box(calcs), &rules))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_build,
    bench_scenario_build,
    bench_aggregate_requirements
);
criterion_main!(benches);
