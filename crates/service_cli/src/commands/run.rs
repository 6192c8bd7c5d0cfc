//! Run command implementation
//!
//! Aggregates the requirements of every configured calculation, builds them
//! for each scenario and reports what was built and what failed.

use std::path::Path;

use marketdata_core::environment::MarketEnvironment;
use marketdata_engine::calculation::aggregate_requirements;

use super::engine_for;
use crate::config::AppConfig;
use crate::error::Result;
use crate::report::{BuildReport, OutputFormat};

/// Builds the market data of a validated configuration.
pub fn build_report(config: &AppConfig) -> Result<BuildReport> {
    let rules = config.rules()?;
    let calculations = config.calculations()?;
    let scenarios = config.scenario_definition()?;
    let requirements = aggregate_requirements(&calculations, &rules);

    tracing::info!(
        calculations = calculations.len(),
        values = requirements.value_count(),
        time_series = requirements.time_series().len(),
        scenarios = scenarios.scenario_count(),
        "Requirements aggregated"
    );

    let engine = engine_for(config)?;
    let outcome = engine.build_scenarios(
        &requirements,
        &MarketEnvironment::empty(config.valuation_date),
        &config.market_config(),
        &scenarios,
    )?;

    Ok(BuildReport::new(&outcome, &calculations, &rules))
}

/// Run the run command
pub fn run(config_path: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!(config = %config_path.display(), "Running market data build");
    let config = AppConfig::load_with_env_and_validate(config_path)?;

    let report = build_report(&config)?;
    if !report.is_complete() {
        tracing::warn!(failures = report.failures.len(), "Market data build incomplete");
    }
    println!("{}", report.render(format)?);
    Ok(())
}
