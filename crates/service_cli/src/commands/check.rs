//! Check command implementation
//!
//! Validates a configuration and its data files and prints the build plan
//! without building anything.

use std::fmt::Write as _;
use std::path::Path;

use marketdata_core::environment::MarketEnvironment;
use marketdata_engine::calculation::aggregate_requirements;

use super::engine_for;
use crate::config::AppConfig;
use crate::error::Result;

/// What a build of the configuration would do.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSummary {
    /// Number of calculations
    pub calculations: usize,
    /// Number of scenarios
    pub scenarios: usize,
    /// Ids per layer, in build order
    pub layers: Vec<Vec<String>>,
    /// Ids that cannot be planned, with the reason
    pub unplannable: Vec<(String, String)>,
    /// Time series to fetch
    pub time_series: Vec<String>,
}

impl std::fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Calculations: {}  Scenarios: {}",
            self.calculations, self.scenarios
        );
        for (i, layer) in self.layers.iter().enumerate() {
            let _ = writeln!(out, "Layer {}: {}", i, layer.join(", "));
        }
        if !self.time_series.is_empty() {
            let _ = writeln!(out, "Time series: {}", self.time_series.join(", "));
        }
        for (id, message) in &self.unplannable {
            let _ = writeln!(out, "Cannot build {}: {}", id, message);
        }
        f.write_str(out.trim_end())
    }
}

/// Plans the build of a validated configuration.
///
/// A dependency cycle is returned as an error.
pub fn check(config: &AppConfig) -> Result<CheckSummary> {
    let rules = config.rules()?;
    let calculations = config.calculations()?;
    let scenarios = config.scenario_definition()?;
    let requirements = aggregate_requirements(&calculations, &rules);

    let engine = engine_for(config)?;
    let plan = engine.plan(
        &requirements,
        &MarketEnvironment::empty(config.valuation_date),
        &config.market_config(),
    )?;

    let mut unplannable: Vec<(String, String)> = plan
        .discovery_failures()
        .iter()
        .map(|(id, failure)| (id.to_string(), failure.to_string()))
        .collect();
    unplannable.sort();

    Ok(CheckSummary {
        calculations: calculations.len(),
        scenarios: scenarios.scenario_count(),
        layers: plan
            .layers()
            .iter()
            .map(|layer| layer.iter().map(|id| id.to_string()).collect())
            .collect(),
        unplannable,
        time_series: plan.time_series().iter().map(|id| id.to_string()).collect(),
    })
}

/// Run the check command
pub fn run(config_path: &Path) -> Result<()> {
    tracing::info!(config = %config_path.display(), "Checking configuration");
    let config = AppConfig::load_with_env_and_validate(config_path)?;
    let summary = check(&config)?;
    println!("{}", summary);
    tracing::info!("Configuration OK");
    Ok(())
}
