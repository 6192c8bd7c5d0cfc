//! Build reports printed by `mdengine run`.

use std::fmt::Write as _;

use marketdata_core::market_data::{MarketDataId, MarketDataValue};
use marketdata_engine::calculation::Calculation;
use marketdata_engine::mapping::MarketDataRules;
use marketdata_engine::ScenarioBuildOutcome;
use serde::Serialize;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text tables
    Table,
    /// Pretty-printed JSON
    Json,
}

/// One built item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    /// The market data id
    pub id: String,
    /// Value type
    pub value_type: String,
    /// `global` or `scenario`
    pub scope: String,
    /// Short description of the value(s)
    pub summary: String,
}

/// One failed item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRow {
    /// The market data id
    pub id: String,
    /// Failure reason
    pub reason: String,
    /// Failure message
    pub message: String,
}

/// Status of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRow {
    /// Calculation name
    pub name: String,
    /// Target type
    pub target_type: String,
    /// Number of failed requirements
    pub failures: usize,
}

/// Everything `mdengine run` reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    /// Valuation date of the first scenario
    pub valuation_date: String,
    /// Number of scenarios
    pub scenario_count: usize,
    /// Built items, sorted by id
    pub items: Vec<ItemRow>,
    /// Failed items and time series, sorted by id
    pub failures: Vec<FailureRow>,
    /// Calculations with the number of their requirements that failed
    pub calculations: Vec<CalculationRow>,
}

fn summarize(value: &MarketDataValue) -> String {
    match value {
        MarketDataValue::Quote(v) => format!("{:.6}", v),
        MarketDataValue::Curve(curve) => format!("{} nodes", curve.tenors().len()),
        MarketDataValue::CurveGroup(group) => format!("{} curves", group.len()),
    }
}

impl BuildReport {
    /// Summarises a build outcome for the given calculations.
    pub fn new(
        outcome: &ScenarioBuildOutcome,
        calculations: &[Calculation],
        rules: &MarketDataRules,
    ) -> Self {
        let env = outcome.environment();

        let mut ids: Vec<&MarketDataId> = env.global_ids().chain(env.scenario_ids()).collect();
        ids.sort();
        let items = ids
            .into_iter()
            .filter_map(|id| {
                let values = env.values(id).ok()?;
                let first = values.first()?;
                let (scope, summary) = if env.is_global(id) {
                    ("global", summarize(first))
                } else {
                    let all: Vec<String> = values.iter().map(|v| summarize(v)).collect();
                    ("scenario", format!("[{}]", all.join(", ")))
                };
                Some(ItemRow {
                    id: id.to_string(),
                    value_type: first.value_type().to_string(),
                    scope: scope.to_string(),
                    summary,
                })
            })
            .collect();

        let mut failures: Vec<FailureRow> = outcome
            .failure_report()
            .into_iter()
            .map(|(id, reason, message)| FailureRow {
                id: id.to_string(),
                reason: reason.to_string(),
                message,
            })
            .collect();
        let mut series_failures: Vec<FailureRow> = outcome
            .time_series_failures()
            .iter()
            .map(|(id, failure)| FailureRow {
                id: format!("time series {}", id),
                reason: failure.reason().to_string(),
                message: failure.message().to_string(),
            })
            .collect();
        series_failures.sort_by(|a, b| a.id.cmp(&b.id));
        failures.extend(series_failures);

        let calculations = calculations
            .iter()
            .map(|calc| CalculationRow {
                name: calc.name().to_string(),
                target_type: calc.target_type().to_string(),
                failures: outcome
                    .failures_for(&calc.market_data_requirements(rules))
                    .len(),
            })
            .collect();

        Self {
            valuation_date: env
                .valuation_dates()
                .first()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            scenario_count: env.scenario_count(),
            items,
            failures,
            calculations,
        }
    }

    /// Returns true if nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Renders in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Table => Ok(self.to_table()),
            OutputFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    /// Plain text tables.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "Valuation date: {}  Scenarios: {}",
            self.valuation_date, self.scenario_count
        );

        let _ = writeln!(out, "\nBuilt ({})", self.items.len());
        let width = self.items.iter().map(|i| i.id.len()).max().unwrap_or(0);
        for item in &self.items {
            let _ = writeln!(
                out,
                "  {:<width$}  {:<10}  {:<8}  {}",
                item.id,
                item.value_type,
                item.scope,
                item.summary,
                width = width
            );
        }

        let _ = writeln!(out, "\nFailures ({})", self.failures.len());
        for failure in &self.failures {
            let _ = writeln!(
                out,
                "  {}  [{}] {}",
                failure.id, failure.reason, failure.message
            );
        }

        if !self.calculations.is_empty() {
            let _ = writeln!(out, "\nCalculations ({})", self.calculations.len());
            for calc in &self.calculations {
                let status = if calc.failures == 0 {
                    "ok".to_string()
                } else {
                    format!("{} missing", calc.failures)
                };
                let _ = writeln!(out, "  {} ({})  {}", calc.name, calc.target_type, status);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketdata_core::environment::MarketEnvironment;
    use marketdata_core::market_data::QuoteId;
    use marketdata_core::requirements::MarketDataRequirements;
    use marketdata_core::types::Date;
    use marketdata_engine::config::MarketDataConfig;
    use marketdata_engine::{
        FunctionRegistry, MarketDataEngine, QuoteFilter, QuotePerturbation, QuoteStore,
        ScenarioDefinition,
    };

    fn outcome(scenarios: &ScenarioDefinition) -> ScenarioBuildOutcome {
        let engine = MarketDataEngine::new(FunctionRegistry::with_defaults(
            QuoteStore::new().with_quote("A", 1.5),
        ));
        let reqs = MarketDataRequirements::of([
            MarketDataId::from(QuoteId::of("A")),
            MarketDataId::from(QuoteId::of("B")),
        ]);
        engine
            .build_scenarios(
                &reqs,
                &MarketEnvironment::empty(Date::from_ymd(2024, 6, 28).unwrap()),
                &MarketDataConfig::new(),
                scenarios,
            )
            .unwrap()
    }

    #[test]
    fn test_report_rows() {
        let report = BuildReport::new(
            &outcome(&ScenarioDefinition::empty()),
            &[],
            &MarketDataRules::new(),
        );
        assert_eq!(report.valuation_date, "2024-06-28");
        assert_eq!(report.scenario_count, 1);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].summary, "1.500000");
        assert_eq!(report.items[0].scope, "global");
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("B"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_table_and_json() {
        let report = BuildReport::new(
            &outcome(&ScenarioDefinition::empty()),
            &[],
            &MarketDataRules::new(),
        );
        let table = report.render(OutputFormat::Table).unwrap();
        assert!(table.contains("Built (1)"));
        assert!(table.contains("Failures (1)"));

        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["scenario_count"], 1);
        assert_eq!(json["items"][0]["value_type"], report.items[0].value_type.as_str());
    }

    #[test]
    fn test_scenario_values_listed() {
        let scenarios = ScenarioDefinition::new(vec![QuotePerturbation::absolute(
            QuoteFilter::Ticker("A".to_string()),
            vec![0.0, 1.0],
        )])
        .unwrap();
        let report = BuildReport::new(&outcome(&scenarios), &[], &MarketDataRules::new());
        assert_eq!(report.scenario_count, 2);
        assert_eq!(report.items[0].scope, "scenario");
        assert_eq!(report.items[0].summary, "[1.500000, 2.500000]");
    }
}
