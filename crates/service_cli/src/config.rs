//! Application configuration.
//!
//! Loaded from a TOML file with environment variable overrides:
//!
//! ```toml
//! valuation_date = "2024-06-28"
//! quotes_file = "quotes.csv"
//!
//! [engine]
//! parallel_threshold = 8
//!
//! [[curve_groups]]
//! name = "USD-Disc"
//!
//! [[curve_groups.curves]]
//! name = "Discount"
//! nodes = [{ ticker = "USD-3M", tenor = 0.25 }, { ticker = "USD-1Y", tenor = 1.0 }]
//!
//! [[rules]]
//! target_type = "Swap"
//! discount_curves = { USD = "USD-Disc" }
//!
//! [[calculations]]
//! name = "swap-1"
//! target_type = "Swap"
//! discount_curves = ["USD"]
//!
//! [[scenarios.perturbations]]
//! filter = { match = "prefix", value = "USD-" }
//! shift_type = "absolute"
//! shifts = [0.0, 0.0001]
//! ```
//!
//! Relative data file paths are resolved against the directory of the
//! configuration file.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use marketdata_core::market_data::{MarketDataFeed, MarketDataKey};
use marketdata_core::types::{Currency, Date};
use marketdata_engine::calculation::{Calculation, CalculationRequirements};
use marketdata_engine::config::{CurveGroupDefinition, EngineConfig, MarketDataConfig};
use marketdata_engine::mapping::{MarketDataMappings, MarketDataRule, MarketDataRules, ANY_TARGET};
use marketdata_engine::scenario::{QuotePerturbation, ScenarioDefinition};
use serde::Deserialize;

use crate::error::{CliError, Result};

/// Environment variable overriding the valuation date
pub const ENV_VALUATION_DATE: &str = "MDENGINE_VALUATION_DATE";
/// Environment variable overriding the parallel threshold
pub const ENV_PARALLEL_THRESHOLD: &str = "MDENGINE_PARALLEL_THRESHOLD";
/// Environment variable overriding the quotes file.
///
/// Relative paths are taken as given, relative to the working directory.
pub const ENV_QUOTES_FILE: &str = "MDENGINE_QUOTES_FILE";
/// Environment variable overriding the time series file.
///
/// Relative paths are taken as given, relative to the working directory.
pub const ENV_TIME_SERIES_FILE: &str = "MDENGINE_TIME_SERIES_FILE";

/// Where the forward curve of an index lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForwardCurveConfig {
    /// Rate index, e.g. `USD-LIBOR-3M`
    pub index: String,
    /// Curve group holding the curve
    pub group: String,
    /// Curve name within the group
    pub curve: String,
}

/// A market data rule: which ids the keys of matching calculations map to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleConfig {
    /// Calculation target type, or `*` for any
    #[serde(default = "default_target_type")]
    pub target_type: String,
    /// Market data feed for quotes and curve groups
    #[serde(default)]
    pub feed: Option<String>,
    /// Discount curve group per currency code
    #[serde(default)]
    pub discount_curves: BTreeMap<String, String>,
    /// Forward curve locations
    #[serde(default)]
    pub forward_curves: Vec<ForwardCurveConfig>,
}

fn default_target_type() -> String {
    ANY_TARGET.to_string()
}

impl RuleConfig {
    /// Converts to an engine rule.
    pub fn to_rule(&self) -> std::result::Result<MarketDataRule, String> {
        let feed = self
            .feed
            .as_deref()
            .map(MarketDataFeed::new)
            .unwrap_or_default();
        let mut mappings = MarketDataMappings::new(feed);
        for (code, group) in &self.discount_curves {
            let currency = Currency::from_str(code)
                .map_err(|e| format!("rule for {}: {}", self.target_type, e))?;
            mappings = mappings.with_discount_curve_group(currency, group.as_str());
        }
        for forward in &self.forward_curves {
            mappings = mappings.with_forward_curve(
                forward.index.as_str(),
                forward.group.as_str(),
                forward.curve.as_str(),
            );
        }
        Ok(MarketDataRule::new(self.target_type.as_str(), mappings))
    }
}

/// A calculation and the keys it needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculationConfig {
    /// Calculation name
    pub name: String,
    /// Target type, used to select a rule
    pub target_type: String,
    /// Quote tickers
    #[serde(default)]
    pub quotes: Vec<String>,
    /// Currency codes of discount curves
    #[serde(default)]
    pub discount_curves: Vec<String>,
    /// Rate indices of forward curves
    #[serde(default)]
    pub forward_curves: Vec<String>,
    /// Curve group names
    #[serde(default)]
    pub curve_groups: Vec<String>,
    /// Tickers of time series
    #[serde(default)]
    pub time_series: Vec<String>,
}

impl CalculationConfig {
    /// Converts to an engine calculation.
    pub fn to_calculation(&self) -> std::result::Result<Calculation, String> {
        let mut requirements = CalculationRequirements::new();
        for ticker in &self.quotes {
            requirements = requirements.with_key(MarketDataKey::Quote(ticker.clone()));
        }
        for code in &self.discount_curves {
            let currency = Currency::from_str(code)
                .map_err(|e| format!("calculation {}: {}", self.name, e))?;
            requirements = requirements.with_key(MarketDataKey::DiscountCurve(currency));
        }
        for index in &self.forward_curves {
            requirements = requirements.with_key(MarketDataKey::ForwardCurve(index.clone()));
        }
        for group in &self.curve_groups {
            requirements = requirements.with_key(MarketDataKey::CurveGroup(group.as_str().into()));
        }
        for ticker in &self.time_series {
            requirements = requirements.with_time_series_key(MarketDataKey::Quote(ticker.clone()));
        }
        Ok(Calculation::new(
            self.name.as_str(),
            self.target_type.as_str(),
            requirements,
        ))
    }
}

/// Scenario perturbations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScenariosConfig {
    /// Perturbations, all with the same number of shifts
    #[serde(default)]
    pub perturbations: Vec<QuotePerturbation>,
}

/// The `mdengine` configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Valuation date, `YYYY-MM-DD`
    pub valuation_date: Date,

    /// Engine execution settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Curve group definitions
    #[serde(default)]
    pub curve_groups: Vec<CurveGroupDefinition>,

    /// Rules, first match wins
    #[serde(default)]
    pub rules: Vec<RuleConfig>,

    /// Calculations whose requirements are built
    #[serde(default)]
    pub calculations: Vec<CalculationConfig>,

    /// Scenario perturbations; none for a single build
    #[serde(default)]
    pub scenarios: ScenariosConfig,

    /// CSV file of quotes: `ticker,value[,feed]`
    #[serde(default)]
    pub quotes_file: Option<PathBuf>,

    /// CSV file of time series points: `ticker,date,value[,feed]`
    #[serde(default)]
    pub time_series_file: Option<PathBuf>,
}

impl AppConfig {
    /// Parses a configuration from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a configuration file, resolving data paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_paths(base))
    }

    /// Loads a configuration file with environment overrides and validates it.
    ///
    /// Data paths from the file are resolved against its directory before the
    /// overrides apply; paths from the environment are left as given.
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self> {
        let config = Self::load(path)?.with_env_override()?;
        config.validate()?;
        Ok(config)
    }

    /// Makes relative data file paths relative to `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.quotes_file = self.quotes_file.map(resolve);
        self.time_series_file = self.time_series_file.map(resolve);
        self
    }

    /// Applies `MDENGINE_*` environment variable overrides.
    pub fn with_env_override(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    ///
    /// File paths are used as given and are not passed through
    /// [`resolve_paths`](Self::resolve_paths).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(date) = lookup(ENV_VALUATION_DATE) {
            self.valuation_date = Date::parse(&date).map_err(|e| {
                CliError::InvalidArgument(format!("{}={}: {}", ENV_VALUATION_DATE, date, e))
            })?;
        }
        if let Some(threshold) = lookup(ENV_PARALLEL_THRESHOLD) {
            self.engine.parallel_threshold = threshold.parse().map_err(|_| {
                CliError::InvalidArgument(format!(
                    "{}={}: expected a non-negative integer",
                    ENV_PARALLEL_THRESHOLD, threshold
                ))
            })?;
        }
        if let Some(path) = lookup(ENV_QUOTES_FILE) {
            self.quotes_file = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(ENV_TIME_SERIES_FILE) {
            self.time_series_file = Some(PathBuf::from(path));
        }
        Ok(self)
    }

    /// Checks the configuration, reporting every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = self.market_config().validate();

        for rule in &self.rules {
            if let Err(e) = rule.to_rule() {
                errors.push(e);
            }
        }

        let mut names = HashSet::new();
        for calculation in &self.calculations {
            if calculation.name.is_empty() {
                errors.push("calculation name must not be empty".to_string());
            } else if !names.insert(calculation.name.as_str()) {
                errors.push(format!("calculation {} is defined twice", calculation.name));
            }
            if let Err(e) = calculation.to_calculation() {
                errors.push(e);
            }
        }

        if let Err(e) = ScenarioDefinition::new(self.scenarios.perturbations.clone()) {
            errors.push(format!("scenarios: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CliError::Validation(errors))
        }
    }

    /// Curve group definitions for the market data functions.
    pub fn market_config(&self) -> MarketDataConfig {
        MarketDataConfig::from_curve_groups(self.curve_groups.clone())
    }

    /// The configured rules, in order.
    pub fn rules(&self) -> Result<MarketDataRules> {
        self.rules
            .iter()
            .try_fold(MarketDataRules::new(), |rules, rule| {
                rule.to_rule().map(|r| rules.with_rule(r))
            })
            .map_err(|e| CliError::Validation(vec![e]))
    }

    /// The configured calculations.
    pub fn calculations(&self) -> Result<Vec<Calculation>> {
        self.calculations
            .iter()
            .map(CalculationConfig::to_calculation)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| CliError::Validation(vec![e]))
    }

    /// The configured scenarios.
    pub fn scenario_definition(&self) -> Result<ScenarioDefinition> {
        Ok(ScenarioDefinition::new(
            self.scenarios.perturbations.clone(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketdata_core::market_data::{CurveGroupId, MarketDataId};

    const CONFIG: &str = r#"
        valuation_date = "2024-06-28"
        quotes_file = "quotes.csv"

        [engine]
        parallel_threshold = 4

        [[curve_groups]]
        name = "USD-Disc"

        [[curve_groups.curves]]
        name = "Discount"
        nodes = [{ ticker = "USD-3M", tenor = 0.25 }, { ticker = "USD-1Y", tenor = 1.0 }]

        [[rules]]
        target_type = "Swap"
        discount_curves = { USD = "USD-Disc" }
        forward_curves = [{ index = "USD-SOFR", group = "USD-Disc", curve = "Discount" }]

        [[calculations]]
        name = "swap-1"
        target_type = "Swap"
        discount_curves = ["USD"]
        forward_curves = ["USD-SOFR"]
        time_series = ["SOFR"]

        [[scenarios.perturbations]]
        filter = { match = "prefix", value = "USD-" }
        shift_type = "absolute"
        shifts = [0.0, 0.0001]
    "#;

    fn config() -> AppConfig {
        AppConfig::from_toml_str(CONFIG).unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let config = config();
        assert_eq!(config.valuation_date, Date::from_ymd(2024, 6, 28).unwrap());
        assert_eq!(config.engine.parallel_threshold, 4);
        assert_eq!(config.curve_groups.len(), 1);
        assert_eq!(config.rules[0].target_type, "Swap");
        assert_eq!(config.calculations[0].time_series, vec!["SOFR"]);
        assert_eq!(config.scenarios.perturbations.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = AppConfig::from_toml_str(r#"valuation_date = "2024-06-28""#).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert!(config.calculations.is_empty());
        assert!(config.quotes_file.is_none());
        assert_eq!(config.scenario_definition().unwrap().scenario_count(), 1);
    }

    #[test]
    fn test_rules_default_to_any_target() {
        let config = AppConfig::from_toml_str(
            r#"
            valuation_date = "2024-06-28"
            [[rules]]
            discount_curves = { EUR = "EUR-Disc" }
            "#,
        )
        .unwrap();
        let rules = config.rules().unwrap();
        let mappings = rules.mappings_for("Anything");
        assert_eq!(
            mappings.id_for_key(&MarketDataKey::DiscountCurve(Currency::EUR)),
            MarketDataId::from(CurveGroupId::of("EUR-Disc"))
        );
    }

    #[test]
    fn test_calculation_requirements_mapped() {
        let config = config();
        let rules = config.rules().unwrap();
        let calcs = config.calculations().unwrap();
        let reqs = calcs[0].market_data_requirements(&rules);
        assert!(reqs.contains_value(&MarketDataId::from(CurveGroupId::of("USD-Disc"))));
        assert_eq!(reqs.time_series().len(), 1);
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = config();
        config.calculations.push(config.calculations[0].clone());
        config.calculations[0].discount_curves.push("XXX".to_string());
        config.scenarios.perturbations[0].shifts.clear();

        match config.validate() {
            Err(CliError::Validation(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors[0].contains("XXX"));
                assert!(errors[1].contains("defined twice"));
                assert!(errors[2].starts_with("scenarios:"));
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let config = config()
            .with_overrides(|name| match name {
                ENV_VALUATION_DATE => Some("2024-07-01".to_string()),
                ENV_PARALLEL_THRESHOLD => Some("16".to_string()),
                ENV_TIME_SERIES_FILE => Some("/data/fixings.csv".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.valuation_date, Date::from_ymd(2024, 7, 1).unwrap());
        assert_eq!(config.engine.parallel_threshold, 16);
        assert_eq!(config.quotes_file, Some(PathBuf::from("quotes.csv")));
        assert_eq!(
            config.time_series_file,
            Some(PathBuf::from("/data/fixings.csv"))
        );

        let bad = self::config().with_overrides(|name| {
            (name == ENV_PARALLEL_THRESHOLD).then(|| "many".to_string())
        });
        assert!(matches!(bad, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdengine.toml");
        std::fs::write(&path, CONFIG).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.quotes_file, Some(dir.path().join("quotes.csv")));
    }

    #[test]
    fn test_env_paths_not_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdengine.toml");
        std::fs::write(&path, CONFIG).unwrap();

        let config = AppConfig::load(&path)
            .unwrap()
            .with_overrides(|name| {
                (name == ENV_TIME_SERIES_FILE).then(|| "local/fixings.csv".to_string())
            })
            .unwrap();
        assert_eq!(config.quotes_file, Some(dir.path().join("quotes.csv")));
        assert_eq!(
            config.time_series_file,
            Some(PathBuf::from("local/fixings.csv"))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load(Path::new("/nonexistent/mdengine.toml"));
        assert!(matches!(result, Err(CliError::Io { .. })));
    }
}
