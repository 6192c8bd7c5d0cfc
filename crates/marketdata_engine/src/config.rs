//! Engine and market data configuration.
//!
//! [`EngineConfig`] tunes how the engine executes a build. [`MarketDataConfig`]
//! is handed unmodified to every market data function and describes how
//! non-observable data is built, currently the curve groups and the quotes
//! each curve is built from.

use marketdata_core::market_data::{CurveGroupName, CurveName};
use serde::{Deserialize, Serialize};

/// Default minimum layer size before jobs run on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

/// Execution settings for the build engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum number of jobs in a layer (or discovery round) before they
    /// are run in parallel
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with the given parallel threshold.
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// A configuration that never runs jobs in parallel.
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
        }
    }

    /// Returns whether to use parallel processing for the given job count.
    #[inline]
    pub fn should_parallelize(&self, n_jobs: usize) -> bool {
        n_jobs >= self.parallel_threshold.max(1)
    }
}

/// One node of a curve: the quote providing the zero rate at a tenor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveNode {
    /// Ticker of the quote
    pub ticker: String,
    /// Tenor in years
    pub tenor: f64,
}

impl CurveNode {
    /// Creates a curve node.
    pub fn new(ticker: impl Into<String>, tenor: f64) -> Self {
        Self {
            ticker: ticker.into(),
            tenor,
        }
    }
}

/// Definition of one curve within a group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveDefinition {
    /// Curve name, unique within its group
    pub name: CurveName,
    /// Nodes, in any order
    pub nodes: Vec<CurveNode>,
}

impl CurveDefinition {
    /// Creates a curve definition.
    pub fn new(name: impl Into<CurveName>, nodes: Vec<CurveNode>) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }
}

/// Definition of a group of curves built together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveGroupDefinition {
    /// Group name
    pub name: CurveGroupName,
    /// Curves in the group
    pub curves: Vec<CurveDefinition>,
}

impl CurveGroupDefinition {
    /// Creates a curve group definition.
    pub fn new(name: impl Into<CurveGroupName>, curves: Vec<CurveDefinition>) -> Self {
        Self {
            name: name.into(),
            curves,
        }
    }

    /// Tickers of every node in the group.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.curves
            .iter()
            .flat_map(|curve| curve.nodes.iter().map(|node| node.ticker.as_str()))
    }
}

/// Configuration passed to market data functions.
///
/// # Examples
///
/// ```
/// use marketdata_engine::config::MarketDataConfig;
///
/// let config = MarketDataConfig::from_toml_str(r#"
///     [[curve_groups]]
///     name = "USD-Disc"
///
///     [[curve_groups.curves]]
///     name = "USD-Disc"
///     nodes = [
///         { ticker = "USD-3M", tenor = 0.25 },
///         { ticker = "USD-1Y", tenor = 1.0 },
///     ]
/// "#).unwrap();
///
/// assert!(config.curve_group(&"USD-Disc".into()).is_some());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    curve_groups: Vec<CurveGroupDefinition>,
}

impl MarketDataConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration holding `definitions` as given, duplicates included.
    ///
    /// Use [`validate`](Self::validate) to find duplicated names.
    pub fn from_curve_groups(definitions: Vec<CurveGroupDefinition>) -> Self {
        Self {
            curve_groups: definitions,
        }
    }

    /// Parses a configuration from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Adds a curve group definition, replacing one with the same name.
    pub fn with_curve_group(mut self, definition: CurveGroupDefinition) -> Self {
        self.curve_groups.retain(|g| g.name != definition.name);
        self.curve_groups.push(definition);
        self
    }

    /// The definition of a curve group.
    pub fn curve_group(&self, name: &CurveGroupName) -> Option<&CurveGroupDefinition> {
        self.curve_groups.iter().find(|g| &g.name == name)
    }

    /// All curve group definitions.
    pub fn curve_groups(&self) -> &[CurveGroupDefinition] {
        &self.curve_groups
    }

    /// Checks the definitions, returning every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (i, group) in self.curve_groups.iter().enumerate() {
            if group.name.as_str().is_empty() {
                errors.push(format!("curve_groups[{}]: name must not be empty", i));
            }
            if self.curve_groups[..i].iter().any(|g| g.name == group.name) {
                errors.push(format!("curve group {} is defined twice", group.name));
            }
            if group.curves.is_empty() {
                errors.push(format!("curve group {} has no curves", group.name));
            }
            for curve in &group.curves {
                if curve.nodes.is_empty() {
                    errors.push(format!(
                        "curve {} in group {} has no nodes",
                        curve.name, group.name
                    ));
                }
                for node in &curve.nodes {
                    if !node.tenor.is_finite() || node.tenor <= 0.0 {
                        errors.push(format!(
                            "curve {} in group {}: tenor of {} must be positive",
                            curve.name, group.name, node.ticker
                        ));
                    }
                }
            }
        }
        errors
    }
}
