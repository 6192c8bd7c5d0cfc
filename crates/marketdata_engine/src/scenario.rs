//! Scenario definitions as quote perturbations.
//!
//! A [`ScenarioDefinition`] describes N scenarios. Each [`QuotePerturbation`]
//! selects quotes by ticker and carries one shift per scenario. The engine
//! builds unaffected data once and stores it globally; perturbed quotes and
//! everything depending on them are built per scenario.

use std::fmt;

use marketdata_core::market_data::{MarketDataError, QuoteId};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// How a shift is applied to a quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    /// value + shift
    Absolute,
    /// value * (1 + shift)
    Relative,
}

impl ShiftType {
    /// Applies a shift to a value.
    #[inline]
    pub fn apply(self, value: f64, shift: f64) -> f64 {
        match self {
            ShiftType::Absolute => value + shift,
            ShiftType::Relative => value * (1.0 + shift),
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::Absolute => write!(f, "absolute"),
            ShiftType::Relative => write!(f, "relative"),
        }
    }
}

/// Selects the quotes a perturbation applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "value", rename_all = "lowercase")]
pub enum QuoteFilter {
    /// Every quote
    All,
    /// Quotes with exactly this ticker
    Ticker(String),
    /// Quotes whose ticker starts with this prefix
    Prefix(String),
}

impl QuoteFilter {
    /// Returns true if the quote is selected.
    pub fn matches(&self, id: &QuoteId) -> bool {
        match self {
            QuoteFilter::All => true,
            QuoteFilter::Ticker(ticker) => id.ticker() == ticker,
            QuoteFilter::Prefix(prefix) => id.ticker().starts_with(prefix.as_str()),
        }
    }
}

/// Shifts applied to the selected quotes, one per scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotePerturbation {
    /// Quotes affected
    pub filter: QuoteFilter,
    /// How shifts are applied
    pub shift_type: ShiftType,
    /// One shift per scenario
    pub shifts: Vec<f64>,
}

impl QuotePerturbation {
    /// Creates a perturbation.
    pub fn new(filter: QuoteFilter, shift_type: ShiftType, shifts: Vec<f64>) -> Self {
        Self {
            filter,
            shift_type,
            shifts,
        }
    }

    /// Absolute shifts to the quotes selected by `filter`.
    pub fn absolute(filter: QuoteFilter, shifts: Vec<f64>) -> Self {
        Self::new(filter, ShiftType::Absolute, shifts)
    }

    /// Relative shifts to the quotes selected by `filter`.
    pub fn relative(filter: QuoteFilter, shifts: Vec<f64>) -> Self {
        Self::new(filter, ShiftType::Relative, shifts)
    }

    /// Number of scenarios described.
    pub fn scenario_count(&self) -> usize {
        self.shifts.len()
    }
}

/// A set of scenarios described by quote perturbations.
///
/// An empty definition describes a single unperturbed scenario.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::QuoteId;
/// use marketdata_engine::scenario::{QuoteFilter, QuotePerturbation, ScenarioDefinition};
///
/// let scenarios = ScenarioDefinition::new(vec![QuotePerturbation::absolute(
///     QuoteFilter::Prefix("USD-".to_string()),
///     vec![0.0, 0.0001, -0.0001],
/// )])
/// .unwrap();
///
/// assert_eq!(scenarios.scenario_count(), 3);
/// assert!(scenarios.perturbs(&QuoteId::of("USD-3M")));
/// assert!(!scenarios.perturbs(&QuoteId::of("EUR-3M")));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioDefinition {
    perturbations: Vec<QuotePerturbation>,
    scenario_count: usize,
}

impl ScenarioDefinition {
    /// A single scenario with no perturbations.
    pub fn empty() -> Self {
        Self {
            perturbations: Vec::new(),
            scenario_count: 1,
        }
    }

    /// Creates a definition from perturbations.
    ///
    /// # Errors
    ///
    /// - `EngineError::ScenarioCountMismatch` if the perturbations have
    ///   different numbers of shifts
    /// - `EngineError::Environment` if a perturbation has no shifts
    pub fn new(perturbations: Vec<QuotePerturbation>) -> Result<Self, EngineError> {
        let Some(first) = perturbations.first() else {
            return Ok(Self::empty());
        };
        let scenario_count = first.scenario_count();
        if scenario_count == 0 {
            return Err(MarketDataError::InvalidScenarioCount(0).into());
        }
        for (i, perturbation) in perturbations.iter().enumerate().skip(1) {
            if perturbation.scenario_count() != scenario_count {
                return Err(EngineError::ScenarioCountMismatch {
                    what: format!("perturbation {}", i),
                    expected: scenario_count,
                    actual: perturbation.scenario_count(),
                });
            }
        }
        Ok(Self {
            perturbations,
            scenario_count,
        })
    }

    /// Number of scenarios.
    pub fn scenario_count(&self) -> usize {
        self.scenario_count
    }

    /// Returns true if there are no perturbations.
    pub fn is_empty(&self) -> bool {
        self.perturbations.is_empty()
    }

    /// The perturbations.
    pub fn perturbations(&self) -> &[QuotePerturbation] {
        &self.perturbations
    }

    /// Returns true if any perturbation applies to the quote.
    pub fn perturbs(&self, id: &QuoteId) -> bool {
        self.perturbations.iter().any(|p| p.filter.matches(id))
    }

    /// The quote value in one scenario, applying matching perturbations in order.
    pub fn apply_to_scenario(&self, id: &QuoteId, value: f64, scenario: usize) -> f64 {
        self.perturbations
            .iter()
            .filter(|p| p.filter.matches(id))
            .fold(value, |v, p| match p.shifts.get(scenario) {
                Some(shift) => p.shift_type.apply(v, *shift),
                None => v,
            })
    }

    /// The quote value in every scenario.
    pub fn apply(&self, id: &QuoteId, value: f64) -> Vec<f64> {
        (0..self.scenario_count())
            .map(|s| self.apply_to_scenario(id, value, s))
            .collect()
    }
}

impl Default for ScenarioDefinition {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shift_types() {
        assert_relative_eq!(ShiftType::Absolute.apply(0.05, 0.01), 0.06, epsilon = 1e-15);
        assert_relative_eq!(ShiftType::Relative.apply(0.05, 0.1), 0.055, epsilon = 1e-15);
    }

    #[test]
    fn test_filters() {
        let id = QuoteId::of("USD-3M");
        assert!(QuoteFilter::All.matches(&id));
        assert!(QuoteFilter::Ticker("USD-3M".to_string()).matches(&id));
        assert!(!QuoteFilter::Ticker("USD-1Y".to_string()).matches(&id));
        assert!(QuoteFilter::Prefix("USD".to_string()).matches(&id));
    }

    #[test]
    fn test_empty_definition_has_one_scenario() {
        let def = ScenarioDefinition::empty();
        assert_eq!(def.scenario_count(), 1);
        assert!(def.is_empty());
        assert_eq!(def.apply(&QuoteId::of("A"), 1.0), vec![1.0]);
        assert_eq!(ScenarioDefinition::new(vec![]).unwrap(), def);
        assert_eq!(ScenarioDefinition::default(), def);
    }

    #[test]
    fn test_mismatched_counts_rejected() {
        let result = ScenarioDefinition::new(vec![
            QuotePerturbation::absolute(QuoteFilter::All, vec![0.0, 0.1]),
            QuotePerturbation::relative(QuoteFilter::All, vec![0.0, 0.1, 0.2]),
        ]);
        assert_eq!(
            result.err(),
            Some(EngineError::ScenarioCountMismatch {
                what: "perturbation 1".to_string(),
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_no_shifts_rejected() {
        let result =
            ScenarioDefinition::new(vec![QuotePerturbation::absolute(QuoteFilter::All, vec![])]);
        assert!(matches!(result, Err(EngineError::Environment(_))));
    }

    #[test]
    fn test_perturbations_compose() {
        let def = ScenarioDefinition::new(vec![
            QuotePerturbation::absolute(QuoteFilter::Ticker("A".to_string()), vec![0.0, 1.0]),
            QuotePerturbation::relative(QuoteFilter::All, vec![0.5, 0.0]),
        ])
        .unwrap();
        let values = def.apply(&QuoteId::of("A"), 2.0);
        assert_relative_eq!(values[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(values[1], 3.0, epsilon = 1e-12);

        let other = def.apply(&QuoteId::of("B"), 2.0);
        assert_relative_eq!(other[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(other[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perturbation_from_toml() {
        let p: QuotePerturbation = toml::from_str(
            r#"
            filter = { match = "prefix", value = "USD-" }
            shift_type = "relative"
            shifts = [0.0, 0.01]
            "#,
        )
        .unwrap();
        assert_eq!(
            p,
            QuotePerturbation::relative(QuoteFilter::Prefix("USD-".to_string()), vec![0.0, 0.01])
        );
    }
}
