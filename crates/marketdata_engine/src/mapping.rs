//! Mapping calculation keys to market data ids.
//!
//! Calculations ask for data by [`MarketDataKey`] ("the USD discount curve").
//! A [`MarketDataMappings`] turns each key into the concrete id to build,
//! choosing the feed and curve group. [`MarketDataRules`] pick the mappings
//! for a calculation from its target type.

use std::collections::BTreeMap;

use marketdata_core::market_data::{
    CurveGroupId, CurveGroupName, CurveId, CurveName, MarketDataFeed, MarketDataId, MarketDataKey,
    NoMatchingRuleId, QuoteId,
};
use marketdata_core::requirements::MarketDataRequirements;
use marketdata_core::types::Currency;

use crate::calculation::CalculationRequirements;

/// Wildcard target type matching every calculation.
pub const ANY_TARGET: &str = "*";

/// Location of a forward curve: the group holding it and its name.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ForwardCurveLocation {
    group: CurveGroupName,
    curve: CurveName,
}

/// Maps keys to ids for one family of calculations.
///
/// Mappings created by [`no_rules`](Self::no_rules) map every key to a
/// [`NoMatchingRuleId`].
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::{CurveGroupId, MarketDataFeed, MarketDataKey};
/// use marketdata_core::types::Currency;
/// use marketdata_engine::mapping::MarketDataMappings;
///
/// let mappings = MarketDataMappings::new(MarketDataFeed::none())
///     .with_discount_curve_group(Currency::USD, "USD-Disc");
///
/// assert_eq!(
///     mappings.id_for_key(&MarketDataKey::DiscountCurve(Currency::USD)),
///     CurveGroupId::of("USD-Disc").into()
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketDataMappings {
    feed: MarketDataFeed,
    discount_curve_groups: BTreeMap<Currency, CurveGroupName>,
    forward_curves: BTreeMap<String, ForwardCurveLocation>,
    has_rules: bool,
}

impl MarketDataMappings {
    /// Mappings reading observables from `feed`, with no curves mapped yet.
    pub fn new(feed: MarketDataFeed) -> Self {
        Self {
            feed,
            discount_curve_groups: BTreeMap::new(),
            forward_curves: BTreeMap::new(),
            has_rules: true,
        }
    }

    /// Mappings used when no rule matched a calculation.
    pub fn no_rules() -> Self {
        Self {
            has_rules: false,
            ..Self::new(MarketDataFeed::none())
        }
    }

    /// Maps the discount curve of a currency to a curve group.
    pub fn with_discount_curve_group(
        mut self,
        currency: Currency,
        group: impl Into<CurveGroupName>,
    ) -> Self {
        self.discount_curve_groups.insert(currency, group.into());
        self
    }

    /// Maps the forward curve of an index to a curve within a group.
    pub fn with_forward_curve(
        mut self,
        index: impl Into<String>,
        group: impl Into<CurveGroupName>,
        curve: impl Into<CurveName>,
    ) -> Self {
        self.forward_curves.insert(
            index.into(),
            ForwardCurveLocation {
                group: group.into(),
                curve: curve.into(),
            },
        );
        self
    }

    /// The feed observables are read from.
    pub fn feed(&self) -> &MarketDataFeed {
        &self.feed
    }

    /// Returns false for the mappings used when no rule matched.
    pub fn has_rules(&self) -> bool {
        self.has_rules
    }

    /// The id of the market data for a key.
    pub fn id_for_key(&self, key: &MarketDataKey) -> MarketDataId {
        if !self.has_rules {
            return NoMatchingRuleId::new(key.clone()).into();
        }
        let mapped: Option<MarketDataId> = match key {
            MarketDataKey::Quote(ticker) => {
                Some(QuoteId::new(ticker.as_str(), self.feed.clone()).into())
            }
            MarketDataKey::DiscountCurve(currency) => self
                .discount_curve_groups
                .get(currency)
                .map(|group| CurveGroupId::new(group.clone(), self.feed.clone()).into()),
            MarketDataKey::ForwardCurve(index) => self.forward_curves.get(index).map(|loc| {
                CurveId::new(loc.group.clone(), loc.curve.clone(), self.feed.clone()).into()
            }),
            MarketDataKey::CurveGroup(name) => {
                Some(CurveGroupId::new(name.clone(), self.feed.clone()).into())
            }
        };
        mapped.unwrap_or_else(|| NoMatchingRuleId::new(key.clone()).into())
    }

    /// The market data requirements of one calculation.
    ///
    /// A time series key that does not map to an observable becomes a
    /// [`NoMatchingRuleId`] value requirement, so it is reported as a failure.
    pub fn requirements_for(&self, requirements: &CalculationRequirements) -> MarketDataRequirements {
        let mut builder = MarketDataRequirements::builder();
        builder.add_values(requirements.keys().iter().map(|key| self.id_for_key(key)));
        for key in requirements.time_series_keys() {
            match self.id_for_key(key) {
                MarketDataId::Quote(quote) => {
                    builder.add_time_series([quote]);
                }
                _ => {
                    builder.add_value(NoMatchingRuleId::new(key.clone()));
                }
            }
        }
        builder.build()
    }
}

/// One rule: a calculation target type and the mappings for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketDataRule {
    target_type: String,
    mappings: MarketDataMappings,
}

impl MarketDataRule {
    /// Creates a rule. The target type [`ANY_TARGET`] matches every calculation.
    pub fn new(target_type: impl Into<String>, mappings: MarketDataMappings) -> Self {
        Self {
            target_type: target_type.into(),
            mappings,
        }
    }

    /// The target type matched by the rule.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// The mappings applied by the rule.
    pub fn mappings(&self) -> &MarketDataMappings {
        &self.mappings
    }

    /// Returns true if the rule applies to the target type.
    pub fn matches(&self, target_type: &str) -> bool {
        self.target_type == ANY_TARGET || self.target_type == target_type
    }
}

/// Ordered rules; the first matching rule wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketDataRules {
    rules: Vec<MarketDataRule>,
}

impl MarketDataRules {
    /// Rules matching nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single rule applying `mappings` to every calculation.
    pub fn any(mappings: MarketDataMappings) -> Self {
        Self::new().with_rule(MarketDataRule::new(ANY_TARGET, mappings))
    }

    /// Appends a rule.
    pub fn with_rule(mut self, rule: MarketDataRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rules, in match order.
    pub fn rules(&self) -> &[MarketDataRule] {
        &self.rules
    }

    /// The mappings for a target type, or [`MarketDataMappings::no_rules`].
    pub fn mappings_for(&self, target_type: &str) -> MarketDataMappings {
        self.rules
            .iter()
            .find(|rule| rule.matches(target_type))
            .map(|rule| rule.mappings.clone())
            .unwrap_or_else(MarketDataMappings::no_rules)
    }
}
