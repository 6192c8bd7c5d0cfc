//! Identifier types for market data.
//!
//! A [`MarketDataId`] names one concrete unit of market data bound to a
//! source (feed). Ids are immutable values with structural equality and
//! hashing, so they can be shared freely between requirement sets,
//! environments and scenarios.
//!
//! Each id carries a [`MarketDataKind`] discriminant which selects the
//! market data function that knows how to build it.

use std::fmt;

use super::keys::MarketDataKey;
use super::value::ValueType;

/// Name of a market data feed (source of observable quotes).
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::MarketDataFeed;
///
/// let feed = MarketDataFeed::new("Bloomberg");
/// assert_eq!(feed.as_str(), "Bloomberg");
/// assert!(MarketDataFeed::none().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MarketDataFeed(String);

impl MarketDataFeed {
    const NONE: &'static str = "None";

    /// Creates a new feed name.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The feed used when market data is not bound to any particular source.
    #[inline]
    pub fn none() -> Self {
        Self(Self::NONE.to_string())
    }

    /// Returns true if this is the [`MarketDataFeed::none`] feed.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.0 == Self::NONE
    }

    /// Returns the feed name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MarketDataFeed {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for MarketDataFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MarketDataFeed {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name of a group of curves that are built together.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CurveGroupName(String);

impl CurveGroupName {
    /// Creates a new curve group name.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurveGroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurveGroupName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name of a single curve within a curve group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CurveName(String);

impl CurveName {
    /// Creates a new curve name.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurveName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Id of an observable market quote, e.g. a deposit rate published by a feed.
///
/// Observable ids are the only ids that can be requested as time series.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::{MarketDataFeed, QuoteId};
///
/// let id = QuoteId::of("USD-3M");
/// assert_eq!(id.ticker(), "USD-3M");
/// assert_eq!(id.feed(), &MarketDataFeed::none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuoteId {
    ticker: String,
    feed: MarketDataFeed,
}

/// Ids of observable market data.
pub type ObservableId = QuoteId;

impl QuoteId {
    /// Creates a quote id bound to the given feed.
    pub fn new(ticker: impl Into<String>, feed: MarketDataFeed) -> Self {
        Self {
            ticker: ticker.into(),
            feed,
        }
    }

    /// Creates a quote id bound to [`MarketDataFeed::none`].
    pub fn of(ticker: impl Into<String>) -> Self {
        Self::new(ticker, MarketDataFeed::none())
    }

    /// The ticker identifying the quote within its feed.
    #[inline]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// The feed publishing the quote.
    #[inline]
    pub fn feed(&self) -> &MarketDataFeed {
        &self.feed
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.feed.is_none() {
            write!(f, "QuoteId({})", self.ticker)
        } else {
            write!(f, "QuoteId({}, feed={})", self.ticker, self.feed)
        }
    }
}

/// Id of a group of curves that are calibrated together.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveGroupId {
    name: CurveGroupName,
    feed: MarketDataFeed,
}

impl CurveGroupId {
    /// Creates a curve group id whose quotes come from the given feed.
    pub fn new(name: impl Into<CurveGroupName>, feed: MarketDataFeed) -> Self {
        Self {
            name: name.into(),
            feed,
        }
    }

    /// Creates a curve group id with a feed of [`MarketDataFeed::none`].
    pub fn of(name: impl Into<CurveGroupName>) -> Self {
        Self::new(name, MarketDataFeed::none())
    }

    /// The name of the curve group.
    #[inline]
    pub fn name(&self) -> &CurveGroupName {
        &self.name
    }

    /// The feed which provides quotes used to build curves in the group.
    #[inline]
    pub fn feed(&self) -> &MarketDataFeed {
        &self.feed
    }
}

impl fmt::Display for CurveGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.feed.is_none() {
            write!(f, "CurveGroupId({})", self.name)
        } else {
            write!(f, "CurveGroupId({}, feed={})", self.name, self.feed)
        }
    }
}

/// Id of a single curve taken from a curve group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveId {
    group: CurveGroupName,
    curve: CurveName,
    feed: MarketDataFeed,
}

impl CurveId {
    /// Creates a curve id.
    pub fn new(
        group: impl Into<CurveGroupName>,
        curve: impl Into<CurveName>,
        feed: MarketDataFeed,
    ) -> Self {
        Self {
            group: group.into(),
            curve: curve.into(),
            feed,
        }
    }

    /// The group containing the curve.
    #[inline]
    pub fn group(&self) -> &CurveGroupName {
        &self.group
    }

    /// The curve name within its group.
    #[inline]
    pub fn curve(&self) -> &CurveName {
        &self.curve
    }

    /// The feed used to build the curve group.
    #[inline]
    pub fn feed(&self) -> &MarketDataFeed {
        &self.feed
    }

    /// The id of the curve group this curve is taken from.
    pub fn group_id(&self) -> CurveGroupId {
        CurveGroupId::new(self.group.clone(), self.feed.clone())
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.feed.is_none() {
            write!(f, "CurveId({}/{})", self.group, self.curve)
        } else {
            write!(f, "CurveId({}/{}, feed={})", self.group, self.curve, self.feed)
        }
    }
}

/// Id produced by the mapping layer when no rule can resolve a key.
///
/// Building it always fails with a missing-data failure naming the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoMatchingRuleId {
    key: MarketDataKey,
}

impl NoMatchingRuleId {
    /// Creates an id standing in for the unmapped key.
    pub fn new(key: MarketDataKey) -> Self {
        Self { key }
    }

    /// The key that could not be mapped.
    #[inline]
    pub fn key(&self) -> &MarketDataKey {
        &self.key
    }
}

impl fmt::Display for NoMatchingRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoMatchingRuleId({})", self.key)
    }
}

/// Discriminant of a [`MarketDataId`], used to dispatch to market data functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarketDataKind {
    /// Observable quote
    Quote,
    /// Calibrated group of curves
    CurveGroup,
    /// Single curve extracted from a group
    Curve,
    /// Placeholder for an unmapped key
    NoMatchingRule,
}

impl fmt::Display for MarketDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketDataKind::Quote => "Quote",
            MarketDataKind::CurveGroup => "CurveGroup",
            MarketDataKind::Curve => "Curve",
            MarketDataKind::NoMatchingRule => "NoMatchingRule",
        };
        write!(f, "{}", name)
    }
}

/// Identifier of one concrete unit of market data.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::{CurveGroupId, MarketDataId, MarketDataKind, QuoteId, ValueType};
///
/// let quote: MarketDataId = QuoteId::of("USD-3M").into();
/// assert!(quote.is_observable());
/// assert_eq!(quote.value_type(), ValueType::Quote);
///
/// let group: MarketDataId = CurveGroupId::of("USD-Disc").into();
/// assert_eq!(group.kind(), MarketDataKind::CurveGroup);
/// assert_eq!(group.to_string(), "CurveGroupId(USD-Disc)");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarketDataId {
    /// Observable quote
    Quote(QuoteId),
    /// Calibrated group of curves
    CurveGroup(CurveGroupId),
    /// Single curve extracted from a group
    Curve(CurveId),
    /// Placeholder for an unmapped key
    NoMatchingRule(NoMatchingRuleId),
}

impl MarketDataId {
    /// The kind of this id, selecting the function that builds it.
    pub fn kind(&self) -> MarketDataKind {
        match self {
            MarketDataId::Quote(_) => MarketDataKind::Quote,
            MarketDataId::CurveGroup(_) => MarketDataKind::CurveGroup,
            MarketDataId::Curve(_) => MarketDataKind::Curve,
            MarketDataId::NoMatchingRule(_) => MarketDataKind::NoMatchingRule,
        }
    }

    /// The type of value this id declares it produces.
    ///
    /// A [`NoMatchingRuleId`] declares the type its unmapped key would have produced.
    pub fn value_type(&self) -> ValueType {
        match self {
            MarketDataId::Quote(_) => ValueType::Quote,
            MarketDataId::CurveGroup(_) => ValueType::CurveGroup,
            MarketDataId::Curve(_) => ValueType::Curve,
            MarketDataId::NoMatchingRule(id) => id.key().value_type(),
        }
    }

    /// Returns true for ids of observable market data.
    #[inline]
    pub fn is_observable(&self) -> bool {
        matches!(self, MarketDataId::Quote(_))
    }

    /// Returns the observable id if this is an observable.
    pub fn as_observable(&self) -> Option<&ObservableId> {
        match self {
            MarketDataId::Quote(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for MarketDataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketDataId::Quote(id) => id.fmt(f),
            MarketDataId::CurveGroup(id) => id.fmt(f),
            MarketDataId::Curve(id) => id.fmt(f),
            MarketDataId::NoMatchingRule(id) => id.fmt(f),
        }
    }
}

impl From<QuoteId> for MarketDataId {
    fn from(id: QuoteId) -> Self {
        MarketDataId::Quote(id)
    }
}

impl From<CurveGroupId> for MarketDataId {
    fn from(id: CurveGroupId) -> Self {
        MarketDataId::CurveGroup(id)
    }
}

impl From<CurveId> for MarketDataId {
    fn from(id: CurveId) -> Self {
        MarketDataId::Curve(id)
    }
}

impl From<NoMatchingRuleId> for MarketDataId {
    fn from(id: NoMatchingRuleId) -> Self {
        MarketDataId::NoMatchingRule(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;
    use std::collections::HashSet;

    #[test]
    fn test_feed_none() {
        let feed = MarketDataFeed::default();
        assert!(feed.is_none());
        assert!(!MarketDataFeed::new("Reuters").is_none());
    }

    #[test]
    fn test_quote_id_equality_includes_feed() {
        let a = QuoteId::of("USD-3M");
        let b = QuoteId::new("USD-3M", MarketDataFeed::new("Bloomberg"));
        assert_ne!(a, b);
        assert_eq!(a, QuoteId::of("USD-3M"));
    }

    #[test]
    fn test_market_data_id_kind() {
        let ids: Vec<MarketDataId> = vec![
            QuoteId::of("A").into(),
            CurveGroupId::of("G").into(),
            CurveId::new("G", "C", MarketDataFeed::none()).into(),
            NoMatchingRuleId::new(MarketDataKey::DiscountCurve(Currency::USD)).into(),
        ];
        let kinds: Vec<MarketDataKind> = ids.iter().map(|id| id.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                MarketDataKind::Quote,
                MarketDataKind::CurveGroup,
                MarketDataKind::Curve,
                MarketDataKind::NoMatchingRule,
            ]
        );
    }

    #[test]
    fn test_no_matching_rule_declares_key_type() {
        let id: MarketDataId =
            NoMatchingRuleId::new(MarketDataKey::DiscountCurve(Currency::EUR)).into();
        assert_eq!(id.value_type(), ValueType::CurveGroup);
        assert!(!id.is_observable());
    }

    #[test]
    fn test_curve_id_group_id() {
        let id = CurveId::new("USD-Disc", "USD-OIS", MarketDataFeed::new("F"));
        assert_eq!(
            id.group_id(),
            CurveGroupId::new("USD-Disc", MarketDataFeed::new("F"))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(QuoteId::of("USD-1Y").to_string(), "QuoteId(USD-1Y)");
        assert_eq!(
            CurveGroupId::new("G", MarketDataFeed::new("F")).to_string(),
            "CurveGroupId(G, feed=F)"
        );
        assert_eq!(
            CurveId::new("G", "C", MarketDataFeed::none()).to_string(),
            "CurveId(G/C)"
        );
    }

    #[test]
    fn test_market_data_id_hash() {
        let mut set: HashSet<MarketDataId> = HashSet::new();
        set.insert(QuoteId::of("A").into());
        set.insert(QuoteId::of("B").into());
        set.insert(QuoteId::of("A").into()); // Duplicate
        assert_eq!(set.len(), 2);
    }
}
