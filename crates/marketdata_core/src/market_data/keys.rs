//! Feed-agnostic market data keys.
//!
//! Calculations describe the data they need with [`MarketDataKey`]s. A key
//! says *what* is needed ("the USD discount curve") without saying where it
//! comes from; the mapping layer turns it into a [`MarketDataId`](super::MarketDataId)
//! before anything is built. Keys are never stored in an environment.

use std::fmt;

use super::ids::CurveGroupName;
use super::value::ValueType;
use crate::types::Currency;

/// Semantic reference to market data used by calculations.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::{MarketDataKey, ValueType};
/// use marketdata_core::types::Currency;
///
/// let key = MarketDataKey::DiscountCurve(Currency::USD);
/// assert_eq!(key.to_string(), "USD discount curve");
/// assert_eq!(key.value_type(), ValueType::CurveGroup);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value"))]
pub enum MarketDataKey {
    /// An observable quote, by ticker
    Quote(String),
    /// The curve group holding the discount curve for a currency
    DiscountCurve(Currency),
    /// The forward curve of a rate index, e.g. `USD-LIBOR-3M`
    ForwardCurve(String),
    /// A curve group, by name
    CurveGroup(CurveGroupName),
}

impl MarketDataKey {
    /// The type of value the key refers to.
    pub fn value_type(&self) -> ValueType {
        match self {
            MarketDataKey::Quote(_) => ValueType::Quote,
            MarketDataKey::DiscountCurve(_) => ValueType::CurveGroup,
            MarketDataKey::ForwardCurve(_) => ValueType::Curve,
            MarketDataKey::CurveGroup(_) => ValueType::CurveGroup,
        }
    }

    /// Returns true if the key refers to observable data (and so may have a time series).
    #[inline]
    pub fn is_observable(&self) -> bool {
        matches!(self, MarketDataKey::Quote(_))
    }
}

impl fmt::Display for MarketDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketDataKey::Quote(ticker) => write!(f, "quote {}", ticker),
            MarketDataKey::DiscountCurve(ccy) => write!(f, "{} discount curve", ccy),
            MarketDataKey::ForwardCurve(index) => write!(f, "{} forward curve", index),
            MarketDataKey::CurveGroup(name) => write!(f, "curve group {}", name),
        }
    }
}
