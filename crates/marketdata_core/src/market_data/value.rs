//! Heterogeneous market data values.
//!
//! Every value held by an environment is a [`MarketDataValue`]. The type a
//! value must have is declared by its id ([`MarketDataId::value_type`]) and
//! checked when the value is inserted, so readers can rely on it.
//!
//! [`MarketDataId::value_type`]: super::MarketDataId::value_type

use std::fmt;

use super::curves::{Curve, CurveGroup};

/// The type of value an id declares it produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// A single number
    Quote,
    /// A single curve
    Curve,
    /// A group of curves
    CurveGroup,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Quote => "Quote",
            ValueType::Curve => "Curve",
            ValueType::CurveGroup => "CurveGroup",
        };
        write!(f, "{}", name)
    }
}

/// A single built item of market data.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::{MarketDataValue, ValueType};
///
/// let value = MarketDataValue::Quote(0.0125);
/// assert_eq!(value.value_type(), ValueType::Quote);
/// assert_eq!(value.as_quote(), Some(0.0125));
/// assert!(value.as_curve().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarketDataValue {
    /// Raw observable number
    Quote(f64),
    /// Single curve
    Curve(Curve),
    /// Calibrated group of curves
    CurveGroup(CurveGroup),
}

impl MarketDataValue {
    /// The type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            MarketDataValue::Quote(_) => ValueType::Quote,
            MarketDataValue::Curve(_) => ValueType::Curve,
            MarketDataValue::CurveGroup(_) => ValueType::CurveGroup,
        }
    }

    /// The number, if this is a quote.
    pub fn as_quote(&self) -> Option<f64> {
        match self {
            MarketDataValue::Quote(v) => Some(*v),
            _ => None,
        }
    }

    /// The curve, if this is a single curve.
    pub fn as_curve(&self) -> Option<&Curve> {
        match self {
            MarketDataValue::Curve(c) => Some(c),
            _ => None,
        }
    }

    /// The curve group, if this is a curve group.
    pub fn as_curve_group(&self) -> Option<&CurveGroup> {
        match self {
            MarketDataValue::CurveGroup(g) => Some(g),
            _ => None,
        }
    }
}

impl From<f64> for MarketDataValue {
    fn from(v: f64) -> Self {
        MarketDataValue::Quote(v)
    }
}

impl From<Curve> for MarketDataValue {
    fn from(c: Curve) -> Self {
        MarketDataValue::Curve(c)
    }
}

impl From<CurveGroup> for MarketDataValue {
    fn from(g: CurveGroup) -> Self {
        MarketDataValue::CurveGroup(g)
    }
}
