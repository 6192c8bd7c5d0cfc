//! Curve value types produced by curve group functions.
//!
//! This module provides:
//! - [`Curve`]: zero rates at pillar tenors with linear interpolation
//! - [`CurveGroup`]: named curves calibrated together

use std::collections::BTreeMap;

use super::error::MarketDataError;
use super::ids::{CurveGroupName, CurveName};

/// Yield curve defined by zero rates at pillar tenors.
///
/// Zero rates are interpolated linearly between pillars and extrapolated
/// flat outside them.
///
/// # Example
///
/// ```
/// use marketdata_core::market_data::Curve;
///
/// let curve = Curve::new("USD-OIS", &[0.25, 1.0], &[0.02, 0.03]).unwrap();
/// assert!((curve.zero_rate(0.625) - 0.025).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "CurvePoints")
)]
pub struct Curve {
    name: CurveName,
    /// Sorted tenor points (years)
    tenors: Vec<f64>,
    /// Corresponding zero rates
    rates: Vec<f64>,
}

impl Curve {
    /// Construct a curve from pillar points.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InsufficientData)` - No pillars, or tenor and rate counts differ
    /// * `Err(MarketDataError::InvalidMaturity)` - Tenors not finite, positive and strictly increasing
    /// * `Err(MarketDataError::InvalidRate)` - A rate is not finite
    pub fn new(
        name: impl Into<CurveName>,
        tenors: &[f64],
        rates: &[f64],
    ) -> Result<Self, MarketDataError> {
        if tenors.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }

        if tenors.len() != rates.len() {
            return Err(MarketDataError::InsufficientData {
                got: rates.len(),
                need: tenors.len(),
            });
        }

        for i in 0..tenors.len() {
            let t = tenors[i];
            if !t.is_finite() || t <= 0.0 || (i > 0 && t <= tenors[i - 1]) {
                return Err(MarketDataError::InvalidMaturity { t });
            }
            if !rates[i].is_finite() {
                return Err(MarketDataError::InvalidRate { t, rate: rates[i] });
            }
        }

        Ok(Self {
            name: name.into(),
            tenors: tenors.to_vec(),
            rates: rates.to_vec(),
        })
    }

    /// The curve name.
    #[inline]
    pub fn name(&self) -> &CurveName {
        &self.name
    }

    /// Pillar tenors in years.
    #[inline]
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Zero rates at the pillar tenors.
    #[inline]
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Zero rate at time `t` (years).
    pub fn zero_rate(&self, t: f64) -> f64 {
        let last = self.tenors.len() - 1;
        if t <= self.tenors[0] {
            return self.rates[0];
        }
        if t >= self.tenors[last] {
            return self.rates[last];
        }
        // First pillar strictly beyond t; t lies in [tenors[i - 1], tenors[i])
        let i = self.tenors.partition_point(|&x| x <= t);
        let (t0, t1) = (self.tenors[i - 1], self.tenors[i]);
        let (r0, r1) = (self.rates[i - 1], self.rates[i]);
        r0 + (r1 - r0) * (t - t0) / (t1 - t0)
    }

    /// Discount factor `exp(-r(t) * t)`.
    pub fn discount_factor(&self, t: f64) -> f64 {
        (-self.zero_rate(t) * t).exp()
    }
}

/// Unvalidated curve fields, checked by [`Curve::new`] on deserialisation.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CurvePoints {
    name: CurveName,
    tenors: Vec<f64>,
    rates: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<CurvePoints> for Curve {
    type Error = MarketDataError;

    fn try_from(points: CurvePoints) -> Result<Self, Self::Error> {
        Curve::new(points.name, &points.tenors, &points.rates)
    }
}

/// Group of curves built together from one set of quotes.
///
/// # Example
///
/// ```
/// use marketdata_core::market_data::{Curve, CurveGroup, CurveName};
///
/// let mut group = CurveGroup::new("USD-Disc");
/// group.insert(Curve::new("USD-OIS", &[1.0], &[0.03]).unwrap());
/// assert!(group.curve(&CurveName::new("USD-OIS")).is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveGroup {
    name: CurveGroupName,
    curves: BTreeMap<CurveName, Curve>,
}

impl CurveGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<CurveGroupName>) -> Self {
        Self {
            name: name.into(),
            curves: BTreeMap::new(),
        }
    }

    /// The group name.
    #[inline]
    pub fn name(&self) -> &CurveGroupName {
        &self.name
    }

    /// Insert a curve, replacing any curve with the same name.
    pub fn insert(&mut self, curve: Curve) {
        self.curves.insert(curve.name().clone(), curve);
    }

    /// Get a curve by name.
    #[inline]
    pub fn curve(&self, name: &CurveName) -> Option<&Curve> {
        self.curves.get(name)
    }

    /// Iterate over the curves in name order.
    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.curves.values()
    }

    /// Number of curves in the group.
    #[inline]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Check if the group has no curves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
