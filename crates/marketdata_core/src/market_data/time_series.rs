//! Date-indexed time series of observable values.

use std::collections::BTreeMap;

use crate::types::Date;

/// Time series of observable values keyed by date.
///
/// Points are kept in date order; inserting a point for an existing date
/// replaces it.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::DateTimeSeries;
/// use marketdata_core::types::Date;
///
/// let d1 = Date::from_ymd(2024, 1, 2).unwrap();
/// let d2 = Date::from_ymd(2024, 1, 3).unwrap();
/// let series: DateTimeSeries = [(d2, 0.011), (d1, 0.010)].into_iter().collect();
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.get(d1), Some(0.010));
/// assert_eq!(series.latest(), Some((d2, 0.011)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTimeSeries {
    points: BTreeMap<Date, f64>,
}

impl DateTimeSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point, replacing any value on the same date.
    pub fn insert(&mut self, date: Date, value: f64) {
        self.points.insert(date, value);
    }

    /// The value on a date.
    pub fn get(&self, date: Date) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// The most recent point.
    pub fn latest(&self) -> Option<(Date, f64)> {
        self.points.iter().next_back().map(|(d, v)| (*d, *v))
    }

    /// The latest point on or before `date`.
    pub fn latest_on_or_before(&self, date: Date) -> Option<(Date, f64)> {
        self.points.range(..=date).next_back().map(|(d, v)| (*d, *v))
    }

    /// Iterate over points in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(Date, f64)> for DateTimeSeries {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
