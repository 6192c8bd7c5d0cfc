//! Market data for a single valuation date.

use std::collections::HashMap;

use crate::market_data::{
    CurveGroup, CurveGroupId, DateTimeSeries, MarketDataError, MarketDataId, MarketDataValue,
    ObservableId, QuoteId,
};
use crate::types::Date;

/// Checks that `value` has the type declared by `id`.
pub(crate) fn check_value_type(
    id: &MarketDataId,
    value: &MarketDataValue,
) -> Result<(), MarketDataError> {
    let expected = id.value_type();
    let actual = value.value_type();
    if expected == actual {
        Ok(())
    } else {
        Err(MarketDataError::TypeMismatch {
            id: id.clone(),
            expected,
            actual,
        })
    }
}

/// Immutable snapshot of market data for one valuation date.
///
/// Every value is guaranteed to have the type its id declares; this is
/// checked by [`MarketEnvironmentBuilder`] on insertion.
///
/// # Examples
///
/// ```
/// use marketdata_core::environment::MarketEnvironment;
/// use marketdata_core::market_data::{MarketDataValue, QuoteId};
/// use marketdata_core::types::Date;
///
/// let date = Date::from_ymd(2024, 6, 28).unwrap();
/// let env = MarketEnvironment::builder(date)
///     .add_value(QuoteId::of("USD-3M"), MarketDataValue::Quote(0.0531))
///     .unwrap()
///     .build();
///
/// assert_eq!(env.quote(&QuoteId::of("USD-3M")).unwrap(), 0.0531);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEnvironment {
    valuation_date: Date,
    values: HashMap<MarketDataId, MarketDataValue>,
    time_series: HashMap<ObservableId, DateTimeSeries>,
}

impl MarketEnvironment {
    /// Returns a builder with a valuation date and no data.
    pub fn builder(valuation_date: Date) -> MarketEnvironmentBuilder {
        MarketEnvironmentBuilder::new(valuation_date)
    }

    /// An environment with no data.
    pub fn empty(valuation_date: Date) -> Self {
        Self {
            valuation_date,
            values: HashMap::new(),
            time_series: HashMap::new(),
        }
    }

    /// Returns a builder pre-populated with this environment's data.
    pub fn to_builder(&self) -> MarketEnvironmentBuilder {
        MarketEnvironmentBuilder {
            valuation_date: self.valuation_date,
            values: self.values.clone(),
            time_series: self.time_series.clone(),
        }
    }

    /// The valuation date of the market data.
    #[inline]
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// The value for an id.
    pub fn value(&self, id: &MarketDataId) -> Result<&MarketDataValue, MarketDataError> {
        self.values
            .get(id)
            .ok_or_else(|| MarketDataError::NotFound { id: id.clone() })
    }

    /// The number for a quote id.
    pub fn quote(&self, id: &QuoteId) -> Result<f64, MarketDataError> {
        let id = MarketDataId::Quote(id.clone());
        let value = self.value(&id)?;
        value
            .as_quote()
            .ok_or_else(|| MarketDataError::TypeMismatch {
                expected: id.value_type(),
                actual: value.value_type(),
                id,
            })
    }

    /// The curve group for a curve group id.
    pub fn curve_group(&self, id: &CurveGroupId) -> Result<&CurveGroup, MarketDataError> {
        let id = MarketDataId::CurveGroup(id.clone());
        let value = self.value(&id)?;
        value
            .as_curve_group()
            .ok_or_else(|| MarketDataError::TypeMismatch {
                expected: id.value_type(),
                actual: value.value_type(),
                id,
            })
    }

    /// Returns true if there is a value for the id.
    #[inline]
    pub fn contains_value(&self, id: &MarketDataId) -> bool {
        self.values.contains_key(id)
    }

    /// The time series for an observable id.
    pub fn time_series(&self, id: &ObservableId) -> Result<&DateTimeSeries, MarketDataError> {
        self.time_series
            .get(id)
            .ok_or_else(|| MarketDataError::TimeSeriesNotFound { id: id.clone() })
    }

    /// Returns true if there is a time series for the id.
    #[inline]
    pub fn contains_time_series(&self, id: &ObservableId) -> bool {
        self.time_series.contains_key(id)
    }

    /// Iterate over all single values.
    pub fn values(&self) -> impl Iterator<Item = (&MarketDataId, &MarketDataValue)> {
        self.values.iter()
    }

    /// Iterate over all time series.
    pub fn all_time_series(&self) -> impl Iterator<Item = (&ObservableId, &DateTimeSeries)> {
        self.time_series.iter()
    }

    /// Number of single values.
    #[inline]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Number of time series.
    #[inline]
    pub fn time_series_count(&self) -> usize {
        self.time_series.len()
    }
}

/// Mutable builder for [`MarketEnvironment`].
///
/// Adding data for an id that already has data replaces it. The builder can
/// be used after [`build`](Self::build); snapshots built earlier are
/// unaffected.
#[derive(Debug, Clone)]
pub struct MarketEnvironmentBuilder {
    valuation_date: Date,
    values: HashMap<MarketDataId, MarketDataValue>,
    time_series: HashMap<ObservableId, DateTimeSeries>,
}

impl MarketEnvironmentBuilder {
    /// Creates a builder with a valuation date but no market data.
    pub fn new(valuation_date: Date) -> Self {
        Self {
            valuation_date,
            values: HashMap::new(),
            time_series: HashMap::new(),
        }
    }

    /// Adds a single value, replacing any existing value for the id.
    ///
    /// # Errors
    ///
    /// `MarketDataError::TypeMismatch` if the value does not have the type the id declares.
    pub fn add_value(
        &mut self,
        id: impl Into<MarketDataId>,
        value: MarketDataValue,
    ) -> Result<&mut Self, MarketDataError> {
        let id = id.into();
        check_value_type(&id, &value)?;
        self.values.insert(id, value);
        Ok(self)
    }

    /// Adds several values, replacing existing values for the same ids.
    ///
    /// Stops at the first value of the wrong type.
    pub fn add_all_values(
        &mut self,
        values: impl IntoIterator<Item = (MarketDataId, MarketDataValue)>,
    ) -> Result<&mut Self, MarketDataError> {
        for (id, value) in values {
            self.add_value(id, value)?;
        }
        Ok(self)
    }

    /// Adds a time series, replacing any existing series for the id.
    pub fn add_time_series(&mut self, id: ObservableId, series: DateTimeSeries) -> &mut Self {
        self.time_series.insert(id, series);
        self
    }

    /// Adds several time series, replacing existing series for the same ids.
    pub fn add_all_time_series(
        &mut self,
        series: impl IntoIterator<Item = (ObservableId, DateTimeSeries)>,
    ) -> &mut Self {
        self.time_series.extend(series);
        self
    }

    /// Replaces the valuation date.
    pub fn valuation_date(&mut self, valuation_date: Date) -> &mut Self {
        self.valuation_date = valuation_date;
        self
    }

    /// Builds a snapshot of the data added so far.
    pub fn build(&self) -> MarketEnvironment {
        MarketEnvironment {
            valuation_date: self.valuation_date,
            values: self.values.clone(),
            time_series: self.time_series.clone(),
        }
    }
}
