//! The market data function seam.
//!
//! Each kind of [`MarketDataId`] is built by one [`MarketDataFunction`]. The
//! engine first asks the function what the id depends on, then, once every
//! dependency has a value or a failure, asks it to build the value through a
//! read-only [`MarketDataLookup`].

use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{
    CurveGroup, CurveGroupId, DateTimeSeries, MarketDataId, MarketDataKind, MarketDataValue,
    ObservableId, QuoteId,
};
use marketdata_core::requirements::MarketDataRequirements;
use marketdata_core::types::Date;

use crate::config::MarketDataConfig;

/// Builds market data of one kind.
///
/// Implementations are shared between rayon workers and must be `Send + Sync`.
pub trait MarketDataFunction: Send + Sync {
    /// The kind of id this function builds.
    fn kind(&self) -> MarketDataKind;

    /// The market data needed to build `id`.
    ///
    /// Must be deterministic and must not depend on built data.
    fn requirements(
        &self,
        id: &MarketDataId,
        config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataRequirements>;

    /// Builds the value for `id` from its requirements.
    ///
    /// Only called once every requirement has a value or a recorded failure.
    fn build(
        &self,
        id: &MarketDataId,
        lookup: &dyn MarketDataLookup,
        config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataValue>;
}

/// Read-only view of the market data available to a function.
pub trait MarketDataLookup {
    /// The valuation date of the data being built.
    fn valuation_date(&self) -> Date;

    /// The value for an id, if it has been built or supplied.
    fn value(&self, id: &MarketDataId) -> Option<&MarketDataValue>;

    /// The failure recorded for an id, if building it failed.
    fn failure(&self, id: &MarketDataId) -> Option<&Failure>;

    /// The time series for an observable id, if available.
    fn time_series(&self, id: &ObservableId) -> Option<&DateTimeSeries>;

    /// The value for an id, or a failure explaining why there is none.
    fn require(&self, id: &MarketDataId) -> MarketDataResult<&MarketDataValue> {
        if let Some(value) = self.value(id) {
            return Ok(value);
        }
        match self.failure(id) {
            Some(failure) => Err(Failure::upstream_failed(format!(
                "{} failed: {}",
                id, failure
            ))),
            None => Err(Failure::missing_data(format!("No market data for {}", id))),
        }
    }

    /// The number for a quote id.
    fn require_quote(&self, id: &QuoteId) -> MarketDataResult<f64> {
        let id = MarketDataId::Quote(id.clone());
        let value = self.require(&id)?;
        value.as_quote().ok_or_else(|| {
            Failure::invalid_input(format!(
                "{} holds a {} value, not a quote",
                id,
                value.value_type()
            ))
        })
    }

    /// The curve group for a curve group id.
    fn require_curve_group(&self, id: &CurveGroupId) -> MarketDataResult<&CurveGroup> {
        let id = MarketDataId::CurveGroup(id.clone());
        let value = self.require(&id)?;
        value.as_curve_group().ok_or_else(|| {
            Failure::invalid_input(format!(
                "{} holds a {} value, not a curve group",
                id,
                value.value_type()
            ))
        })
    }

    /// The time series for an observable id, or a missing data failure.
    fn require_time_series(&self, id: &ObservableId) -> MarketDataResult<&DateTimeSeries> {
        self.time_series(id)
            .ok_or_else(|| Failure::missing_data(format!("No time series for {}", id)))
    }
}

/// Failure for an id handed to a function of another kind.
pub(crate) fn wrong_kind(function: MarketDataKind, id: &MarketDataId) -> Failure {
    Failure::invalid_input(format!(
        "{} function cannot build {} of kind {}",
        function,
        id,
        id.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketdata_core::failure::FailureReason;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapLookup {
        values: HashMap<MarketDataId, MarketDataValue>,
        failures: HashMap<MarketDataId, Failure>,
    }

    impl MarketDataLookup for MapLookup {
        fn valuation_date(&self) -> Date {
            Date::from_ymd(2024, 6, 28).unwrap()
        }

        fn value(&self, id: &MarketDataId) -> Option<&MarketDataValue> {
            self.values.get(id)
        }

        fn failure(&self, id: &MarketDataId) -> Option<&Failure> {
            self.failures.get(id)
        }

        fn time_series(&self, _id: &ObservableId) -> Option<&DateTimeSeries> {
            None
        }
    }

    #[test]
    fn test_require_present() {
        let mut lookup = MapLookup::default();
        lookup
            .values
            .insert(QuoteId::of("A").into(), MarketDataValue::Quote(1.5));
        assert_eq!(lookup.require_quote(&QuoteId::of("A")).unwrap(), 1.5);
    }

    #[test]
    fn test_require_missing() {
        let lookup = MapLookup::default();
        let failure = lookup.require_quote(&QuoteId::of("A")).unwrap_err();
        assert_eq!(failure.reason(), FailureReason::MissingData);
        assert_eq!(failure.message(), "No market data for QuoteId(A)");
    }

    #[test]
    fn test_require_failed_dependency() {
        let mut lookup = MapLookup::default();
        lookup
            .failures
            .insert(QuoteId::of("A").into(), Failure::missing_data("no quote"));
        let failure = lookup.require(&QuoteId::of("A").into()).unwrap_err();
        assert_eq!(failure.reason(), FailureReason::UpstreamFailed);
        assert!(failure.message().contains("no quote"));
    }

    #[test]
    fn test_require_time_series_missing() {
        let lookup = MapLookup::default();
        let failure = lookup.require_time_series(&QuoteId::of("A")).unwrap_err();
        assert_eq!(failure.reason(), FailureReason::MissingData);
    }

    #[test]
    fn test_wrong_kind() {
        let failure = wrong_kind(MarketDataKind::Curve, &QuoteId::of("A").into());
        assert_eq!(failure.reason(), FailureReason::InvalidInput);
        assert_eq!(
            failure.message(),
            "Curve function cannot build QuoteId(A) of kind Quote"
        );
    }
}
