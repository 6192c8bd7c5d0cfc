//! Market data requirements and their builder.
//!
//! A [`MarketDataRequirements`] is the set of ids needed to perform a
//! calculation, or to build one item of market data. Requirements from many
//! calculations are unioned with a [`MarketDataRequirementsBuilder`] into one
//! aggregate set for the build engine.

use std::collections::HashSet;

use crate::market_data::{MarketDataId, ObservableId};

/// Immutable set of market data ids needed by a calculation.
///
/// Holds three sets: observable single values, non-observable single values,
/// and time series of observables. Within each set ids are unique; no order
/// is kept.
///
/// # Examples
///
/// ```
/// use marketdata_core::market_data::{CurveGroupId, QuoteId};
/// use marketdata_core::requirements::MarketDataRequirements;
///
/// let reqs = MarketDataRequirements::builder()
///     .add_values([QuoteId::of("USD-3M").into(), CurveGroupId::of("USD-Disc").into()])
///     .add_values([QuoteId::of("USD-3M").into()])
///     .build();
///
/// assert_eq!(reqs.observables().len(), 1);
/// assert_eq!(reqs.non_observables().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketDataRequirements {
    /// Ids of observable single values
    observables: HashSet<ObservableId>,
    /// Ids of non-observable single values
    non_observables: HashSet<MarketDataId>,
    /// Ids of time series of observables
    time_series: HashSet<ObservableId>,
}

impl MarketDataRequirements {
    /// Requirements with no ids.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a new mutable builder.
    pub fn builder() -> MarketDataRequirementsBuilder {
        MarketDataRequirementsBuilder::new()
    }

    /// Requirements for the given single values.
    pub fn of(ids: impl IntoIterator<Item = MarketDataId>) -> Self {
        Self::builder().add_values(ids).build()
    }

    /// Ids of the observable single values required.
    #[inline]
    pub fn observables(&self) -> &HashSet<ObservableId> {
        &self.observables
    }

    /// Ids of the non-observable single values required.
    #[inline]
    pub fn non_observables(&self) -> &HashSet<MarketDataId> {
        &self.non_observables
    }

    /// Ids of the time series required.
    #[inline]
    pub fn time_series(&self) -> &HashSet<ObservableId> {
        &self.time_series
    }

    /// Every single-value id, observable or not.
    pub fn value_ids(&self) -> impl Iterator<Item = MarketDataId> + '_ {
        self.observables
            .iter()
            .cloned()
            .map(MarketDataId::Quote)
            .chain(self.non_observables.iter().cloned())
    }

    /// Returns true if the id is required as a single value.
    pub fn contains_value(&self, id: &MarketDataId) -> bool {
        match id {
            MarketDataId::Quote(quote) => self.observables.contains(quote),
            other => self.non_observables.contains(other),
        }
    }

    /// Number of single-value ids.
    pub fn value_count(&self) -> usize {
        self.observables.len() + self.non_observables.len()
    }

    /// Returns true if nothing is required.
    pub fn is_empty(&self) -> bool {
        self.observables.is_empty() && self.non_observables.is_empty() && self.time_series.is_empty()
    }

    /// The union of these requirements and `other`.
    pub fn union(&self, other: &MarketDataRequirements) -> MarketDataRequirements {
        Self::builder()
            .add_requirements(self)
            .add_requirements(other)
            .build()
    }
}

/// Mutable builder for [`MarketDataRequirements`].
///
/// Adding an id that is already present has no effect.
#[derive(Debug, Clone, Default)]
pub struct MarketDataRequirementsBuilder {
    observables: HashSet<ObservableId>,
    non_observables: HashSet<MarketDataId>,
    time_series: HashSet<ObservableId>,
}

impl MarketDataRequirementsBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds requirements for single values, classified by observability.
    pub fn add_values(&mut self, ids: impl IntoIterator<Item = MarketDataId>) -> &mut Self {
        for id in ids {
            match id {
                MarketDataId::Quote(quote) => {
                    self.observables.insert(quote);
                }
                other => {
                    self.non_observables.insert(other);
                }
            }
        }
        self
    }

    /// Adds a requirement for one single value.
    pub fn add_value(&mut self, id: impl Into<MarketDataId>) -> &mut Self {
        self.add_values(std::iter::once(id.into()))
    }

    /// Adds requirements for time series of observables.
    pub fn add_time_series(&mut self, ids: impl IntoIterator<Item = ObservableId>) -> &mut Self {
        self.time_series.extend(ids);
        self
    }

    /// Adds everything in `requirements`.
    pub fn add_requirements(&mut self, requirements: &MarketDataRequirements) -> &mut Self {
        self.observables
            .extend(requirements.observables.iter().cloned());
        self.non_observables
            .extend(requirements.non_observables.iter().cloned());
        self.time_series
            .extend(requirements.time_series.iter().cloned());
        self
    }

    /// Returns the requirements added so far.
    ///
    /// The builder stays usable; later additions do not affect the result.
    pub fn build(&self) -> MarketDataRequirements {
        MarketDataRequirements {
            observables: self.observables.clone(),
            non_observables: self.non_observables.clone(),
            time_series: self.time_series.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{CurveGroupId, CurveId, MarketDataFeed, QuoteId};

    fn quote(t: &str) -> MarketDataId {
        QuoteId::of(t).into()
    }

    #[test]
    fn test_builder_classifies_by_observability() {
        let reqs = MarketDataRequirements::builder()
            .add_values([quote("A"), CurveGroupId::of("G").into()])
            .add_value(CurveId::new("G", "C", MarketDataFeed::none()))
            .build();
        assert_eq!(reqs.observables().len(), 1);
        assert_eq!(reqs.non_observables().len(), 2);
        assert_eq!(reqs.value_count(), 3);
    }

    #[test]
    fn test_adding_twice_is_idempotent() {
        let once = MarketDataRequirements::of([quote("A")]);
        let twice = MarketDataRequirements::builder()
            .add_value(QuoteId::of("A"))
            .add_value(QuoteId::of("A"))
            .build();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_value_and_time_series_are_separate() {
        let reqs = MarketDataRequirements::builder()
            .add_value(QuoteId::of("A"))
            .add_time_series([QuoteId::of("A")])
            .build();
        assert_eq!(reqs.observables().len(), 1);
        assert_eq!(reqs.time_series().len(), 1);
        assert!(reqs.contains_value(&quote("A")));
    }

    #[test]
    fn test_union() {
        let a = MarketDataRequirements::of([quote("A"), quote("B")]);
        let b = MarketDataRequirements::builder()
            .add_value(QuoteId::of("B"))
            .add_time_series([QuoteId::of("C")])
            .build();
        let union = a.union(&b);
        assert_eq!(union.observables().len(), 2);
        assert_eq!(union.time_series().len(), 1);
        assert_eq!(union, b.union(&a));
    }

    #[test]
    fn test_build_is_a_snapshot() {
        let mut builder = MarketDataRequirements::builder();
        builder.add_value(QuoteId::of("A"));
        let first = builder.build();
        builder.add_value(QuoteId::of("B"));
        assert_eq!(first.value_count(), 1);
        assert_eq!(builder.build().value_count(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(MarketDataRequirements::empty().is_empty());
        assert!(!MarketDataRequirements::of([quote("A")]).is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn tickers() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[A-C]{1,2}", 0..20)
        }

        proptest! {
            #[test]
            fn test_duplicate_additions_collapse(tickers in tickers()) {
                let ids: Vec<MarketDataId> = tickers.iter().map(|t| quote(t)).collect();
                let once = MarketDataRequirements::of(ids.clone());
                let twice = MarketDataRequirements::of(ids.iter().cloned().chain(ids.iter().cloned()));
                prop_assert_eq!(&once, &twice);

                let distinct: HashSet<&String> = tickers.iter().collect();
                prop_assert_eq!(once.observables().len(), distinct.len());
            }

            #[test]
            fn test_union_contains_both(left in tickers(), right in tickers()) {
                let a = MarketDataRequirements::of(left.iter().map(|t| quote(t)));
                let b = MarketDataRequirements::of(right.iter().map(|t| quote(t)));
                let union = a.union(&b);
                for id in a.value_ids().chain(b.value_ids()) {
                    prop_assert!(union.contains_value(&id));
                }
                let distinct: HashSet<&String> = left.iter().chain(right.iter()).collect();
                prop_assert_eq!(union.value_count(), distinct.len());
            }
        }
    }
}
