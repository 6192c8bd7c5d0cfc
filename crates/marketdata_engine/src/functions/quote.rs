//! Observable quotes from an in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{MarketDataId, MarketDataKind, MarketDataValue, QuoteId};
use marketdata_core::requirements::MarketDataRequirements;

use crate::config::MarketDataConfig;
use crate::function::{wrong_kind, MarketDataFunction, MarketDataLookup};

/// Quote values keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuoteStore {
    quotes: HashMap<QuoteId, f64>,
}

impl QuoteStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quote, replacing any existing value for the id.
    pub fn insert(&mut self, id: QuoteId, value: f64) -> &mut Self {
        self.quotes.insert(id, value);
        self
    }

    /// Adds a quote on the default feed.
    pub fn with_quote(mut self, ticker: impl Into<String>, value: f64) -> Self {
        self.quotes.insert(QuoteId::of(ticker), value);
        self
    }

    /// The value of a quote.
    pub fn get(&self, id: &QuoteId) -> Option<f64> {
        self.quotes.get(id).copied()
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Returns true if the store holds no quotes.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl FromIterator<(QuoteId, f64)> for QuoteStore {
    fn from_iter<I: IntoIterator<Item = (QuoteId, f64)>>(iter: I) -> Self {
        Self {
            quotes: iter.into_iter().collect(),
        }
    }
}

/// Builds quotes by reading them from a [`QuoteStore`].
#[derive(Clone, Debug, Default)]
pub struct QuoteFunction {
    store: Arc<QuoteStore>,
}

impl QuoteFunction {
    /// Creates a function reading from `store`.
    pub fn new(store: impl Into<Arc<QuoteStore>>) -> Self {
        Self {
            store: store.into(),
        }
    }

    /// The store quotes are read from.
    pub fn store(&self) -> &QuoteStore {
        &self.store
    }
}

impl MarketDataFunction for QuoteFunction {
    fn kind(&self) -> MarketDataKind {
        MarketDataKind::Quote
    }

    fn requirements(
        &self,
        _id: &MarketDataId,
        _config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataRequirements> {
        Ok(MarketDataRequirements::empty())
    }

    fn build(
        &self,
        id: &MarketDataId,
        _lookup: &dyn MarketDataLookup,
        _config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataValue> {
        let MarketDataId::Quote(quote) = id else {
            return Err(wrong_kind(self.kind(), id));
        };
        self.store
            .get(quote)
            .map(MarketDataValue::Quote)
            .ok_or_else(|| Failure::missing_data(format!("No quote available for {}", quote)))
    }
}
