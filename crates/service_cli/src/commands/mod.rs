//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check;
pub mod run;

use marketdata_engine::{FunctionRegistry, InMemoryTimeSeriesProvider, MarketDataEngine, QuoteStore};

use crate::config::AppConfig;
use crate::data::{load_quotes, load_time_series};
use crate::error::Result;

/// Builds an engine over the quotes and time series named in the configuration.
pub fn engine_for(config: &AppConfig) -> Result<MarketDataEngine> {
    let quotes = match &config.quotes_file {
        Some(path) => load_quotes(path)?,
        None => QuoteStore::new(),
    };
    let time_series = match &config.time_series_file {
        Some(path) => load_time_series(path)?,
        None => InMemoryTimeSeriesProvider::new(),
    };
    tracing::info!(
        quotes = quotes.len(),
        time_series = time_series.len(),
        "Market data inputs loaded"
    );

    Ok(MarketDataEngine::new(FunctionRegistry::with_defaults(quotes))
        .with_time_series_provider(time_series)
        .with_config(config.engine.clone()))
}
