//! CSV loaders for quotes and time series.
//!
//! Quotes: `ticker,value[,feed]`. Time series: `ticker,date,value[,feed]`,
//! one row per point. Both files need a header row.

use std::path::Path;

use marketdata_core::market_data::{DateTimeSeries, MarketDataFeed, QuoteId};
use marketdata_core::types::Date;
use marketdata_engine::{InMemoryTimeSeriesProvider, QuoteStore};
use serde::Deserialize;

use crate::error::{CliError, Result};

#[derive(Debug, Deserialize)]
struct QuoteRecord {
    ticker: String,
    value: f64,
    #[serde(default)]
    feed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesRecord {
    ticker: String,
    date: Date,
    value: f64,
    #[serde(default)]
    feed: Option<String>,
}

fn quote_id(ticker: String, feed: Option<String>) -> QuoteId {
    let feed = feed
        .filter(|f| !f.is_empty())
        .map(MarketDataFeed::new)
        .unwrap_or_default();
    QuoteId::new(ticker, feed)
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> CliError + '_ {
    move |source| CliError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Loads quotes. A later row for the same quote replaces an earlier one.
pub fn load_quotes(path: &Path) -> Result<QuoteStore> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error(path))?;

    let mut store = QuoteStore::new();
    for record in reader.deserialize::<QuoteRecord>() {
        let record = record.map_err(csv_error(path))?;
        store.insert(quote_id(record.ticker, record.feed), record.value);
    }
    tracing::debug!(path = %path.display(), quotes = store.len(), "Loaded quotes");
    Ok(store)
}

/// Loads time series points, grouped by quote.
pub fn load_time_series(path: &Path) -> Result<InMemoryTimeSeriesProvider> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error(path))?;

    let mut series: std::collections::HashMap<QuoteId, DateTimeSeries> =
        std::collections::HashMap::new();
    for record in reader.deserialize::<TimeSeriesRecord>() {
        let record = record.map_err(csv_error(path))?;
        series
            .entry(quote_id(record.ticker, record.feed))
            .or_default()
            .insert(record.date, record.value);
    }

    let mut provider = InMemoryTimeSeriesProvider::new();
    for (id, points) in series {
        provider.insert(id, points);
    }
    tracing::debug!(path = %path.display(), series = provider.len(), "Loaded time series");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_quotes() {
        let file = write_csv("ticker,value,feed\nUSD-3M,0.0531,\nUSD-1Y, 0.0502 ,BBG\nUSD-3M,0.0533,\n");
        let store = load_quotes(file.path()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&QuoteId::of("USD-3M")), Some(0.0533));
        assert_eq!(
            store.get(&QuoteId::new("USD-1Y", MarketDataFeed::new("BBG"))),
            Some(0.0502)
        );
        assert_eq!(store.get(&QuoteId::of("USD-1Y")), None);
    }

    #[test]
    fn test_load_quotes_without_feed_column() {
        let file = write_csv("ticker,value\nEUR-3M,0.037\n");
        let store = load_quotes(file.path()).unwrap();
        assert_eq!(store.get(&QuoteId::of("EUR-3M")), Some(0.037));
    }

    #[test]
    fn test_bad_quote_value() {
        let file = write_csv("ticker,value\nEUR-3M,abc\n");
        assert!(matches!(
            load_quotes(file.path()),
            Err(CliError::Csv { .. })
        ));
    }

    #[test]
    fn test_load_time_series() {
        let file = write_csv(
            "ticker,date,value\nSOFR,2024-06-27,0.0533\nSOFR,2024-06-28,0.0531\nESTR,2024-06-28,0.0366\n",
        );
        let provider = load_time_series(file.path()).unwrap();
        assert_eq!(provider.len(), 2);

        use marketdata_engine::TimeSeriesProvider;
        let sofr = provider.time_series(&QuoteId::of("SOFR")).unwrap();
        assert_eq!(sofr.len(), 2);
        assert_eq!(sofr.latest(), Some((Date::from_ymd(2024, 6, 28).unwrap(), 0.0531)));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_time_series(Path::new("/nonexistent/fixings.csv")).is_err());
    }
}
