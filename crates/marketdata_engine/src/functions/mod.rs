//! Built-in market data functions.
//!
//! - [`QuoteFunction`]: quotes read from a [`QuoteStore`]
//! - [`CurveGroupFunction`]: curve groups built from configured node quotes
//! - [`CurveFunction`]: single curves taken from their group
//! - [`NoMatchingRuleFunction`]: failure for keys no rule could map
//! - [`TimeSeriesProvider`]: time series resolved before the layered build

mod curve;
mod curve_group;
mod no_matching_rule;
mod quote;
mod time_series;

pub use curve::CurveFunction;
pub use curve_group::CurveGroupFunction;
pub use no_matching_rule::NoMatchingRuleFunction;
pub use quote::{QuoteFunction, QuoteStore};
pub use time_series::{InMemoryTimeSeriesProvider, TimeSeriesProvider};
