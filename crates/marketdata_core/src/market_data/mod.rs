//! Market data identifiers, keys and values.
//!
//! # Components
//!
//! - [`ids`]: Concrete, feed-bound identifiers ([`MarketDataId`] and its kinds)
//! - [`keys`]: Feed-agnostic keys used by calculations ([`MarketDataKey`])
//! - [`value`]: The [`MarketDataValue`] sum type and [`ValueType`]
//! - [`curves`]: Curve value types ([`Curve`], [`CurveGroup`])
//! - [`time_series`]: Date-indexed series of observables ([`DateTimeSeries`])
//! - [`error`]: Market data error types ([`MarketDataError`])
//!
//! # Example
//!
//! ```
//! use marketdata_core::market_data::{CurveGroupId, MarketDataId, MarketDataValue, ValueType};
//!
//! let id: MarketDataId = CurveGroupId::of("USD-Disc").into();
//! let value = MarketDataValue::Quote(0.01);
//! assert_ne!(id.value_type(), value.value_type());
//! assert_eq!(id.value_type(), ValueType::CurveGroup);
//! ```

pub mod curves;
pub mod error;
pub mod ids;
pub mod keys;
pub mod time_series;
pub mod value;

// Re-export commonly used types
pub use curves::{Curve, CurveGroup};
pub use error::MarketDataError;
pub use ids::{
    CurveGroupId, CurveGroupName, CurveId, CurveName, MarketDataFeed, MarketDataId,
    MarketDataKind, NoMatchingRuleId, ObservableId, QuoteId,
};
pub use keys::MarketDataKey;
pub use time_series::DateTimeSeries;
pub use value::{MarketDataValue, ValueType};
