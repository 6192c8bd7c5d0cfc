//! # marketdata_core: Market Data Foundation
//!
//! ## Layer 1 (Foundation) Role
//!
//! marketdata_core is the bottom layer of the workspace, providing the
//! value types shared by the build engine and by calculations:
//! - Time and currency types: `Date`, `Currency` (`types`)
//! - Identifiers, keys and values: `MarketDataId`, `MarketDataKey`, `MarketDataValue` (`market_data`)
//! - Requirement sets: `MarketDataRequirements` and its builder (`requirements`)
//! - Typed failures: `Failure`, `FailureReason` (`failure`)
//! - Snapshots: `MarketEnvironment`, `ScenarioMarketEnvironment` (`environment`)
//!
//! ## Usage Examples
//!
//! ```rust
//! use marketdata_core::environment::MarketEnvironment;
//! use marketdata_core::market_data::{CurveGroupId, MarketDataValue, QuoteId};
//! use marketdata_core::requirements::MarketDataRequirements;
//! use marketdata_core::types::Date;
//!
//! // What a calculation needs
//! let reqs = MarketDataRequirements::of([
//!     CurveGroupId::of("USD-Disc").into(),
//!     QuoteId::of("USD-3M").into(),
//! ]);
//! assert_eq!(reqs.value_count(), 2);
//!
//! // What has been built
//! let date = Date::from_ymd(2024, 6, 28).unwrap();
//! let env = MarketEnvironment::builder(date)
//!     .add_value(QuoteId::of("USD-3M"), MarketDataValue::Quote(0.0531))
//!     .unwrap()
//!     .build();
//! assert_eq!(env.value_count(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for ids, keys, values and dates

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod environment;
pub mod failure;
pub mod market_data;
pub mod requirements;
pub mod types;
