//! # marketdata_engine: Market Data Build Engine (L2)
//!
//! Builds the market data a set of calculations needs, resolving dependencies
//! between market data and isolating failures per id.
//!
//! This crate provides:
//! - Build functions per market data kind, looked up in a `FunctionRegistry`
//! - Dependency discovery and layering into a `BuildPlan`
//! - Layer-by-layer building with Rayon, sequential below a threshold
//! - Scenario builds from quote perturbations, sharing unaffected data
//! - Rules mapping calculation keys to market data ids
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         marketdata_engine (L2)          │
//! ├─────────────────────────────────────────┤
//! │  calculation/ - keys, aggregation,     │
//! │                 per-calculation views   │
//! │  mapping/     - rules: key -> id       │
//! │  engine/      - build, build_scenarios │
//! │  plan/        - discovery, layering    │
//! │  functions/   - quote, curve group,    │
//! │                 curve, time series      │
//! │  scenario/    - quote perturbations    │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │          marketdata_core (L1)           │
//! │  ids, values, requirements, snapshots  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use marketdata_core::environment::MarketEnvironment;
//! use marketdata_core::market_data::{CurveGroupId, MarketDataId};
//! use marketdata_core::requirements::MarketDataRequirements;
//! use marketdata_core::types::Date;
//! use marketdata_engine::config::{
//!     CurveDefinition, CurveGroupDefinition, CurveNode, MarketDataConfig,
//! };
//! use marketdata_engine::{FunctionRegistry, MarketDataEngine, QuoteStore};
//!
//! let config = MarketDataConfig::new().with_curve_group(CurveGroupDefinition::new(
//!     "USD-Disc",
//!     vec![CurveDefinition::new(
//!         "Discount",
//!         vec![CurveNode::new("USD-3M", 0.25), CurveNode::new("USD-1Y", 1.0)],
//!     )],
//! ));
//! let quotes = QuoteStore::new()
//!     .with_quote("USD-3M", 0.0531)
//!     .with_quote("USD-1Y", 0.0502);
//!
//! let engine = MarketDataEngine::new(FunctionRegistry::with_defaults(quotes));
//! let reqs = MarketDataRequirements::of([MarketDataId::from(CurveGroupId::of("USD-Disc"))]);
//! let date = Date::from_ymd(2024, 6, 28).unwrap();
//!
//! let outcome = engine
//!     .build(&reqs, &MarketEnvironment::empty(date), &config)
//!     .unwrap();
//! assert!(outcome.is_complete());
//! assert!(outcome.environment().curve_group(&CurveGroupId::of("USD-Disc")).is_ok());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod function;
pub mod functions;
pub mod mapping;
pub mod outcome;
pub mod parallel;
pub mod plan;
pub mod registry;
pub mod scenario;

// Re-export commonly used types
pub use calculation::{
    aggregate_requirements, Calculation, CalculationMarketData, CalculationRequirements,
    DefaultCalculationMarketData, SingleCalculationMarketData,
};
pub use config::{EngineConfig, MarketDataConfig, DEFAULT_PARALLEL_THRESHOLD};
pub use engine::MarketDataEngine;
pub use error::EngineError;
pub use function::{MarketDataFunction, MarketDataLookup};
pub use functions::{InMemoryTimeSeriesProvider, QuoteStore, TimeSeriesProvider};
pub use mapping::{MarketDataMappings, MarketDataRule, MarketDataRules};
pub use outcome::{BuildOutcome, FailureRecord, ScenarioBuildOutcome};
pub use plan::BuildPlan;
pub use registry::FunctionRegistry;
pub use scenario::{QuoteFilter, QuotePerturbation, ScenarioDefinition, ShiftType};
