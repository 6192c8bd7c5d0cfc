//! Built market data snapshots.
//!
//! - [`MarketEnvironment`]: market data for one valuation date
//! - [`ScenarioMarketEnvironment`]: market data for N scenarios, with global
//!   values shared by all of them
//!
//! Both are produced by mutable builders and are immutable once built, so a
//! snapshot can be shared read-only between threads.

mod market;
mod scenario;

pub use market::{MarketEnvironment, MarketEnvironmentBuilder};
pub use scenario::{ScenarioMarketEnvironment, ScenarioMarketEnvironmentBuilder};
