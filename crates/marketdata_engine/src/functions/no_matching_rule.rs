//! Placeholder function for keys no market data rule could map.

use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{MarketDataId, MarketDataKind, MarketDataValue};
use marketdata_core::requirements::MarketDataRequirements;

use crate::config::MarketDataConfig;
use crate::function::{wrong_kind, MarketDataFunction, MarketDataLookup};

/// Fails every build with a message naming the unmapped key.
///
/// Registered in every [`FunctionRegistry`](crate::registry::FunctionRegistry),
/// so unmapped keys turn into readable failures instead of missing functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMatchingRuleFunction;

impl MarketDataFunction for NoMatchingRuleFunction {
    fn kind(&self) -> MarketDataKind {
        MarketDataKind::NoMatchingRule
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
        match id {
            MarketDataId::NoMatchingRule(unmapped) => Err(Failure::missing_data(format!(
                "No market data rules were available to build the market data for key {}",
                unmapped.key()
            ))),
            other => Err(wrong_kind(self.kind(), other)),
        }
    }
}
