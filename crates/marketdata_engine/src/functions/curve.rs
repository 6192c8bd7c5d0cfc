//! Single curves extracted from a built curve group.

use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{MarketDataId, MarketDataKind, MarketDataValue};
use marketdata_core::requirements::MarketDataRequirements;

use crate::config::MarketDataConfig;
use crate::function::{wrong_kind, MarketDataFunction, MarketDataLookup};

/// Builds a curve by taking it from its curve group.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurveFunction;

impl MarketDataFunction for CurveFunction {
    fn kind(&self) -> MarketDataKind {
        MarketDataKind::Curve
    }

    fn requirements(
        &self,
        id: &MarketDataId,
        _config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataRequirements> {
        let MarketDataId::Curve(curve_id) = id else {
            return Err(wrong_kind(self.kind(), id));
        };
        Ok(MarketDataRequirements::of([curve_id.group_id().into()]))
    }

    fn build(
        &self,
        id: &MarketDataId,
        lookup: &dyn MarketDataLookup,
        _config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataValue> {
        let MarketDataId::Curve(curve_id) = id else {
            return Err(wrong_kind(self.kind(), id));
        };
        let group = lookup.require_curve_group(&curve_id.group_id())?;
        group
            .curve(curve_id.curve())
            .cloned()
            .map(MarketDataValue::Curve)
            .ok_or_else(|| {
                Failure::missing_data(format!(
                    "Curve group {} has no curve named {}",
                    curve_id.group(),
                    curve_id.curve()
                ))
            })
    }
}
