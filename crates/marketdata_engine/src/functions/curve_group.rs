//! Curve groups built from the node quotes in their definition.
//!
//! Each node quote is used directly as the zero rate at its tenor; no
//! bootstrap is performed.

use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{
    Curve, CurveGroup, CurveGroupId, MarketDataId, MarketDataKind, MarketDataValue, QuoteId,
};
use marketdata_core::requirements::MarketDataRequirements;

use crate::config::{CurveGroupDefinition, MarketDataConfig};
use crate::function::{wrong_kind, MarketDataFunction, MarketDataLookup};

/// Builds a [`CurveGroup`] for a [`CurveGroupId`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CurveGroupFunction;

impl CurveGroupFunction {
    fn definition<'a>(
        id: &CurveGroupId,
        config: &'a MarketDataConfig,
    ) -> MarketDataResult<&'a CurveGroupDefinition> {
        config.curve_group(id.name()).ok_or_else(|| {
            Failure::missing_data(format!("No curve group definition found for {}", id.name()))
        })
    }
}

impl MarketDataFunction for CurveGroupFunction {
    fn kind(&self) -> MarketDataKind {
        MarketDataKind::CurveGroup
    }

    fn requirements(
        &self,
        id: &MarketDataId,
        config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataRequirements> {
        let MarketDataId::CurveGroup(group_id) = id else {
            return Err(wrong_kind(self.kind(), id));
        };
        let definition = Self::definition(group_id, config)?;
        let quotes = definition
            .tickers()
            .map(|ticker| MarketDataId::from(QuoteId::new(ticker, group_id.feed().clone())));
        Ok(MarketDataRequirements::of(quotes))
    }

    fn build(
        &self,
        id: &MarketDataId,
        lookup: &dyn MarketDataLookup,
        config: &MarketDataConfig,
    ) -> MarketDataResult<MarketDataValue> {
        let MarketDataId::CurveGroup(group_id) = id else {
            return Err(wrong_kind(self.kind(), id));
        };
        let definition = Self::definition(group_id, config)?;

        let mut group = CurveGroup::new(definition.name.clone());
        for curve in &definition.curves {
            let mut points = Vec::with_capacity(curve.nodes.len());
            for node in &curve.nodes {
                let quote = QuoteId::new(node.ticker.as_str(), group_id.feed().clone());
                let value = lookup.require_quote(&quote)?;
                if !value.is_finite() {
                    return Err(Failure::invalid_input(format!(
                        "Quote {} for curve {} is not finite: {}",
                        quote, curve.name, value
                    )));
                }
                points.push((node.tenor, value));
            }
            points.sort_by(|a, b| a.0.total_cmp(&b.0));

            let tenors: Vec<f64> = points.iter().map(|p| p.0).collect();
            let rates: Vec<f64> = points.iter().map(|p| p.1).collect();
            let built = Curve::new(curve.name.clone(), &tenors, &rates).map_err(|e| {
                Failure::calculation_failed(format!(
                    "Curve {} in group {} could not be built: {}",
                    curve.name, definition.name, e
                ))
            })?;
            group.insert(built);
        }
        tracing::debug!(group = %definition.name, curves = group.len(), "Built curve group");
        Ok(MarketDataValue::CurveGroup(group))
    }
}
