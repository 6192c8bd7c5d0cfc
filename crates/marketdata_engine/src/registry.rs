//! Dispatch from id kind to market data function.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use marketdata_core::failure::{Failure, MarketDataResult};
use marketdata_core::market_data::{MarketDataId, MarketDataKind};

use crate::function::MarketDataFunction;
use crate::functions::{
    CurveFunction, CurveGroupFunction, NoMatchingRuleFunction, QuoteFunction, QuoteStore,
};

/// Market data functions keyed by the kind of id they build.
///
/// Every registry contains [`NoMatchingRuleFunction`]. Registering a function
/// for a kind that already has one replaces it.
///
/// # Examples
///
/// ```
/// use marketdata_engine::functions::QuoteStore;
/// use marketdata_engine::registry::FunctionRegistry;
/// use marketdata_core::market_data::MarketDataKind;
///
/// let registry = FunctionRegistry::with_defaults(QuoteStore::new());
/// assert!(registry.get(MarketDataKind::Quote).is_some());
/// assert!(registry.get(MarketDataKind::NoMatchingRule).is_some());
/// ```
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<MarketDataKind, Arc<dyn MarketDataFunction>>,
}

impl FunctionRegistry {
    /// A registry holding only the no-matching-rule function.
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };
        registry.register(NoMatchingRuleFunction);
        registry
    }

    /// A registry with every built-in function, reading quotes from `quotes`.
    pub fn with_defaults(quotes: impl Into<Arc<QuoteStore>>) -> Self {
        let mut registry = Self::new();
        registry
            .register(QuoteFunction::new(quotes))
            .register(CurveGroupFunction)
            .register(CurveFunction);
        registry
    }

    /// Registers a function for the kind it reports.
    pub fn register(&mut self, function: impl MarketDataFunction + 'static) -> &mut Self {
        self.register_arc(Arc::new(function))
    }

    /// Registers a shared function for the kind it reports.
    pub fn register_arc(&mut self, function: Arc<dyn MarketDataFunction>) -> &mut Self {
        self.functions.insert(function.kind(), function);
        self
    }

    /// The function for a kind.
    pub fn get(&self, kind: MarketDataKind) -> Option<&Arc<dyn MarketDataFunction>> {
        self.functions.get(&kind)
    }

    /// The function that builds `id`, or a missing data failure.
    pub fn function_for(&self, id: &MarketDataId) -> MarketDataResult<&dyn MarketDataFunction> {
        self.functions
            .get(&id.kind())
            .map(|function| function.as_ref())
            .ok_or_else(|| {
                Failure::missing_data(format!(
                    "No market data function available to build {} of kind {}",
                    id,
                    id.kind()
                ))
            })
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<MarketDataKind> {
        let mut kinds: Vec<MarketDataKind> = self.functions.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketdata_core::failure::FailureReason;
    use marketdata_core::market_data::{CurveGroupId, MarketDataKey, NoMatchingRuleId, QuoteId};

    #[test]
    fn test_new_registers_sentinel_only() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.kinds(), vec![MarketDataKind::NoMatchingRule]);
        let id = NoMatchingRuleId::new(MarketDataKey::Quote("X".to_string())).into();
        assert!(registry.function_for(&id).is_ok());
    }

    #[test]
    fn test_with_defaults() {
        let registry = FunctionRegistry::with_defaults(QuoteStore::new());
        assert_eq!(
            registry.kinds(),
            vec![
                MarketDataKind::Quote,
                MarketDataKind::CurveGroup,
                MarketDataKind::Curve,
                MarketDataKind::NoMatchingRule,
            ]
        );
    }

    #[test]
    fn test_missing_function() {
        let registry = FunctionRegistry::new();
        let failure = registry
            .function_for(&QuoteId::of("A").into())
            .err()
            .unwrap();
        assert_eq!(failure.reason(), FailureReason::MissingData);
        assert!(failure.message().contains("QuoteId(A)"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FunctionRegistry::new();
        registry.register(CurveGroupFunction).register(CurveGroupFunction);
        assert_eq!(registry.kinds().len(), 2);
        assert_eq!(
            registry
                .function_for(&CurveGroupId::of("G").into())
                .map(|f| f.kind())
                .unwrap(),
            MarketDataKind::CurveGroup
        );
    }

    #[test]
    fn test_debug_lists_kinds() {
        let debug = format!("{:?}", FunctionRegistry::new());
        assert_eq!(debug, "FunctionRegistry { kinds: [NoMatchingRule] }");
    }
}
