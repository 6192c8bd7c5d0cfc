//! Integration tests for module exports.
//!
//! Verify that the public modules and types are reachable via absolute paths.

use chrono::NaiveDate;

/// Test that the time and currency types are accessible.
#[test]
fn test_types_module_exports() {
    use marketdata_core::types::{Currency, CurrencyError, Date, DateError};

    let date = Date::from(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
    assert_eq!(date.year(), 2024);
    assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
    assert!(matches!(
        "XXX".parse::<Currency>(),
        Err(CurrencyError::UnknownCurrency(_))
    ));
    assert!(matches!(
        Date::from_ymd(2024, 2, 30),
        Err(DateError::InvalidDate { .. })
    ));
}

/// Test that ids, keys and values are accessible via the market_data module.
#[test]
fn test_market_data_module_exports() {
    use marketdata_core::market_data::{
        Curve, CurveGroup, CurveGroupId, CurveId, MarketDataFeed, MarketDataId, MarketDataKey,
        MarketDataKind, MarketDataValue, NoMatchingRuleId, QuoteId, ValueType,
    };

    let curve = Curve::new("USD-Disc", &[0.25, 1.0], &[0.0531, 0.0512]).unwrap();
    let mut group = CurveGroup::new("USD-Disc");
    group.insert(curve);
    let value = MarketDataValue::CurveGroup(group);
    assert_eq!(value.value_type(), ValueType::CurveGroup);

    let ids: Vec<MarketDataId> = vec![
        QuoteId::of("USD-3M").into(),
        CurveGroupId::of("USD-Disc").into(),
        CurveId::new("USD-Disc", "USD-Disc", MarketDataFeed::none()).into(),
        NoMatchingRuleId::new(MarketDataKey::Quote("X".to_string())).into(),
    ];
    let kinds: Vec<MarketDataKind> = ids.iter().map(|id| id.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            MarketDataKind::Quote,
            MarketDataKind::CurveGroup,
            MarketDataKind::Curve,
            MarketDataKind::NoMatchingRule,
        ]
    );
}

/// Test that requirements, failures and environments are accessible.
#[test]
fn test_engine_facing_exports() {
    use marketdata_core::environment::{MarketEnvironment, ScenarioMarketEnvironment};
    use marketdata_core::failure::{Failure, FailureReason, MarketDataResult};
    use marketdata_core::market_data::{MarketDataValue, QuoteId};
    use marketdata_core::requirements::MarketDataRequirements;
    use marketdata_core::types::Date;

    let date = Date::from_ymd(2024, 6, 28).unwrap();
    let reqs = MarketDataRequirements::of([QuoteId::of("A").into()]);
    assert_eq!(reqs.value_count(), 1);

    let env = MarketEnvironment::builder(date)
        .add_value(QuoteId::of("A"), MarketDataValue::Quote(1.0))
        .unwrap()
        .build();
    assert_eq!(env.quote(&QuoteId::of("A")).unwrap(), 1.0);

    let scenarios = ScenarioMarketEnvironment::builder(date, 2).unwrap().build();
    assert_eq!(scenarios.scenario_count(), 2);

    let result: MarketDataResult<f64> = Err(Failure::missing_data("no quote"));
    assert_eq!(result.unwrap_err().reason(), FailureReason::MissingData);
}
