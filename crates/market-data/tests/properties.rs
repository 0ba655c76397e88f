//! Property-based tests for the canonical series types.
//!
//! These tests verify invariants that must hold for any input, using the
//! `proptest` crate for random test case generation.

use borsa_market_data::{Lookback, PriceBar, PriceSeries, SeriesValidator};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..2_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Bars whose high and low bracket open and close.
fn arb_consistent_bar() -> impl Strategy<Value = PriceBar> {
    (
        arb_date(),
        arb_price(),
        arb_price(),
        0i64..10_000,
        0i64..10_000,
        0u64..10_000_000,
    )
        .prop_map(|(date, open, close, up, down, volume)| {
            let high = open.max(close) + Decimal::new(up, 2);
            let low = (open.min(close) - Decimal::new(down, 2)).max(Decimal::ZERO);
            PriceBar::new(date, open, high, low, close, volume)
        })
}

fn arb_lookback() -> impl Strategy<Value = Lookback> {
    prop_oneof![
        Just(Lookback::OneMonth),
        Just(Lookback::ThreeMonths),
        Just(Lookback::SixMonths),
        Just(Lookback::OneYear),
        Just(Lookback::TwoYears),
        Just(Lookback::FiveYears),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn bracketing_bars_are_consistent(bar in arb_consistent_bar()) {
        prop_assert!(bar.is_consistent());
        prop_assert!(bar.low <= bar.open.min(bar.close));
        prop_assert!(bar.high >= bar.open.max(bar.close));
    }

    #[test]
    fn validator_keeps_consistent_bars(bars in prop::collection::vec(arb_consistent_bar(), 1..50)) {
        let series = PriceSeries::new(bars);
        let expected = series.len();

        let validated = SeriesValidator::new()
            .validate_series("TEST", "ACME", series)
            .unwrap();

        prop_assert_eq!(validated.len(), expected);
    }

    #[test]
    fn validator_never_returns_inconsistent_bars(
        bars in prop::collection::vec(arb_consistent_bar(), 1..50),
        broken in prop::collection::vec(any::<bool>(), 50),
    ) {
        // Swap high and low on some bars to break the invariant.
        let bars: Vec<PriceBar> = bars
            .into_iter()
            .zip(broken)
            .map(|(bar, broken)| {
                if broken && bar.high > bar.low {
                    PriceBar { high: bar.low, low: bar.high, ..bar }
                } else {
                    bar
                }
            })
            .collect();

        if let Ok(validated) = SeriesValidator::new().validate_series("TEST", "ACME", PriceSeries::new(bars)) {
            prop_assert!(validated.bars().iter().all(PriceBar::is_consistent));
        }
    }

    #[test]
    fn series_dates_are_strictly_ascending(bars in prop::collection::vec(arb_consistent_bar(), 0..100)) {
        let series = PriceSeries::new(bars);

        prop_assert!(series.bars().windows(2).all(|w| w[0].date < w[1].date));
        let descending = series.descending();
        prop_assert!(descending.windows(2).all(|w| w[0].date > w[1].date));
    }

    #[test]
    fn within_keeps_exactly_the_bars_after_the_cutoff(
        bars in prop::collection::vec(arb_consistent_bar(), 0..100),
        lookback in arb_lookback(),
        today in arb_date(),
    ) {
        let series = PriceSeries::new(bars);
        let cutoff = today - Duration::days(lookback.days());

        let filtered = series.within(lookback, today);

        prop_assert!(filtered.bars().iter().all(|b| b.date >= cutoff));
        let expected = series.bars().iter().filter(|b| b.date >= cutoff).count();
        prop_assert_eq!(filtered.len(), expected);
    }
}
