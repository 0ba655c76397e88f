//! End-to-end behavior of the engine over scripted providers.
//!
//! Time is driven by a `ManualClock`; persistent caches live in temp dirs.

mod common;

use std::sync::Arc;
use std::time::Duration;

use borsa_market_data::{
    Clock, DataMode, EngineError, FixtureProvider, ManualClock, MarketDataEngine,
    MarketDataProvider, PriceBar, ProviderRegistry, SeriesRange,
};
use chrono::Duration as ChronoDuration;
use common::{clock, companies, engine, ScriptedProvider};
use rust_decimal::Decimal;
use tempfile::TempDir;

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn second_request_is_served_without_calling_the_provider() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live.clone()], None, &clock);

    let first = engine.get_series("ACME", SeriesRange::OneYear).await;
    let second = engine.get_series("acme", SeriesRange::OneYear).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(live.calls(), 1);
}

#[tokio::test]
async fn shorter_ranges_are_sliced_from_the_session_entry() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live.clone()], None, &clock);

    let year = engine.get_series("ACME", SeriesRange::OneYear).await;
    let quarter = engine.get_series("ACME", SeriesRange::ThreeMonths).await;
    let month = engine.get_series("ACME", SeriesRange::OneMonth).await;

    assert_eq!(year.len(), 300);
    assert_eq!(quarter.len(), 91);
    assert_eq!(month.len(), 31);
    assert_eq!(month.last(), year.last());
    assert_eq!(live.calls(), 1);
}

#[tokio::test]
async fn persistent_cache_survives_a_new_session() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));

    let first = engine(&[live.clone()], Some(dir.path()), &clock)
        .get_series("ACME", SeriesRange::OneYear)
        .await;
    let second = engine(&[live.clone()], Some(dir.path()), &clock)
        .get_series("ACME", SeriesRange::OneYear)
        .await;

    assert_eq!(first, second);
    assert_eq!(live.calls(), 1);
}

// =============================================================================
// Fallback
// =============================================================================

#[tokio::test]
async fn failing_primary_falls_back_to_secondary() {
    let clock = clock();
    let primary = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock).failing());
    let secondary = Arc::new(ScriptedProvider::live("SECONDARY", 2, 20, &clock));
    let engine = engine(&[primary.clone(), secondary.clone()], None, &clock);

    let series = engine.get_series("ACME", SeriesRange::OneYear).await;

    assert_eq!(series, secondary.expected_series());
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn fixture_is_the_last_resort() {
    let clock = clock();
    let primary = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock).failing());
    let secondary = Arc::new(ScriptedProvider::live("SECONDARY", 2, 20, &clock).failing());
    let fixture = Arc::new(ScriptedProvider::fixture("STATIC", 30, &clock));
    let engine = engine(
        &[fixture.clone(), secondary.clone(), primary.clone()],
        None,
        &clock,
    );

    let series = engine.get_series("ACME", SeriesRange::OneMonth).await;

    assert_eq!(series.last().unwrap().close, Decimal::from(30));
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
    assert_eq!(fixture.calls(), 1);
}

#[tokio::test]
async fn exhaustion_yields_an_empty_series() {
    let clock = clock();
    let primary = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock).failing());
    let secondary = Arc::new(ScriptedProvider::live("SECONDARY", 2, 20, &clock).failing());
    let engine = engine(&[primary, secondary], None, &clock);

    assert!(engine.get_series("ACME", SeriesRange::OneYear).await.is_empty());
    assert_eq!(engine.status().session_entries, 0);
}

#[tokio::test]
async fn failures_are_not_memoized() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock).failing());
    let engine = engine(&[live.clone()], None, &clock);

    assert!(engine.get_series("ACME", SeriesRange::OneYear).await.is_empty());
    live.set_failing(false);
    assert!(!engine.get_series("ACME", SeriesRange::OneYear).await.is_empty());
    assert_eq!(live.calls(), 2);
}

// =============================================================================
// Persistent cache TTL
// =============================================================================

#[tokio::test]
async fn historical_record_is_fresh_at_sixty_minutes_and_stale_at_sixty_one() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));

    engine(&[live.clone()], Some(dir.path()), &clock)
        .get_series("ACME", SeriesRange::OneYear)
        .await;
    assert_eq!(live.calls(), 1);

    clock.advance(ChronoDuration::minutes(60));
    let cached = engine(&[live.clone()], Some(dir.path()), &clock)
        .get_series("ACME", SeriesRange::OneYear)
        .await;
    assert_eq!(cached, live.expected_series());
    assert_eq!(live.calls(), 1);

    clock.advance(ChronoDuration::minutes(1));
    engine(&[live.clone()], Some(dir.path()), &clock)
        .get_series("ACME", SeriesRange::OneYear)
        .await;
    assert_eq!(live.calls(), 2);
}

#[tokio::test]
async fn stale_record_falls_through_to_next_provider_when_refetch_fails() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let primary = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let fixture = Arc::new(ScriptedProvider::fixture("STATIC", 30, &clock));

    engine(&[primary.clone(), fixture.clone()], Some(dir.path()), &clock)
        .get_series("ACME", SeriesRange::OneYear)
        .await;

    clock.advance(ChronoDuration::minutes(90));
    primary.set_failing(true);
    let series = engine(&[primary.clone(), fixture.clone()], Some(dir.path()), &clock)
        .get_series("ACME", SeriesRange::OneYear)
        .await;

    assert_eq!(series.last().unwrap().close, Decimal::from(30));
    assert_eq!(primary.calls(), 2);
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn targeted_refresh_only_touches_that_entity() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live.clone()], Some(dir.path()), &clock);

    engine.get_series("ACME", SeriesRange::OneYear).await;
    engine.get_series("BETA", SeriesRange::OneYear).await;
    engine.get_series("ACMEX", SeriesRange::OneYear).await;
    assert_eq!(live.calls(), 3);

    let report = engine.refresh(Some("acme"));
    assert_eq!(report.session_entries, 1);
    assert_eq!(report.cache_records, 1);

    engine.get_series("BETA", SeriesRange::OneYear).await;
    engine.get_series("ACMEX", SeriesRange::OneYear).await;
    assert_eq!(live.calls(), 3);

    engine.get_series("ACME", SeriesRange::OneYear).await;
    assert_eq!(live.calls(), 4);
}

#[tokio::test]
async fn global_refresh_clears_everything() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live.clone()], Some(dir.path()), &clock);

    engine.get_series("ACME", SeriesRange::OneYear).await;
    engine.get_series("BETA", SeriesRange::OneYear).await;

    let report = engine.refresh(None);
    assert_eq!(report.session_entries, 2);
    assert_eq!(report.cache_records, 2);
    assert_eq!(engine.status().cache_records, 0);

    engine.get_series("ACME", SeriesRange::OneYear).await;
    engine.get_series("BETA", SeriesRange::OneYear).await;
    assert_eq!(live.calls(), 4);
}

// =============================================================================
// Modes
// =============================================================================

#[tokio::test]
async fn mock_and_real_answers_never_collide() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let fixture = Arc::new(ScriptedProvider::fixture("STATIC", 30, &clock));
    let engine = engine(&[live.clone(), fixture.clone()], None, &clock);

    let real = engine
        .get_series_with_mode("ACME", SeriesRange::OneYear, DataMode::Real)
        .await;
    let mock = engine
        .get_series_with_mode("ACME", SeriesRange::OneYear, DataMode::Mock)
        .await;

    assert_eq!(real.last().unwrap().close, Decimal::from(10));
    assert_eq!(mock.last().unwrap().close, Decimal::from(30));
    assert_eq!(engine.status().session_entries, 2);
    assert_eq!(live.calls(), 1);
    assert_eq!(fixture.calls(), 1);
}

#[tokio::test]
async fn disabling_a_provider_drops_live_session_entries() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let fixture = Arc::new(ScriptedProvider::fixture("STATIC", 30, &clock));
    let engine = engine(&[live.clone(), fixture.clone()], None, &clock);

    assert_eq!(engine.default_mode(), DataMode::Real);
    engine.get_series("ACME", SeriesRange::OneYear).await;
    engine
        .get_series_with_mode("ACME", SeriesRange::OneYear, DataMode::Mock)
        .await;

    assert!(engine.set_provider_enabled("primary", false));
    assert_eq!(engine.status().session_entries, 1);
    assert_eq!(engine.default_mode(), DataMode::Mock);

    let series = engine.get_series("ACME", SeriesRange::OneYear).await;
    assert_eq!(series.last().unwrap().close, Decimal::from(30));
    assert_eq!(live.calls(), 1);
    assert_eq!(fixture.calls(), 1);

    assert!(!engine.set_provider_enabled("UNKNOWN", false));
}

// =============================================================================
// Not-found conditions
// =============================================================================

#[tokio::test]
async fn unknown_entity_is_reported_distinctly() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live.clone()], None, &clock);

    let err = engine
        .require_series("NOPE", SeriesRange::OneYear)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownEntity(_)));
    assert_eq!(live.calls(), 0);
}

#[tokio::test]
async fn known_entity_without_data_is_no_data() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live.clone()], None, &clock);

    let err = engine
        .require_series("missing", SeriesRange::OneMonth)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoData { .. }));
    assert_eq!(err.to_string(), "No data for MISSING (1M)");

    assert!(engine.require_series("ACME", SeriesRange::OneMonth).await.is_ok());
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn live_calls_are_spaced_by_the_minimum_interval() {
    let clock = clock();
    let live = Arc::new(
        ScriptedProvider::live("PRIMARY", 1, 10, &clock).with_min_interval(Duration::from_secs(12)),
    );
    let engine = engine(&[live.clone()], None, &clock);
    let limiter = engine.registry().adapter("PRIMARY").unwrap().limiter().unwrap();

    engine.get_series("ACME", SeriesRange::OneYear).await;
    let first = limiter.last_call().await.unwrap();
    engine.get_series("BETA", SeriesRange::OneYear).await;
    let second = limiter.last_call().await.unwrap();

    assert!(second >= first + ChronoDuration::seconds(12));
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(12)]);
}

#[tokio::test]
async fn cache_hits_do_not_consume_rate_limit_slots() {
    let clock = clock();
    let live = Arc::new(
        ScriptedProvider::live("PRIMARY", 1, 10, &clock).with_min_interval(Duration::from_secs(12)),
    );
    let engine = engine(&[live.clone()], None, &clock);

    for _ in 0..5 {
        engine.get_series("ACME", SeriesRange::OneMonth).await;
    }

    assert!(clock.sleeps().is_empty());
    assert_eq!(live.calls(), 1);
}

// =============================================================================
// Derived data
// =============================================================================

#[tokio::test]
async fn latest_quote_is_derived_when_no_provider_offers_one() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live.clone()], None, &clock);

    let quote = engine.get_latest("ACME").await.unwrap();

    assert_eq!(quote.ticker, "ACME");
    assert_eq!(quote.price, Decimal::from(10));
    assert_eq!(quote.previous_close, Some(Decimal::from(10)));
    assert_eq!(quote.change, Some(Decimal::ZERO));
    assert_eq!(quote.source, "DERIVED");
    assert_eq!(live.calls(), 1);
}

/// Writes `prices/ACME.json` with `days` flat bars at `close`, the newest
/// `age_days` before the clock's today.
fn write_fixture(dir: &TempDir, clock: &ManualClock, close: i64, days: i64, age_days: i64) {
    let newest = clock.today() - ChronoDuration::days(age_days);
    let bars: Vec<PriceBar> = (0..days)
        .map(|i| {
            let price = Decimal::from(close);
            PriceBar::new(newest - ChronoDuration::days(i), price, price, price, price, 500)
        })
        .collect();
    let prices = dir.path().join("prices");
    std::fs::create_dir_all(&prices).unwrap();
    std::fs::write(prices.join("ACME.json"), serde_json::to_string(&bars).unwrap()).unwrap();
}

fn engine_with_fixture(
    live: &Arc<ScriptedProvider>,
    fixtures: &TempDir,
    clock: &Arc<ManualClock>,
) -> MarketDataEngine {
    let providers = vec![
        live.clone() as Arc<dyn MarketDataProvider>,
        Arc::new(FixtureProvider::new(fixtures.path())) as Arc<dyn MarketDataProvider>,
    ];
    let clock: Arc<dyn Clock> = clock.clone();
    let registry = ProviderRegistry::new(providers, None, clock.clone());
    MarketDataEngine::new(registry, companies(), clock)
}

#[tokio::test]
async fn live_latest_comes_from_the_live_series_not_the_fixture() {
    let clock = clock();
    let fixtures = TempDir::new().unwrap();
    write_fixture(&fixtures, &clock, 2, 30, 0);
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine_with_fixture(&live, &fixtures, &clock);
    assert_eq!(engine.default_mode(), DataMode::Real);

    let series = engine.get_series("ACME", SeriesRange::OneYear).await;
    assert_eq!(series.last().unwrap().close, Decimal::from(10));

    let quote = engine.get_latest("ACME").await.unwrap();
    assert_eq!(quote.price, Decimal::from(10));
    assert_eq!(quote.source, "DERIVED");
    assert_eq!(live.calls(), 1);
}

#[tokio::test]
async fn live_latest_derives_from_the_fixture_fallback_series() {
    let clock = clock();
    let fixtures = TempDir::new().unwrap();
    write_fixture(&fixtures, &clock, 2, 30, 0);
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock).failing());
    let engine = engine_with_fixture(&live, &fixtures, &clock);

    let quote = engine.get_latest("ACME").await.unwrap();
    assert_eq!(quote.price, Decimal::from(2));
    assert_eq!(quote.source, "DERIVED");
}

#[tokio::test]
async fn fixture_quote_is_the_last_resort_in_live_mode() {
    let clock = clock();
    let fixtures = TempDir::new().unwrap();
    // Too old for any range, so no series survives the period filter.
    write_fixture(&fixtures, &clock, 2, 30, 800);
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock).failing());
    let engine = engine_with_fixture(&live, &fixtures, &clock);

    assert!(engine.get_series("ACME", SeriesRange::OneYear).await.is_empty());

    let quote = engine.get_latest("ACME").await.unwrap();
    assert_eq!(quote.price, Decimal::from(2));
    assert_eq!(quote.source, "FIXTURE");
}

#[tokio::test]
async fn profile_falls_back_to_the_registry_entry() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live], None, &clock);

    let profile = engine.get_profile("beta").await.unwrap();
    assert_eq!(profile.ticker, "BETA");
    assert_eq!(profile.name.as_deref(), Some("Beta"));
    assert_eq!(profile.source.as_deref(), Some("REGISTRY"));

    assert!(engine.get_profile("NOPE").await.is_none());
}

#[tokio::test]
async fn batch_omits_entities_without_data() {
    let clock = clock();
    let live = Arc::new(ScriptedProvider::live("PRIMARY", 1, 10, &clock));
    let engine = engine(&[live], None, &clock);

    let batch = engine
        .get_series_batch(&["acme", "MISSING", "beta"], SeriesRange::OneMonth)
        .await;

    assert_eq!(batch.keys().cloned().collect::<Vec<_>>(), vec!["ACME", "BETA"]);
}

#[tokio::test]
async fn status_reports_providers_in_priority_order() {
    let clock = clock();
    let fixture = Arc::new(ScriptedProvider::fixture("STATIC", 30, &clock));
    let live = Arc::new(
        ScriptedProvider::live("PRIMARY", 1, 10, &clock).with_min_interval(Duration::from_secs(1)),
    );
    let engine = engine(&[fixture, live], None, &clock);

    let status = engine.status();
    assert_eq!(status.mode, DataMode::Real);
    assert_eq!(status.companies, 3);
    assert_eq!(status.providers[0].id, "PRIMARY");
    assert_eq!(status.providers[0].min_interval_ms, Some(1_000));
    assert!(!status.providers[1].live);
    assert_eq!(status.providers[1].min_interval_ms, None);
}
