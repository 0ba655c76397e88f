//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use borsa_market_data::{
    Clock, Company, CompanyRegistry, ManualClock, MarketDataEngine, MarketDataError,
    MarketDataProvider, PriceBar, PriceSeries, ProviderCapabilities, ProviderRegistry, RateLimit,
    SeriesWindow,
};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use rust_decimal::Decimal;

/// Monday 2024-06-03, midday UTC.
pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap(),
    ))
}

/// Provider whose answers and failures are scripted by the test.
///
/// Every bar it returns has `close` equal to its configured price, so tests
/// can tell which provider produced a series.
pub struct ScriptedProvider {
    id: &'static str,
    priority: u8,
    live: bool,
    price: Decimal,
    days: i64,
    min_interval: Option<Duration>,
    clock: Arc<ManualClock>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn live(id: &'static str, priority: u8, price: i64, clock: &Arc<ManualClock>) -> Self {
        Self {
            id,
            priority,
            live: true,
            price: Decimal::from(price),
            days: 300,
            min_interval: None,
            clock: clock.clone(),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixture(id: &'static str, price: i64, clock: &Arc<ManualClock>) -> Self {
        Self {
            live: false,
            ..Self::live(id, 100, price, clock)
        }
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = Some(min_interval);
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// What a successful fetch returns, as seen on the clock's current day.
    pub fn expected_series(&self) -> PriceSeries {
        let today = self.clock.today();
        let bars = (0..self.days)
            .map(|i| {
                PriceBar::new(
                    today - ChronoDuration::days(i),
                    self.price,
                    self.price,
                    self.price,
                    self.price,
                    1_000 + i as u64,
                )
            })
            .collect();
        PriceSeries::new(bars)
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            live: self.live,
            supports_latest: false,
            supports_profile: false,
        }
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        self.min_interval.map(RateLimit::every)
    }

    async fn fetch_series(
        &self,
        ticker: &str,
        _window: &SeriesWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(MarketDataError::RateLimited {
                provider: self.id.to_string(),
            });
        }
        if ticker == "MISSING" {
            return Err(MarketDataError::SymbolNotFound(ticker.to_string()));
        }
        Ok(self.expected_series())
    }
}

pub fn companies() -> CompanyRegistry {
    let company = |name: &str, ticker: &str, sector: &str| Company {
        name: name.to_string(),
        ticker: ticker.to_string(),
        exchange: "BME".to_string(),
        sector: sector.to_string(),
        hq_province: "Madrid".to_string(),
    };
    CompanyRegistry::from_companies(vec![
        company("Acme", "ACME", "Industria"),
        company("Beta", "BETA", "Banca"),
        company("Missing", "MISSING", "Salud"),
    ])
}

pub fn engine(
    providers: &[Arc<ScriptedProvider>],
    cache_root: Option<&Path>,
    clock: &Arc<ManualClock>,
) -> MarketDataEngine {
    let providers = providers
        .iter()
        .map(|p| p.clone() as Arc<dyn MarketDataProvider>)
        .collect();
    let clock: Arc<dyn Clock> = clock.clone();
    let registry = ProviderRegistry::new(providers, cache_root, clock.clone());
    MarketDataEngine::new(registry, companies(), clock)
}
