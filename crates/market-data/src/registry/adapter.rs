//! Per-provider call path.
//!
//! Wraps one [`MarketDataProvider`] with the pieces every live source needs:
//! persistent cache lookup, rate limiting, validation and cache write-back.
//! Static providers skip the cache and the limiter.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use super::{RateLimiter, SeriesValidator};
use crate::cache::{CacheKey, CacheStore, TtlClass};
use crate::clock::Clock;
use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, LatestQuote, Lookback, PriceSeries};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

pub struct ProviderAdapter {
    provider: Arc<dyn MarketDataProvider>,
    capabilities: ProviderCapabilities,
    limiter: Option<RateLimiter>,
    cache: Option<CacheStore>,
    validator: SeriesValidator,
    clock: Arc<dyn Clock>,
    enabled: AtomicBool,
}

impl ProviderAdapter {
    /// Live providers get a cache under `<cache_root>/<provider id>` when a
    /// root is given.
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache_root: Option<&Path>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let capabilities = provider.capabilities();
        let limiter = provider
            .rate_limit()
            .map(|limit| RateLimiter::new(provider.id(), limit.min_interval, clock.clone()));
        let cache = match cache_root {
            Some(root) if capabilities.live => Some(CacheStore::new(
                root.join(provider.id().to_lowercase()),
                clock.clone(),
            )),
            _ => None,
        };

        Self {
            provider,
            capabilities,
            limiter,
            cache,
            validator: SeriesValidator::new(),
            clock,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> &'static str {
        self.provider.id()
    }

    pub fn priority(&self) -> u8 {
        self.provider.priority()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    pub fn is_live(&self) -> bool {
        self.capabilities.live
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_ref()
    }

    /// Records currently on disk for this provider.
    pub fn cached_records(&self) -> usize {
        self.cache.as_ref().map_or(0, CacheStore::len)
    }

    /// Daily bars within `lookback` of today, never empty on `Ok`.
    pub async fn series(
        &self,
        ticker: &str,
        lookback: Lookback,
    ) -> Result<PriceSeries, MarketDataError> {
        let window = self.provider.series_window(lookback);
        let key = CacheKey::new(ticker, TtlClass::Historical).with_sub_key(window.cache_tag.clone());

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get::<PriceSeries>(&key)) {
            debug!("'{}' serving {} from cache", self.id(), key);
            return self.within(cached, lookback);
        }

        self.throttle().await;
        let raw = self.provider.fetch_series(ticker, &window).await?;
        let series = self.validator.validate_series(self.id(), ticker, raw)?;
        if series.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        if let Some(cache) = &self.cache {
            cache.put(&key, &series);
        }
        self.within(series, lookback)
    }

    pub async fn latest(&self, ticker: &str) -> Result<LatestQuote, MarketDataError> {
        if !self.capabilities.supports_latest {
            return Err(MarketDataError::not_supported(self.id(), "latest quote"));
        }

        let key = CacheKey::new(ticker, TtlClass::Quote);
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get::<LatestQuote>(&key)) {
            return Ok(cached);
        }

        self.throttle().await;
        let quote = self.provider.fetch_latest(ticker).await?;
        self.validator.validate_quote(self.id(), &quote)?;

        if let Some(cache) = &self.cache {
            cache.put(&key, &quote);
        }
        Ok(quote)
    }

    pub async fn profile(&self, ticker: &str) -> Result<CompanyProfile, MarketDataError> {
        if !self.capabilities.supports_profile {
            return Err(MarketDataError::not_supported(self.id(), "profile"));
        }

        let key = CacheKey::new(ticker, TtlClass::Metadata);
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get::<CompanyProfile>(&key)) {
            return Ok(cached);
        }

        self.throttle().await;
        let profile = self.provider.fetch_profile(ticker).await?;

        if let Some(cache) = &self.cache {
            cache.put(&key, &profile);
        }
        Ok(profile)
    }

    /// Drop cached records for one entity, or all of them.
    pub fn invalidate(&self, entity: Option<&str>) -> usize {
        match (&self.cache, entity) {
            (Some(cache), Some(entity)) => cache.invalidate_entity(entity),
            (Some(cache), None) => cache.invalidate_all(),
            (None, _) => 0,
        }
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
    }

    fn within(&self, series: PriceSeries, lookback: Lookback) -> Result<PriceSeries, MarketDataError> {
        let filtered = series.within(lookback, self.clock.today());
        if filtered.is_empty() {
            debug!(
                "'{}' has no bars inside {} (cutoff {})",
                self.id(),
                lookback,
                lookback.cutoff(self.clock.today())
            );
            return Err(MarketDataError::NoDataForRange);
        }
        Ok(filtered)
    }
}
