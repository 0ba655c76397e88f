//! Provider registry for orchestrating market data providers.
//!
//! The registry manages multiple providers, handling:
//! - Priority ordering (lower value first)
//! - Filtering by runtime enabled flag and data mode
//! - Sequential fallback: first success wins, failures are swallowed
//! - Per-provider caching, rate limiting and validation (via the adapter)

use std::borrow::Cow;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use super::{FetchDiagnostics, ProviderAdapter, SkipReason};
use crate::clock::Clock;
use crate::errors::{FailureKind, MarketDataError};
use crate::models::{CompanyProfile, DataMode, LatestQuote, Lookback, PriceSeries, ProviderId};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

/// Which adapters a request may walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Candidates {
    All,
    LiveOnly,
    StaticOnly,
}

impl Candidates {
    /// `Mock` keeps to static providers; `Real` may fall back to them.
    fn for_mode(mode: DataMode) -> Self {
        match mode {
            DataMode::Real => Candidates::All,
            DataMode::Mock => Candidates::StaticOnly,
        }
    }

    fn admits(self, adapter: &ProviderAdapter) -> bool {
        match self {
            Candidates::All => true,
            Candidates::LiveOnly => adapter.is_live(),
            Candidates::StaticOnly => !adapter.is_live(),
        }
    }
}

/// Provider registry for orchestrating market data fetching.
pub struct ProviderRegistry {
    adapters: Vec<ProviderAdapter>,
}

impl ProviderRegistry {
    /// Create a new provider registry.
    ///
    /// Providers are ordered by priority once, here. Live providers cache
    /// under `cache_root` when it is given.
    pub fn new(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        cache_root: Option<&Path>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut adapters: Vec<ProviderAdapter> = providers
            .into_iter()
            .map(|provider| ProviderAdapter::new(provider, cache_root, clock.clone()))
            .collect();
        adapters.sort_by_key(|adapter| adapter.priority());

        Self { adapters }
    }

    /// Registered providers in priority order.
    pub fn adapters(&self) -> &[ProviderAdapter] {
        &self.adapters
    }

    pub fn adapter(&self, provider_id: &str) -> Option<&ProviderAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.id().eq_ignore_ascii_case(provider_id))
    }

    /// Switch a provider on or off. Returns `false` for an unknown id.
    pub fn set_enabled(&self, provider_id: &str, enabled: bool) -> bool {
        match self.adapter(provider_id) {
            Some(adapter) => {
                adapter.set_enabled(enabled);
                info!(
                    "Provider '{}' {}",
                    adapter.id(),
                    if enabled { "enabled" } else { "disabled" }
                );
                true
            }
            None => false,
        }
    }

    /// Whether at least one live provider can currently be tried.
    pub fn has_live_enabled(&self) -> bool {
        self.adapters
            .iter()
            .any(|adapter| adapter.is_live() && adapter.is_enabled())
    }

    pub fn enabled_ids(&self) -> Vec<ProviderId> {
        self.adapters
            .iter()
            .filter(|adapter| adapter.is_enabled())
            .map(|adapter| Cow::Borrowed(adapter.id()))
            .collect()
    }

    /// Fetch daily bars for `ticker`. Empty when every provider fails.
    pub async fn fetch_series(&self, ticker: &str, lookback: Lookback, mode: DataMode) -> PriceSeries {
        self.fetch_series_with_diagnostics(ticker, lookback, mode)
            .await
            .0
    }

    pub async fn fetch_series_with_diagnostics(
        &self,
        ticker: &str,
        lookback: Lookback,
        mode: DataMode,
    ) -> (PriceSeries, FetchDiagnostics) {
        let (series, diagnostics) = self
            .first_success(
                "series",
                ticker,
                mode,
                Candidates::for_mode(mode),
                |_| true,
                |adapter| adapter.series(ticker, lookback),
            )
            .await;
        (series.unwrap_or_default(), diagnostics)
    }

    /// Latest quote from the providers of `mode` only: live providers for
    /// `Real`, static ones for `Mock`. A fixture snapshot is never mixed into
    /// a live answer.
    pub async fn fetch_latest(&self, ticker: &str, mode: DataMode) -> Option<LatestQuote> {
        let candidates = match mode {
            DataMode::Real => Candidates::LiveOnly,
            DataMode::Mock => Candidates::StaticOnly,
        };
        self.first_success(
            "latest quote",
            ticker,
            mode,
            candidates,
            |caps| caps.supports_latest,
            |adapter| adapter.latest(ticker),
        )
        .await
        .0
    }

    pub async fn fetch_profile(&self, ticker: &str, mode: DataMode) -> Option<CompanyProfile> {
        self.first_success(
            "profile",
            ticker,
            mode,
            Candidates::for_mode(mode),
            |caps| caps.supports_profile,
            |adapter| adapter.profile(ticker),
        )
        .await
        .0
    }

    /// Drop persistent cache records for one entity, or everything.
    pub fn invalidate(&self, entity: Option<&str>) -> usize {
        self.adapters
            .iter()
            .map(|adapter| adapter.invalidate(entity))
            .sum()
    }

    pub fn cached_records(&self) -> usize {
        self.adapters.iter().map(ProviderAdapter::cached_records).sum()
    }

    /// Walk candidates in priority order until one succeeds.
    ///
    /// State goes `NotTried -> Trying(i) -> Success | Trying(i + 1) | Exhausted`;
    /// every attempt and skip is recorded in the returned diagnostics.
    async fn first_success<'a, T, S, F, Fut>(
        &'a self,
        operation: &str,
        ticker: &str,
        mode: DataMode,
        candidates: Candidates,
        supports: S,
        call: F,
    ) -> (Option<T>, FetchDiagnostics)
    where
        S: Fn(&ProviderCapabilities) -> bool,
        F: Fn(&'a ProviderAdapter) -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let mut diagnostics = FetchDiagnostics::new();

        for (index, adapter) in self.adapters.iter().enumerate() {
            let provider_id: ProviderId = Cow::Borrowed(adapter.id());

            if !adapter.is_enabled() {
                debug!("Provider '{}' disabled, skipping", provider_id);
                diagnostics.record_skip(provider_id, SkipReason::Disabled);
                continue;
            }
            if !candidates.admits(adapter) {
                diagnostics.record_skip(provider_id, SkipReason::ModeMismatch);
                continue;
            }
            if !supports(adapter.capabilities()) {
                diagnostics.record_skip(provider_id, SkipReason::NotSupported);
                continue;
            }

            diagnostics.mark_trying(index);
            match call(adapter).await {
                Ok(value) => {
                    info!(
                        "Fetched {} for {} from '{}' ({} mode)",
                        operation, ticker, provider_id, mode
                    );
                    diagnostics.record_success(provider_id);
                    return (Some(value), diagnostics);
                }
                Err(e) => {
                    log_failure(&provider_id, operation, ticker, &e);
                    diagnostics.record_error(provider_id, e.kind(), e.to_string());
                }
            }
        }

        diagnostics.mark_exhausted();
        warn!(
            "No provider produced {} for {}: {}",
            operation,
            ticker,
            diagnostics.summary()
        );
        (None, diagnostics)
    }
}

fn log_failure(provider_id: &ProviderId, operation: &str, ticker: &str, e: &MarketDataError) {
    match e.kind() {
        FailureKind::Transient | FailureKind::Malformed => warn!(
            "Provider '{}' failed {} for {} [{}]: {}, trying next provider",
            provider_id,
            operation,
            ticker,
            e.kind().as_str(),
            e
        ),
        FailureKind::NotFound => info!(
            "Provider '{}' has no {} for {}: {}",
            provider_id, operation, ticker, e
        ),
        FailureKind::Unsupported => debug!("Provider '{}': {}", provider_id, e),
    }
}
