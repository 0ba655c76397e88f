//! Market data engine.
//!
//! The context object handed to the presentation layer. It layers the
//! in-memory session cache over the provider registry and answers every
//! request with canonical data: an empty series means "unavailable", never
//! an error. [`MarketDataEngine::require_series`] turns that into distinct
//! not-found conditions for callers that need them.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::cache::SessionCache;
use crate::clock::{Clock, SystemClock};
use crate::companies::CompanyRegistry;
use crate::errors::EngineError;
use crate::models::{
    Company, CompanyProfile, DataMode, LatestQuote, Lookback, PriceSeries, ProviderId, SeriesRange,
};
use crate::provider::alpha_vantage::AlphaVantageProvider;
use crate::provider::fixture::FixtureProvider;
use crate::provider::symbols::canonical;
use crate::provider::yahoo::YahooProvider;
use crate::provider::MarketDataProvider;
use crate::registry::ProviderRegistry;
use crate::settings::EngineSettings;

/// Source label for quotes derived locally from a series.
const DERIVED_SOURCE: &str = "DERIVED";

/// Source label for profiles built from the reference registry.
const REGISTRY_SOURCE: &str = "REGISTRY";

/// Window kept per session entry; shorter ranges are sliced from it.
const SESSION_LOOKBACK: Lookback = Lookback::OneYear;

pub struct MarketDataEngine {
    registry: ProviderRegistry,
    session: SessionCache,
    companies: CompanyRegistry,
    clock: Arc<dyn Clock>,
}

/// Snapshot of one registered provider.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub priority: u8,
    pub live: bool,
    pub enabled: bool,
    pub min_interval_ms: Option<u64>,
    pub cached_records: usize,
}

/// What the engine is currently doing, for the status query.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub mode: DataMode,
    pub providers: Vec<ProviderStatus>,
    pub session_entries: usize,
    pub cache_records: usize,
    pub companies: usize,
}

/// How much a refresh removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub session_entries: usize,
    pub cache_records: usize,
}

impl MarketDataEngine {
    pub fn new(registry: ProviderRegistry, companies: CompanyRegistry, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            session: SessionCache::new(),
            companies,
            clock,
        }
    }

    /// Build the engine with real providers, constructed only when their
    /// configuration is present.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, EngineError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let providers = build_providers(settings);

        let companies = match &settings.companies_file {
            Some(path) => CompanyRegistry::load(path)?,
            None => CompanyRegistry::empty(),
        };

        let registry = ProviderRegistry::new(providers, Some(settings.cache_dir.as_path()), clock.clone());
        info!(
            "Market data engine ready: providers [{}], cache at {}",
            registry
                .enabled_ids()
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            settings.cache_dir.display()
        );

        Ok(Self::new(registry, companies, clock))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// `Real` while any live provider is enabled, `Mock` otherwise.
    pub fn default_mode(&self) -> DataMode {
        if self.registry.has_live_enabled() {
            DataMode::Real
        } else {
            DataMode::Mock
        }
    }

    /// Daily bars for `entity` over `range`. Empty when no tier has data.
    pub async fn get_series(&self, entity: &str, range: SeriesRange) -> PriceSeries {
        self.get_series_with_mode(entity, range, self.default_mode())
            .await
    }

    /// Same as [`Self::get_series`] with an explicit mode; `Mock` forces the
    /// fixture path.
    pub async fn get_series_with_mode(
        &self,
        entity: &str,
        range: SeriesRange,
        mode: DataMode,
    ) -> PriceSeries {
        let ticker = canonical(entity);
        if ticker.is_empty() {
            return PriceSeries::empty();
        }

        self.session_series(&ticker, mode)
            .await
            .within(range.lookback(), self.clock.today())
    }

    /// Like [`Self::get_series`] but reports unknown entities and empty
    /// results as errors.
    pub async fn require_series(
        &self,
        entity: &str,
        range: SeriesRange,
    ) -> Result<PriceSeries, EngineError> {
        let ticker = canonical(entity);
        if ticker.is_empty() || (!self.companies.is_empty() && !self.companies.contains(&ticker)) {
            return Err(EngineError::UnknownEntity(entity.to_string()));
        }

        let series = self.get_series(&ticker, range).await;
        if series.is_empty() {
            return Err(EngineError::NoData {
                ticker,
                range: range.to_string(),
            });
        }
        Ok(series)
    }

    /// Fetch several entities one after another. Entities without data are
    /// left out of the map.
    pub async fn get_series_batch<S: AsRef<str>>(
        &self,
        entities: &[S],
        range: SeriesRange,
    ) -> BTreeMap<String, PriceSeries> {
        let mut out = BTreeMap::new();
        for entity in entities {
            let ticker = canonical(entity.as_ref());
            let series = self.get_series(&ticker, range).await;
            if series.is_empty() {
                warn!("Batch: no data for {} ({})", ticker, range);
                continue;
            }
            out.insert(ticker, series);
        }
        out
    }

    /// Latest snapshot for the active mode.
    ///
    /// Providers of that mode are asked first, then the snapshot is derived
    /// from the newest bars. In `Real` mode a fixture quote is the last
    /// resort, used only when no series is available at all.
    pub async fn get_latest(&self, entity: &str) -> Option<LatestQuote> {
        let ticker = canonical(entity);
        if ticker.is_empty() {
            return None;
        }
        let mode = self.default_mode();

        if let Some(quote) = self.registry.fetch_latest(&ticker, mode).await {
            return Some(quote);
        }

        debug!("No provider quote for {}, deriving from series", ticker);
        let series = self.session_series(&ticker, mode).await;
        if let Some(quote) =
            LatestQuote::from_series(&ticker, &series, self.clock.now(), DERIVED_SOURCE)
        {
            return Some(quote);
        }

        match mode {
            DataMode::Real => self.registry.fetch_latest(&ticker, DataMode::Mock).await,
            DataMode::Mock => None,
        }
    }

    /// Company metadata from providers, falling back to the registry entry.
    pub async fn get_profile(&self, entity: &str) -> Option<CompanyProfile> {
        let ticker = canonical(entity);
        if ticker.is_empty() {
            return None;
        }

        if let Some(profile) = self.registry.fetch_profile(&ticker, self.default_mode()).await {
            return Some(profile);
        }

        self.companies.find(&ticker).map(|company| CompanyProfile {
            name: Some(company.name.clone()),
            sector: Some(company.sector.clone()),
            exchange: Some(company.exchange.clone()),
            ..CompanyProfile::new(ticker.clone(), REGISTRY_SOURCE)
        })
    }

    /// Clear the session and persistent caches for one entity, or for
    /// everything. Nothing is re-fetched.
    pub fn refresh(&self, entity: Option<&str>) -> RefreshReport {
        let report = match entity.map(canonical) {
            Some(ticker) => RefreshReport {
                session_entries: self.session.invalidate_entity(&ticker),
                cache_records: self.registry.invalidate(Some(&ticker)),
            },
            None => {
                let session_entries = self.session.len();
                self.session.clear();
                RefreshReport {
                    session_entries,
                    cache_records: self.registry.invalidate(None),
                }
            }
        };

        info!(
            "Refreshed {}: {} session entries, {} cache records",
            entity.unwrap_or("all entities"),
            report.session_entries,
            report.cache_records
        );
        report
    }

    /// Switch a provider on or off at runtime. Disabling drops every `Real`
    /// session entry so a stale live answer is never served afterwards.
    pub fn set_provider_enabled(&self, provider_id: &str, enabled: bool) -> bool {
        if !self.registry.set_enabled(provider_id, enabled) {
            return false;
        }
        if !enabled {
            let dropped = self.session.invalidate_mode(DataMode::Real);
            debug!("Dropped {} live session entries", dropped);
        }
        true
    }

    pub fn status(&self) -> EngineStatus {
        let providers = self
            .registry
            .adapters()
            .iter()
            .map(|adapter| ProviderStatus {
                id: ProviderId::Borrowed(adapter.id()),
                priority: adapter.priority(),
                live: adapter.is_live(),
                enabled: adapter.is_enabled(),
                min_interval_ms: adapter
                    .limiter()
                    .map(|limiter| limiter.min_interval().as_millis() as u64),
                cached_records: adapter.cached_records(),
            })
            .collect();

        EngineStatus {
            mode: self.default_mode(),
            providers,
            session_entries: self.session.len(),
            cache_records: self.registry.cached_records(),
            companies: self.companies.len(),
        }
    }

    pub fn companies(&self) -> &[Company] {
        self.companies.all()
    }

    pub fn company(&self, entity: &str) -> Option<&Company> {
        self.companies.find(entity)
    }

    /// The one-year series for `ticker`, memoized per mode. Empty results
    /// are not memoized.
    async fn session_series(&self, ticker: &str, mode: DataMode) -> PriceSeries {
        if let Some(series) = self.session.get(ticker, mode) {
            debug!("Session hit for {} ({} mode)", ticker, mode);
            return series;
        }

        let series = self
            .registry
            .fetch_series(ticker, SESSION_LOOKBACK, mode)
            .await;
        if !series.is_empty() {
            self.session.put(ticker, mode, series.clone());
        }
        series
    }
}

fn build_providers(settings: &EngineSettings) -> Vec<Arc<dyn MarketDataProvider>> {
    let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();

    if settings.yahoo_enabled {
        match YahooProvider::new(settings.http_timeout, settings.yahoo_min_interval) {
            Ok(provider) => providers.push(Arc::new(provider)),
            Err(e) => warn!("Yahoo provider unavailable: {}", e),
        }
    } else {
        info!("Yahoo provider disabled by configuration");
    }

    match settings.alpha_vantage_key() {
        Some(key) => providers.push(Arc::new(AlphaVantageProvider::new(
            key.to_string(),
            settings.alpha_vantage_output_size(),
            settings.http_timeout,
            settings.alpha_vantage_min_interval,
        ))),
        None => info!("No Alpha Vantage API key configured, provider not registered"),
    }

    match settings.fixtures_dir.as_deref() {
        Some(dir) => providers.push(Arc::new(FixtureProvider::new(dir))),
        None => info!("No fixtures directory configured, static fallback not registered"),
    }

    providers
}
