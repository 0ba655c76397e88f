//! Static fixture provider.
//!
//! Last-resort source backed by bundled JSON files:
//! - `<root>/prices/<TICKER>.json`: array of daily bars
//! - `<root>/profiles/<TICKER>.json`: optional company profile
//!
//! Never touches the network, is never rate limited and is the only source
//! allowed in mock mode.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, LatestQuote, PriceBar, PriceSeries};
use crate::provider::symbols::canonical;
use crate::provider::{MarketDataProvider, ProviderCapabilities, SeriesWindow};

const PROVIDER_ID: &str = "FIXTURE";

pub struct FixtureProvider {
    root: PathBuf,
}

impl FixtureProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the price file for `ticker`.
    pub fn prices_path(&self, ticker: &str) -> Result<PathBuf, MarketDataError> {
        self.file_for("prices", ticker)
    }

    pub fn profile_path(&self, ticker: &str) -> Result<PathBuf, MarketDataError> {
        self.file_for("profiles", ticker)
    }

    fn file_for(&self, dir: &str, ticker: &str) -> Result<PathBuf, MarketDataError> {
        let ticker = canonical(ticker);
        if ticker.is_empty()
            || ticker.contains("..")
            || ticker.contains('/')
            || ticker.contains('\\')
        {
            return Err(MarketDataError::SymbolNotFound(ticker));
        }
        Ok(self.root.join(dir).join(format!("{}.json", ticker)))
    }

    fn read(&self, path: &Path, ticker: &str) -> Result<String, MarketDataError> {
        fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                MarketDataError::SymbolNotFound(canonical(ticker))
            } else {
                MarketDataError::provider_error(
                    PROVIDER_ID,
                    format!("Failed to read {}: {}", path.display(), e),
                )
            }
        })
    }

    fn load_series(&self, ticker: &str) -> Result<PriceSeries, MarketDataError> {
        let path = self.prices_path(ticker)?;
        let text = self.read(&path, ticker)?;
        let bars: Vec<PriceBar> = serde_json::from_str(&text).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("{}: {}", path.display(), e))
        })?;

        debug!("Loaded {} fixture bars from {}", bars.len(), path.display());
        if bars.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }
        Ok(PriceSeries::new(bars))
    }
}

#[async_trait]
impl MarketDataProvider for FixtureProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        100
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            live: false,
            supports_latest: true,
            supports_profile: true,
        }
    }

    /// Files hold the whole history; the window only drives local filtering.
    async fn fetch_series(
        &self,
        ticker: &str,
        _window: &SeriesWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        self.load_series(ticker)
    }

    async fn fetch_latest(&self, ticker: &str) -> Result<LatestQuote, MarketDataError> {
        let series = self.load_series(ticker)?;
        let as_of = series
            .last()
            .and_then(|bar| bar.date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or(MarketDataError::NoDataForRange)?;

        LatestQuote::from_series(&canonical(ticker), &series, as_of, PROVIDER_ID)
            .ok_or(MarketDataError::NoDataForRange)
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, MarketDataError> {
        let path = self.profile_path(ticker)?;
        let text = self.read(&path, ticker)?;
        let mut profile: CompanyProfile = serde_json::from_str(&text).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("{}: {}", path.display(), e))
        })?;

        profile.ticker = canonical(ticker);
        if profile.source.is_none() {
            profile.source = Some(PROVIDER_ID.to_string());
        }
        Ok(profile)
    }
}
