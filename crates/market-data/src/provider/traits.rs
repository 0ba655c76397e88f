//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! market data providers must implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, LatestQuote, Lookback, PriceSeries};

use super::capabilities::{ProviderCapabilities, RateLimit, SeriesWindow};

/// Trait for market data providers.
///
/// A provider only knows how to talk to its backend and normalize the
/// answer. Caching, throttling and validation are applied around it by the
/// registry, so implementations stay stateless apart from their client.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use borsa_market_data::provider::{MarketDataProvider, ProviderCapabilities, SeriesWindow};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             live: true,
///             supports_latest: false,
///             supports_profile: false,
///         }
///     }
///
///     async fn fetch_series(
///         &self,
///         ticker: &str,
///         window: &SeriesWindow,
///     ) -> Result<PriceSeries, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO", "ALPHA_VANTAGE", etc.
    /// Used for logging, cache directories and diagnostics.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Describes what this provider can do.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Minimum spacing between calls, if the backend needs one.
    fn rate_limit(&self) -> Option<RateLimit> {
        None
    }

    /// Window the provider requests to satisfy `lookback`.
    ///
    /// Providers that can ask for an exact window keep the default.
    /// Providers that only offer fixed output sizes return their broadest
    /// window; the registry filters locally either way.
    fn series_window(&self, lookback: Lookback) -> SeriesWindow {
        SeriesWindow::exact(lookback)
    }

    /// Fetch daily bars for `ticker`.
    ///
    /// `ticker` is canonical; symbol translation is the provider's job.
    async fn fetch_series(
        &self,
        ticker: &str,
        window: &SeriesWindow,
    ) -> Result<PriceSeries, MarketDataError>;

    /// Fetch the latest trading snapshot.
    ///
    /// Default implementation returns `NotSupported`.
    async fn fetch_latest(&self, ticker: &str) -> Result<LatestQuote, MarketDataError> {
        let _ = ticker;
        Err(MarketDataError::not_supported(self.id(), "latest quote"))
    }

    /// Fetch company profile information.
    ///
    /// Default implementation returns `NotSupported`.
    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, MarketDataError> {
        let _ = ticker;
        Err(MarketDataError::not_supported(self.id(), "profile"))
    }
}
