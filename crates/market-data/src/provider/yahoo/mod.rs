//! Yahoo Finance market data provider.
//!
//! Primary live source. Uses the `yahoo_finance_api` connector for:
//! - Daily bars over an exact range (`1mo` .. `5y`, `1d` interval)
//! - Latest snapshot from the most recent daily bars
//! - Basic profile data from ticker search

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use log::{debug, warn};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, LatestQuote, Lookback, PriceBar, PriceSeries};
use crate::provider::symbols::{canonical, to_yahoo_symbol};
use crate::provider::{MarketDataProvider, ProviderCapabilities, RateLimit, SeriesWindow};

const PROVIDER_ID: &str = "YAHOO";

/// Daily interval requested from the chart API.
const INTERVAL: &str = "1d";

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    timeout: Duration,
    min_interval: Duration,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new(timeout: Duration, min_interval: Duration) -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            MarketDataError::provider_error(
                PROVIDER_ID,
                format!("Failed to initialize Yahoo connector: {}", e),
            )
        })?;
        Ok(Self {
            connector,
            timeout,
            min_interval,
        })
    }

    /// Run a connector call under the client timeout.
    async fn with_timeout<T, F>(&self, call: F) -> Result<T, MarketDataError>
    where
        F: Future<Output = Result<T, yahoo::YahooError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(map_yahoo_error),
            Err(_) => Err(MarketDataError::Timeout {
                provider: PROVIDER_ID.to_string(),
            }),
        }
    }

    async fn fetch_bars(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>, MarketDataError> {
        let response = self
            .with_timeout(self.connector.get_quote_range(symbol, INTERVAL, range))
            .await
            .map_err(|e| not_found_as(symbol, e))?;

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes) => return Err(MarketDataError::NoDataForRange),
            Err(e) => return Err(MarketDataError::malformed(PROVIDER_ID, e.to_string())),
        };

        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let bar = to_price_bar(q.timestamp as i64, q.open, q.high, q.low, q.close, q.volume);
                if bar.is_none() {
                    warn!("Skipping Yahoo bar for {} at {}: unusable values", symbol, q.timestamp);
                }
                bar
            })
            .collect();

        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            live: true,
            supports_latest: true,
            supports_profile: true,
        }
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(RateLimit::every(self.min_interval))
    }

    fn series_window(&self, lookback: Lookback) -> SeriesWindow {
        SeriesWindow {
            fetch: lookback,
            cache_tag: format!("{}_{}", lookback.label(), INTERVAL),
        }
    }

    async fn fetch_series(
        &self,
        ticker: &str,
        window: &SeriesWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        let symbol = to_yahoo_symbol(ticker);
        debug!(
            "Fetching {} daily bars for {} from Yahoo",
            window.fetch.label(),
            symbol
        );

        let bars = self.fetch_bars(&symbol, window.fetch.label()).await?;
        if bars.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }
        Ok(PriceSeries::new(bars))
    }

    async fn fetch_latest(&self, ticker: &str) -> Result<LatestQuote, MarketDataError> {
        let symbol = to_yahoo_symbol(ticker);
        debug!("Fetching latest quote for {} from Yahoo", symbol);

        let response = self
            .with_timeout(self.connector.get_latest_quotes(&symbol, INTERVAL))
            .await
            .map_err(|e| not_found_as(&symbol, e))?;

        let quotes = response.quotes().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            MarketDataError::SymbolNotFound(symbol.clone())
        })?;

        latest_from_quotes(ticker, &quotes)
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, MarketDataError> {
        let symbol = to_yahoo_symbol(ticker);
        debug!("Fetching profile for {} from Yahoo search", symbol);

        let encoded_symbol = encode(&symbol);
        let result = self
            .with_timeout(self.connector.search_ticker(&encoded_symbol))
            .await?;

        let item = result
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(&symbol))
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.clone()))?;

        let mut profile = CompanyProfile::new(canonical(ticker), PROVIDER_ID);
        profile.name = Some(format_name(
            Some(&item.long_name),
            Some(&item.short_name),
            &symbol,
        ));
        profile.exchange = Some(item.exchange.clone()).filter(|e| !e.is_empty());
        Ok(profile)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Snapshot from the newest chart rows, stamped with the last row's time.
fn latest_from_quotes(ticker: &str, quotes: &[yahoo::Quote]) -> Result<LatestQuote, MarketDataError> {
    let symbol = to_yahoo_symbol(ticker);
    let bars: Vec<PriceBar> = quotes
        .iter()
        .filter_map(|q| to_price_bar(q.timestamp as i64, q.open, q.high, q.low, q.close, q.volume))
        .collect();
    if bars.is_empty() {
        return Err(MarketDataError::SymbolNotFound(symbol));
    }
    let as_of = quotes
        .last()
        .and_then(|q| Utc.timestamp_opt(q.timestamp as i64, 0).single())
        .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, "bad quote timestamp"))?;

    LatestQuote::from_series(&canonical(ticker), &PriceSeries::new(bars), as_of, PROVIDER_ID)
        .ok_or(MarketDataError::SymbolNotFound(symbol))
}

fn map_yahoo_error(e: yahoo::YahooError) -> MarketDataError {
    match e {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
            MarketDataError::NoDataForRange
        }
        other => MarketDataError::provider_error(PROVIDER_ID, other.to_string()),
    }
}

/// The connector reports an unknown symbol as an empty result.
fn not_found_as(symbol: &str, e: MarketDataError) -> MarketDataError {
    match e {
        MarketDataError::NoDataForRange => MarketDataError::SymbolNotFound(symbol.to_string()),
        other => other,
    }
}

/// Convert one chart row to a canonical bar.
///
/// Returns `None` for rows Yahoo pads with zeros or non-finite values, and
/// for timestamps outside chrono's range.
fn to_price_bar(
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
) -> Option<PriceBar> {
    let date = Utc.timestamp_opt(timestamp, 0).single()?.date_naive();
    let price = |v: f64| {
        if v.is_finite() && v > 0.0 {
            Decimal::from_f64(v).map(|d| d.round_dp(4))
        } else {
            None
        }
    };
    Some(PriceBar::new(
        date,
        price(open)?,
        price(high)?,
        price(low)?,
        price(close)?,
        volume,
    ))
}

/// Prefer the long name, then the short name, then the symbol.
fn format_name(long_name: Option<&str>, short_name: Option<&str>, symbol: &str) -> String {
    let name = long_name.unwrap_or("").replace("&amp;", "&");
    let name = name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    match short_name.map(str::trim) {
        Some(short) if !short.is_empty() => short.to_string(),
        _ => symbol.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
