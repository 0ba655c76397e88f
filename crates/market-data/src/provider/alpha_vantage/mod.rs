//! Alpha Vantage market data provider implementation.
//!
//! This module provides market data from Alpha Vantage API:
//! - Daily bars via TIME_SERIES_DAILY (`compact` or `full` output size)
//! - Latest snapshot via GLOBAL_QUOTE
//! - Company metadata via OVERVIEW
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, LatestQuote, Lookback, PriceBar, PriceSeries};
use crate::provider::symbols::{canonical, to_alpha_vantage_symbol};
use crate::provider::{MarketDataProvider, ProviderCapabilities, RateLimit, SeriesWindow};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// TIME_SERIES_DAILY output size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputSize {
    /// Latest 100 data points.
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// Alpha Vantage market data provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    output_size: OutputSize,
    min_interval: Duration,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// TIME_SERIES_DAILY response for equities
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyQuote>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// Every field is optional: an unknown symbol comes back as `{}`.
#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "02. open")]
    open: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
}

/// OVERVIEW response for companies
#[derive(Debug, Deserialize)]
struct CompanyOverviewResponse {
    #[serde(rename = "Symbol")]
    symbol: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Exchange")]
    exchange: Option<String>,
    #[serde(rename = "Currency")]
    currency: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "DividendYield")]
    dividend_yield: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl CompanyOverviewResponse {
    /// Parse a string field as f64, handling "None" and "-" values
    fn parse_f64(s: &Option<String>) -> Option<f64> {
        s.as_ref()
            .filter(|v| !v.is_empty() && *v != "None" && *v != "-" && *v != "0")
            .and_then(|v| v.parse::<f64>().ok())
    }

    fn text(s: &Option<String>) -> Option<String> {
        s.as_ref()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && *v != "None" && *v != "-")
            .map(str::to_string)
    }

    fn to_profile(&self, ticker: &str) -> CompanyProfile {
        let mut profile = CompanyProfile::new(ticker, PROVIDER_ID);
        profile.name = Self::text(&self.name);
        profile.sector = Self::text(&self.sector);
        profile.industry = Self::text(&self.industry);
        profile.exchange = Self::text(&self.exchange);
        profile.currency = Self::text(&self.currency);
        profile.description = Self::text(&self.description);
        profile.market_cap = Self::parse_f64(&self.market_capitalization);
        profile.pe_ratio = Self::parse_f64(&self.pe_ratio);
        profile.dividend_yield = Self::parse_f64(&self.dividend_yield);
        profile
    }
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(
        api_key: String,
        output_size: OutputSize,
        timeout: Duration,
        min_interval: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            output_size,
            min_interval,
        }
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(BASE_URL, &all_params).map_err(|e| {
            MarketDataError::provider_error(PROVIDER_ID, format!("Failed to build URL: {}", e))
        })?;

        debug!(
            "Alpha Vantage request: {}",
            mask(url.as_str(), &self.api_key)
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::provider_error(PROVIDER_ID, mask(&e.to_string(), &self.api_key))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::provider_error(
                PROVIDER_ID,
                format!("HTTP {}", status),
            ));
        }

        response.text().await.map_err(|e| {
            MarketDataError::provider_error(PROVIDER_ID, mask(&e.to_string(), &self.api_key))
        })
    }

    /// Check for API-level errors in the response.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            // Check if it's a "not found" type error
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::provider_error(PROVIDER_ID, msg.clone()));
        }

        // "Note" is the classic frequency-limit message
        if let Some(ref msg) = note {
            warn!("Alpha Vantage note: {}", msg);
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // "Information" carries daily quota and premium-endpoint messages
        if let Some(ref msg) = information {
            warn!("Alpha Vantage info: {}", msg);
            let lower = msg.to_lowercase();
            if lower.contains("rate limit")
                || lower.contains("api call frequency")
                || lower.contains("requests per day")
            {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            return Err(MarketDataError::provider_error(PROVIDER_ID, msg.clone()));
        }

        Ok(())
    }

    /// Parse a decimal value from a string.
    fn parse_decimal(s: &str) -> Option<Decimal> {
        Decimal::from_str(s.trim()).ok()
    }

    fn parse_volume(s: &str) -> Option<u64> {
        let s = s.trim();
        s.parse::<u64>()
            .ok()
            .or_else(|| Self::parse_decimal(s).and_then(|d| d.trunc().to_u64()))
    }

    /// Normalize a TIME_SERIES_DAILY body into a series.
    fn parse_time_series(text: &str, symbol: &str) -> Result<PriceSeries, MarketDataError> {
        let response: TimeSeriesResponse = serde_json::from_str(text).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let time_series = response
            .time_series
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let total = time_series.len();
        let bars: Vec<PriceBar> = time_series
            .into_iter()
            .filter_map(|(date_str, daily)| {
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").ok()?;
                Some(PriceBar::new(
                    date,
                    Self::parse_decimal(&daily.open)?,
                    Self::parse_decimal(&daily.high)?,
                    Self::parse_decimal(&daily.low)?,
                    Self::parse_decimal(&daily.close)?,
                    Self::parse_volume(&daily.volume)?,
                ))
            })
            .collect();

        if bars.len() < total {
            warn!(
                "Alpha Vantage: dropped {} unparsable rows for {}",
                total - bars.len(),
                symbol
            );
        }
        if bars.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        debug!("Alpha Vantage: parsed {} daily bars for {}", bars.len(), symbol);
        Ok(PriceSeries::new(bars))
    }

    /// Normalize a GLOBAL_QUOTE body into a snapshot.
    fn parse_global_quote(
        text: &str,
        ticker: &str,
        symbol: &str,
    ) -> Result<LatestQuote, MarketDataError> {
        let response: GlobalQuoteResponse = serde_json::from_str(text).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("Failed to parse quote: {}", e))
        })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let quote = response
            .global_quote
            .filter(|q| q.price.is_some())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let field = |value: &Option<String>, name: &str| {
            value
                .as_deref()
                .and_then(Self::parse_decimal)
                .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, format!("bad {}", name)))
        };

        let price = field(&quote.price, "price")?;
        let as_of = quote
            .latest_trading_day
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, "bad latest trading day"))?;

        let snapshot = LatestQuote {
            ticker: ticker.to_string(),
            price,
            open: field(&quote.open, "open")?,
            high: field(&quote.high, "high")?,
            low: field(&quote.low, "low")?,
            volume: quote
                .volume
                .as_deref()
                .and_then(Self::parse_volume)
                .unwrap_or(0),
            previous_close: None,
            change: None,
            change_percent: None,
            as_of,
            source: PROVIDER_ID.to_string(),
        };

        Ok(match quote.previous_close.as_deref().and_then(Self::parse_decimal) {
            Some(previous) => snapshot.with_previous_close(previous),
            None => snapshot,
        })
    }

    /// Normalize an OVERVIEW body into a profile.
    fn parse_overview(
        text: &str,
        ticker: &str,
        symbol: &str,
    ) -> Result<CompanyProfile, MarketDataError> {
        let response: CompanyOverviewResponse = serde_json::from_str(text).map_err(|e| {
            MarketDataError::malformed(
                PROVIDER_ID,
                format!("Failed to parse company overview response: {}", e),
            )
        })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        // An unknown symbol comes back as an empty object
        if response.symbol.is_none() {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        Ok(response.to_profile(ticker))
    }
}

// ============================================================================
// MarketDataProvider trait implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        // Behind Yahoo due to rate limits
        2
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

    /// Only fixed output sizes exist, so the broadest one is always fetched
    /// and cached under its size.
    fn series_window(&self, _lookback: Lookback) -> SeriesWindow {
        let fetch = match self.output_size {
            OutputSize::Compact => Lookback::SixMonths,
            OutputSize::Full => Lookback::FiveYears,
        };
        SeriesWindow {
            fetch,
            cache_tag: self.output_size.as_str().to_string(),
        }
    }

    async fn fetch_series(
        &self,
        ticker: &str,
        _window: &SeriesWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        let symbol = to_alpha_vantage_symbol(ticker);
        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol.as_str()),
            ("outputsize", self.output_size.as_str()),
        ];

        let text = self.fetch(&params).await?;
        Self::parse_time_series(&text, &symbol)
    }

    async fn fetch_latest(&self, ticker: &str) -> Result<LatestQuote, MarketDataError> {
        let symbol = to_alpha_vantage_symbol(ticker);
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol.as_str())];

        let text = self.fetch(&params).await?;
        Self::parse_global_quote(&text, &canonical(ticker), &symbol)
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, MarketDataError> {
        let symbol = to_alpha_vantage_symbol(ticker);
        let params = [("function", "OVERVIEW"), ("symbol", symbol.as_str())];

        let text = self.fetch(&params).await?;
        Self::parse_overview(&text, &canonical(ticker), &symbol)
    }
}

fn mask(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "***")
    }
}
