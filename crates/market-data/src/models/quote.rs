use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::PriceSeries;

/// Latest trading snapshot for one entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatestQuote {
    /// Canonical ticker (never a provider-specific symbol)
    pub ticker: String,

    /// Last traded / closing price
    pub price: Decimal,

    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: u64,

    /// Previous session close, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    /// Absolute change versus previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,

    /// Percentage change versus previous close (e.g. 1.25 for +1.25%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,

    /// When the snapshot was produced
    pub as_of: DateTime<Utc>,

    /// Provider that produced the snapshot (YAHOO, ALPHA_VANTAGE, FIXTURE, ...)
    pub source: String,
}

impl LatestQuote {
    /// Fill `change` and `change_percent` from `price` and `previous_close`.
    pub fn with_previous_close(mut self, previous_close: Decimal) -> Self {
        self.previous_close = Some(previous_close);
        self.change = Some(self.price - previous_close);
        self.change_percent = if previous_close > Decimal::ZERO {
            Some(((self.price - previous_close) / previous_close * Decimal::ONE_HUNDRED).round_dp(4))
        } else {
            None
        };
        self
    }

    /// Derive a snapshot from the newest two bars of a series.
    pub fn from_series(
        ticker: &str,
        series: &PriceSeries,
        as_of: DateTime<Utc>,
        source: &str,
    ) -> Option<Self> {
        let bars = series.bars();
        let latest = bars.last()?;

        let quote = Self {
            ticker: ticker.to_string(),
            price: latest.close,
            open: latest.open,
            high: latest.high,
            low: latest.low,
            volume: latest.volume,
            previous_close: None,
            change: None,
            change_percent: None,
            as_of,
            source: source.to_string(),
        };

        match bars.len().checked_sub(2).map(|i| &bars[i]) {
            Some(previous) => Some(quote.with_previous_close(previous.close)),
            None => Some(quote),
        }
    }
}
