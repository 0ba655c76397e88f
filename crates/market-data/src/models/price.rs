use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::range::Lookback;

/// One daily OHLCV bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading day (no time component)
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `low <= min(open, close)` and `high >= max(open, close)`, with no negative price.
    pub fn is_consistent(&self) -> bool {
        self.low >= Decimal::ZERO
            && self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
    }
}

/// Date-ordered series of bars for one entity.
///
/// Construction always normalizes: bars are sorted ascending by date and
/// duplicate dates collapse to the last bar seen. Deserialization goes
/// through the same path, so cached or fixture payloads are normalized too.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        // Stable sort keeps input order among equal dates, so "last wins" below is well defined.
        bars.sort_by_key(|b| b.date);

        let mut normalized: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match normalized.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => normalized.push(bar),
            }
        }

        Self { bars: normalized }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Bars dated on or after `cutoff`.
    pub fn since(&self, cutoff: NaiveDate) -> PriceSeries {
        let start = self.bars.partition_point(|b| b.date < cutoff);
        Self {
            bars: self.bars[start..].to_vec(),
        }
    }

    /// Bars inside the lookback window ending `today`.
    pub fn within(&self, lookback: Lookback, today: NaiveDate) -> PriceSeries {
        self.since(lookback.cutoff(today))
    }

    /// Newest-first copy of the bars, for consumers that list recent data first.
    pub fn descending(&self) -> Vec<PriceBar> {
        self.bars.iter().rev().cloned().collect()
    }
}

impl From<Vec<PriceBar>> for PriceSeries {
    fn from(bars: Vec<PriceBar>) -> Self {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}
