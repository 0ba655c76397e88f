use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Lookback window understood by providers, in calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lookback {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl Lookback {
    pub const ALL: [Lookback; 6] = [
        Lookback::OneMonth,
        Lookback::ThreeMonths,
        Lookback::SixMonths,
        Lookback::OneYear,
        Lookback::TwoYears,
        Lookback::FiveYears,
    ];

    /// Number of calendar days covered by the window.
    pub const fn days(self) -> i64 {
        match self {
            Lookback::OneMonth => 30,
            Lookback::ThreeMonths => 90,
            Lookback::SixMonths => 180,
            Lookback::OneYear => 365,
            Lookback::TwoYears => 730,
            Lookback::FiveYears => 1825,
        }
    }

    /// Period label in the `1mo`/`1y` style most HTTP APIs accept.
    pub const fn label(self) -> &'static str {
        match self {
            Lookback::OneMonth => "1mo",
            Lookback::ThreeMonths => "3mo",
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
            Lookback::TwoYears => "2y",
            Lookback::FiveYears => "5y",
        }
    }

    /// Parse a period label. Unknown labels fall back to one year.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|l| l.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(Lookback::OneYear)
    }

    /// First date (inclusive) that belongs to the window ending `today`.
    pub fn cutoff(self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days())
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Range selector exposed to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesRange {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[default]
    #[serde(rename = "1Y")]
    OneYear,
}

impl SeriesRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            SeriesRange::OneMonth => "1M",
            SeriesRange::ThreeMonths => "3M",
            SeriesRange::OneYear => "1Y",
        }
    }

    pub const fn lookback(self) -> Lookback {
        match self {
            SeriesRange::OneMonth => Lookback::OneMonth,
            SeriesRange::ThreeMonths => Lookback::ThreeMonths,
            SeriesRange::OneYear => Lookback::OneYear,
        }
    }
}

impl fmt::Display for SeriesRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1M" => Ok(SeriesRange::OneMonth),
            "3M" => Ok(SeriesRange::ThreeMonths),
            "1Y" => Ok(SeriesRange::OneYear),
            _ => Err(EngineError::InvalidRange(s.to_string())),
        }
    }
}
