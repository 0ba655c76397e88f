//! Price data validation.
//!
//! Validates normalized bars from providers before they are cached:
//! - OHLC invariants (low <= open, close <= high)
//! - Non-negative prices
//! - Reasonable value ranges

use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{LatestQuote, PriceBar, PriceSeries};

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Hard failure - drop the bar.
    Hard,
    /// Soft warning - keep the bar but log.
    Soft,
}

/// Validation result details.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Whether to reject bars with negative prices.
    pub reject_negative_prices: bool,
    /// Whether to reject bars violating low <= open, close <= high.
    pub reject_invalid_ohlc: bool,
    /// Maximum allowed price value (sanity check).
    pub max_price: Option<Decimal>,
    /// Whether to warn on zero volume.
    pub warn_on_zero_volume: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            reject_negative_prices: true,
            reject_invalid_ohlc: true,
            max_price: Some(Decimal::from(1_000_000_000i64)),
            // Thinly traded Madrid names print zero-volume days routinely.
            warn_on_zero_volume: false,
        }
    }
}

/// Series validator.
///
/// Drops bars with hard issues, keeps the rest. A non-empty series whose
/// every bar is rejected is reported as a malformed response so the
/// registry moves on to the next provider.
#[derive(Clone, Debug, Default)]
pub struct SeriesValidator {
    config: ValidatorConfig,
}

impl SeriesValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Issues found on one bar.
    pub fn check_bar(&self, bar: &PriceBar) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let prices = [bar.open, bar.high, bar.low, bar.close];

        if self.config.reject_negative_prices && prices.iter().any(|p| *p < Decimal::ZERO) {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!("Negative price on {}", bar.date),
            });
        }

        if self.config.reject_invalid_ohlc && !bar.is_consistent() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!(
                    "OHLC invariant violated on {}: O={} H={} L={} C={}",
                    bar.date, bar.open, bar.high, bar.low, bar.close
                ),
            });
        }

        if let Some(max) = self.config.max_price {
            if prices.iter().any(|p| *p > max) {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Hard,
                    message: format!("Price above sanity limit {} on {}", max, bar.date),
                });
            }
        }

        if self.config.warn_on_zero_volume && bar.volume == 0 {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Soft,
                message: format!("Zero volume on {}", bar.date),
            });
        }

        issues
    }

    /// Keep the bars without hard issues.
    pub fn validate_series(
        &self,
        provider: &str,
        ticker: &str,
        series: PriceSeries,
    ) -> Result<PriceSeries, MarketDataError> {
        let original_count = series.len();
        let mut valid = Vec::with_capacity(original_count);

        for bar in series.into_bars() {
            let issues = self.check_bar(&bar);
            let mut rejected = false;
            for issue in &issues {
                warn!("{} bar for {} from '{}': {}", severity_label(issue), ticker, provider, issue.message);
                rejected |= issue.severity == ValidationSeverity::Hard;
            }
            if !rejected {
                valid.push(bar);
            }
        }

        if valid.is_empty() && original_count > 0 {
            warn!(
                "All {} bars for {} from '{}' failed validation",
                original_count, ticker, provider
            );
            return Err(MarketDataError::malformed(
                provider,
                "all bars failed validation",
            ));
        }

        Ok(PriceSeries::new(valid))
    }

    /// Reject a snapshot whose range is inverted or whose price is negative.
    pub fn validate_quote(&self, provider: &str, quote: &LatestQuote) -> Result<(), MarketDataError> {
        if self.config.reject_negative_prices && quote.price < Decimal::ZERO {
            return Err(MarketDataError::malformed(
                provider,
                format!("negative price {} for {}", quote.price, quote.ticker),
            ));
        }
        if self.config.reject_invalid_ohlc && quote.high < quote.low {
            return Err(MarketDataError::malformed(
                provider,
                format!(
                    "high {} below low {} for {}",
                    quote.high, quote.low, quote.ticker
                ),
            ));
        }
        Ok(())
    }
}

fn severity_label(issue: &ValidationIssue) -> &'static str {
    match issue.severity {
        ValidationSeverity::Hard => "Rejected",
        ValidationSeverity::Soft => "Suspicious",
    }
}
