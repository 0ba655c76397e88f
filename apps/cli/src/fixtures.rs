//! Synthetic fixture files for the static provider.
//!
//! Produces a weekday-only random walk per ticker and writes it to
//! `<out>/prices/<TICKER>.json` in the shape the fixture provider reads.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use borsa_market_data::PriceBar;

/// Daily upward drift of the walk.
const DRIFT: f64 = 0.0002;

/// Intraday range around open/close.
const INTRADAY_VOLATILITY: f64 = 0.015;

/// Price floor for the walk.
const MIN_PRICE: f64 = 1.0;

/// Start price and daily volatility per known ticker.
fn walk_params(ticker: &str) -> (f64, f64) {
    match ticker {
        "CABK.MC" => (4.2, 0.025),
        "GRF.MC" => (15.8, 0.035),
        "CLNX.MC" => (45.3, 0.030),
        "FDR.MC" => (18.9, 0.028),
        "COL.MC" => (7.6, 0.032),
        "ALM.MC" => (12.4, 0.033),
        _ => (25.0, 0.025),
    }
}

/// The last `days` weekdays up to and including `end`, oldest first.
pub fn trading_days(days: usize, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(days);
    let mut current = end;
    while dates.len() < days {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
        current -= Duration::days(1);
    }
    dates.reverse();
    dates
}

fn round2(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

/// Random-walk bars for `ticker`.
pub fn generate_bars<R: Rng>(
    ticker: &str,
    days: usize,
    end: NaiveDate,
    rng: &mut R,
) -> Result<Vec<PriceBar>> {
    let (start_price, volatility) = walk_params(ticker);
    let shock = Normal::new(0.0, volatility)
        .map_err(|e| anyhow!("invalid volatility {} for {}: {}", volatility, ticker, e))?;
    let base_volume = rng.gen_range(50_000..=500_000) as f64;

    let mut closes = Vec::with_capacity(days);
    let mut price = start_price;
    for i in 0..days {
        if i > 0 {
            price = (price * (1.0 + DRIFT + shock.sample(rng))).max(MIN_PRICE);
        }
        closes.push(price);
    }

    let bars = trading_days(days, end)
        .into_iter()
        .zip(closes.iter().enumerate())
        .map(|(date, (i, &close))| {
            let open = match i {
                0 => close * rng.gen_range(0.995..1.005),
                _ => closes[i - 1] * rng.gen_range(0.998..1.002),
            };
            let high = (open.max(close) * rng.gen_range(1.001..1.0 + INTRADAY_VOLATILITY))
                .max(open)
                .max(close);
            let low = (open.min(close) * rng.gen_range(1.0 - INTRADAY_VOLATILITY..0.999))
                .min(open)
                .min(close);

            // Lighter volume on every sixth and seventh session.
            let weekly_factor = if i % 7 >= 5 { 0.3 } else { 1.0 };
            let volume = (base_volume * weekly_factor * rng.gen_range(0.5..1.8)) as u64;

            // Rounding can push open/close past the extremes; re-bracket afterwards.
            let (open, close) = (round2(open), round2(close));
            let high = round2(high).max(open).max(close);
            let low = round2(low).min(open).min(close);
            PriceBar::new(date, open, high, low, close, volume)
        })
        .collect();
    Ok(bars)
}

/// Write one fixture file per ticker. Returns the files written.
pub fn write_fixtures(
    out_dir: &Path,
    tickers: &[String],
    days: usize,
    end: NaiveDate,
    seed: Option<u64>,
) -> Result<Vec<PathBuf>> {
    let prices_dir = out_dir.join("prices");
    fs::create_dir_all(&prices_dir)
        .with_context(|| format!("creating {}", prices_dir.display()))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut written = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let bars = generate_bars(ticker, days, end, &mut rng)?;
        let path = prices_dir.join(format!("{}.json", ticker));
        let json = serde_json::to_string_pretty(&bars)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote {} bars for {} to {}", bars.len(), ticker, path.display());
        written.push(path);
    }
    Ok(written)
}
