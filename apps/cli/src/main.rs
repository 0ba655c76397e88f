//! Borsa CLI: query and maintain the market data engine.
//!
//! Commands:
//! - `series` - daily bars for one ticker over 1M / 3M / 1Y
//! - `latest` - latest quote snapshot
//! - `profile` - company metadata
//! - `refresh` - clear caches for one ticker or everything
//! - `status` - providers, active mode and cache counts
//! - `companies` - the reference registry
//! - `batch` - series for several tickers (all registry tickers by default)
//! - `fixtures` - generate synthetic fixture files for the static provider

mod config;
mod fixtures;
mod main_lib;

use std::path::PathBuf;

use anyhow::{bail, Result};
use borsa_market_data::{DataMode, MarketDataEngine, PriceSeries, SeriesRange};
use clap::{Parser, Subcommand};
use serde::Serialize;

use config::Config;
use main_lib::{build_engine, init_tracing};

#[derive(Parser)]
#[command(name = "borsa", about = "Borsa market data engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily bars for one ticker.
    Series {
        ticker: String,

        /// Range: 1M, 3M or 1Y.
        #[arg(long, default_value = "1Y")]
        range: String,

        /// Force the fixture path.
        #[arg(long, default_value_t = false)]
        mock: bool,

        /// Newest bar first.
        #[arg(long, default_value_t = false)]
        desc: bool,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Latest quote snapshot.
    Latest { ticker: String },
    /// Company metadata.
    Profile { ticker: String },
    /// Clear session and on-disk caches. Clears everything without a ticker.
    Refresh { ticker: Option<String> },
    /// Enabled providers, active mode and cache counts.
    Status,
    /// List the reference registry.
    Companies,
    /// Series for several tickers. Defaults to every registry ticker.
    Batch {
        tickers: Vec<String>,

        /// Range: 1M, 3M or 1Y.
        #[arg(long, default_value = "1Y")]
        range: String,
    },
    /// Generate synthetic fixture files.
    Fixtures {
        /// Tickers to generate. Defaults to every registry ticker.
        tickers: Vec<String>,

        /// Trading days per ticker.
        #[arg(long, default_value_t = 260)]
        days: usize,

        /// RNG seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory. Defaults to the configured fixtures directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config.log_format);
    let engine = build_engine(&config)?;

    match cli.command {
        Commands::Series {
            ticker,
            range,
            mock,
            desc,
            json,
        } => run_series(&engine, &ticker, &range, mock, desc, json).await,
        Commands::Latest { ticker } => match engine.get_latest(&ticker).await {
            Some(quote) => print_json(&quote),
            None => bail!("No quote available for {}", ticker),
        },
        Commands::Profile { ticker } => match engine.get_profile(&ticker).await {
            Some(profile) => print_json(&profile),
            None => bail!("No profile available for {}", ticker),
        },
        Commands::Refresh { ticker } => print_json(&engine.refresh(ticker.as_deref())),
        Commands::Status => print_json(&engine.status()),
        Commands::Companies => print_json(&engine.companies()),
        Commands::Batch { tickers, range } => {
            let range: SeriesRange = range.parse()?;
            let tickers = tickers_or_registry(&engine, tickers);
            let batch = engine.get_series_batch(&tickers, range).await;
            let summary: Vec<BatchLine> = tickers
                .iter()
                .map(|ticker| BatchLine::new(ticker, batch.get(&ticker.trim().to_uppercase())))
                .collect();
            print_json(&summary)
        }
        Commands::Fixtures {
            tickers,
            days,
            seed,
            out,
        } => {
            let out = match out.or_else(|| config.settings.fixtures_dir.clone()) {
                Some(dir) => dir,
                None => bail!("No output directory: pass --out or set BORSA_FIXTURES_DIR"),
            };
            let tickers = tickers_or_registry(&engine, tickers);
            let today = chrono::Utc::now().date_naive();
            let written = fixtures::write_fixtures(&out, &tickers, days, today, seed)?;
            println!("Wrote {} fixture files to {}", written.len(), out.display());
            Ok(())
        }
    }
}

async fn run_series(
    engine: &MarketDataEngine,
    ticker: &str,
    range: &str,
    mock: bool,
    desc: bool,
    json: bool,
) -> Result<()> {
    let range: SeriesRange = range.parse()?;
    let series = if mock {
        engine
            .get_series_with_mode(ticker, range, DataMode::Mock)
            .await
    } else {
        engine.require_series(ticker, range).await?
    };
    if series.is_empty() {
        bail!("No data for {} ({})", ticker, range);
    }

    let bars = if desc {
        series.descending()
    } else {
        series.into_bars()
    };

    if json {
        return print_json(&bars);
    }

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "date", "open", "high", "low", "close", "volume"
    );
    for bar in &bars {
        println!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }
    Ok(())
}

fn tickers_or_registry(engine: &MarketDataEngine, tickers: Vec<String>) -> Vec<String> {
    if tickers.is_empty() {
        engine.companies().iter().map(|c| c.ticker.clone()).collect()
    } else {
        tickers
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchLine {
    ticker: String,
    bars: usize,
    first: Option<String>,
    last: Option<String>,
    last_close: Option<String>,
}

impl BatchLine {
    fn new(ticker: &str, series: Option<&PriceSeries>) -> Self {
        let first = series.and_then(|s| s.first());
        let last = series.and_then(|s| s.last());
        Self {
            ticker: ticker.trim().to_uppercase(),
            bars: series.map_or(0, PriceSeries::len),
            first: first.map(|b| b.date.to_string()),
            last: last.map(|b| b.date.to_string()),
            last_close: last.map(|b| b.close.to_string()),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
