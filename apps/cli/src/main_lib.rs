use std::sync::Arc;

use borsa_market_data::MarketDataEngine;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for command output.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn build_engine(config: &Config) -> anyhow::Result<Arc<MarketDataEngine>> {
    let settings = &config.settings;
    tracing::info!("Cache directory in use: {}", settings.cache_dir.display());
    if let Some(dir) = &settings.fixtures_dir {
        tracing::info!("Fixture directory in use: {}", dir.display());
    }

    let engine = MarketDataEngine::from_settings(settings)?;
    Ok(Arc::new(engine))
}
