use std::path::PathBuf;
use std::time::Duration;

use borsa_market_data::EngineSettings;

pub struct Config {
    pub settings: EngineSettings,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = EngineSettings::default();

        let cache_dir = std::env::var("BORSA_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);
        let fixtures_dir = optional_path("BORSA_FIXTURES_DIR", defaults.fixtures_dir);
        let companies_file = optional_path("BORSA_COMPANIES_FILE", defaults.companies_file);
        let yahoo_enabled = flag("BORSA_YAHOO_ENABLED", defaults.yahoo_enabled);
        let alpha_vantage_key = std::env::var("ALPHAVANTAGE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let alpha_vantage_full = flag("BORSA_ALPHAVANTAGE_FULL", defaults.alpha_vantage_full);
        let timeout_secs: u64 = std::env::var("BORSA_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .unwrap_or(10);
        let log_format = std::env::var("BORSA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Self {
            settings: EngineSettings {
                cache_dir,
                fixtures_dir,
                companies_file,
                yahoo_enabled,
                alpha_vantage_key,
                alpha_vantage_full,
                http_timeout: Duration::from_secs(timeout_secs),
                ..defaults
            },
            log_format,
        }
    }
}

/// Unset keeps the default; an empty value switches the feature off.
fn optional_path(name: &str, default: Option<PathBuf>) -> Option<PathBuf> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(PathBuf::from(value)),
        Err(_) => default,
    }
}

fn flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
