//! Engine construction settings.
//!
//! Plain data filled in by the startup routine; the library itself never
//! reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::provider::alpha_vantage::OutputSize;

/// Everything needed to build a [`crate::MarketDataEngine`] with real providers.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// Root of the per-provider persistent cache.
    pub cache_dir: PathBuf,

    /// Root holding `prices/` and `profiles/` fixture files. `None` disables
    /// the fixture provider.
    pub fixtures_dir: Option<PathBuf>,

    /// Reference registry file. `None` means every ticker is accepted.
    pub companies_file: Option<PathBuf>,

    pub yahoo_enabled: bool,

    /// Alpha Vantage is only constructed when a key is present.
    pub alpha_vantage_key: Option<String>,

    /// Request the full daily history instead of the last 100 points.
    pub alpha_vantage_full: bool,

    pub http_timeout: Duration,

    pub yahoo_min_interval: Duration,

    /// Free tier allows 5 requests per minute.
    pub alpha_vantage_min_interval: Duration,
}

impl EngineSettings {
    pub fn alpha_vantage_output_size(&self) -> OutputSize {
        if self.alpha_vantage_full {
            OutputSize::Full
        } else {
            OutputSize::Compact
        }
    }

    /// Key with surrounding whitespace removed; blank keys count as missing.
    pub fn alpha_vantage_key(&self) -> Option<&str> {
        self.alpha_vantage_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache"),
            fixtures_dir: Some(PathBuf::from("data")),
            companies_file: Some(PathBuf::from("data/companies.json")),
            yahoo_enabled: true,
            alpha_vantage_key: None,
            alpha_vantage_full: false,
            http_timeout: Duration::from_secs(10),
            yahoo_min_interval: Duration::from_secs(1),
            alpha_vantage_min_interval: Duration::from_secs(12),
        }
    }
}
