//! Provider capabilities and rate limiting configuration.
//!
//! This module defines structures for describing what a market data provider
//! can do and how it should be rate-limited.

use std::time::Duration;

use crate::models::Lookback;

/// Describes the capabilities of a market data provider.
///
/// Used by the registry to decide which providers take part in a request
/// and whether their answers go through the persistent cache.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Whether the provider talks to a network backend. Live providers are
    /// cached on disk, rate limited, and excluded from mock mode.
    pub live: bool,

    /// Whether the provider can produce a latest-quote snapshot.
    pub supports_latest: bool,

    /// Whether the provider can produce a company profile.
    pub supports_profile: bool,
}

/// Rate limiting configuration for a provider.
///
/// A hard floor between consecutive calls; bursts are never allowed.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Minimum delay between two dispatched requests.
    pub min_interval: Duration,
}

impl RateLimit {
    pub fn every(min_interval: Duration) -> Self {
        Self { min_interval }
    }
}

/// What a provider actually requests for a given lookback, and the cache
/// sub-key that response is stored under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesWindow {
    /// Window asked from the backend.
    pub fetch: Lookback,

    /// Cache sub-key (e.g. `1y_1d`, `compact`, `full`).
    pub cache_tag: String,
}

impl SeriesWindow {
    /// Request exactly `lookback` and key the cache by its label.
    pub fn exact(lookback: Lookback) -> Self {
        Self {
            fetch: lookback,
            cache_tag: lookback.label().to_string(),
        }
    }
}
