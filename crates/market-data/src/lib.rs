//! Borsa Market Data Crate
//!
//! This crate provides the multi-source data acquisition and caching engine
//! behind the Borsa reporting front end.
//!
//! # Overview
//!
//! For any (ticker, range) request the engine decides whether to answer from
//! memory, from a TTL-bound on-disk cache, from a live provider or from
//! bundled fixtures, while respecting provider rate limits. As long as any
//! tier can produce data the caller gets data; otherwise it gets an empty
//! series, never an error.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | MarketDataEngine |  (context object, owned by the startup routine)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  SessionCache    |  (entity, mode) -> one-year series
//! +------------------+
//!          | miss
//!          v
//! +------------------+
//! | ProviderRegistry |  (priority order, first success wins)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | ProviderAdapter  | --> |   CacheStore     |  (per provider, TTL classes)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   RateLimiter    | --> |    Provider      |  (Yahoo, Alpha Vantage, fixtures)
//! +------------------+     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceBar`] / [`PriceSeries`] - Canonical daily OHLCV data
//! - [`LatestQuote`] - Latest trading snapshot
//! - [`CompanyProfile`] - Provider-sourced company metadata
//! - [`Company`] - Static reference registry entry
//! - [`DataMode`] - Live (`Real`) or forced fixture (`Mock`) path
//! - [`SeriesRange`] - Presentation ranges (1M, 3M, 1Y)

pub mod cache;
pub mod clock;
pub mod companies;
pub mod engine;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod settings;

// Re-export all public types from models
pub use models::{
    Company, CompanyProfile, DataMode, LatestQuote, Lookback, PriceBar, PriceSeries, ProviderId,
    SeriesRange,
};

pub use cache::{CacheKey, CacheStore, SessionCache, TtlClass};
pub use clock::{Clock, ManualClock, SystemClock};
pub use companies::CompanyRegistry;
pub use engine::{EngineStatus, MarketDataEngine, ProviderStatus, RefreshReport};
pub use errors::{EngineError, FailureKind, MarketDataError};
pub use settings::EngineSettings;

// Re-export provider types
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::fixture::FixtureProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{MarketDataProvider, ProviderCapabilities, RateLimit, SeriesWindow};

// Re-export registry types
pub use registry::{
    FallbackState, FetchDiagnostics, ProviderAdapter, ProviderAttempt, ProviderRegistry,
    RateLimiter, SeriesValidator, SkipReason, ValidationSeverity,
};
