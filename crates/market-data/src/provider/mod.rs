//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Provider capabilities and rate limiting configuration
//! - Concrete providers: Yahoo (primary live), Alpha Vantage (secondary
//!   live) and bundled fixtures (static)
//!
//! # Architecture
//!
//! Providers only fetch and normalize. The registry wraps each one with its
//! persistent cache, rate limiter and validator, and walks them in priority
//! order. Canonical tickers go in; each provider translates them to its own
//! symbol convention internally (see [`symbols`]).

mod capabilities;
mod traits;

pub mod alpha_vantage;
pub mod fixture;
pub mod symbols;
pub mod yahoo;

// Re-exports
pub use capabilities::{ProviderCapabilities, RateLimit, SeriesWindow};
pub use traits::MarketDataProvider;
