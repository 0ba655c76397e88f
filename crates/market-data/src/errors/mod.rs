//! Error types for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: the tagged failure an adapter hands back to the orchestrator
//! - [`FailureKind`]: classification used for logging and diagnostics
//! - [`EngineError`]: conditions surfaced to the presentation layer

mod retry;

pub use retry::FailureKind;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to a single provider.
///
/// These never cross the orchestrator boundary: they are logged, recorded
/// in diagnostics and answered by trying the next provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol exists but has no bars in the requested window.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider does not implement the operation.
    #[error("{operation} not supported by {provider}")]
    NotSupported {
        operation: String,
        provider: String,
    },

    /// The provider reported a quota / frequency limit.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The response did not match the provider's schema.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        provider: String,
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    pub fn provider_error(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn not_supported(provider: &str, operation: &str) -> Self {
        Self::NotSupported {
            operation: operation.to_string(),
            provider: provider.to_string(),
        }
    }

    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use borsa_market_data::errors::{FailureKind, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.kind(), FailureKind::Transient);
    ///
    /// let error = MarketDataError::SymbolNotFound("NOPE.MC".to_string());
    /// assert_eq!(error.kind(), FailureKind::NotFound);
    /// ```
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SymbolNotFound(_) | Self::NoDataForRange => FailureKind::NotFound,

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::Network(_) => FailureKind::Transient,

            Self::MalformedResponse { .. } => FailureKind::Malformed,

            Self::NotSupported { .. } => FailureKind::Unsupported,
        }
    }
}

/// Conditions the presentation layer turns into user-visible messages.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The entity is not part of the reference registry.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// No tier could produce data for the entity.
    #[error("No data for {ticker} ({range})")]
    NoData { ticker: String, range: String },

    /// Range selector outside 1M / 3M / 1Y.
    #[error("Invalid range '{0}', expected one of 1M, 3M, 1Y")]
    InvalidRange(String),

    /// The reference registry could not be loaded.
    #[error("Failed to load company registry {path}: {message}")]
    Registry { path: PathBuf, message: String },
}
