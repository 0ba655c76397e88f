//! Provider registry module.
//!
//! This module provides orchestration for market data providers, including:
//! - Provider registration and priority ordering
//! - Minimum-interval rate limiting per provider
//! - Persistent caching around each live provider
//! - Price data validation
//! - Fallback diagnostics

mod adapter;
mod rate_limiter;
mod registry;
mod skip_reason;
mod validator;

pub use adapter::ProviderAdapter;
pub use rate_limiter::RateLimiter;
pub use registry::ProviderRegistry;
pub use skip_reason::{FallbackState, FetchDiagnostics, ProviderAttempt, SkipReason};
pub use validator::{SeriesValidator, ValidationIssue, ValidationSeverity, ValidatorConfig};
