//! Market data models
//!
//! This module contains the canonical data types handed to callers:
//! - `types` - Provider identifiers and the session `DataMode`
//! - `price` - Daily bars and normalized series (PriceBar, PriceSeries)
//! - `range` - Lookback windows and presentation ranges (Lookback, SeriesRange)
//! - `quote` - Latest trading snapshot (LatestQuote)
//! - `profile` - Provider-sourced company metadata (CompanyProfile)
//! - `company` - Static reference registry entry (Company)

mod company;
mod price;
mod profile;
mod quote;
mod range;
mod types;

pub use company::Company;
pub use price::{PriceBar, PriceSeries};
pub use profile::CompanyProfile;
pub use quote::LatestQuote;
pub use range::{Lookback, SeriesRange};
pub use types::{DataMode, ProviderId};
