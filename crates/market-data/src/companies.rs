//! Static reference registry of tracked companies.
//!
//! Loaded once from a JSON array and kept read-only for the engine's
//! lifetime. Lookups are case-insensitive on the ticker.

use std::fs;
use std::path::Path;

use log::info;

use crate::errors::EngineError;
use crate::models::Company;
use crate::provider::symbols::canonical;

#[derive(Clone, Debug, Default)]
pub struct CompanyRegistry {
    companies: Vec<Company>,
}

impl CompanyRegistry {
    /// Load `[{name, ticker, exchange, sector, hq_province}]` from `path`.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let registry_error = |message: String| EngineError::Registry {
            path: path.to_path_buf(),
            message,
        };

        let text = fs::read_to_string(path).map_err(|e| registry_error(e.to_string()))?;
        let companies: Vec<Company> =
            serde_json::from_str(&text).map_err(|e| registry_error(e.to_string()))?;

        info!(
            "Loaded {} companies from {}",
            companies.len(),
            path.display()
        );
        Ok(Self::from_companies(companies))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_companies(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    pub fn find(&self, ticker: &str) -> Option<&Company> {
        let ticker = canonical(ticker);
        self.companies
            .iter()
            .find(|c| c.ticker.eq_ignore_ascii_case(&ticker))
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.find(ticker).is_some()
    }

    pub fn all(&self) -> &[Company] {
        &self.companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
