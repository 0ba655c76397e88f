use serde::{Deserialize, Serialize};

/// Company metadata from market data providers
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Canonical ticker
    pub ticker: String,

    /// Provider that supplied this profile (e.g., "YAHOO", "ALPHA_VANTAGE")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Company name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Business sector (e.g., "Financial Services")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Industry within sector (e.g., "Banks - Regional")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    /// Listing exchange as reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    /// Trading currency (ISO 4217)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Business description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Market capitalization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    /// Price-to-earnings ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,

    /// Dividend yield (as decimal, e.g., 0.025 for 2.5%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
}

impl CompanyProfile {
    pub fn new(ticker: impl Into<String>, source: &str) -> Self {
        Self {
            ticker: ticker.into(),
            source: Some(source.to_string()),
            ..Default::default()
        }
    }
}
