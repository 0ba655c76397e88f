//! Provider-specific symbol translation.
//!
//! Canonical tickers use Yahoo-style market suffixes (`CABK.MC`). Each
//! provider rewrites them to its own convention right before the request;
//! the translated symbol never reaches canonical data.

/// Yahoo suffix to Alpha Vantage suffix.
const ALPHA_VANTAGE_SUFFIXES: &[(&str, &str)] = &[
    (".MC", ".MAD"),
    (".L", ".LON"),
    (".DE", ".DEX"),
    (".TO", ".TRT"),
    (".PA", ".PAR"),
];

/// Canonical form: trimmed and upper-cased.
pub fn canonical(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Yahoo uses the canonical form as-is.
pub fn to_yahoo_symbol(ticker: &str) -> String {
    canonical(ticker)
}

pub fn to_alpha_vantage_symbol(ticker: &str) -> String {
    let ticker = canonical(ticker);
    for (yahoo, alpha_vantage) in ALPHA_VANTAGE_SUFFIXES {
        if let Some(base) = ticker.strip_suffix(yahoo) {
            if !base.is_empty() {
                return format!("{}{}", base, alpha_vantage);
            }
        }
    }
    ticker
}
