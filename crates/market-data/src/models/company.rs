use serde::{Deserialize, Serialize};

/// Static reference entry for a tracked company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Display name
    pub name: String,

    /// Canonical ticker, Yahoo-style market suffix included (e.g. "CABK.MC")
    pub ticker: String,

    pub exchange: String,

    pub sector: String,

    /// Region / province of the headquarters
    #[serde(alias = "region")]
    pub hq_province: String,
}
