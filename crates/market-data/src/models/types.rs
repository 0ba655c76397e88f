use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Which orchestration path produced a series.
///
/// `Real` walks every enabled provider (live first, fixtures last);
/// `Mock` is restricted to fixture providers. The two never share
/// session cache entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    Real,
    Mock,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Real => "real",
            DataMode::Mock => "mock",
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
