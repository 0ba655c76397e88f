//! Freshness classes and cache record addressing.

use std::fmt;

use chrono::Duration;

/// Freshness class of a cached record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TtlClass {
    /// Company metadata (profile / overview): 1440 minutes.
    Metadata,
    /// Daily price series: 60 minutes.
    Historical,
    /// Latest quote snapshot: 5 minutes.
    Quote,
}

impl TtlClass {
    pub const ALL: [TtlClass; 3] = [TtlClass::Metadata, TtlClass::Historical, TtlClass::Quote];

    pub const fn minutes(&self) -> i64 {
        match self {
            TtlClass::Metadata => 1440,
            TtlClass::Historical => 60,
            TtlClass::Quote => 5,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    /// Segment used in cache file names.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TtlClass::Metadata => "info",
            TtlClass::Historical => "prices",
            TtlClass::Quote => "quote",
        }
    }

    /// A record is served while its age has not passed the TTL. A record
    /// exactly TTL old is still fresh; one tick later it is stale.
    pub fn is_fresh(&self, age: Duration) -> bool {
        age <= self.ttl()
    }
}

impl fmt::Display for TtlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one cache record: (entity, TTL class, optional sub-key).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    entity: String,
    class: TtlClass,
    sub_key: Option<String>,
}

impl CacheKey {
    pub fn new(entity: &str, class: TtlClass) -> Self {
        Self {
            entity: normalize_entity(entity),
            class,
            sub_key: None,
        }
    }

    /// Attach a sub-key such as the output size or requested window.
    pub fn with_sub_key(mut self, sub_key: impl Into<String>) -> Self {
        self.sub_key = Some(sub_key.into());
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn class(&self) -> TtlClass {
        self.class
    }

    pub fn sub_key(&self) -> Option<&str> {
        self.sub_key.as_deref()
    }

    /// `<ENTITY>__<class>[__<sub>].json`
    pub fn file_name(&self) -> String {
        match &self.sub_key {
            Some(sub) => format!(
                "{}__{}__{}.json",
                sanitize(&self.entity),
                self.class.as_str(),
                sanitize(sub)
            ),
            None => format!("{}__{}.json", sanitize(&self.entity), self.class.as_str()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.class)?;
        if let Some(sub) = &self.sub_key {
            write!(f, "/{}", sub)?;
        }
        Ok(())
    }
}

pub(crate) fn normalize_entity(entity: &str) -> String {
    entity.trim().to_uppercase()
}

/// File-name prefix shared by every record of `entity`.
pub(crate) fn entity_prefix(entity: &str) -> String {
    format!("{}__", sanitize(&normalize_entity(entity)))
}

/// Percent-encode a name segment. `_` is escaped too, so the `__`
/// separator never occurs inside a segment and distinct tickers never share
/// a file.
fn sanitize(segment: &str) -> String {
    urlencoding::encode(segment).replace('_', "%5F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_minutes() {
        assert_eq!(TtlClass::Metadata.minutes(), 1440);
        assert_eq!(TtlClass::Historical.minutes(), 60);
        assert_eq!(TtlClass::Quote.minutes(), 5);
    }

    #[test]
    fn test_is_fresh_boundaries() {
        let class = TtlClass::Historical;
        assert!(class.is_fresh(Duration::minutes(59)));
        assert!(class.is_fresh(Duration::minutes(60)));
        assert!(!class.is_fresh(Duration::minutes(60) + Duration::seconds(1)));
        assert!(!class.is_fresh(Duration::minutes(61)));
    }

    #[test]
    fn test_file_name() {
        let key = CacheKey::new("cabk.mc", TtlClass::Historical);
        assert_eq!(key.file_name(), "CABK.MC__prices.json");

        let key = CacheKey::new("CABK.MC", TtlClass::Historical).with_sub_key("compact");
        assert_eq!(key.file_name(), "CABK.MC__prices__compact.json");

        let key = CacheKey::new("BRK/B", TtlClass::Metadata);
        assert_eq!(key.file_name(), "BRK%2FB__info.json");

        let key = CacheKey::new("CABK.MC", TtlClass::Historical).with_sub_key("1y_1d");
        assert_eq!(key.file_name(), "CABK.MC__prices__1y%5F1d.json");
    }

    #[test]
    fn test_distinct_entities_get_distinct_files() {
        let slash = CacheKey::new("BRK/B", TtlClass::Quote).file_name();
        let underscore = CacheKey::new("BRK_B", TtlClass::Quote).file_name();
        assert_ne!(slash, underscore);
    }

    #[test]
    fn test_entity_prefix_ignores_punctuated_neighbours() {
        let prefix = entity_prefix("A");
        for other in ["A^", "A_", "A_B", "A/"] {
            let name = CacheKey::new(other, TtlClass::Historical).file_name();
            assert!(!name.starts_with(&prefix), "{} matched {}", name, prefix);
        }
    }

    #[test]
    fn test_entity_prefix_is_exact() {
        let prefix = entity_prefix("CABK");
        assert!(!CacheKey::new("CABK.MC", TtlClass::Quote)
            .file_name()
            .starts_with(&prefix));
        assert!(CacheKey::new("cabk", TtlClass::Quote)
            .file_name()
            .starts_with(&prefix));
    }
}
