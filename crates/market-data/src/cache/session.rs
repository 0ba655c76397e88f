//! In-memory series memo for the life of the process.

use dashmap::DashMap;

use super::ttl::normalize_entity;
use crate::models::{DataMode, PriceSeries};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SessionKey {
    entity: String,
    mode: DataMode,
}

impl SessionKey {
    fn new(entity: &str, mode: DataMode) -> Self {
        Self {
            entity: normalize_entity(entity),
            mode,
        }
    }
}

/// Process-lifetime memo of series keyed by (entity, mode).
///
/// A forced mock answer never shadows a live one for the same entity and
/// vice versa.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: DashMap<SessionKey, PriceSeries>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &str, mode: DataMode) -> Option<PriceSeries> {
        self.entries
            .get(&SessionKey::new(entity, mode))
            .map(|entry| entry.value().clone())
    }

    pub fn put(&self, entity: &str, mode: DataMode, series: PriceSeries) {
        self.entries.insert(SessionKey::new(entity, mode), series);
    }

    /// Drops both modes for exactly this entity.
    pub fn invalidate_entity(&self, entity: &str) -> usize {
        let entity = normalize_entity(entity);
        let before = self.entries.len();
        self.entries.retain(|key, _| key.entity != entity);
        before - self.entries.len()
    }

    pub fn invalidate_mode(&self, mode: DataMode) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.mode != mode);
        before - self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
