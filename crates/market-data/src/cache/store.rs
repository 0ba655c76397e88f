//! File-backed TTL cache.
//!
//! One JSON record per [`CacheKey`] under the store's directory. Records are
//! overwritten in place and never deleted on read: a stale record is a miss
//! until the next successful fetch replaces it. Any I/O or decoding failure is
//! logged and reported as a miss.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::ttl::{entity_prefix, CacheKey};
use crate::clock::Clock;

#[derive(Error, Debug)]
enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk record shape.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    key: String,
    written_at: DateTime<Utc>,
    payload: Value,
}

pub struct CacheStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Returns the payload if the record exists, decodes, and is still fresh.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let path = self.path_for(key);
        let record = match self.read_record(&path) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {} ({}): {}", key, path.display(), e);
                return None;
            }
        };

        let age = self.clock.now() - record.written_at;
        if !key.class().is_fresh(age) {
            debug!(
                "Cache stale for {} (age {}m, ttl {}m)",
                key,
                age.num_minutes(),
                key.class().minutes()
            );
            return None;
        }

        match serde_json::from_value(record.payload) {
            Ok(payload) => {
                debug!("Cache hit for {} (age {}m)", key, age.num_minutes());
                Some(payload)
            }
            Err(e) => {
                warn!("Cache payload for {} did not decode: {}", key, e);
                None
            }
        }
    }

    /// Overwrites the record for `key`, stamping it with the current time.
    pub fn put<T: Serialize>(&self, key: &CacheKey, payload: &T) {
        if let Err(e) = self.write_record(key, payload) {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }

    pub fn invalidate(&self, key: &CacheKey) {
        let path = self.path_for(key);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove cache file {}: {}", path.display(), e);
            }
        }
    }

    /// Removes every record of one entity. Returns the number removed.
    pub fn invalidate_entity(&self, entity: &str) -> usize {
        let prefix = entity_prefix(entity);
        self.remove_matching(|name| name.starts_with(&prefix))
    }

    /// Removes every record in the store. Returns the number removed.
    pub fn invalidate_all(&self) -> usize {
        self.remove_matching(|_| true)
    }

    /// Number of records on disk, fresh or stale.
    pub fn len(&self) -> usize {
        self.record_names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_record(&self, path: &Path) -> Result<Option<CacheRecord>, CacheError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_record<T: Serialize>(&self, key: &CacheKey, payload: &T) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;

        let record = CacheRecord {
            key: key.to_string(),
            written_at: self.clock.now(),
            payload: serde_json::to_value(payload)?,
        };

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&record)?)?;
        fs::rename(&tmp, &path)?;
        debug!("Cached {} at {}", key, path.display());
        Ok(())
    }

    fn record_names(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to list cache dir {}: {}", self.dir.display(), e);
                }
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".json"))
            .collect()
    }

    fn remove_matching(&self, matches: impl Fn(&str) -> bool) -> usize {
        let mut removed = 0;
        for name in self.record_names().into_iter().filter(|n| matches(n)) {
            let path = self.dir.join(&name);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove cache file {}: {}", path.display(), e),
            }
        }
        removed
    }
}
