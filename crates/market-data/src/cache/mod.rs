//! Caching tiers.
//!
//! - [`CacheStore`]: per-provider JSON files with TTL staleness checks
//! - [`SessionCache`]: in-memory memo keyed by (entity, mode)

mod session;
mod store;
mod ttl;

pub use session::SessionCache;
pub use store::CacheStore;
pub use ttl::{CacheKey, TtlClass};
