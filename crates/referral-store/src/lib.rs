//! Referral Store: durable SQLite edge store, TTL cache, cache-aside repository.

pub mod cache;
pub mod caching;
pub mod repository;
pub mod schema;
pub mod sqlite;

pub use cache::{CacheStore, MemoryCache};
pub use caching::{cache_key, CachingReferralRepository, REFERRAL_KEY_PREFIX};
pub use repository::{GraphStore, ReferralRepository};
pub use sqlite::SqliteGraphStore;
