//! Cache-aside repository.
//!
//! Reads of a referrer's child list go to the cache first and populate it on
//! miss. Writes invalidate the child list of the edge's referrer. The cache is
//! never authoritative: any cache fault falls back to the wrapped store.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::cache::CacheStore;
use crate::repository::{GraphStore, ReferralRepository};
use referral_core::config::DEFAULT_CACHE_TTL;
use referral_core::{Error, ReferralEdge, Result};

/// Prefix for cached child lists. Reads, writes and invalidation all go
/// through [`cache_key`].
pub const REFERRAL_KEY_PREFIX: &str = "ReferralKey::";

/// Cache key holding the child list of `referrer_id`.
pub fn cache_key(referrer_id: &str) -> String {
    format!("{}{}", REFERRAL_KEY_PREFIX, referrer_id)
}

/// Caching decorator over a durable [`GraphStore`].
pub struct CachingReferralRepository<S, C> {
    store: S,
    cache: C,
    ttl: Duration,
}

impl<S: GraphStore, C: CacheStore> CachingReferralRepository<S, C> {
    /// Wrap `store` with `cache`, using the default one-hour TTL.
    pub fn new(store: S, cache: C) -> Self {
        Self::with_ttl(store, cache, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(store: S, cache: C, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Cached child list for `key`, or `None` on miss, corrupt entry, or cache fault.
    /// The flag is false when the cache itself failed.
    fn read_cached(&self, key: &str) -> (Option<Vec<ReferralEdge>>, bool) {
        match self.cache.get(key) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<ReferralEdge>>(&json) {
                Ok(edges) => {
                    debug!("Cache hit for {}: {} edges", key, edges.len());
                    (Some(edges), true)
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                    (None, true)
                }
            },
            Ok(None) => {
                debug!("Cache miss for {}", key);
                (None, true)
            }
            Err(e) => {
                cache_fault("get", key, &e);
                (None, false)
            }
        }
    }

    fn populate(&self, key: &str, edges: &[ReferralEdge]) {
        let json = match serde_json::to_string(edges) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode child list for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.cache.set(key, self.ttl, json) {
            cache_fault("set", key, &e);
        }
    }

    fn invalidate(&self, referrer_id: &str) {
        let key = cache_key(referrer_id);
        match self.cache.delete(&key) {
            Ok(()) => debug!("Invalidated {}", key),
            Err(e) => cache_fault("delete", &key, &e),
        }
    }
}

impl<S: GraphStore, C: CacheStore> ReferralRepository for CachingReferralRepository<S, C> {
    fn add_referral(&self, edge: ReferralEdge) -> Result<ReferralEdge> {
        if let Some(referrer) = &edge.referrer_id {
            self.invalidate(referrer);
        }
        self.store.save(&edge)?;
        // A read racing the save may have repopulated the pre-write list.
        if let Some(referrer) = &edge.referrer_id {
            self.invalidate(referrer);
        }
        Ok(edge)
    }

    fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>> {
        let key = cache_key(referrer_id);
        let (cached, cache_healthy) = self.read_cached(&key);
        if let Some(edges) = cached {
            return Ok(edges);
        }

        let edges = self.store.find_by_referrer(referrer_id)?;
        if cache_healthy {
            self.populate(&key, &edges);
        }
        Ok(edges)
    }

    fn find_roots(&self) -> Result<Vec<String>> {
        self.store.find_roots()
    }
}

fn cache_fault(op: &str, key: &str, e: &Error) {
    match e {
        Error::InvalidKey(_) => error!("Cache {} rejected key {:?}: {}", op, key, e),
        _ => warn!("Cache {} failed for {}, using store: {}", op, key, e),
    }
}
