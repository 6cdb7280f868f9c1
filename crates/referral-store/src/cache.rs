//! Key/value cache with per-entry expiry and explicit deletion.
//!
//! `CacheStore` is the boundary the caching repository talks to. `MemoryCache`
//! is the in-process implementation: bounded, oldest-first eviction, TTL
//! checked lazily on read.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use referral_core::{Error, Result};

/// Cache backend. All operations reject an empty key with [`Error::InvalidKey`].
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl`.
    fn set(&self, key: &str, ttl: Duration, value: String) -> Result<()>;

    /// Fetch a live value. Expired entries read as absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    fn set(&self, key: &str, ttl: Duration, value: String) -> Result<()> {
        (**self).set(key, ttl, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey("cache key must not be empty".into()));
    }
    Ok(())
}

struct CacheEntry {
    value: String,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Thread-safe in-process cache.
pub struct MemoryCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
    max_size: usize,
}

impl MemoryCache {
    /// Create a cache holding at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size.min(1024)),
                order: VecDeque::new(),
                max_size: max_size.max(1),
            }),
        }
    }

    /// Number of entries held, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(referral_core::config::DEFAULT_CACHE_CAPACITY)
    }
}

impl CacheStore for MemoryCache {
    fn set(&self, key: &str, ttl: Duration, value: String) -> Result<()> {
        check_key(key)?;
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(key) {
            inner.order.retain(|k| k != key);
        } else {
            while inner.entries.len() >= inner.max_size {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        inner.order.push_back(key.to_string());
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        let mut inner = self.inner.lock();

        let expired = inner.entries.get(key).map(CacheEntry::is_expired);
        match expired {
            Some(false) => Ok(inner.entries.get(key).map(|e| e.value.clone())),
            Some(true) => {
                inner.entries.remove(key);
                inner.order.retain(|k| k != key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        check_key(key)?;
        let mut inner = self.inner.lock();
        if inner.entries.remove(key).is_some() {
            inner.order.retain(|k| k != key);
        }
        Ok(())
    }
}
