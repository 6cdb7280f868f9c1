//! Error types for the referral engine.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied identifier is missing or empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Empty key reached the cache boundary. Indicates a defect in the caller.
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Durable store unreachable or returned malformed data.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cache backend failure. External `CacheStore` backends (a remote cache
    /// that is down or timing out) return this; the caching repository
    /// absorbs it and reads the durable store instead.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Leaderboard deadline elapsed before every root was counted.
    #[error("Leaderboard computation timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
