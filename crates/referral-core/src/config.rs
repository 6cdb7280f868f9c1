//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// TTL for cached child lists.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
/// Overall deadline for one leaderboard computation.
pub const DEFAULT_LEADERBOARD_DEADLINE: Duration = Duration::from_secs(20);
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Top-level referral engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralConfig {
    /// Directory holding `referrals.db`.
    pub data_dir: PathBuf,
    /// Expiry applied to every cache write.
    pub cache_ttl: Duration,
    /// Hard cutoff for `compute_top5`.
    pub leaderboard_deadline: Duration,
    /// Maximum number of leaderboard entries returned.
    pub leaderboard_size: usize,
    /// Maximum number of child lists held by the in-process cache.
    pub cache_capacity: usize,
}

impl ReferralConfig {
    /// Configuration with defaults rooted at `data_dir`. Does not touch the filesystem.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            cache_ttl: DEFAULT_CACHE_TTL,
            leaderboard_deadline: DEFAULT_LEADERBOARD_DEADLINE,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Create configuration from environment and defaults. Creates the data directory.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_vars(data_dir, |key| std::env::var(key).ok())
    }

    /// Same as [`ReferralConfig::from_env`] with an explicit variable lookup.
    pub fn from_vars<F>(data_dir: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(data_dir);

        if let Some(secs) = parse_var::<u64, _>(&lookup, "REFERRAL_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "REFERRAL_LEADERBOARD_DEADLINE_SECS")? {
            config.leaderboard_deadline = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var::<usize, _>(&lookup, "REFERRAL_LEADERBOARD_SIZE")? {
            config.leaderboard_size = size;
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, "REFERRAL_CACHE_CAPACITY")? {
            config.cache_capacity = capacity;
        }

        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(config)
    }

    /// Path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("referrals.db")
    }

    fn validate(&self) -> Result<()> {
        if self.leaderboard_deadline.is_zero() {
            return Err(Error::Config(
                "leaderboard deadline must be greater than zero".into(),
            ));
        }
        if self.leaderboard_size == 0 {
            return Err(Error::Config(
                "leaderboard size must be greater than zero".into(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(Error::Config(
                "cache capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} is not a valid number: {:?}", key, raw))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReferralConfig::from_vars(dir.path(), lookup(&[])).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.leaderboard_deadline, Duration::from_secs(20));
        assert_eq!(config.leaderboard_size, 5);
        assert_eq!(config.db_path(), dir.path().join("referrals.db"));
    }

    #[test]
    fn test_overrides_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        let config = ReferralConfig::from_vars(
            &data_dir,
            lookup(&[
                ("REFERRAL_CACHE_TTL_SECS", "60"),
                ("REFERRAL_LEADERBOARD_DEADLINE_SECS", " 3 "),
                ("REFERRAL_LEADERBOARD_SIZE", "10"),
            ]),
        )
        .unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.leaderboard_deadline, Duration::from_secs(3));
        assert_eq!(config.leaderboard_size, 10);
        assert!(data_dir.is_dir());
    }

    #[test]
    fn test_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReferralConfig::from_vars(
            dir.path(),
            lookup(&[("REFERRAL_CACHE_TTL_SECS", "an hour")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ReferralConfig::from_vars(
            dir.path(),
            lookup(&[("REFERRAL_LEADERBOARD_DEADLINE_SECS", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
