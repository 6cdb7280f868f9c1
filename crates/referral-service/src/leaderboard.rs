//! Top-N leaderboard over forest roots.
//!
//! One blocking unit of work per root counts that root's direct referrals.
//! The units run on a `JoinSet` created for each call and are combined only
//! after all of them finish. The whole computation is bounded by a deadline;
//! on expiry the set is dropped, queued units are cancelled and late results
//! are discarded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::ordering;
use referral_core::config::{DEFAULT_LEADERBOARD_DEADLINE, DEFAULT_LEADERBOARD_SIZE};
use referral_core::{Error, LeaderboardEntry, ReferralConfig, Result};
use referral_store::ReferralRepository;

/// Computes the referral leaderboard concurrently.
pub struct LeaderboardComputer {
    repo: Arc<dyn ReferralRepository>,
    deadline: Duration,
    size: usize,
}

impl LeaderboardComputer {
    /// Top 5 within 20 seconds.
    pub fn new(repo: Arc<dyn ReferralRepository>) -> Self {
        Self {
            repo,
            deadline: DEFAULT_LEADERBOARD_DEADLINE,
            size: DEFAULT_LEADERBOARD_SIZE,
        }
    }

    pub fn with_config(repo: Arc<dyn ReferralRepository>, config: &ReferralConfig) -> Self {
        Self::new(repo)
            .with_deadline(config.leaderboard_deadline)
            .with_size(config.leaderboard_size)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Roots with at least one direct referral, most referrals first.
    ///
    /// Fails with [`Error::Timeout`] if the deadline elapses and with the
    /// first storage error any unit hits. Never returns a partial list.
    pub async fn compute_top5(&self) -> Result<Vec<LeaderboardEntry>> {
        let started = Instant::now();
        let entries = tokio::time::timeout(self.deadline, self.count_roots())
            .await
            .map_err(|_| {
                error!(
                    "Leaderboard computation exceeded {:?}; abandoning in-flight lookups",
                    self.deadline
                );
                Error::Timeout(self.deadline)
            })??;

        let counted = entries.len();
        let ranked = ordering::rank(entries, self.size);
        info!(
            "Leaderboard computed: {} roots counted, {} ranked in {}ms",
            counted,
            ranked.len(),
            started.elapsed().as_millis()
        );
        Ok(ranked)
    }

    /// Direct referral count for every root, in root order.
    async fn count_roots(&self) -> Result<Vec<LeaderboardEntry>> {
        let repo = Arc::clone(&self.repo);
        let roots = tokio::task::spawn_blocking(move || repo.find_roots())
            .await
            .map_err(|e| Error::Internal(format!("root lookup task failed: {}", e)))??;

        let mut units = JoinSet::new();
        for (position, root) in roots.into_iter().enumerate() {
            let repo = Arc::clone(&self.repo);
            units.spawn_blocking(move || {
                let num_referrals = repo.find_by_referrer(&root)?.len();
                debug!("Root {} has {} direct referrals", root, num_referrals);
                Ok::<_, Error>((position, LeaderboardEntry::new(root, num_referrals)))
            });
        }

        let mut results = Vec::with_capacity(units.len());
        while let Some(joined) = units.join_next().await {
            let result = joined
                .map_err(|e| Error::Internal(format!("leaderboard unit failed: {}", e)))??;
            results.push(result);
        }

        // Completion order is arbitrary; ties must follow root order.
        results.sort_by_key(|(position, _)| *position);
        Ok(results.into_iter().map(|(_, entry)| entry).collect())
    }
}
