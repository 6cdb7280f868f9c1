//! Referral graph business logic.

use std::sync::Arc;

use tracing::{debug, info};

use crate::leaderboard::LeaderboardComputer;
use referral_core::{Error, LeaderboardEntry, ReferralConfig, ReferralEdge, ReferralSummary, Result};
use referral_store::ReferralRepository;

/// Records referral edges and answers referral queries.
///
/// Referrer existence is validated by the caller; this layer only rejects a
/// missing customer id.
pub struct ReferralGraphService {
    repo: Arc<dyn ReferralRepository>,
    leaderboard: LeaderboardComputer,
}

impl ReferralGraphService {
    pub fn new(repo: Arc<dyn ReferralRepository>) -> Self {
        let leaderboard = LeaderboardComputer::new(Arc::clone(&repo));
        Self { repo, leaderboard }
    }

    pub fn with_config(repo: Arc<dyn ReferralRepository>, config: &ReferralConfig) -> Self {
        let leaderboard = LeaderboardComputer::with_config(Arc::clone(&repo), config);
        Self { repo, leaderboard }
    }

    /// Record that `customer_id` was referred by `referrer_id` (or is a root
    /// when `referrer_id` is `None` or empty). Returns the stored edge with its
    /// server-assigned timestamp.
    pub fn add_referral(&self, customer_id: &str, referrer_id: Option<&str>) -> Result<ReferralEdge> {
        if customer_id.is_empty() {
            return Err(Error::InvalidInput(
                "Request must contain a valid Customer ID".into(),
            ));
        }

        let edge = ReferralEdge::new(customer_id, referrer_id);
        let edge = self.repo.add_referral(edge)?;
        info!(
            "Recorded referral {} <- {}",
            edge.customer_id,
            edge.referrer_id.as_deref().unwrap_or("(root)")
        );
        Ok(edge)
    }

    /// Edges whose referrer is `customer_id`. Empty when there are none.
    pub fn get_direct_referrals(&self, customer_id: &str) -> Result<Vec<ReferralEdge>> {
        self.repo.find_by_referrer(customer_id)
    }

    /// Per-generation descendant counts, three generations deep.
    ///
    /// Issues one lookup for the first level, one per first-level customer,
    /// and one per second-level customer. Never looks deeper, so a cycle
    /// cannot make it loop.
    pub fn get_referral_summary(&self, customer_id: &str) -> Result<ReferralSummary> {
        let first_level = self.repo.find_by_referrer(customer_id)?;
        let mut summary = ReferralSummary {
            level1: first_level.len(),
            ..Default::default()
        };

        for first in &first_level {
            let second_level = self.repo.find_by_referrer(&first.customer_id)?;
            summary.level2 += second_level.len();
            for second in &second_level {
                summary.level3 += self.repo.find_by_referrer(&second.customer_id)?.len();
            }
        }

        debug!("Referral summary for {}: {:?}", customer_id, summary);
        Ok(summary)
    }

    /// Top roots by direct referral count. See [`LeaderboardComputer::compute_top5`].
    pub async fn get_top5_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.leaderboard.compute_top5().await
    }
}
