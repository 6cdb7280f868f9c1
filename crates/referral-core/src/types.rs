//! Referral forest data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// "`customer_id` was referred by `referrer_id` at `referred_at`".
///
/// A customer has at most one edge, which makes the referral relation a
/// forest. An edge without a referrer marks a forest root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralEdge {
    pub customer_id: String,
    #[serde(default)]
    pub referrer_id: Option<String>,
    pub referred_at: DateTime<Utc>,
}

impl ReferralEdge {
    /// Create an edge stamped with the current time.
    ///
    /// An empty `referrer_id` is normalized to `None`.
    pub fn new(customer_id: impl Into<String>, referrer_id: Option<&str>) -> Self {
        Self {
            customer_id: customer_id.into(),
            referrer_id: referrer_id
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            referred_at: Utc::now(),
        }
    }

    /// Whether this edge marks a forest root (no referrer).
    pub fn is_root(&self) -> bool {
        self.referrer_id.is_none()
    }
}

/// Descendant counts for the first three generations below a customer.
///
/// Each level counts only that generation; the levels are not cumulative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralSummary {
    #[serde(rename = "numFirstLevelReferrals")]
    pub level1: usize,
    #[serde(rename = "numSecondLevelReferrals")]
    pub level2: usize,
    #[serde(rename = "numThirdLevelReferrals")]
    pub level3: usize,
}

/// A forest root ranked by its direct referral count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub customer_id: String,
    pub num_referrals: usize,
}

impl LeaderboardEntry {
    pub fn new(customer_id: impl Into<String>, num_referrals: usize) -> Self {
        Self {
            customer_id: customer_id.into(),
            num_referrals,
        }
    }
}
