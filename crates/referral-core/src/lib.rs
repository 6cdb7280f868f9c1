//! Referral Core: data model, error taxonomy, configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::ReferralConfig;
pub use error::{Error, Result};
pub use types::{LeaderboardEntry, ReferralEdge, ReferralSummary};
