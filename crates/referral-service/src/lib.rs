//! Referral Service: edge validation, three-level summaries, concurrent leaderboard.

pub mod leaderboard;
pub mod ordering;
pub mod service;

pub use leaderboard::LeaderboardComputer;
pub use service::ReferralGraphService;
