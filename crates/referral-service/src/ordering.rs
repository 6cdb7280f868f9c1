//! Leaderboard ordering.

use std::cmp::Ordering;

use referral_core::LeaderboardEntry;

/// Ascending by `num_referrals`. Ties compare equal.
pub fn by_num_referrals(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    a.num_referrals.cmp(&b.num_referrals)
}

/// Drop zero-referral entries, sort descending (stable), keep the first `limit`.
pub fn rank(entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<LeaderboardEntry> = entries
        .into_iter()
        .filter(|e| e.num_referrals > 0)
        .collect();
    ranked.sort_by(|a, b| by_num_referrals(a, b).reverse());
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(entries: &[LeaderboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.customer_id.as_str()).collect()
    }

    #[test]
    fn test_ascending_comparison() {
        let low = LeaderboardEntry::new("low", 1);
        let high = LeaderboardEntry::new("high", 4);
        assert_eq!(by_num_referrals(&low, &high), Ordering::Less);
        assert_eq!(by_num_referrals(&high, &low), Ordering::Greater);
        assert_eq!(
            by_num_referrals(&low, &LeaderboardEntry::new("other", 1)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_rank_filters_zero_and_sorts_descending() {
        let ranked = rank(
            vec![
                LeaderboardEntry::new("r1", 3),
                LeaderboardEntry::new("r2", 5),
                LeaderboardEntry::new("r3", 0),
            ],
            5,
        );
        assert_eq!(ids(&ranked), vec!["r2", "r1"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(
            vec![
                LeaderboardEntry::new("first", 2),
                LeaderboardEntry::new("big", 9),
                LeaderboardEntry::new("second", 2),
                LeaderboardEntry::new("third", 2),
            ],
            5,
        );
        assert_eq!(ids(&ranked), vec!["big", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_truncates() {
        let entries = (1..=8)
            .map(|n| LeaderboardEntry::new(format!("c{}", n), n))
            .collect();
        let ranked = rank(entries, 5);
        assert_eq!(ids(&ranked), vec!["c8", "c7", "c6", "c5", "c4"]);
    }
}
