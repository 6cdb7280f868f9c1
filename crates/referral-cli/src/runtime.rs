//! Runtime lifecycle for the binary.

use std::future::Future;

/// Run `future` to completion on a fresh multi-threaded runtime, then shut the
/// runtime down without waiting for blocking tasks still in flight.
///
/// A leaderboard that timed out leaves its lookups running on the blocking
/// pool. Dropping the runtime normally would wait for them and delay the
/// timeout report until the slowest lookup returned.
pub fn block_on_detached<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use referral_core::{Error, ReferralEdge, Result};
    use referral_service::LeaderboardComputer;
    use referral_store::ReferralRepository;

    /// One root whose child lookup takes far longer than the deadline.
    struct HangingRepo {
        delay: Duration,
    }

    impl ReferralRepository for HangingRepo {
        fn add_referral(&self, edge: ReferralEdge) -> Result<ReferralEdge> {
            Ok(edge)
        }

        fn find_by_referrer(&self, _referrer_id: &str) -> Result<Vec<ReferralEdge>> {
            std::thread::sleep(self.delay);
            Ok(Vec::new())
        }

        fn find_roots(&self) -> Result<Vec<String>> {
            Ok(vec!["root".to_string()])
        }
    }

    #[test]
    fn test_timeout_reported_without_waiting_for_abandoned_lookups() {
        let computer = LeaderboardComputer::new(Arc::new(HangingRepo {
            delay: Duration::from_secs(3),
        }))
        .with_deadline(Duration::from_millis(200));

        let started = Instant::now();
        let result = block_on_detached(async move { computer.compute_top5().await }).unwrap();

        assert!(matches!(result, Err(Error::Timeout(_))));
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "runtime shutdown waited {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_returns_future_output() {
        assert_eq!(block_on_detached(async { 7 }).unwrap(), 7);
    }
}
