//! End-to-end referral flow: SQLite store behind the cache-aside repository,
//! driven through the service the way an HTTP layer would call it.

use std::sync::Arc;

use referral_core::{Error, LeaderboardEntry, ReferralConfig, ReferralEdge, ReferralSummary};
use referral_service::ReferralGraphService;
use referral_store::{cache_key, CacheStore, CachingReferralRepository, MemoryCache, SqliteGraphStore};

struct Harness {
    service: ReferralGraphService,
    cache: Arc<MemoryCache>,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = ReferralConfig::from_vars(dir.path(), |_| None).unwrap();
    let store = SqliteGraphStore::open(config.db_path()).unwrap();
    let cache = Arc::new(MemoryCache::new(config.cache_capacity));
    let repo = Arc::new(CachingReferralRepository::with_ttl(
        store,
        cache.clone(),
        config.cache_ttl,
    ));
    Harness {
        service: ReferralGraphService::with_config(repo, &config),
        cache,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_full_referral_flow() {
    let h = harness();

    h.service.add_referral("alice", None).unwrap();
    h.service.add_referral("bob", Some("alice")).unwrap();
    h.service.add_referral("carol", Some("alice")).unwrap();
    h.service.add_referral("dave", Some("bob")).unwrap();
    h.service.add_referral("erin", Some("dave")).unwrap();
    h.service.add_referral("frank", None).unwrap();
    h.service.add_referral("grace", Some("frank")).unwrap();
    h.service.add_referral("heidi", None).unwrap();

    assert_eq!(
        h.service.get_referral_summary("alice").unwrap(),
        ReferralSummary {
            level1: 2,
            level2: 1,
            level3: 1
        }
    );

    // the summary populated the cache for alice's children
    assert!(h.cache.get(&cache_key("alice")).unwrap().is_some());

    let top = h.service.get_top5_leaderboard().await.unwrap();
    assert_eq!(
        top,
        vec![
            LeaderboardEntry::new("alice", 2),
            LeaderboardEntry::new("frank", 1)
        ]
    );

    // a new referral is reflected immediately despite the warm cache
    h.service.add_referral("ivan", Some("frank")).unwrap();
    h.service.add_referral("judy", Some("frank")).unwrap();
    let top = h.service.get_top5_leaderboard().await.unwrap();
    assert_eq!(top[0], LeaderboardEntry::new("frank", 3));
}

#[test]
fn test_cached_list_decodes_to_store_view() {
    let h = harness();
    h.service.add_referral("bob", Some("alice")).unwrap();

    let from_store = h.service.get_direct_referrals("alice").unwrap();
    let raw = h.cache.get(&cache_key("alice")).unwrap().unwrap();
    let from_cache: Vec<ReferralEdge> = serde_json::from_str(&raw).unwrap();
    assert_eq!(from_store, from_cache);
    assert_eq!(h.service.get_direct_referrals("alice").unwrap(), from_store);
}

#[test]
fn test_duplicate_customer_is_storage_error() {
    let h = harness();
    h.service.add_referral("bob", Some("alice")).unwrap();
    let err = h.service.add_referral("bob", Some("mallory")).unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(h.service.get_direct_referrals("mallory").unwrap().is_empty());
}
