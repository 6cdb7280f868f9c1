//! Storage interfaces.
//!
//! `GraphStore` is the durable edge store the caching layer sits on.
//! `ReferralRepository` is what the service layer talks to; both the direct
//! store and the caching wrapper implement it.

use std::sync::Arc;

use referral_core::{ReferralEdge, Result};

/// Durable, authoritative store of referral edges.
pub trait GraphStore: Send + Sync {
    /// Persist a new edge. Fails if the customer already has one.
    fn save(&self, edge: &ReferralEdge) -> Result<()>;

    /// All edges whose referrer is `referrer_id`, in insertion order.
    fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>>;

    /// Customer ids of every forest root, in insertion order.
    fn find_roots(&self) -> Result<Vec<String>>;
}

impl<T: GraphStore + ?Sized> GraphStore for Arc<T> {
    fn save(&self, edge: &ReferralEdge) -> Result<()> {
        (**self).save(edge)
    }

    fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>> {
        (**self).find_by_referrer(referrer_id)
    }

    fn find_roots(&self) -> Result<Vec<String>> {
        (**self).find_roots()
    }
}

/// Edge persistence as seen by the service layer.
///
/// Implemented by [`crate::SqliteGraphStore`] (direct) and by
/// [`crate::CachingReferralRepository`], which wraps a [`GraphStore`].
pub trait ReferralRepository: Send + Sync {
    /// Persist a new edge and return it.
    fn add_referral(&self, edge: ReferralEdge) -> Result<ReferralEdge>;

    /// All edges whose referrer is `referrer_id`, in insertion order.
    fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>>;

    /// Customer ids of every forest root, in insertion order.
    fn find_roots(&self) -> Result<Vec<String>>;
}

impl<T: ReferralRepository + ?Sized> ReferralRepository for Arc<T> {
    fn add_referral(&self, edge: ReferralEdge) -> Result<ReferralEdge> {
        (**self).add_referral(edge)
    }

    fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>> {
        (**self).find_by_referrer(referrer_id)
    }

    fn find_roots(&self) -> Result<Vec<String>> {
        (**self).find_roots()
    }
}
