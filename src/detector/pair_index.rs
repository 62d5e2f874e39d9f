//! Incremental per-mint venue index (spec §4.5).
//!
//! Kept current by the lifecycle FSM rather than rebuilt per detection
//! pass: a pool enters on activation and leaves once it stops being
//! routable, so the detector's mint loop never scans a pool that cannot
//! currently be simulated.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::CacheRegistry;
use crate::model::{PoolLifecycleState, Venue};
use crate::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VenuePool {
    pub venue: Venue,
    pub pool: Pubkey,
}

/// `{mint -> set<(venue, pool)>}` (spec §4.5).
pub struct PairIndex {
    by_mint: RwLock<HashMap<Pubkey, HashSet<VenuePool>>>,
    pool_mints: RwLock<HashMap<Pubkey, (Pubkey, Pubkey)>>,
}

impl PairIndex {
    pub fn new() -> Self {
        Self {
            by_mint: RwLock::new(HashMap::new()),
            pool_mints: RwLock::new(HashMap::new()),
        }
    }

    pub fn add(&self, base_mint: Pubkey, quote_mint: Pubkey, venue: Venue, pool: Pubkey) {
        let vp = VenuePool { venue, pool };
        self.by_mint.write().entry(base_mint).or_default().insert(vp);
        self.by_mint.write().entry(quote_mint).or_default().insert(vp);
        self.pool_mints.write().insert(pool, (base_mint, quote_mint));
    }

    pub fn remove(&self, pool: &Pubkey) {
        let Some((base_mint, quote_mint)) = self.pool_mints.write().remove(pool) else {
            return;
        };
        let vp_matches = |vp: &VenuePool| vp.pool == *pool;
        let mut by_mint = self.by_mint.write();
        if let Some(set) = by_mint.get_mut(&base_mint) {
            set.retain(|vp| !vp_matches(vp));
            if set.is_empty() {
                by_mint.remove(&base_mint);
            }
        }
        if let Some(set) = by_mint.get_mut(&quote_mint) {
            set.retain(|vp| !vp_matches(vp));
            if set.is_empty() {
                by_mint.remove(&quote_mint);
            }
        }
    }

    pub fn pools_for_mint(&self, mint: &Pubkey) -> HashSet<VenuePool> {
        self.by_mint.read().get(mint).cloned().unwrap_or_default()
    }

    /// Mints with at least two distinct pools -- the only candidates the
    /// detection loop needs to visit.
    pub fn multi_venue_mints(&self) -> Vec<Pubkey> {
        self.by_mint
            .read()
            .iter()
            .filter(|(_, pools)| pools.len() >= 2)
            .map(|(mint, _)| *mint)
            .collect()
    }
}

impl Default for PairIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire a [`PairIndex`] to `registry`'s lifecycle transitions: a pool is
/// added the moment it becomes routable (`ACTIVE`/`REFRESHING`) and removed
/// once it stops being (`FROZEN_TOPOLOGY`), matching spec §5's "updated
/// synchronously after a cache write that changes a pool's lifecycle
/// state."
pub fn install(index: Arc<PairIndex>, registry: Arc<CacheRegistry>) {
    registry.lifecycle.set_listener(Arc::new(move |pool, venue, from, to| {
        let was_routable = from.is_routable(false);
        let is_routable = to.is_routable(false);
        if is_routable && !was_routable {
            if let Some(entry) = registry.pools.get(&pool) {
                index.add(entry.payload.base_mint(), entry.payload.quote_mint(), venue, pool);
            }
        } else if was_routable && !is_routable {
            index.remove(&pool);
        }
    }));
}
