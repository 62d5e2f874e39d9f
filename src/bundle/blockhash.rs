//! Blockhash lifecycle (spec §4.6): distinguish "cached" from "refresh
//! needed" and honor a forced refresh on an expired-blockhash failure.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blockhash(pub [u8; 32]);

/// Caches the most recently fetched blockhash and its age, so the builder
/// only re-fetches when genuinely stale or forced.
pub struct BlockhashCache {
    current: Option<(Blockhash, Instant)>,
    min_refresh_interval: Duration,
}

impl BlockhashCache {
    pub fn new(min_refresh_interval: Duration) -> Self {
        Self { current: None, min_refresh_interval }
    }

    /// `true` iff a fresh fetch is required: no cached hash, its age
    /// exceeds `minRefreshIntervalMs`, or `force` was requested (e.g. after
    /// an `expired_blockhash` submission failure).
    pub fn needs_refresh(&self, now: Instant, force: bool) -> bool {
        if force {
            return true;
        }
        match self.current {
            None => true,
            Some((_, fetched_at)) => now.saturating_duration_since(fetched_at) >= self.min_refresh_interval,
        }
    }

    pub fn store(&mut self, hash: Blockhash, now: Instant) {
        self.current = Some((hash, now));
    }

    pub fn current(&self) -> Option<Blockhash> {
        self.current.map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_always_needs_refresh() {
        let cache = BlockhashCache::new(Duration::from_millis(400));
        assert!(cache.needs_refresh(Instant::now(), false));
    }

    #[test]
    fn fresh_hash_within_interval_is_cached() {
        let mut cache = BlockhashCache::new(Duration::from_millis(400));
        let t0 = Instant::now();
        cache.store(Blockhash([1u8; 32]), t0);
        assert!(!cache.needs_refresh(t0 + Duration::from_millis(100), false));
    }

    #[test]
    fn stale_hash_needs_refresh() {
        let mut cache = BlockhashCache::new(Duration::from_millis(400));
        let t0 = Instant::now();
        cache.store(Blockhash([1u8; 32]), t0);
        assert!(cache.needs_refresh(t0 + Duration::from_millis(500), false));
    }

    #[test]
    fn force_overrides_a_fresh_cache() {
        let mut cache = BlockhashCache::new(Duration::from_millis(400));
        let t0 = Instant::now();
        cache.store(Blockhash([1u8; 32]), t0);
        assert!(cache.needs_refresh(t0 + Duration::from_millis(10), true));
    }
}
