//! Tick/bin array caches with virtual zero-liquidity arrays (spec §4.2).
//!
//! A bootstrap fetch that returns `null` for an account proves the array
//! doesn't exist yet, which is different from never having asked. Once
//! that's recorded, `get_or_virtual` can hand back an empty array instead
//! of forcing every caller to special-case "absent".

use crate::model::{BinArray, TickArray, UpdateSource};
use crate::pubkey::Pubkey;
use crate::slot::{Slot, WriteVersion};
use parking_lot::RwLock;
use std::collections::HashSet;

use super::trace::TraceHandler;
use super::typed_cache::{SetOutcome, TypedCache};

/// Key for a tick/bin array: the owning pool plus the array's own index
/// (start-tick index for ticks, signed array index for bins).
pub type DependencyKey = (Pubkey, i64);

pub struct DependencyCache<T> {
    inner: TypedCache<T>,
    /// `(pool, index)` pairs a bootstrap fetch confirmed do not exist.
    confirmed_empty: RwLock<HashSet<DependencyKey>>,
}

impl<T: Clone> DependencyCache<T> {
    pub fn new() -> Self {
        Self {
            inner: TypedCache::new(),
            confirmed_empty: RwLock::new(HashSet::new()),
        }
    }

    pub fn set_trace_handler(&self, handler: TraceHandler) {
        self.inner.set_trace_handler(handler);
    }

    pub fn has(&self, key: &Pubkey) -> bool {
        self.inner.has(key)
    }

    pub fn delete(&self, key: &Pubkey) -> Option<crate::model::CacheEntry<T>> {
        self.inner.delete(key)
    }

    pub fn get(&self, key: &Pubkey) -> Option<crate::model::CacheEntry<T>> {
        self.inner.get(key)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &self,
        key: Pubkey,
        dep_key: DependencyKey,
        payload: T,
        slot: Slot,
        write_version: WriteVersion,
        ingested_at_nanos: u64,
        source: UpdateSource,
    ) -> SetOutcome {
        // An array that materializes is, by definition, no longer confirmed
        // empty.
        self.confirmed_empty.write().remove(&dep_key);
        self.inner
            .set(key, payload, slot, write_version, ingested_at_nanos, source, None)
    }

    /// Record that a bootstrap fetch proved `dep_key` does not exist on
    /// chain. Idempotent.
    pub fn mark_confirmed_empty(&self, dep_key: DependencyKey) {
        self.confirmed_empty.write().insert(dep_key);
    }

    pub fn is_confirmed_empty(&self, dep_key: &DependencyKey) -> bool {
        self.confirmed_empty.read().contains(dep_key)
    }
}

impl<T: Clone> Default for DependencyCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type TickArrayCache = DependencyCache<TickArray>;
pub type BinArrayCache = DependencyCache<BinArray>;

impl TickArrayCache {
    /// Returns the cached array at `key`, or a materialized zero-liquidity
    /// array if `dep_key` was confirmed empty by bootstrap, or `None` if
    /// it has genuinely never been observed at all.
    pub fn get_or_virtual(
        &self,
        pool: Pubkey,
        key: &Pubkey,
        dep_key: DependencyKey,
    ) -> Option<TickArray> {
        if let Some(entry) = self.get(key) {
            return Some(entry.payload);
        }
        if self.is_confirmed_empty(&dep_key) {
            return Some(TickArray::virtual_empty(pool, dep_key.1 as i32));
        }
        None
    }
}

impl BinArrayCache {
    pub fn get_or_virtual(
        &self,
        pool: Pubkey,
        key: &Pubkey,
        dep_key: DependencyKey,
    ) -> Option<BinArray> {
        if let Some(entry) = self.get(key) {
            return Some(entry.payload);
        }
        if self.is_confirmed_empty(&dep_key) {
            return Some(BinArray::virtual_empty(pool, dep_key.1));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_virtual_is_none_when_never_observed() {
        let cache = TickArrayCache::new();
        let pool = Pubkey::new([1u8; 32]);
        let pda = Pubkey::new([2u8; 32]);
        assert!(cache.get_or_virtual(pool, &pda, (pool, 0)).is_none());
    }

    #[test]
    fn get_or_virtual_materializes_confirmed_empty() {
        let cache = TickArrayCache::new();
        let pool = Pubkey::new([1u8; 32]);
        let pda = Pubkey::new([2u8; 32]);
        cache.mark_confirmed_empty((pool, 0));
        let arr = cache.get_or_virtual(pool, &pda, (pool, 0)).unwrap();
        assert_eq!(arr.start_tick_index, 0);
        assert!(!arr.ticks[0].initialized());
    }

    #[test]
    fn materializing_an_array_clears_confirmed_empty() {
        let cache = TickArrayCache::new();
        let pool = Pubkey::new([1u8; 32]);
        let pda = Pubkey::new([2u8; 32]);
        cache.mark_confirmed_empty((pool, 0));
        let arr = TickArray::virtual_empty(pool, 0);
        cache.set(pda, (pool, 0), arr, 10, 0, 0, UpdateSource::Stream);
        assert!(!cache.is_confirmed_empty(&(pool, 0)));
    }
}
