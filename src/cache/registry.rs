//! The full set of typed caches the engine owns (spec §3, §4.2).

use crate::decode::{BIN_ARRAY_LEN, TICK_ARRAY_LEN};
use crate::model::{ConfigRecord, PoolRecord, VaultRecord};

use super::dependency_cache::{BinArrayCache, TickArrayCache};
use super::lifecycle::LifecycleManager;
use super::trace::TraceHandler;
use super::typed_cache::{SetOutcome, TypedCache};

/// A pool-account's raw data length never legitimately equals a tick- or
/// bin-array's; a match means the update was routed to the wrong cache
/// (spec §4.2 point 3, §8 invariant 2).
fn pool_layout_guard(len: usize) -> bool {
    len == TICK_ARRAY_LEN || len == BIN_ARRAY_LEN
}

/// Every cache the engine owns, plus the lifecycle FSM that gates pool
/// routability. One instance lives for the lifetime of the engine and is
/// never cloned (spec §5: "caches are owned by one task").
pub struct CacheRegistry {
    pub pools: TypedCache<PoolRecord>,
    pub vaults: TypedCache<VaultRecord>,
    pub tick_arrays: TickArrayCache,
    pub bin_arrays: BinArrayCache,
    pub configs: TypedCache<ConfigRecord>,
    pub lifecycle: LifecycleManager,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self {
            pools: TypedCache::with_layout_guard(pool_layout_guard),
            vaults: TypedCache::new(),
            tick_arrays: TickArrayCache::new(),
            bin_arrays: BinArrayCache::new(),
            configs: TypedCache::new(),
            lifecycle: LifecycleManager::new(),
        }
    }

    /// Install one trace handler across every cache that supports tracing.
    pub fn set_trace_handler(&self, handler: TraceHandler) {
        self.pools.set_trace_handler(handler.clone());
        self.vaults.set_trace_handler(handler.clone());
        self.tick_arrays.set_trace_handler(handler.clone());
        self.bin_arrays.set_trace_handler(handler.clone());
        self.configs.set_trace_handler(handler);
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UpdateSource;
    use crate::pubkey::Pubkey;

    #[test]
    fn pool_cache_rejects_tick_array_sized_payload() {
        let registry = CacheRegistry::new();
        let key = Pubkey::new([9u8; 32]);
        let dummy = PoolRecord::Cpmm(crate::model::CpmmPool {
            venue: crate::model::Venue::CpmmA,
            base_vault: Pubkey::ZERO,
            quote_vault: Pubkey::ZERO,
            base_mint: Pubkey::ZERO,
            quote_mint: Pubkey::ZERO,
            lp_supply: 0,
            fee_bps: Some(30),
            fee_numerator: 0,
            fee_denominator: 1,
        });
        let outcome = registry.pools.set(
            key,
            dummy,
            10,
            0,
            0,
            UpdateSource::Stream,
            Some(TICK_ARRAY_LEN),
        );
        assert_eq!(outcome, SetOutcome::LayoutRejected);
    }
}
