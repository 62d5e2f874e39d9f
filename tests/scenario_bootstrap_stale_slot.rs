//! End-to-end bootstrap stale-slot rejection: a bootstrap requested with
//! `minContextSlot=1000` against an RPC that reports `contextSlot=950`
//! must leave the pool `DISCOVERED`, never mutate the cache, and the
//! caller must be able to count the rejection as `rpc_stale_context`.

use async_trait::async_trait;

use venue_arb_engine::cache::CacheRegistry;
use venue_arb_engine::engine::{fetch_chunked, BootstrapFetchError, BootstrapRpc, BootstrapRpcError};
use venue_arb_engine::model::{PoolLifecycleState, Venue};
use venue_arb_engine::pubkey::Pubkey;
use venue_arb_engine::slot::Slot;

struct StaleRpc;

#[async_trait]
impl BootstrapRpc for StaleRpc {
    async fn fetch_accounts(&self, pubkeys: &[Pubkey]) -> Result<(Slot, Vec<Option<Vec<u8>>>), BootstrapRpcError> {
        Ok((950, pubkeys.iter().map(|_| None).collect()))
    }
}

#[tokio::test]
async fn stale_bootstrap_context_leaves_pool_discovered() {
    let registry = CacheRegistry::new();
    let pool = Pubkey::new([7u8; 32]);
    registry.lifecycle.discover(pool, Venue::Clmm, 900);
    registry.lifecycle.begin_bootstrap(&pool).unwrap();
    assert_eq!(registry.lifecycle.state(&pool), Some(PoolLifecycleState::Bootstrapping));

    let deps = vec![Pubkey::new([8u8; 32]), Pubkey::new([9u8; 32])];
    let err = fetch_chunked(&StaleRpc, &deps, Some(1_000)).await.unwrap_err();
    assert_eq!(err, BootstrapFetchError::StaleContext { context_slot: 950, min_context_slot: 1_000 });

    // A stale fetch never even attempts finish_bootstrap with a context
    // slot below the pool's own target; the pool stays put.
    assert_eq!(registry.lifecycle.state(&pool), Some(PoolLifecycleState::Bootstrapping));
    assert!(!registry.vaults.has(&deps[0]));
    assert!(!registry.vaults.has(&deps[1]));

    let finish_err = registry.lifecycle.finish_bootstrap(&pool, 1_000, 950, []).unwrap_err();
    assert_eq!(
        finish_err,
        venue_arb_engine::cache::BootstrapError::StaleContext { context_slot: 950, target_slot: 1_000 }
    );
    assert_eq!(registry.lifecycle.state(&pool), Some(PoolLifecycleState::Discovered));
}
