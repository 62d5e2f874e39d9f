//! Owns every component's lifecycle and wires them together (spec §4.7,
//! component C7): stream events reach the cache, cache lifecycle events
//! reach the pair index, pair-index activations feed the detector, and
//! detected opportunities feed the bundle builder.

mod bootstrap;
mod ingest;
mod stats;

pub use bootstrap::{fetch_chunked, BootstrapFetchError, BootstrapRpc, BootstrapRpcError, MAX_ACCOUNTS_PER_CALL};
pub use ingest::{apply_account_update, AccountUpdate, KnownKeys, PendingTxUpdate};
pub use stats::{persist_snapshot, EngineStats, StatsSnapshot};

use std::sync::Arc;

use crate::cache::CacheRegistry;
use crate::detector::{detect_opportunities, install as install_pair_index, DetectorConfig, Opportunity, PairIndex};
use crate::model::{PoolLifecycleState, Venue};
use crate::snapshot::SnapshotRadii;

/// The single owning structure the spec's §9 "global state: none" note
/// describes: every subtask receives a reference to this, nothing is
/// reachable any other way.
pub struct Engine {
    pub registry: Arc<CacheRegistry>,
    pub pair_index: Arc<PairIndex>,
    pub known_keys: KnownKeys,
    pub stats: EngineStats,
    pub detector_config: DetectorConfig,
    pub snapshot_radii: SnapshotRadii,
    pub strict_snapshots: bool,
}

impl Engine {
    pub fn new(detector_config: DetectorConfig, snapshot_radii: SnapshotRadii, strict_snapshots: bool) -> Self {
        let registry = Arc::new(CacheRegistry::new());
        let pair_index = Arc::new(PairIndex::new());
        install_pair_index(pair_index.clone(), registry.clone());
        Self {
            registry,
            pair_index,
            known_keys: KnownKeys::new(),
            stats: EngineStats::new(),
            detector_config,
            snapshot_radii,
            strict_snapshots,
        }
    }

    /// Apply one account update: decode, write the matching cache, and for
    /// CPMM pools (no bootstrap dependencies) activate immediately. CLMM
    /// and DLMM pools stay `DISCOVERED` until a separate bootstrap
    /// completes (spec §4.2: "never freezes at slot 0").
    pub fn on_account_update(&self, update: &AccountUpdate) {
        let Some(venue) = apply_account_update(&self.registry, &self.known_keys, &self.stats, update) else {
            return;
        };
        if self.registry.lifecycle.state(&update.pubkey).is_none() {
            self.registry.lifecycle.discover(update.pubkey, venue, update.slot);
        }
        if !matches!(venue, Venue::Clmm | Venue::Dlmm) {
            self.registry.lifecycle.activate_trivial(update.pubkey, venue, update.slot);
        }
    }

    /// Run one detection pass over every currently routable, multi-venue
    /// mint (spec §4.5).
    pub fn detect(&self) -> Vec<Opportunity> {
        detect_opportunities(&self.registry, &self.pair_index, self.snapshot_radii, self.strict_snapshots, &self.detector_config)
    }

    pub fn persist_stats(&self, dir: &std::path::Path) -> std::io::Result<()> {
        persist_snapshot(dir, &self.stats.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpmm_pool_update_activates_and_indexes_immediately() {
        let engine = Engine::new(DetectorConfig::default(), SnapshotRadii::default(), false);
        let pool = crate::pubkey::Pubkey::new([1u8; 32]);
        let mut data = vec![0u8; 184];
        data[..8].copy_from_slice(&crate::decode::CPMM_A_DISCRIMINATOR);
        data[8..40].copy_from_slice(&[2u8; 32]);
        data[40..72].copy_from_slice(&[3u8; 32]);
        data[72..104].copy_from_slice(&[4u8; 32]);
        data[104..136].copy_from_slice(&[5u8; 32]);
        data[136..144].copy_from_slice(&0u64.to_le_bytes());
        data[144..152].copy_from_slice(&30u64.to_le_bytes());

        engine.on_account_update(&AccountUpdate {
            pubkey: pool,
            owner: crate::pubkey::Pubkey::ZERO,
            data,
            lamports: 0,
            slot: 1,
            write_version: 0,
            ingested_at_nanos: 0,
        });

        assert_eq!(engine.registry.lifecycle.state(&pool), Some(PoolLifecycleState::Active));
        assert_eq!(engine.pair_index.pools_for_mint(&crate::pubkey::Pubkey::new([4u8; 32])).len(), 1);
    }
}
