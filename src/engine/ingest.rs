//! Account-update and pending-tx contracts (spec §6.1, §6.2) and the
//! routing that turns a raw update into a cache write.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::cache::CacheRegistry;
use crate::decode::{decode_bin_array, decode_config, decode_pool, decode_tick_array, decode_vault, DecodeError};
use crate::engine::stats::EngineStats;
use crate::model::{PoolRecord, UpdateSource, Venue};
use crate::pubkey::Pubkey;
use crate::slot::{Slot, WriteVersion};

/// One account update (spec §6.1).
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub pubkey: Pubkey,
    pub owner: Pubkey,
    pub data: Vec<u8>,
    pub lamports: u64,
    pub slot: Slot,
    pub write_version: WriteVersion,
    pub ingested_at_nanos: u64,
}

/// A decoded pending/confirmed transaction's swap legs, already extracted
/// from the raw instruction list (spec §6.2). Parsing the wire message
/// format into instructions is an ingest-edge concern outside this engine.
#[derive(Debug, Clone)]
pub struct PendingTxUpdate {
    pub signature: [u8; 64],
    pub slot: Slot,
    pub instructions: Vec<crate::decode::RawInstruction>,
}

/// Tracks vault and amm-config pubkeys discovered as a side effect of
/// decoding a pool, so a later update to one of those accounts can be
/// routed without re-sniffing its layout (spec §4.1: pools, vaults, and
/// dependency accounts share one update stream but are cached separately).
#[derive(Default)]
pub struct KnownKeys {
    vaults: RwLock<HashSet<Pubkey>>,
    configs: RwLock<HashSet<Pubkey>>,
}

impl KnownKeys {
    pub fn new() -> Self {
        Self::default()
    }

    fn learn_from_pool(&self, record: &PoolRecord) {
        self.vaults.write().insert(record.base_vault());
        self.vaults.write().insert(record.quote_vault());
        if let PoolRecord::Clmm(clmm) = record {
            self.configs.write().insert(clmm.amm_config);
        }
    }

    fn is_vault(&self, key: &Pubkey) -> bool {
        self.vaults.read().contains(key)
    }

    fn is_config(&self, key: &Pubkey) -> bool {
        self.configs.read().contains(key)
    }
}

/// Apply one account update to `registry`, routing it to the pool, vault,
/// config, tick-array, or bin-array cache and updating `known` as new pools
/// are learned. Returns the venue for a pool update so the caller can drive
/// the lifecycle FSM (CPMM pools activate trivially; CLMM/DLMM stay
/// `DISCOVERED` until bootstrapped).
pub fn apply_account_update(
    registry: &CacheRegistry,
    known: &KnownKeys,
    stats: &EngineStats,
    update: &AccountUpdate,
) -> Option<Venue> {
    if known.is_vault(&update.pubkey) {
        if let Ok(vault) = decode_vault(&update.data, update.owner) {
            registry.vaults.set(
                update.pubkey, vault, update.slot, update.write_version,
                update.ingested_at_nanos, UpdateSource::Stream, None,
            );
        } else {
            stats.decode_failures.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        return None;
    }

    if known.is_config(&update.pubkey) {
        if let Ok(config) = decode_config(&update.data) {
            registry.configs.set(
                update.pubkey, config, update.slot, update.write_version,
                update.ingested_at_nanos, UpdateSource::Stream, None,
            );
        } else {
            stats.decode_failures.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        return None;
    }

    if let Ok(record) = decode_pool(&update.data, &update.owner) {
        known.learn_from_pool(&record);
        let venue = record.venue();
        registry.pools.set(
            update.pubkey, record, update.slot, update.write_version,
            update.ingested_at_nanos, UpdateSource::Stream, Some(update.data.len()),
        );
        return Some(venue);
    }

    if let Ok(tick_array) = decode_tick_array(&update.data) {
        let dep_key = (tick_array.pool, tick_array.start_tick_index as i64);
        registry.tick_arrays.set(
            update.pubkey, dep_key, tick_array, update.slot, update.write_version,
            update.ingested_at_nanos, UpdateSource::Stream,
        );
        return None;
    }

    if let Ok(bin_array) = decode_bin_array(&update.data) {
        let dep_key = (bin_array.pool, bin_array.array_index);
        registry.bin_arrays.set(
            update.pubkey, dep_key, bin_array, update.slot, update.write_version,
            update.ingested_at_nanos, UpdateSource::Stream,
        );
        return None;
    }

    let _: DecodeError = DecodeError::UnknownDiscriminator;
    stats.decode_failures.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    None
}
