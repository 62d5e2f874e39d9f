//! Slot-coherent snapshot assembly (spec §4.3, component C3).

use crate::cache::CacheRegistry;
use crate::decode::{CLMM_PROGRAM, DLMM_PROGRAM};
use crate::model::{BinArray, ClmmPool, CpmmPool, DlmmPool, PoolRecord, TickArray, VaultRecord};
use crate::pubkey::Pubkey;
use crate::slot::Slot;

use super::pda::{bin_array_index, derive_bin_array_pda, derive_tick_array_pda, tick_array_start_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("pool {0} not present in the pool cache")]
    PoolNotFound(Pubkey),
    #[error("vault {0} missing from the vault cache")]
    MissingVault(Pubkey),
    #[error("amm-config {0} missing from the config cache")]
    MissingConfig(Pubkey),
    #[error("current tick array at index {0} missing (not virtual-empty, never observed)")]
    MissingTickArray(i64),
    #[error("current bin array at index {0} missing (not virtual-empty, never observed)")]
    MissingBinArray(i64),
    #[error("dependency slot {dep_slot} precedes pool slot {pool_slot} under strict mode")]
    SlotInconsistent { dep_slot: Slot, pool_slot: Slot },
}

/// A read-only, internally consistent view of one pool and its
/// dependencies, bound to the call that produced it (spec §3: "no shared
/// mutable state escapes").
#[derive(Debug, Clone)]
pub struct SimulationSnapshot {
    pub pool: Pubkey,
    pub record: PoolRecord,
    pub base_vault: VaultRecord,
    pub quote_vault: VaultRecord,
    pub config: Option<crate::model::ConfigRecord>,
    /// Populated for CLMM only, ordered by ascending start-tick index.
    pub tick_arrays: Vec<TickArray>,
    /// Populated for DLMM only, ordered by ascending array index.
    pub bin_arrays: Vec<BinArray>,
    /// `min` over every materialized dependency's slot (spec §8 invariant 4).
    pub as_of_slot: Slot,
    pub pool_slot: Slot,
}

/// Radii controlling how many neighboring tick/bin arrays are pulled into
/// the snapshot, in array units (spec §6.5 `tickArrayRadius`/`binArrayRadius`).
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRadii {
    pub tick_array_radius: i64,
    pub bin_array_radius: i64,
}

impl Default for SnapshotRadii {
    fn default() -> Self {
        Self { tick_array_radius: 2, bin_array_radius: 2 }
    }
}

fn bitmap_bit_set(bitmap: &[u64; 16], relative_index: i64) -> bool {
    let offset = relative_index + 512;
    if !(0..1024).contains(&offset) {
        return false;
    }
    let offset = offset as usize;
    (bitmap[offset / 64] >> (offset % 64)) & 1 == 1
}

/// Build a slot-coherent snapshot for `pool`, rejecting if any strict-mode
/// consistency check fails (spec §4.3).
pub fn build_snapshot(
    registry: &CacheRegistry,
    pool: Pubkey,
    radii: SnapshotRadii,
    strict: bool,
) -> Result<SimulationSnapshot, SnapshotError> {
    let pool_entry = registry
        .pools
        .get(&pool)
        .ok_or(SnapshotError::PoolNotFound(pool))?;
    let pool_slot = pool_entry.slot;
    let record = pool_entry.payload;

    match record {
        PoolRecord::Cpmm(ref cpmm) => build_cpmm_snapshot(registry, pool, record, cpmm, pool_slot, strict),
        PoolRecord::Clmm(ref clmm) => {
            build_clmm_snapshot(registry, pool, record, clmm, pool_slot, radii, strict)
        }
        PoolRecord::Dlmm(ref dlmm) => {
            build_dlmm_snapshot(registry, pool, record, dlmm, pool_slot, radii, strict)
        }
    }
}

fn fetch_vault(
    registry: &CacheRegistry,
    key: Pubkey,
    pool_slot: Slot,
    strict: bool,
) -> Result<(VaultRecord, Slot), SnapshotError> {
    let entry = registry.vaults.get(&key).ok_or(SnapshotError::MissingVault(key))?;
    check_strict(entry.slot, pool_slot, strict)?;
    Ok((entry.payload, entry.slot))
}

fn check_strict(dep_slot: Slot, pool_slot: Slot, strict: bool) -> Result<(), SnapshotError> {
    if strict && dep_slot < pool_slot {
        return Err(SnapshotError::SlotInconsistent { dep_slot, pool_slot });
    }
    Ok(())
}

fn build_cpmm_snapshot(
    registry: &CacheRegistry,
    pool: Pubkey,
    record: PoolRecord,
    cpmm: &CpmmPool,
    pool_slot: Slot,
    strict: bool,
) -> Result<SimulationSnapshot, SnapshotError> {
    let (base_vault, base_slot) = fetch_vault(registry, cpmm.base_vault, pool_slot, strict)?;
    let (quote_vault, quote_slot) = fetch_vault(registry, cpmm.quote_vault, pool_slot, strict)?;
    let as_of_slot = pool_slot.min(base_slot).min(quote_slot);
    Ok(SimulationSnapshot {
        pool,
        record,
        base_vault,
        quote_vault,
        config: None,
        tick_arrays: Vec::new(),
        bin_arrays: Vec::new(),
        as_of_slot,
        pool_slot,
    })
}

fn build_clmm_snapshot(
    registry: &CacheRegistry,
    pool: Pubkey,
    record: PoolRecord,
    clmm: &ClmmPool,
    pool_slot: Slot,
    radii: SnapshotRadii,
    strict: bool,
) -> Result<SimulationSnapshot, SnapshotError> {
    let (base_vault, base_slot) = fetch_vault(registry, clmm.base_vault, pool_slot, strict)?;
    let (quote_vault, quote_slot) = fetch_vault(registry, clmm.quote_vault, pool_slot, strict)?;

    let config_entry = registry
        .configs
        .get(&clmm.amm_config)
        .ok_or(SnapshotError::MissingConfig(clmm.amm_config))?;
    check_strict(config_entry.slot, pool_slot, strict)?;

    let current_start = tick_array_start_index(clmm.tick_current, clmm.tick_spacing);
    let span = crate::model::TICKS_PER_ARRAY as i32 * clmm.tick_spacing as i32;

    let mut tick_arrays = Vec::new();
    let mut min_dep_slot = base_slot.min(quote_slot).min(config_entry.slot);

    for rel in -radii.tick_array_radius..=radii.tick_array_radius {
        if !bitmap_bit_set(&clmm.tick_bitmap, rel) {
            if rel == 0 {
                return Err(SnapshotError::MissingTickArray(0));
            }
            continue;
        }
        let start_tick = current_start + rel as i32 * span;
        let pda = derive_tick_array_pda(&CLMM_PROGRAM, &pool, start_tick);
        let dep_key = (pool, start_tick as i64);
        match registry.tick_arrays.get(&pda) {
            Some(entry) => {
                check_strict(entry.slot, pool_slot, strict)?;
                min_dep_slot = min_dep_slot.min(entry.slot);
                tick_arrays.push(entry.payload);
            }
            None => match registry.tick_arrays.get_or_virtual(pool, &pda, dep_key) {
                Some(arr) => tick_arrays.push(arr),
                None if rel == 0 => return Err(SnapshotError::MissingTickArray(start_tick as i64)),
                None => continue,
            },
        }
    }

    Ok(SimulationSnapshot {
        pool,
        record,
        base_vault,
        quote_vault,
        config: Some(config_entry.payload),
        tick_arrays,
        bin_arrays: Vec::new(),
        as_of_slot: min_dep_slot,
        pool_slot,
    })
}

fn build_dlmm_snapshot(
    registry: &CacheRegistry,
    pool: Pubkey,
    record: PoolRecord,
    dlmm: &DlmmPool,
    pool_slot: Slot,
    radii: SnapshotRadii,
    strict: bool,
) -> Result<SimulationSnapshot, SnapshotError> {
    let (base_vault, base_slot) = fetch_vault(registry, dlmm.base_vault, pool_slot, strict)?;
    let (quote_vault, quote_slot) = fetch_vault(registry, dlmm.quote_vault, pool_slot, strict)?;

    let current_index = bin_array_index(dlmm.active_id);
    let mut bin_arrays = Vec::new();
    let mut min_dep_slot = base_slot.min(quote_slot);

    for rel in -radii.bin_array_radius..=radii.bin_array_radius {
        let array_index = current_index + rel;
        if !bitmap_bit_set(&dlmm.bin_array_bitmap, rel) {
            if rel == 0 {
                return Err(SnapshotError::MissingBinArray(array_index));
            }
            continue;
        }
        let pda = derive_bin_array_pda(&DLMM_PROGRAM, &pool, array_index);
        let dep_key = (pool, array_index);
        match registry.bin_arrays.get(&pda) {
            Some(entry) => {
                check_strict(entry.slot, pool_slot, strict)?;
                min_dep_slot = min_dep_slot.min(entry.slot);
                bin_arrays.push(entry.payload);
            }
            None => match registry.bin_arrays.get_or_virtual(pool, &pda, dep_key) {
                Some(arr) => bin_arrays.push(arr),
                None if rel == 0 => return Err(SnapshotError::MissingBinArray(array_index)),
                None => continue,
            },
        }
    }

    Ok(SimulationSnapshot {
        pool,
        record,
        base_vault,
        quote_vault,
        config: None,
        tick_arrays: Vec::new(),
        bin_arrays,
        as_of_slot: min_dep_slot,
        pool_slot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfigRecord, UpdateSource, Venue};

    fn vault(mint: u8, amount: u64) -> VaultRecord {
        VaultRecord {
            mint: Pubkey::new([mint; 32]),
            owner_program: Pubkey::new([0xaa; 32]),
            amount,
            data_len: 165,
        }
    }

    #[test]
    fn cpmm_snapshot_uses_min_of_vault_and_pool_slot() {
        let registry = CacheRegistry::new();
        let pool = Pubkey::new([1u8; 32]);
        let base_vault = Pubkey::new([2u8; 32]);
        let quote_vault = Pubkey::new([3u8; 32]);
        let record = PoolRecord::Cpmm(CpmmPool {
            venue: Venue::CpmmA,
            base_vault,
            quote_vault,
            base_mint: Pubkey::new([4u8; 32]),
            quote_mint: Pubkey::new([5u8; 32]),
            lp_supply: 0,
            fee_bps: Some(30),
            fee_numerator: 0,
            fee_denominator: 1,
        });
        registry.pools.set(pool, record, 100, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(base_vault, vault(4, 1_000), 90, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(quote_vault, vault(5, 2_000), 95, 0, 0, UpdateSource::Stream, None);

        let snap = build_snapshot(&registry, pool, SnapshotRadii::default(), false).unwrap();
        assert_eq!(snap.as_of_slot, 90);
        assert_eq!(snap.base_vault.amount, 1_000);
    }

    #[test]
    fn strict_mode_rejects_stale_vault() {
        let registry = CacheRegistry::new();
        let pool = Pubkey::new([1u8; 32]);
        let base_vault = Pubkey::new([2u8; 32]);
        let quote_vault = Pubkey::new([3u8; 32]);
        let record = PoolRecord::Cpmm(CpmmPool {
            venue: Venue::CpmmA,
            base_vault,
            quote_vault,
            base_mint: Pubkey::new([4u8; 32]),
            quote_mint: Pubkey::new([5u8; 32]),
            lp_supply: 0,
            fee_bps: Some(30),
            fee_numerator: 0,
            fee_denominator: 1,
        });
        registry.pools.set(pool, record, 100, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(base_vault, vault(4, 1_000), 40, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(quote_vault, vault(5, 2_000), 95, 0, 0, UpdateSource::Stream, None);

        let err = build_snapshot(&registry, pool, SnapshotRadii::default(), true).unwrap_err();
        assert_eq!(err, SnapshotError::SlotInconsistent { dep_slot: 40, pool_slot: 100 });
    }

    #[test]
    fn missing_pool_is_reported() {
        let registry = CacheRegistry::new();
        let pool = Pubkey::new([9u8; 32]);
        let err = build_snapshot(&registry, pool, SnapshotRadii::default(), false).unwrap_err();
        assert_eq!(err, SnapshotError::PoolNotFound(pool));
    }

    #[test]
    fn clmm_snapshot_requires_current_tick_array() {
        let registry = CacheRegistry::new();
        let pool = Pubkey::new([1u8; 32]);
        let base_vault = Pubkey::new([2u8; 32]);
        let quote_vault = Pubkey::new([3u8; 32]);
        let amm_config = Pubkey::new([6u8; 32]);
        let record = PoolRecord::Clmm(ClmmPool {
            base_vault,
            quote_vault,
            base_mint: Pubkey::new([4u8; 32]),
            quote_mint: Pubkey::new([5u8; 32]),
            amm_config,
            sqrt_price_x64: 1u128 << 64,
            tick_current: 0,
            tick_spacing: 60,
            liquidity: 1_000_000,
            tick_bitmap: [u64::MAX; 16],
            bitmap_extension: None,
        });
        registry.pools.set(pool, record, 100, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(base_vault, vault(4, 1_000), 100, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(quote_vault, vault(5, 2_000), 100, 0, 0, UpdateSource::Stream, None);
        registry.configs.set(
            amm_config,
            ConfigRecord { fee_bps: 25, protocol_fee_bps: 0 },
            100,
            0,
            0,
            UpdateSource::Stream,
            None,
        );

        let err = build_snapshot(&registry, pool, SnapshotRadii::default(), false).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingTickArray(_)));
    }
}
