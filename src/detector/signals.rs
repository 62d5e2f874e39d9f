//! Derived DLMM-only signals: fee-decay rechecks and empty-bin backruns
//! (spec §4.5 "Derived signals").

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cache::CacheRegistry;
use crate::model::{BinArray, DlmmPool, PoolRecord};
use crate::pubkey::Pubkey;
use crate::sim::effective_fee_bps;
use crate::slot::Slot;

use super::opportunity::DetectorConfig;

/// A pending fee-decay recheck, scheduled after a volatility spike.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledRecheck {
    pub pool: Pubkey,
    pub predicted_slot: Slot,
    pub fee_at_spike_bps: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct FeeDecayOpportunity {
    pub pool: Pubkey,
    pub fee_before_bps: u64,
    pub fee_after_bps: u64,
}

/// Tracks the last-seen `volatilityAccumulator` per pool so a spike can be
/// recognized relative to its own history rather than a fixed constant.
pub struct FeeDecayWatcher {
    previous_volatility: RwLock<HashMap<Pubkey, u32>>,
}

impl FeeDecayWatcher {
    pub fn new() -> Self {
        Self { previous_volatility: RwLock::new(HashMap::new()) }
    }

    /// Observe a DLMM pool's current accumulator; if it just spiked
    /// (`≥1.5×` the previous reading, above the noise floor), schedule a
    /// recheck for the slot decay is predicted to reach the base fee.
    pub fn observe(&self, pool: Pubkey, dlmm: &DlmmPool, current_slot: Slot, config: &DetectorConfig) -> Option<ScheduledRecheck> {
        let previous = {
            let mut map = self.previous_volatility.write();
            let old = map.insert(pool, dlmm.volatility_accumulator);
            old
        }?;

        if dlmm.volatility_accumulator < config.volatility_noise_floor {
            return None;
        }
        let ratio = dlmm.volatility_accumulator as f64 / previous.max(1) as f64;
        if ratio < config.volatility_spike_ratio {
            return None;
        }

        // Decay proceeds over filter_period (hold) then decay_period
        // (ramp-down); spec leaves the unit conversion unspecified, so both
        // periods are treated as slot counts directly.
        let decay_slots = dlmm.filter_period as Slot + dlmm.decay_period as Slot;
        Some(ScheduledRecheck {
            pool,
            predicted_slot: current_slot + decay_slots,
            fee_at_spike_bps: effective_fee_bps(dlmm),
        })
    }
}

impl Default for FeeDecayWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// At (or after) the predicted slot, re-read the pool fresh from the cache
/// and compare its current fee against the spike reading -- never trust a
/// cached parameter from when the recheck was scheduled (spec §4.5).
pub fn recheck_fee_decay(registry: &CacheRegistry, recheck: &ScheduledRecheck, config: &DetectorConfig) -> Option<FeeDecayOpportunity> {
    let entry = registry.pools.get(&recheck.pool)?;
    let PoolRecord::Dlmm(dlmm) = entry.payload else { return None };
    let fee_after_bps = effective_fee_bps(&dlmm);
    if recheck.fee_at_spike_bps.saturating_sub(fee_after_bps) >= config.fee_decay_threshold_bps {
        Some(FeeDecayOpportunity { pool: recheck.pool, fee_before_bps: recheck.fee_at_spike_bps, fee_after_bps })
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BackrunSignal {
    pub pool: Pubkey,
    pub bins_moved: i32,
    pub empty_bin_ratio: f64,
}

fn find_bin(bin_arrays: &[BinArray], bin_id: i32) -> Option<crate::model::Bin> {
    for array in bin_arrays {
        let start = array.array_index as i64 * crate::model::BINS_PER_ARRAY as i64;
        let relative = bin_id as i64 - start;
        if (0..crate::model::BINS_PER_ARRAY as i64).contains(&relative) {
            return Some(array.bins[relative as usize]);
        }
    }
    None
}

/// When the active bin has moved at least `minBinsMoved`, measure the
/// fraction of crossed bins that were empty; a high ratio implies partial
/// reversion is likely once the displaced price relaxes (spec §4.5).
pub fn detect_empty_bin_backrun(
    pool: Pubkey,
    previous_active_id: i32,
    current_active_id: i32,
    bin_arrays: &[BinArray],
    config: &DetectorConfig,
) -> Option<BackrunSignal> {
    let bins_moved = (current_active_id - previous_active_id).abs();
    if bins_moved < config.min_bins_moved {
        return None;
    }

    let (lo, hi) = if previous_active_id <= current_active_id {
        (previous_active_id, current_active_id)
    } else {
        (current_active_id, previous_active_id)
    };

    let mut total = 0u32;
    let mut empty = 0u32;
    for bin_id in lo..=hi {
        if let Some(bin) = find_bin(bin_arrays, bin_id) {
            total += 1;
            if bin.amount_x == 0 && bin.amount_y == 0 {
                empty += 1;
            }
        }
    }
    if total == 0 {
        return None;
    }
    let empty_bin_ratio = empty as f64 / total as f64;
    if empty_bin_ratio > config.empty_bin_ratio_threshold {
        Some(BackrunSignal { pool, bins_moved, empty_bin_ratio })
    } else {
        None
    }
}
