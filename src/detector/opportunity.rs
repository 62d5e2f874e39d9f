//! Cross-venue spread detection (spec §4.5 points 1-4).

use std::collections::HashMap;

use crate::cache::CacheRegistry;
use crate::model::{Direction, ExactSide, PoolRecord};
use crate::pubkey::Pubkey;
use crate::sim::{effective_fee_bps, simulate};
use crate::snapshot::{build_snapshot, SimulationSnapshot, SnapshotRadii};

use super::pair_index::{PairIndex, VenuePool};

/// Spread above this is treated as a decoding bug rather than a real
/// arbitrage (spec §8 invariant 6: "grossSpreadBps ≤ 100000").
const GROSS_SPREAD_SANITY_BPS: i64 = 100_000;

#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Probe amount used to derive `effectivePrice`, in the mint's native
    /// (smallest) unit. Spec's "0.1 native units" is assumed to mean 0.1 of
    /// a 9-decimal token (spec doesn't fix a decimals convention).
    pub probe_amount: u128,
    pub min_spread_bps: i64,
    pub dedup_window_ms: u64,
    pub empty_bin_ratio_threshold: f64,
    pub min_bins_moved: i32,
    pub volatility_spike_ratio: f64,
    pub volatility_noise_floor: u32,
    pub fee_decay_threshold_bps: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            probe_amount: 100_000_000,
            min_spread_bps: 55,
            dedup_window_ms: 100,
            empty_bin_ratio_threshold: 0.5,
            min_bins_moved: 3,
            volatility_spike_ratio: 1.5,
            volatility_noise_floor: 500,
            fee_decay_threshold_bps: 5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Opportunity {
    pub mint: Pubkey,
    pub buy: VenuePool,
    pub sell: VenuePool,
    pub probe_in: u128,
    pub gross_spread_bps: i64,
    pub net_spread_bps: i64,
}

struct Quote {
    venue_pool: VenuePool,
    price: f64,
    fee_bps: u64,
}

/// Fee rate implied by a snapshot's venue (spec §4.5 point 3: "fetched
/// per-venue; DLMM uses the dynamic `baseFee + variableFee`").
pub fn venue_fee_bps(snapshot: &SimulationSnapshot) -> u64 {
    match &snapshot.record {
        PoolRecord::Cpmm(cpmm) => cpmm.fee_bps.unwrap_or_else(|| {
            if cpmm.fee_denominator == 0 {
                0
            } else {
                ((cpmm.fee_numerator as u128 * 10_000) / cpmm.fee_denominator as u128) as u64
            }
        }),
        PoolRecord::Clmm(_) => snapshot.config.map(|c| c.fee_bps).unwrap_or(25),
        PoolRecord::Dlmm(dlmm) => effective_fee_bps(dlmm),
    }
}

fn quote_pool(
    registry: &CacheRegistry,
    radii: SnapshotRadii,
    strict: bool,
    vp: VenuePool,
    mint: Pubkey,
    probe_amount: u128,
) -> Option<Quote> {
    let snapshot = build_snapshot(registry, vp.pool, radii, strict).ok()?;
    let direction = if snapshot.record.base_mint() == mint {
        Direction::BaseToQuote
    } else {
        Direction::QuoteToBase
    };
    let result = simulate(&snapshot, direction, ExactSide::Input, probe_amount).ok()?;
    if probe_amount == 0 {
        return None;
    }
    let price = result.output_amount as f64 / probe_amount as f64;
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    Some(Quote { venue_pool: vp, price, fee_bps: venue_fee_bps(&snapshot) })
}

/// Group a mint's venue pools by their counter-mint -- only pools trading
/// the exact same pair are comparable.
fn group_by_counter_mint(registry: &CacheRegistry, mint: Pubkey, pools: impl IntoIterator<Item = VenuePool>) -> HashMap<Pubkey, Vec<VenuePool>> {
    let mut groups: HashMap<Pubkey, Vec<VenuePool>> = HashMap::new();
    for vp in pools {
        let Some(entry) = registry.pools.get(&vp.pool) else { continue };
        let base = entry.payload.base_mint();
        let quote = entry.payload.quote_mint();
        let other = if base == mint { quote } else { base };
        groups.entry(other).or_default().push(vp);
    }
    groups
}

/// Scan every multi-venue mint in `index` for net-positive cross-venue
/// spreads (spec §4.5 detection loop).
pub fn detect_opportunities(
    registry: &CacheRegistry,
    index: &PairIndex,
    radii: SnapshotRadii,
    strict: bool,
    config: &DetectorConfig,
) -> Vec<Opportunity> {
    let mut out = Vec::new();

    for mint in index.multi_venue_mints() {
        let groups = group_by_counter_mint(registry, mint, index.pools_for_mint(&mint));
        for group in groups.into_values() {
            if group.len() < 2 {
                continue;
            }
            let mut quotes: Vec<Quote> = group
                .into_iter()
                .filter_map(|vp| quote_pool(registry, radii, strict, vp, mint, config.probe_amount))
                .collect();
            quotes.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap());

            for i in 0..quotes.len() {
                for j in (i + 1)..quotes.len() {
                    let low = &quotes[i];
                    let high = &quotes[j];
                    let gross_spread_bps = (((high.price - low.price) / low.price) * 10_000.0) as i64;
                    if gross_spread_bps > GROSS_SPREAD_SANITY_BPS {
                        continue;
                    }
                    let net_spread_bps = gross_spread_bps - low.fee_bps as i64 - high.fee_bps as i64;
                    if net_spread_bps >= config.min_spread_bps {
                        out.push(Opportunity {
                            mint,
                            buy: low.venue_pool,
                            sell: high.venue_pool,
                            probe_in: config.probe_amount,
                            gross_spread_bps,
                            net_spread_bps,
                        });
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CpmmPool, UpdateSource, VaultRecord, Venue};

    fn seed_cpmm(
        registry: &CacheRegistry,
        pool: Pubkey,
        base_vault: Pubkey,
        quote_vault: Pubkey,
        base_mint: Pubkey,
        quote_mint: Pubkey,
        fee_bps: u64,
        reserves: (u64, u64),
    ) {
        let record = PoolRecord::Cpmm(CpmmPool {
            venue: Venue::CpmmA,
            base_vault,
            quote_vault,
            base_mint,
            quote_mint,
            lp_supply: 0,
            fee_bps: Some(fee_bps),
            fee_numerator: 0,
            fee_denominator: 1,
        });
        registry.pools.set(pool, record, 100, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(
            base_vault,
            VaultRecord { mint: base_mint, owner_program: Pubkey::ZERO, amount: reserves.0, data_len: 165 },
            100,
            0,
            0,
            UpdateSource::Stream,
            None,
        );
        registry.vaults.set(
            quote_vault,
            VaultRecord { mint: quote_mint, owner_program: Pubkey::ZERO, amount: reserves.1, data_len: 165 },
            100,
            0,
            0,
            UpdateSource::Stream,
            None,
        );
    }

    #[test]
    fn fragmented_pair_emits_one_opportunity_above_threshold() {
        let registry = CacheRegistry::new();
        let index = PairIndex::new();
        let base_mint = Pubkey::new([1u8; 32]);
        let quote_mint = Pubkey::new([2u8; 32]);

        let pool_a = Pubkey::new([10u8; 32]);
        seed_cpmm(
            &registry, pool_a,
            Pubkey::new([11u8; 32]), Pubkey::new([12u8; 32]),
            base_mint, quote_mint, 30, (1_000_000_000_000, 1_000_000_000),
        );
        index.add(base_mint, quote_mint, Venue::CpmmA, pool_a);

        let pool_b = Pubkey::new([20u8; 32]);
        seed_cpmm(
            &registry, pool_b,
            Pubkey::new([21u8; 32]), Pubkey::new([22u8; 32]),
            base_mint, quote_mint, 25, (1_020_000_000_000, 1_000_000_000),
        );
        index.add(base_mint, quote_mint, Venue::CpmmA, pool_b);

        let config = DetectorConfig { min_spread_bps: 5, ..DetectorConfig::default() };
        let opportunities = detect_opportunities(&registry, &index, SnapshotRadii::default(), false, &config);
        assert_eq!(opportunities.len(), 1);
        assert!(opportunities[0].net_spread_bps >= config.min_spread_bps);
    }

    #[test]
    fn identical_prices_emit_nothing() {
        let registry = CacheRegistry::new();
        let index = PairIndex::new();
        let base_mint = Pubkey::new([1u8; 32]);
        let quote_mint = Pubkey::new([2u8; 32]);

        for (i, pool_seed) in [10u8, 20u8].into_iter().enumerate() {
            let pool = Pubkey::new([pool_seed; 32]);
            seed_cpmm(
                &registry, pool,
                Pubkey::new([pool_seed + 1; 32]), Pubkey::new([pool_seed + 2; 32]),
                base_mint, quote_mint, 30, (1_000_000_000_000, 1_000_000_000),
            );
            index.add(base_mint, quote_mint, Venue::CpmmA, pool);
            let _ = i;
        }

        let opportunities = detect_opportunities(&registry, &index, SnapshotRadii::default(), false, &DetectorConfig::default());
        assert!(opportunities.is_empty());
    }
}
