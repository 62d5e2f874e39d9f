//! Multi-leg chains: output of leg *k* feeds leg *k+1* (spec §4.4.4).

use crate::cache::CacheRegistry;
use crate::model::{Direction, ExactSide};
use crate::pubkey::Pubkey;
use crate::snapshot::{build_snapshot, SnapshotRadii};

use super::{simulate, SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MultihopError {
    #[error("leg {0} failed: {1}")]
    LegFailed(usize, SimError),
    #[error("leg {0} snapshot unavailable")]
    SnapshotUnavailable(usize),
    #[error("empty leg chain")]
    EmptyChain,
}

#[derive(Debug, Clone, Copy)]
pub struct HopLeg {
    pub pool: Pubkey,
    pub direction: Direction,
}

/// Total result of a chain: only the final leg's post-state and the
/// aggregate totals survive. Per-leg post-state is deliberately not
/// persisted (spec §4.4.4).
#[derive(Debug, Clone, Copy)]
pub struct MultihopResult {
    pub input_amount: u128,
    pub output_amount: u128,
    pub total_fee_paid: u128,
    pub worst_leg_price_impact_bps: i64,
    pub legs_executed: usize,
}

/// Run `legs` in order, feeding each leg's output into the next as exact
/// input. Aborts on the first failing leg (spec §4.4.4: "abort the chain on
/// any leg failure").
pub fn simulate_multihop(
    registry: &CacheRegistry,
    legs: &[HopLeg],
    radii: SnapshotRadii,
    strict: bool,
    amount_in: u128,
) -> Result<MultihopResult, MultihopError> {
    if legs.is_empty() {
        return Err(MultihopError::EmptyChain);
    }

    let mut current_amount = amount_in;
    let mut total_fee: u128 = 0;
    let mut worst_impact: i64 = 0;

    for (i, leg) in legs.iter().enumerate() {
        let snapshot = build_snapshot(registry, leg.pool, radii, strict)
            .map_err(|_| MultihopError::SnapshotUnavailable(i))?;
        let result: SimResult = simulate(&snapshot, leg.direction, ExactSide::Input, current_amount)
            .map_err(|e| MultihopError::LegFailed(i, e))?;
        current_amount = result.output_amount;
        total_fee = total_fee.saturating_add(result.fee_paid);
        worst_impact = worst_impact.max(result.price_impact_bps);
    }

    Ok(MultihopResult {
        input_amount: amount_in,
        output_amount: current_amount,
        total_fee_paid: total_fee,
        worst_leg_price_impact_bps: worst_impact,
        legs_executed: legs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CpmmPool, PoolRecord, UpdateSource, Venue};

    fn seed_cpmm(registry: &CacheRegistry, pool: Pubkey, base: Pubkey, quote: Pubkey, fee_bps: u64, reserves: (u64, u64)) {
        let record = PoolRecord::Cpmm(CpmmPool {
            venue: Venue::CpmmA,
            base_vault: base,
            quote_vault: quote,
            base_mint: Pubkey::new([0xaa; 32]),
            quote_mint: Pubkey::new([0xbb; 32]),
            lp_supply: 0,
            fee_bps: Some(fee_bps),
            fee_numerator: 0,
            fee_denominator: 1,
        });
        registry.pools.set(pool, record, 100, 0, 0, UpdateSource::Stream, None);
        registry.vaults.set(
            base,
            crate::model::VaultRecord { mint: Pubkey::new([0xaa; 32]), owner_program: Pubkey::ZERO, amount: reserves.0, data_len: 165 },
            100,
            0,
            0,
            UpdateSource::Stream,
            None,
        );
        registry.vaults.set(
            quote,
            crate::model::VaultRecord { mint: Pubkey::new([0xbb; 32]), owner_program: Pubkey::ZERO, amount: reserves.1, data_len: 165 },
            100,
            0,
            0,
            UpdateSource::Stream,
            None,
        );
    }

    #[test]
    fn two_leg_chain_feeds_output_to_input() {
        let registry = CacheRegistry::new();
        let pool_a = Pubkey::new([1u8; 32]);
        let pool_b = Pubkey::new([2u8; 32]);
        seed_cpmm(&registry, pool_a, Pubkey::new([10u8; 32]), Pubkey::new([11u8; 32]), 30, (1_000_000_000, 1_000_000_000));
        seed_cpmm(&registry, pool_b, Pubkey::new([12u8; 32]), Pubkey::new([13u8; 32]), 30, (1_000_000_000, 1_000_000_000));

        let legs = [
            HopLeg { pool: pool_a, direction: Direction::BaseToQuote },
            HopLeg { pool: pool_b, direction: Direction::QuoteToBase },
        ];
        let result = simulate_multihop(&registry, &legs, SnapshotRadii::default(), false, 1_000_000).unwrap();
        assert_eq!(result.legs_executed, 2);
        assert!(result.output_amount > 0);
        assert!(result.total_fee_paid > 0);
    }

    #[test]
    fn missing_pool_aborts_chain() {
        let registry = CacheRegistry::new();
        let legs = [HopLeg { pool: Pubkey::new([99u8; 32]), direction: Direction::BaseToQuote }];
        let err = simulate_multihop(&registry, &legs, SnapshotRadii::default(), false, 1_000).unwrap_err();
        assert_eq!(err, MultihopError::SnapshotUnavailable(0));
    }

    #[test]
    fn empty_chain_is_rejected() {
        let registry = CacheRegistry::new();
        let err = simulate_multihop(&registry, &[], SnapshotRadii::default(), false, 1_000).unwrap_err();
        assert_eq!(err, MultihopError::EmptyChain);
    }
}
