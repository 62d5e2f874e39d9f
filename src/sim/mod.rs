//! Venue simulation kernels (spec §4.4, component C4).
//!
//! Every simulator is a pure function `(snapshot, direction, exact side) ->
//! Result<SimResult, SimError>` -- no I/O, no cache access, fully
//! deterministic given its inputs (spec §9: "everywhere else, pure
//! functions and immutable snapshots").

mod clmm;
mod cpmm;
mod dlmm;
mod multihop;

pub use clmm::simulate_clmm;
pub use cpmm::{simulate_cpmm_a, simulate_cpmm_b};
pub use dlmm::{effective_fee_bps, simulate_dlmm};
pub use multihop::{simulate_multihop, HopLeg, MultihopError, MultihopResult};

use crate::model::{Direction, ExactSide, PoolRecord};
use crate::snapshot::SimulationSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("slippage")]
    Slippage,
    #[error("insufficient_liquidity")]
    InsufficientLiquidity,
    #[error("stale_state")]
    StaleState,
    #[error("math_overflow")]
    MathOverflow,
}

/// Post-swap pool state, venue-specific (spec §4.4: "post-swap pool
/// state").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostState {
    Cpmm { base_reserve: u128, quote_reserve: u128 },
    Clmm { sqrt_price_x64: u128, liquidity: u128, tick_current: i32 },
    Dlmm { active_id: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimResult {
    pub input_amount: u128,
    pub output_amount: u128,
    pub fee_paid: u128,
    pub price_impact_bps: i64,
    pub post_state: PostState,
}

/// Cross-multiplied so no precision is lost comparing two ratios: returns
/// the absolute relative difference between `exec = exec_num/exec_den` and
/// `spot = spot_num/spot_den`, in basis points.
pub(crate) fn price_impact_bps(spot_num: u128, spot_den: u128, exec_num: u128, exec_den: u128) -> i64 {
    if spot_num == 0 || spot_den == 0 || exec_den == 0 {
        return 0;
    }
    let lhs = spot_num.saturating_mul(exec_den);
    let rhs = exec_num.saturating_mul(spot_den);
    let diff = lhs.abs_diff(rhs);
    let denom = lhs.max(1);
    ((diff.saturating_mul(10_000)) / denom) as i64
}

/// Dispatch on the snapshot's venue tag to the matching pure simulator
/// (spec §9: static dispatch on a tagged union, not a trait object).
pub fn simulate(
    snapshot: &SimulationSnapshot,
    direction: Direction,
    exact_side: ExactSide,
    amount: u128,
) -> Result<SimResult, SimError> {
    match &snapshot.record {
        PoolRecord::Cpmm(cpmm) if cpmm.fee_bps.is_some() => {
            simulate_cpmm_a(snapshot, cpmm, direction, exact_side, amount)
        }
        PoolRecord::Cpmm(cpmm) => simulate_cpmm_b(snapshot, cpmm, direction, exact_side, amount),
        PoolRecord::Clmm(clmm) => simulate_clmm(snapshot, clmm, direction, exact_side, amount, None),
        PoolRecord::Dlmm(dlmm) => simulate_dlmm(snapshot, dlmm, direction, exact_side, amount),
    }
}

/// Binary-search an exact-input amount that yields at least `target_output`
/// under `quote`, used to implement `ExactSide::Output` on top of a venue's
/// native exact-input math (spec §4.4 leaves exact-output unspecified per
/// venue; this keeps one implementation instead of four).
pub(crate) fn invert_exact_output(
    target_output: u128,
    max_input: u128,
    mut quote: impl FnMut(u128) -> Result<SimResult, SimError>,
) -> Result<SimResult, SimError> {
    let ceiling = quote(max_input)?;
    if ceiling.output_amount < target_output {
        return Err(SimError::InsufficientLiquidity);
    }
    let mut lo: u128 = 0;
    let mut hi: u128 = max_input;
    let mut best: Option<SimResult> = None;
    for _ in 0..64 {
        if lo >= hi {
            break;
        }
        let mid = lo + (hi - lo) / 2;
        if mid == 0 {
            lo = 1;
            continue;
        }
        let result = quote(mid)?;
        if result.output_amount >= target_output {
            best = Some(result);
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    best.ok_or(SimError::InsufficientLiquidity)
}
