//! Tick-indexed concentrated-liquidity simulator (spec §4.4.2).
//!
//! State moves through Q64.64 fixed-point `sqrtPrice` and u128 `liquidity`,
//! stepping tick-by-tick rather than solving the whole trade in one shot, so
//! liquidity updates at each crossing are applied in the same order the
//! on-chain program would apply them. Intermediate products can exceed
//! `u128` (two full-range Q64.64 values multiplied together already reach
//! 2^128), so every multiply-then-divide goes through [`num_bigint::BigUint`]
//! and is narrowed back to `u128` at the end, `math_overflow` on overflow.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::model::{ClmmPool, Direction, ExactSide, Tick};
use crate::snapshot::SimulationSnapshot;

use super::{invert_exact_output, PostState, SimError, SimResult};

const Q64: u128 = 1u128 << 64;
const DEFAULT_FEE_BPS: u64 = 25;

pub fn simulate_clmm(
    snapshot: &SimulationSnapshot,
    clmm: &ClmmPool,
    direction: Direction,
    exact_side: ExactSide,
    amount: u128,
    price_limit_x64: Option<u128>,
) -> Result<SimResult, SimError> {
    let fee_bps = snapshot.config.map(|c| c.fee_bps).unwrap_or(DEFAULT_FEE_BPS);
    let ticks = collect_initialized_ticks(snapshot);

    match exact_side {
        ExactSide::Input => quote_clmm_exact_input(clmm, &ticks, fee_bps, direction, amount, price_limit_x64),
        ExactSide::Output => {
            let base_reserve = snapshot.base_vault.amount as u128;
            let quote_reserve = snapshot.quote_vault.amount as u128;
            let max_input = match direction {
                Direction::BaseToQuote => base_reserve.saturating_mul(1_000).max(1),
                Direction::QuoteToBase => quote_reserve.saturating_mul(1_000).max(1),
            };
            invert_exact_output(amount, max_input, |candidate| {
                quote_clmm_exact_input(clmm, &ticks, fee_bps, direction, candidate, price_limit_x64)
            })
        }
    }
}

fn collect_initialized_ticks(snapshot: &SimulationSnapshot) -> Vec<(i32, Tick)> {
    let mut out = Vec::new();
    for array in &snapshot.tick_arrays {
        for (i, tick) in array.ticks.iter().enumerate() {
            if tick.initialized() {
                out.push((array.start_tick_index + i as i32, *tick));
            }
        }
    }
    out.sort_by_key(|(idx, _)| *idx);
    out
}

fn next_tick(ticks: &[(i32, Tick)], cursor: i32, direction: Direction) -> Option<(i32, Tick)> {
    match direction {
        // Buying base: price rises, walk toward higher ticks.
        Direction::QuoteToBase => ticks.iter().filter(|(idx, _)| *idx > cursor).min_by_key(|(idx, _)| *idx).copied(),
        // Selling base: price falls, walk toward lower ticks.
        Direction::BaseToQuote => ticks.iter().filter(|(idx, _)| *idx < cursor).max_by_key(|(idx, _)| *idx).copied(),
    }
}

/// `sqrt(1.0001^tick)` in Q64.64. Not consensus math -- this engine only
/// needs it to size price movement between loaded ticks, so a float
/// exponential (rather than a fixed-point power-of-two ladder) is accurate
/// enough and far simpler.
fn tick_to_sqrt_price_x64(tick: i32) -> Result<u128, SimError> {
    let price = 1.0001_f64.powi(tick);
    let sqrt_price = price.sqrt() * (Q64 as f64);
    if !sqrt_price.is_finite() || sqrt_price < 0.0 || sqrt_price > u128::MAX as f64 {
        return Err(SimError::MathOverflow);
    }
    Ok(sqrt_price as u128)
}

fn mul_div_ceil(a: u128, b: u128, denom: u128) -> Result<u128, SimError> {
    if denom == 0 {
        return Err(SimError::MathOverflow);
    }
    let num = BigUint::from(a) * BigUint::from(b);
    let d = BigUint::from(denom);
    let ceil = (&num + &d - BigUint::from(1u32)) / &d;
    ceil.to_u128().ok_or(SimError::MathOverflow)
}

/// `L * (sqrtHi - sqrtLo) * 2^64 / (sqrtLo * sqrtHi)` -- amount of the base
/// asset (token0) spanned by `[sqrtLo, sqrtHi]` at liquidity `L`.
fn amount0_delta(liquidity: u128, sqrt_lo: u128, sqrt_hi: u128) -> Result<u128, SimError> {
    let diff = sqrt_hi.checked_sub(sqrt_lo).ok_or(SimError::MathOverflow)?;
    let denom = BigUint::from(sqrt_lo) * BigUint::from(sqrt_hi);
    if denom == BigUint::from(0u32) {
        return Err(SimError::MathOverflow);
    }
    let num = BigUint::from(liquidity) * BigUint::from(diff) * BigUint::from(Q64);
    (num / denom).to_u128().ok_or(SimError::MathOverflow)
}

/// `L * (sqrtHi - sqrtLo) / 2^64` -- amount of the quote asset (token1).
fn amount1_delta(liquidity: u128, sqrt_lo: u128, sqrt_hi: u128) -> Result<u128, SimError> {
    let diff = sqrt_hi.checked_sub(sqrt_lo).ok_or(SimError::MathOverflow)?;
    let num = BigUint::from(liquidity) * BigUint::from(diff);
    (num / BigUint::from(Q64)).to_u128().ok_or(SimError::MathOverflow)
}

/// Price after adding `amount_in` of token0 (price falls).
fn next_sqrt_from_token0(sqrt_current: u128, liquidity: u128, amount_in: u128) -> Result<u128, SimError> {
    if liquidity == 0 {
        return Err(SimError::InsufficientLiquidity);
    }
    let l = BigUint::from(liquidity);
    let s = BigUint::from(sqrt_current);
    let q64 = BigUint::from(Q64);
    let numerator = &l * &s * &q64;
    let denom = &l * &q64 + BigUint::from(amount_in) * &s;
    if denom == BigUint::from(0u32) {
        return Err(SimError::MathOverflow);
    }
    (numerator / denom).to_u128().ok_or(SimError::MathOverflow)
}

/// Price after adding `amount_in` of token1 (price rises).
fn next_sqrt_from_token1(sqrt_current: u128, liquidity: u128, amount_in: u128) -> Result<u128, SimError> {
    if liquidity == 0 {
        return Err(SimError::InsufficientLiquidity);
    }
    let delta = (BigUint::from(amount_in) * BigUint::from(Q64)) / BigUint::from(liquidity);
    let new_sqrt = BigUint::from(sqrt_current) + delta;
    new_sqrt.to_u128().ok_or(SimError::MathOverflow)
}

fn apply_liquidity_net(liquidity: u128, net: i128, direction: Direction) -> Result<u128, SimError> {
    let signed_net = match direction {
        Direction::QuoteToBase => net,
        Direction::BaseToQuote => net.checked_neg().ok_or(SimError::MathOverflow)?,
    };
    if signed_net >= 0 {
        liquidity.checked_add(signed_net as u128).ok_or(SimError::MathOverflow)
    } else {
        liquidity.checked_sub(signed_net.unsigned_abs()).ok_or(SimError::MathOverflow)
    }
}

fn clmm_price_impact_bps(sqrt_before: u128, sqrt_after: u128) -> i64 {
    let before = (sqrt_before as f64) / (Q64 as f64);
    let after = (sqrt_after as f64) / (Q64 as f64);
    let spot = before * before;
    if spot <= 0.0 {
        return 0;
    }
    let exec = after * after;
    (((exec - spot).abs() / spot) * 10_000.0) as i64
}

fn quote_clmm_exact_input(
    clmm: &ClmmPool,
    ticks: &[(i32, Tick)],
    fee_bps: u64,
    direction: Direction,
    amount_in: u128,
    price_limit_x64: Option<u128>,
) -> Result<SimResult, SimError> {
    if amount_in == 0 {
        return Err(SimError::Slippage);
    }
    if fee_bps >= 10_000 {
        return Err(SimError::MathOverflow);
    }

    let sqrt_start = clmm.sqrt_price_x64;
    let mut sqrt_current = sqrt_start;
    let mut liquidity = clmm.liquidity;
    let mut tick_cursor = clmm.tick_current;
    let mut remaining = amount_in;
    let mut total_out: u128 = 0u128;
    let mut total_fee: u128 = 0u128;

    let max_steps = ticks.len() + 2;
    for _ in 0..max_steps {
        if remaining == 0 {
            break;
        }
        let Some((idx, tick)) = next_tick(ticks, tick_cursor, direction) else {
            let (out, fee) = consume_remaining(sqrt_current, liquidity, remaining, fee_bps, direction)?;
            total_out = total_out.checked_add(out).ok_or(SimError::MathOverflow)?;
            total_fee = total_fee.checked_add(fee).ok_or(SimError::MathOverflow)?;
            sqrt_current = match direction {
                Direction::QuoteToBase => next_sqrt_from_token1(sqrt_current, liquidity, remaining - fee)?,
                Direction::BaseToQuote => next_sqrt_from_token0(sqrt_current, liquidity, remaining - fee)?,
            };
            remaining = 0;
            break;
        };

        let raw_target = tick_to_sqrt_price_x64(idx)?;
        let (target, clamped) = match (price_limit_x64, direction) {
            (Some(limit), Direction::QuoteToBase) if limit < raw_target => (limit, true),
            (Some(limit), Direction::BaseToQuote) if limit > raw_target => (limit, true),
            _ => (raw_target, false),
        };

        let delta_full_net = match direction {
            Direction::QuoteToBase => amount1_delta(liquidity, sqrt_current, target)?,
            Direction::BaseToQuote => amount0_delta(liquidity, target, sqrt_current)?,
        };

        let gross_needed = if delta_full_net == 0 {
            0
        } else {
            mul_div_ceil(delta_full_net, 10_000, 10_000 - fee_bps as u128)?
        };

        if gross_needed > 0 && remaining >= gross_needed {
            let fee = gross_needed.checked_sub(delta_full_net).ok_or(SimError::MathOverflow)?;
            let out = match direction {
                Direction::QuoteToBase => amount0_delta(liquidity, sqrt_current, target)?,
                Direction::BaseToQuote => amount1_delta(liquidity, target, sqrt_current)?,
            };
            total_out = total_out.checked_add(out).ok_or(SimError::MathOverflow)?;
            total_fee = total_fee.checked_add(fee).ok_or(SimError::MathOverflow)?;
            remaining = remaining.checked_sub(gross_needed).ok_or(SimError::MathOverflow)?;
            sqrt_current = target;

            if clamped {
                break;
            }
            liquidity = apply_liquidity_net(liquidity, tick.liquidity_net, direction)?;
            tick_cursor = idx;
            continue;
        }

        let (out, fee) = consume_remaining(sqrt_current, liquidity, remaining, fee_bps, direction)?;
        total_out = total_out.checked_add(out).ok_or(SimError::MathOverflow)?;
        total_fee = total_fee.checked_add(fee).ok_or(SimError::MathOverflow)?;
        sqrt_current = match direction {
            Direction::QuoteToBase => next_sqrt_from_token1(sqrt_current, liquidity, remaining - fee)?,
            Direction::BaseToQuote => next_sqrt_from_token0(sqrt_current, liquidity, remaining - fee)?,
        };
        remaining = 0;
        break;
    }

    if total_out == 0 {
        return Err(SimError::InsufficientLiquidity);
    }

    let impact = clmm_price_impact_bps(sqrt_start, sqrt_current);
    Ok(SimResult {
        input_amount: amount_in,
        output_amount: total_out,
        fee_paid: total_fee,
        price_impact_bps: impact,
        post_state: PostState::Clmm { sqrt_price_x64: sqrt_current, liquidity, tick_current: tick_cursor },
    })
}

fn consume_remaining(
    sqrt_current: u128,
    liquidity: u128,
    remaining: u128,
    fee_bps: u64,
    direction: Direction,
) -> Result<(u128, u128), SimError> {
    let fee = mul_div_ceil(remaining, fee_bps as u128, 10_000)?;
    let net_in = remaining.checked_sub(fee).ok_or(SimError::MathOverflow)?;
    let new_sqrt = match direction {
        Direction::QuoteToBase => next_sqrt_from_token1(sqrt_current, liquidity, net_in)?,
        Direction::BaseToQuote => next_sqrt_from_token0(sqrt_current, liquidity, net_in)?,
    };
    let out = match direction {
        Direction::QuoteToBase => amount0_delta(liquidity, sqrt_current, new_sqrt)?,
        Direction::BaseToQuote => amount1_delta(liquidity, new_sqrt, sqrt_current)?,
    };
    Ok((out, fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfigRecord, PoolRecord, TickArray, VaultRecord, Venue, TICKS_PER_ARRAY};
    use crate::pubkey::Pubkey;

    fn pool(sqrt_price_x64: u128, tick_current: i32, liquidity: u128) -> ClmmPool {
        ClmmPool {
            base_vault: Pubkey::ZERO,
            quote_vault: Pubkey::ZERO,
            base_mint: Pubkey::new([1u8; 32]),
            quote_mint: Pubkey::new([2u8; 32]),
            amm_config: Pubkey::new([3u8; 32]),
            sqrt_price_x64,
            tick_current,
            tick_spacing: 60,
            liquidity,
            tick_bitmap: [u64::MAX; 16],
            bitmap_extension: None,
        }
    }

    fn snapshot_with_ticks(clmm: ClmmPool, crossings: &[(i32, i128)]) -> SimulationSnapshot {
        let mut ticks = Box::new([Tick::default(); TICKS_PER_ARRAY]);
        let start = clmm.tick_current - (clmm.tick_current % (TICKS_PER_ARRAY as i32 * clmm.tick_spacing as i32));
        for &(idx, net) in crossings {
            let offset = ((idx - start) / clmm.tick_spacing as i32) as usize;
            ticks[offset] = Tick { liquidity_net: net, liquidity_gross: net.unsigned_abs() };
        }
        let array = TickArray { pool: Pubkey::ZERO, start_tick_index: start, ticks };
        SimulationSnapshot {
            pool: Pubkey::ZERO,
            record: PoolRecord::Clmm(clmm),
            base_vault: VaultRecord { mint: clmm.base_mint, owner_program: Pubkey::ZERO, amount: 1_000_000_000, data_len: 165 },
            quote_vault: VaultRecord { mint: clmm.quote_mint, owner_program: Pubkey::ZERO, amount: 1_000_000_000, data_len: 165 },
            config: Some(ConfigRecord { fee_bps: 25, protocol_fee_bps: 0 }),
            tick_arrays: vec![array],
            bin_arrays: Vec::new(),
            as_of_slot: 0,
            pool_slot: 0,
        }
    }

    #[test]
    fn small_trade_within_current_range_costs_no_crossing() {
        let clmm = pool(Q64, 0, 1_000_000_000_000_000);
        let snap = snapshot_with_ticks(clmm, &[]);
        let result = simulate_clmm(&snap, &clmm, Direction::BaseToQuote, ExactSide::Input, 1_000_000, None).unwrap();
        assert!(result.output_amount > 0);
        assert_eq!(result.fee_paid, mul_div_ceil(1_000_000, 25, 10_000).unwrap());
        match result.post_state {
            PostState::Clmm { liquidity, .. } => assert_eq!(liquidity, clmm.liquidity),
            _ => panic!("expected clmm post-state"),
        }
    }

    #[test]
    fn crossing_an_initialized_tick_updates_liquidity() {
        let clmm = pool(Q64, 0, 1_000_000_000_000_000);
        let snap = snapshot_with_ticks(clmm, &[(60, 100_000_000_000_000), (-60, -100_000_000_000_000)]);
        let result = simulate_clmm(&snap, &clmm, Direction::QuoteToBase, ExactSide::Input, 500_000_000_000, None).unwrap();
        match result.post_state {
            PostState::Clmm { liquidity, tick_current, .. } => {
                assert_eq!(liquidity, clmm.liquidity + 100_000_000_000_000);
                assert!(tick_current >= 60);
            }
            _ => panic!("expected clmm post-state"),
        }
    }

    #[test]
    fn price_limit_clamps_before_reaching_tick() {
        let clmm = pool(Q64, 0, 1_000_000_000_000_000);
        let snap = snapshot_with_ticks(clmm, &[(60, 100_000_000_000_000)]);
        let tight_limit = Q64 + Q64 / 1_000_000;
        let result =
            simulate_clmm(&snap, &clmm, Direction::QuoteToBase, ExactSide::Input, 10_000_000_000_000, Some(tight_limit))
                .unwrap();
        match result.post_state {
            PostState::Clmm { liquidity, .. } => assert_eq!(liquidity, clmm.liquidity),
            _ => panic!("expected clmm post-state"),
        }
    }

    #[test]
    fn no_liquidity_at_all_is_insufficient_liquidity() {
        let clmm = pool(Q64, 0, 0);
        let snap = snapshot_with_ticks(clmm, &[]);
        let err = simulate_clmm(&snap, &clmm, Direction::BaseToQuote, ExactSide::Input, 1_000, None).unwrap_err();
        assert_eq!(err, SimError::InsufficientLiquidity);
    }

    #[test]
    fn exact_output_inversion_meets_target() {
        let clmm = pool(Q64, 0, 1_000_000_000_000_000);
        let snap = snapshot_with_ticks(clmm, &[]);
        let target = 10_000_000u128;
        let result = simulate_clmm(&snap, &clmm, Direction::BaseToQuote, ExactSide::Output, target, None).unwrap();
        assert!(result.output_amount >= target);
    }
}
