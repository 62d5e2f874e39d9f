//! Bin-indexed discrete-liquidity simulator (spec §4.4.3).
//!
//! Each bin trades at one fixed price; a swap drains the bin's opposite-side
//! inventory before advancing the active bin by ±1. Empty bins cost nothing
//! but still move the price, which is exactly what the detector's
//! empty-bin-backrun signal watches for.

use crate::model::{Bin, BinArray, Direction, DlmmPool, ExactSide, BINS_PER_ARRAY};
use crate::snapshot::SimulationSnapshot;

use super::{invert_exact_output, PostState, SimError, SimResult};

/// Bin-id origin: bin 0 in price terms sits at `2^23`.
pub const BIN_ID_OFFSET: i64 = 1 << 23;
/// Ceiling on `baseFee + variableFee`; the source caps the dynamic term so a
/// volatility spike can never push the effective rate past this.
const MAX_VARIABLE_FEE_BPS: u64 = 2_000;
const MAX_STEPS: usize = 2_000;

pub fn simulate_dlmm(
    snapshot: &SimulationSnapshot,
    dlmm: &DlmmPool,
    direction: Direction,
    exact_side: ExactSide,
    amount: u128,
) -> Result<SimResult, SimError> {
    match exact_side {
        ExactSide::Input => quote_dlmm_exact_input(snapshot, dlmm, direction, amount),
        ExactSide::Output => {
            let base_reserve = snapshot.base_vault.amount as u128;
            let quote_reserve = snapshot.quote_vault.amount as u128;
            let max_input = match direction {
                Direction::BaseToQuote => quote_reserve.saturating_mul(1_000).max(1),
                Direction::QuoteToBase => base_reserve.saturating_mul(1_000).max(1),
            };
            invert_exact_output(amount, max_input, |candidate| {
                quote_dlmm_exact_input(snapshot, dlmm, direction, candidate)
            })
        }
    }
}

/// `variableFeeBps = floor(volatilityAccumulator * binStep^2 / 10000^2)`,
/// capped (spec §4.4.3, §4.5).
pub fn variable_fee_bps(volatility_accumulator: u32, bin_step: u16) -> u64 {
    let step = bin_step as u128;
    let raw = (volatility_accumulator as u128 * step * step) / 100_000_000u128;
    (raw as u64).min(MAX_VARIABLE_FEE_BPS)
}

pub fn effective_fee_bps(dlmm: &DlmmPool) -> u64 {
    let base = dlmm.base_factor as u64;
    let variable = variable_fee_bps(dlmm.volatility_accumulator, dlmm.bin_step);
    (base + variable).min(MAX_VARIABLE_FEE_BPS.saturating_add(base))
}

/// `(1 + binStep/10000)^(binId - 2^23)`, Q64.64.
fn bin_price_x64(bin_id: i32, bin_step: u16) -> Result<u128, SimError> {
    let exponent = bin_id as i64 - BIN_ID_OFFSET;
    let exponent: i32 = exponent.try_into().map_err(|_| SimError::MathOverflow)?;
    let base = 1.0_f64 + (bin_step as f64) / 10_000.0;
    let price = base.powi(exponent);
    let scaled = price * ((1u128 << 64) as f64);
    if !scaled.is_finite() || scaled < 0.0 || scaled > u128::MAX as f64 {
        return Err(SimError::MathOverflow);
    }
    Ok(scaled as u128)
}

fn find_bin(bin_arrays: &[BinArray], bin_id: i32) -> Option<Bin> {
    for array in bin_arrays {
        let array_base = array.array_index * BINS_PER_ARRAY as i64;
        let offset = bin_id as i64 - array_base;
        if (0..BINS_PER_ARRAY as i64).contains(&offset) {
            return Some(array.bins[offset as usize]);
        }
    }
    None
}

fn quote_dlmm_exact_input(
    snapshot: &SimulationSnapshot,
    dlmm: &DlmmPool,
    direction: Direction,
    amount_in: u128,
) -> Result<SimResult, SimError> {
    if amount_in == 0 {
        return Err(SimError::Slippage);
    }
    let fee_bps = effective_fee_bps(dlmm) as u128;
    if fee_bps >= 10_000 {
        return Err(SimError::MathOverflow);
    }

    let mut active_id = dlmm.active_id;
    let mut remaining = amount_in;
    let mut total_out: u128 = 0;
    let mut total_fee: u128 = 0;
    let mut touched_any_liquidity = false;

    for _ in 0..MAX_STEPS {
        if remaining == 0 {
            break;
        }
        let price_x64 = bin_price_x64(active_id, dlmm.bin_step)?;
        let bin = find_bin(&snapshot.bin_arrays, active_id);

        let (available_out, has_liquidity) = match bin {
            Some(b) => match direction {
                Direction::BaseToQuote => (b.amount_y as u128, b.amount_y > 0),
                Direction::QuoteToBase => (b.amount_x as u128, b.amount_x > 0),
            },
            None => (0, false),
        };

        if !has_liquidity {
            // Empty bin: zero cost, zero output, price still moves.
            active_id = match direction {
                Direction::BaseToQuote => active_id.checked_sub(1).ok_or(SimError::MathOverflow)?,
                Direction::QuoteToBase => active_id.checked_add(1).ok_or(SimError::MathOverflow)?,
            };
            continue;
        }
        touched_any_liquidity = true;

        // Gross input (pre-fee) that would exactly drain this bin's
        // opposite-side inventory at its fixed price.
        let gross_to_drain = match direction {
            Direction::BaseToQuote => mul_div_ceil_u128(available_out, 1u128 << 64, price_x64)?,
            Direction::QuoteToBase => mul_div_ceil_u128(available_out, price_x64, 1u128 << 64)?,
        };
        let net_to_drain = net_after_fee_ceiling(gross_to_drain, fee_bps)?;

        if net_to_drain > 0 && remaining >= gross_to_drain && gross_to_drain > 0 {
            total_out = total_out.checked_add(available_out).ok_or(SimError::MathOverflow)?;
            total_fee = total_fee
                .checked_add(gross_to_drain - net_to_drain)
                .ok_or(SimError::MathOverflow)?;
            remaining = remaining.checked_sub(gross_to_drain).ok_or(SimError::MathOverflow)?;
            active_id = match direction {
                Direction::BaseToQuote => active_id.checked_sub(1).ok_or(SimError::MathOverflow)?,
                Direction::QuoteToBase => active_id.checked_add(1).ok_or(SimError::MathOverflow)?,
            };
            continue;
        }

        // Partial fill within this bin: stays at fixed price.
        let fee = mul_div_ceil_u128(remaining, fee_bps, 10_000)?;
        let net_in = remaining.checked_sub(fee).ok_or(SimError::MathOverflow)?;
        let out = match direction {
            Direction::BaseToQuote => mul_div_floor_u128(net_in, price_x64, 1u128 << 64)?,
            Direction::QuoteToBase => mul_div_floor_u128(net_in, 1u128 << 64, price_x64)?,
        };
        let out = out.min(available_out);
        total_out = total_out.checked_add(out).ok_or(SimError::MathOverflow)?;
        total_fee = total_fee.checked_add(fee).ok_or(SimError::MathOverflow)?;
        remaining = 0;
        break;
    }

    if !touched_any_liquidity || total_out == 0 {
        return Err(SimError::InsufficientLiquidity);
    }

    let start_price = bin_price_x64(dlmm.active_id, dlmm.bin_step).unwrap_or(0);
    let end_price = bin_price_x64(active_id, dlmm.bin_step).unwrap_or(start_price);
    let impact = super::price_impact_bps(start_price, 1, end_price, 1);

    Ok(SimResult {
        input_amount: amount_in,
        output_amount: total_out,
        fee_paid: total_fee,
        price_impact_bps: impact,
        post_state: PostState::Dlmm { active_id },
    })
}

fn mul_div_ceil_u128(a: u128, b: u128, denom: u128) -> Result<u128, SimError> {
    if denom == 0 {
        return Err(SimError::MathOverflow);
    }
    let num = a.checked_mul(b).ok_or(SimError::MathOverflow)?;
    Ok((num + denom - 1) / denom)
}

fn mul_div_floor_u128(a: u128, b: u128, denom: u128) -> Result<u128, SimError> {
    if denom == 0 {
        return Err(SimError::MathOverflow);
    }
    let num = a.checked_mul(b).ok_or(SimError::MathOverflow)?;
    Ok(num / denom)
}

/// Net amount left after deducting a ceiling-rounded fee from `gross`.
fn net_after_fee_ceiling(gross: u128, fee_bps: u128) -> Result<u128, SimError> {
    let fee = mul_div_ceil_u128(gross, fee_bps, 10_000)?;
    gross.checked_sub(fee).ok_or(SimError::MathOverflow)
}
