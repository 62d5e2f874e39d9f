//! Constant-product simulators for both CPMM venue families (spec §4.4.1).

use crate::model::{CpmmPool, Direction, ExactSide};
use crate::snapshot::SimulationSnapshot;

use super::{invert_exact_output, price_impact_bps, PostState, SimError, SimResult};

fn div_ceil_u128(a: u128, b: u128) -> u128 {
    (a + b - 1) / b
}

/// Variant A: fee applied on the output side when selling base, and (via
/// an equivalent inversion) on the input side when buying base (spec
/// §4.4.1).
pub fn simulate_cpmm_a(
    snapshot: &SimulationSnapshot,
    cpmm: &CpmmPool,
    direction: Direction,
    exact_side: ExactSide,
    amount: u128,
) -> Result<SimResult, SimError> {
    let fee_bps = cpmm.fee_bps.expect("variant A pools always carry fee_bps") as u128;
    let base_reserve = snapshot.base_vault.amount as u128;
    let quote_reserve = snapshot.quote_vault.amount as u128;

    match exact_side {
        ExactSide::Input => quote_cpmm_a_exact_input(base_reserve, quote_reserve, fee_bps, direction, amount),
        ExactSide::Output => {
            let max_input = match direction {
                Direction::BaseToQuote => quote_reserve.saturating_mul(1_000).max(1),
                Direction::QuoteToBase => base_reserve.saturating_mul(1_000).max(1),
            };
            invert_exact_output(amount, max_input, |candidate| {
                quote_cpmm_a_exact_input(base_reserve, quote_reserve, fee_bps, direction, candidate)
            })
        }
    }
}

fn quote_cpmm_a_exact_input(
    base_reserve: u128,
    quote_reserve: u128,
    fee_bps: u128,
    direction: Direction,
    amount_in: u128,
) -> Result<SimResult, SimError> {
    if amount_in == 0 {
        return Err(SimError::Slippage);
    }
    match direction {
        Direction::BaseToQuote => {
            // Selling base: fee on output.
            let denom = base_reserve.checked_add(amount_in).ok_or(SimError::MathOverflow)?;
            let gross_out = quote_reserve
                .checked_mul(amount_in)
                .ok_or(SimError::MathOverflow)?
                / denom;
            if gross_out >= quote_reserve {
                return Err(SimError::InsufficientLiquidity);
            }
            let fee = gross_out.checked_mul(fee_bps).ok_or(SimError::MathOverflow)? / 10_000;
            let output = gross_out - fee;
            let new_base = base_reserve + amount_in;
            let new_quote = quote_reserve - output;
            let impact = price_impact_bps(quote_reserve, base_reserve, output, amount_in);
            Ok(SimResult {
                input_amount: amount_in,
                output_amount: output,
                fee_paid: fee,
                price_impact_bps: impact,
                post_state: PostState::Cpmm { base_reserve: new_base, quote_reserve: new_quote },
            })
        }
        Direction::QuoteToBase => {
            // Buying base: fee on input, inverted per spec (ceiling correction mandatory).
            let mut net = amount_in * 10_000 / (10_000 + fee_bps);
            let fee_on_net = div_ceil_u128(net * fee_bps, 10_000);
            if net + fee_on_net < amount_in {
                net += 1;
            }
            let denom = quote_reserve.checked_add(net).ok_or(SimError::MathOverflow)?;
            let output = base_reserve.checked_mul(net).ok_or(SimError::MathOverflow)? / denom;
            if output >= base_reserve {
                return Err(SimError::InsufficientLiquidity);
            }
            let fee_paid = amount_in - net;
            let new_quote = quote_reserve + amount_in;
            let new_base = base_reserve - output;
            let impact = price_impact_bps(base_reserve, quote_reserve, output, amount_in);
            Ok(SimResult {
                input_amount: amount_in,
                output_amount: output,
                fee_paid,
                price_impact_bps: impact,
                post_state: PostState::Cpmm { base_reserve: new_base, quote_reserve: new_quote },
            })
        }
    }
}

/// Variant B: fee is a ratio `feeNumerator/feeDenominator`, deducted from
/// the input before the constant-product step (spec §4.4.1).
pub fn simulate_cpmm_b(
    snapshot: &SimulationSnapshot,
    cpmm: &CpmmPool,
    direction: Direction,
    exact_side: ExactSide,
    amount: u128,
) -> Result<SimResult, SimError> {
    let num = cpmm.fee_numerator as u128;
    let den = cpmm.fee_denominator as u128;
    let base_reserve = snapshot.base_vault.amount as u128;
    let quote_reserve = snapshot.quote_vault.amount as u128;

    match exact_side {
        ExactSide::Input => quote_cpmm_b_exact_input(base_reserve, quote_reserve, num, den, direction, amount),
        ExactSide::Output => {
            let max_input = match direction {
                Direction::BaseToQuote => quote_reserve.saturating_mul(1_000).max(1),
                Direction::QuoteToBase => base_reserve.saturating_mul(1_000).max(1),
            };
            invert_exact_output(amount, max_input, |candidate| {
                quote_cpmm_b_exact_input(base_reserve, quote_reserve, num, den, direction, candidate)
            })
        }
    }
}

fn quote_cpmm_b_exact_input(
    base_reserve: u128,
    quote_reserve: u128,
    num: u128,
    den: u128,
    direction: Direction,
    amount_in: u128,
) -> Result<SimResult, SimError> {
    if amount_in == 0 || den == 0 {
        return Err(SimError::Slippage);
    }
    let fee = amount_in.checked_mul(num).ok_or(SimError::MathOverflow)? / den;
    let amount_after_fee = amount_in.checked_sub(fee).ok_or(SimError::MathOverflow)?;

    let (in_reserve, out_reserve) = match direction {
        Direction::BaseToQuote => (base_reserve, quote_reserve),
        Direction::QuoteToBase => (quote_reserve, base_reserve),
    };
    let denom = in_reserve.checked_add(amount_after_fee).ok_or(SimError::MathOverflow)?;
    let output = out_reserve
        .checked_mul(amount_after_fee)
        .ok_or(SimError::MathOverflow)?
        / denom;
    if output >= out_reserve {
        return Err(SimError::InsufficientLiquidity);
    }

    let (new_base, new_quote) = match direction {
        Direction::BaseToQuote => (base_reserve + amount_in, quote_reserve - output),
        Direction::QuoteToBase => (base_reserve - output, quote_reserve + amount_in),
    };
    let impact = price_impact_bps(out_reserve, in_reserve, output, amount_after_fee);

    Ok(SimResult {
        input_amount: amount_in,
        output_amount: output,
        fee_paid: fee,
        price_impact_bps: impact,
        post_state: PostState::Cpmm { base_reserve: new_base, quote_reserve: new_quote },
    })
}
