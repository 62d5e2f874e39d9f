//! Pending-transaction swap-leg decoding (spec §4.1, §6.2).
//!
//! Produces the ordered list of swap legs a pending transaction will
//! execute, used by the detector's backrun feed. Multi-leg swaps chain:
//! output of leg *k* is input of leg *k+1* (spec §4.4.4), but decoding
//! itself is per-instruction and stateless.

use super::{read_u128_le, read_u64_le, DecodeError};
use crate::ix_discriminators::{
    CLMM_SWAP_DISCRIMINATOR, CPMM_A_BUY_DISCRIMINATOR, CPMM_A_SELL_DISCRIMINATOR,
    CPMM_B_SWAP_OPCODE, DLMM_SWAP_DISCRIMINATOR,
};
use crate::model::{Direction, ExactSide, SwapLeg, Venue};
use crate::pubkey::Pubkey;

/// A single instruction from a pending transaction's message, already
/// separated from account-table-lookup resolution by the caller (the
/// concrete stream transport is an external collaborator per spec §1).
#[derive(Debug, Clone)]
pub struct RawInstruction {
    pub program_id: Pubkey,
    /// Account order: `[pool, base_vault, quote_vault, base_mint,
    /// quote_mint, ..]`, matching the instruction-encoding convention in
    /// spec §4.6.
    pub accounts: Vec<Pubkey>,
    pub data: Vec<u8>,
}

fn accounts5(ix: &RawInstruction) -> Option<(Pubkey, Pubkey, Pubkey, Pubkey, Pubkey)> {
    if ix.accounts.len() < 5 {
        return None;
    }
    Some((ix.accounts[0], ix.accounts[1], ix.accounts[2], ix.accounts[3], ix.accounts[4]))
}

/// Decode every swap leg contained in a pending transaction's instruction
/// list. Instructions that don't match a known swap shape are skipped, not
/// treated as an error -- a pending tx commonly carries unrelated
/// instructions (compute-budget hints, ATA creation, etc).
pub fn decode_tx_legs(instructions: &[RawInstruction]) -> Result<Vec<SwapLeg>, DecodeError> {
    let mut legs = Vec::new();
    for ix in instructions {
        if let Some(leg) = decode_one(ix)? {
            legs.push(leg);
        }
    }
    Ok(legs)
}

fn decode_one(ix: &RawInstruction) -> Result<Option<SwapLeg>, DecodeError> {
    if ix.data.len() >= 8 && ix.data[..8] == CPMM_A_BUY_DISCRIMINATOR {
        return decode_cpmm_a(ix, Direction::QuoteToBase).map(Some);
    }
    if ix.data.len() >= 8 && ix.data[..8] == CPMM_A_SELL_DISCRIMINATOR {
        return decode_cpmm_a(ix, Direction::BaseToQuote).map(Some);
    }
    if !ix.data.is_empty() && ix.data[0] == CPMM_B_SWAP_OPCODE {
        return decode_cpmm_b(ix).map(Some);
    }
    if ix.data.len() >= 8 && ix.data[..8] == CLMM_SWAP_DISCRIMINATOR {
        return decode_clmm(ix).map(Some);
    }
    if ix.data.len() >= 8 && ix.data[..8] == DLMM_SWAP_DISCRIMINATOR {
        return decode_dlmm(ix).map(Some);
    }
    Ok(None)
}

fn decode_cpmm_a(ix: &RawInstruction, direction: Direction) -> Result<SwapLeg, DecodeError> {
    if ix.data.len() < 24 {
        return Err(DecodeError::BadLength(ix.data.len()));
    }
    let (pool, base_vault, quote_vault, base_mint, quote_mint) =
        accounts5(ix).ok_or(DecodeError::BadLength(ix.accounts.len()))?;
    let amount_in = read_u64_le(&ix.data, 8);
    let min_out = read_u64_le(&ix.data, 16);
    let (input_mint, output_mint) = match direction {
        Direction::BaseToQuote => (base_mint, quote_mint),
        Direction::QuoteToBase => (quote_mint, base_mint),
    };
    Ok(SwapLeg {
        venue: Venue::CpmmA,
        pool,
        direction,
        input_mint,
        output_mint,
        input_amount: amount_in,
        min_output_amount: min_out,
        exact_side: ExactSide::Input,
        sqrt_price_limit_x64: None,
        base_vault,
        quote_vault,
    })
}

fn decode_cpmm_b(ix: &RawInstruction) -> Result<SwapLeg, DecodeError> {
    if ix.data.len() < 17 {
        return Err(DecodeError::BadLength(ix.data.len()));
    }
    let (pool, base_vault, quote_vault, base_mint, quote_mint) =
        accounts5(ix).ok_or(DecodeError::BadLength(ix.accounts.len()))?;
    let amount_in = read_u64_le(&ix.data, 1);
    let min_out = read_u64_le(&ix.data, 9);
    Ok(SwapLeg {
        venue: Venue::CpmmB,
        pool,
        direction: Direction::BaseToQuote,
        input_mint: base_mint,
        output_mint: quote_mint,
        input_amount: amount_in,
        min_output_amount: min_out,
        exact_side: ExactSide::Input,
        sqrt_price_limit_x64: None,
        base_vault,
        quote_vault,
    })
}

fn decode_clmm(ix: &RawInstruction) -> Result<SwapLeg, DecodeError> {
    // [disc(8), amount(8), other_threshold(8), sqrt_price_limit(16), is_base_input(1)]
    if ix.data.len() < 41 {
        return Err(DecodeError::BadLength(ix.data.len()));
    }
    let (pool, base_vault, quote_vault, base_mint, quote_mint) =
        accounts5(ix).ok_or(DecodeError::BadLength(ix.accounts.len()))?;
    let amount = read_u64_le(&ix.data, 8);
    let other_threshold = read_u64_le(&ix.data, 16);
    let sqrt_price_limit = read_u128_le(&ix.data, 24);
    let is_base_input = ix.data[40] != 0;
    let direction = if is_base_input {
        Direction::BaseToQuote
    } else {
        Direction::QuoteToBase
    };
    let (input_mint, output_mint) = match direction {
        Direction::BaseToQuote => (base_mint, quote_mint),
        Direction::QuoteToBase => (quote_mint, base_mint),
    };
    Ok(SwapLeg {
        venue: Venue::Clmm,
        pool,
        direction,
        input_mint,
        output_mint,
        input_amount: amount,
        min_output_amount: other_threshold,
        exact_side: ExactSide::Input,
        sqrt_price_limit_x64: Some(sqrt_price_limit),
        base_vault,
        quote_vault,
    })
}

fn decode_dlmm(ix: &RawInstruction) -> Result<SwapLeg, DecodeError> {
    // [disc(8), amount_in(8), min_amount_out(8), swap_for_y(1)]
    if ix.data.len() < 25 {
        return Err(DecodeError::BadLength(ix.data.len()));
    }
    let (pool, base_vault, quote_vault, base_mint, quote_mint) =
        accounts5(ix).ok_or(DecodeError::BadLength(ix.accounts.len()))?;
    let amount_in = read_u64_le(&ix.data, 8);
    let min_out = read_u64_le(&ix.data, 16);
    let swap_for_y = ix.data[24] != 0;
    let direction = if swap_for_y {
        Direction::BaseToQuote
    } else {
        Direction::QuoteToBase
    };
    let (input_mint, output_mint) = match direction {
        Direction::BaseToQuote => (base_mint, quote_mint),
        Direction::QuoteToBase => (quote_mint, base_mint),
    };
    Ok(SwapLeg {
        venue: Venue::Dlmm,
        pool,
        direction,
        input_mint,
        output_mint,
        input_amount: amount_in,
        min_output_amount: min_out,
        exact_side: ExactSide::Input,
        sqrt_price_limit_x64: None,
        base_vault,
        quote_vault,
    })
}
