//! Venue-specific swap instruction encoding (spec §4.6): each is a
//! fixed-length byte string, a discriminator/opcode followed by
//! little-endian fields, mirroring the decoder's layouts in
//! [`crate::ix_discriminators`] exactly so a decode fixture and an encode
//! fixture can never silently drift apart.

use crate::ix_discriminators::{
    CLMM_SWAP_DISCRIMINATOR, CPMM_A_BUY_DISCRIMINATOR, CPMM_A_SELL_DISCRIMINATOR,
    CPMM_B_SWAP_OPCODE, DLMM_SWAP_DISCRIMINATOR,
};
use crate::model::Direction;

/// `[8-byte disc, u64 amountIn, u64 minOut]`.
pub fn encode_cpmm_a_swap(direction: Direction, amount_in: u64, min_out: u64) -> Vec<u8> {
    let disc = match direction {
        Direction::BaseToQuote => CPMM_A_SELL_DISCRIMINATOR,
        Direction::QuoteToBase => CPMM_A_BUY_DISCRIMINATOR,
    };
    let mut buf = Vec::with_capacity(24);
    buf.extend_from_slice(&disc);
    buf.extend_from_slice(&amount_in.to_le_bytes());
    buf.extend_from_slice(&min_out.to_le_bytes());
    buf
}

/// `[1-byte opcode, u8 direction, u64 amountIn, u64 minOut]`.
pub fn encode_cpmm_b_swap(direction: Direction, amount_in: u64, min_out: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(18);
    buf.push(CPMM_B_SWAP_OPCODE);
    buf.push(match direction {
        Direction::BaseToQuote => 0,
        Direction::QuoteToBase => 1,
    });
    buf.extend_from_slice(&amount_in.to_le_bytes());
    buf.extend_from_slice(&min_out.to_le_bytes());
    buf
}

/// `[8-byte disc, u64 amount, u64 otherAmountThreshold, u128 sqrtPriceLimitX64, u8 isBaseInput]`.
pub fn encode_clmm_swap(amount: u64, other_amount_threshold: u64, sqrt_price_limit_x64: u128, is_base_input: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(41);
    buf.extend_from_slice(&CLMM_SWAP_DISCRIMINATOR);
    buf.extend_from_slice(&amount.to_le_bytes());
    buf.extend_from_slice(&other_amount_threshold.to_le_bytes());
    buf.extend_from_slice(&sqrt_price_limit_x64.to_le_bytes());
    buf.push(is_base_input as u8);
    buf
}

/// `[8-byte disc, u64 amountIn, u64 minOut, u8 swapForY]`.
pub fn encode_dlmm_swap(direction: Direction, amount_in: u64, min_out: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(25);
    buf.extend_from_slice(&DLMM_SWAP_DISCRIMINATOR);
    buf.extend_from_slice(&amount_in.to_le_bytes());
    buf.extend_from_slice(&min_out.to_le_bytes());
    buf.push(match direction {
        Direction::BaseToQuote => 1,
        Direction::QuoteToBase => 0,
    });
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpmm_a_swap_has_fixed_24_byte_layout() {
        let bytes = encode_cpmm_a_swap(Direction::BaseToQuote, 100, 95);
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[..8], &CPMM_A_SELL_DISCRIMINATOR);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 100);
        assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 95);
    }

    #[test]
    fn clmm_swap_has_fixed_41_byte_layout() {
        let bytes = encode_clmm_swap(1_000, 950, 1u128 << 64, true);
        assert_eq!(bytes.len(), 41);
        assert_eq!(&bytes[..8], &CLMM_SWAP_DISCRIMINATOR);
        assert_eq!(bytes[40], 1);
    }

    #[test]
    fn dlmm_swap_direction_sets_swap_for_y_flag() {
        let sell = encode_dlmm_swap(Direction::BaseToQuote, 10, 9);
        let buy = encode_dlmm_swap(Direction::QuoteToBase, 10, 9);
        assert_eq!(sell[24], 1);
        assert_eq!(buy[24], 0);
    }
}
