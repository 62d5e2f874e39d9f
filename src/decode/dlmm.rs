//! DLMM pool decoding (spec §4.1, §3). Layout (little-endian):
//!
//! ```text
//! 0    8    discriminator
//! 8    32   base_vault
//! 40   32   quote_vault
//! 72   32   base_mint
//! 104  32   quote_mint
//! 136  4    active_id (i32)
//! 140  2    bin_step (u16)
//! 142  2    base_factor (u16)
//! 144  4    variable_fee_control (u32)
//! 148  4    max_volatility_accumulator (u32)
//! 152  4    volatility_accumulator (u32)
//! 156  4    volatility_reference (u32)
//! 160  2    filter_period (u16)
//! 162  2    decay_period (u16)
//! 164  2    reduction_factor (u16)
//! 166  128  bin_array_bitmap (16 x u64, 1024 bits)
//! ```

use super::{read_i32_le, read_pubkey, read_u16_le, read_u32_le, read_u64_le, DecodeError};
use crate::model::DlmmPool;

const LEN: usize = 294;

pub fn decode_dlmm_pool(data: &[u8]) -> Result<DlmmPool, DecodeError> {
    if data.len() < LEN {
        return Err(DecodeError::BadLength(data.len()));
    }
    let base_vault = read_pubkey(data, 8);
    let quote_vault = read_pubkey(data, 40);
    let base_mint = read_pubkey(data, 72);
    let quote_mint = read_pubkey(data, 104);
    let active_id = read_i32_le(data, 136);
    let bin_step = read_u16_le(data, 140);
    let base_factor = read_u16_le(data, 142);
    let variable_fee_control = read_u32_le(data, 144);
    let max_volatility_accumulator = read_u32_le(data, 148);
    let volatility_accumulator = read_u32_le(data, 152);
    let volatility_reference = read_u32_le(data, 156);
    let filter_period = read_u16_le(data, 160);
    let decay_period = read_u16_le(data, 162);
    let reduction_factor = read_u16_le(data, 164);

    let mut bin_array_bitmap = [0u64; 16];
    for (i, word) in bin_array_bitmap.iter_mut().enumerate() {
        *word = read_u64_le(data, 166 + i * 8);
    }

    Ok(DlmmPool {
        base_vault,
        quote_vault,
        base_mint,
        quote_mint,
        active_id,
        bin_step,
        base_factor,
        variable_fee_control,
        max_volatility_accumulator,
        volatility_accumulator,
        volatility_reference,
        filter_period,
        decay_period,
        reduction_factor,
        bin_array_bitmap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DLMM_DISCRIMINATOR;

    fn sample_bytes(active_id: i32, vol_acc: u32) -> Vec<u8> {
        let mut buf = vec![0u8; LEN];
        buf[..8].copy_from_slice(&DLMM_DISCRIMINATOR);
        buf[8..40].copy_from_slice(&[1u8; 32]);
        buf[40..72].copy_from_slice(&[2u8; 32]);
        buf[72..104].copy_from_slice(&[3u8; 32]);
        buf[104..136].copy_from_slice(&[4u8; 32]);
        buf[136..140].copy_from_slice(&active_id.to_le_bytes());
        buf[140..142].copy_from_slice(&25u16.to_le_bytes());
        buf[142..144].copy_from_slice(&10u16.to_le_bytes());
        buf[152..156].copy_from_slice(&vol_acc.to_le_bytes());
        buf
    }

    #[test]
    fn decodes_fee_and_volatility_params() {
        let bytes = sample_bytes(1 << 23, 500);
        let pool = decode_dlmm_pool(&bytes).unwrap();
        assert_eq!(pool.active_id, 1 << 23);
        assert_eq!(pool.bin_step, 25);
        assert_eq!(pool.base_factor, 10);
        assert_eq!(pool.volatility_accumulator, 500);
    }

    #[test]
    fn rejects_truncated_data() {
        let bytes = vec![0u8; LEN - 1];
        assert_eq!(decode_dlmm_pool(&bytes), Err(DecodeError::BadLength(LEN - 1)));
    }
}
