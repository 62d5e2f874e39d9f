//! CLMM pool decoding (spec §4.1, §3). Layout (little-endian):
//!
//! ```text
//! 0    8    discriminator
//! 8    32   base_vault
//! 40   32   quote_vault
//! 72   32   base_mint
//! 104  32   quote_mint
//! 136  32   amm_config
//! 168  16   sqrt_price_x64 (Q64.64)
//! 184  4    tick_current (i32)
//! 188  2    tick_spacing (u16)
//! 190  16   liquidity (u128)
//! 206  128  tick_bitmap (16 x u64, 1024 bits)
//! 334  1    has_bitmap_extension
//! 335  32   bitmap_extension
//! ```

use super::{read_i32_le, read_pubkey, read_u128_le, read_u16_le, read_u64_le, DecodeError};
use crate::model::ClmmPool;

const LEN: usize = 367;

pub fn decode_clmm_pool(data: &[u8]) -> Result<ClmmPool, DecodeError> {
    if data.len() < LEN {
        return Err(DecodeError::BadLength(data.len()));
    }
    let base_vault = read_pubkey(data, 8);
    let quote_vault = read_pubkey(data, 40);
    let base_mint = read_pubkey(data, 72);
    let quote_mint = read_pubkey(data, 104);
    let amm_config = read_pubkey(data, 136);
    let sqrt_price_x64 = read_u128_le(data, 168);
    let tick_current = read_i32_le(data, 184);
    let tick_spacing = read_u16_le(data, 188);
    let liquidity = read_u128_le(data, 190);

    let mut tick_bitmap = [0u64; 16];
    for (i, word) in tick_bitmap.iter_mut().enumerate() {
        *word = read_u64_le(data, 206 + i * 8);
    }

    let has_extension = data[334] != 0;
    let bitmap_extension = if has_extension {
        Some(read_pubkey(data, 335))
    } else {
        None
    };

    Ok(ClmmPool {
        base_vault,
        quote_vault,
        base_mint,
        quote_mint,
        amm_config,
        sqrt_price_x64,
        tick_current,
        tick_spacing,
        liquidity,
        tick_bitmap,
        bitmap_extension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::CLMM_DISCRIMINATOR;

    fn sample_bytes(tick: i32, has_ext: bool) -> Vec<u8> {
        let mut buf = vec![0u8; LEN];
        buf[..8].copy_from_slice(&CLMM_DISCRIMINATOR);
        buf[8..40].copy_from_slice(&[1u8; 32]);
        buf[40..72].copy_from_slice(&[2u8; 32]);
        buf[72..104].copy_from_slice(&[3u8; 32]);
        buf[104..136].copy_from_slice(&[4u8; 32]);
        buf[136..168].copy_from_slice(&[5u8; 32]);
        buf[168..184].copy_from_slice(&(1u128 << 64).to_le_bytes());
        buf[184..188].copy_from_slice(&tick.to_le_bytes());
        buf[188..190].copy_from_slice(&60u16.to_le_bytes());
        buf[190..206].copy_from_slice(&1_000_000_000_000u128.to_le_bytes());
        buf[334] = has_ext as u8;
        if has_ext {
            buf[335..367].copy_from_slice(&[7u8; 32]);
        }
        buf
    }

    #[test]
    fn decodes_basic_fields() {
        let bytes = sample_bytes(1200, false);
        let pool = decode_clmm_pool(&bytes).unwrap();
        assert_eq!(pool.tick_current, 1200);
        assert_eq!(pool.tick_spacing, 60);
        assert_eq!(pool.sqrt_price_x64, 1u128 << 64);
        assert!(pool.bitmap_extension.is_none());
    }

    #[test]
    fn decodes_bitmap_extension() {
        let bytes = sample_bytes(-500, true);
        let pool = decode_clmm_pool(&bytes).unwrap();
        assert_eq!(pool.tick_current, -500);
        assert!(pool.bitmap_extension.is_some());
    }

    #[test]
    fn rejects_truncated_data() {
        let bytes = vec![0u8; LEN - 1];
        assert_eq!(decode_clmm_pool(&bytes), Err(DecodeError::BadLength(LEN - 1)));
    }
}
