//! CPMM_A pool decoding. Identified by an 8-byte leading discriminator
//! (spec §4.1). Layout (little-endian):
//!
//! ```text
//! 0    8   discriminator
//! 8    32  base_vault
//! 40   32  quote_vault
//! 72   32  base_mint
//! 104  32  quote_mint
//! 136  8   lp_supply
//! 144  8   fee_bps
//! 152  32  fee_config (zero pubkey => fee_bps above is authoritative)
//! ```

use super::{read_pubkey, read_u64_le, DecodeError};
use crate::model::{CpmmPool, Venue};
use crate::pubkey::Pubkey;

const LEN: usize = 184;

pub fn decode_cpmm_a_pool(data: &[u8]) -> Result<CpmmPool, DecodeError> {
    if data.len() < LEN {
        return Err(DecodeError::BadLength(data.len()));
    }
    let base_vault = read_pubkey(data, 8);
    let quote_vault = read_pubkey(data, 40);
    let base_mint = read_pubkey(data, 72);
    let quote_mint = read_pubkey(data, 104);
    let lp_supply = read_u64_le(data, 136);
    let fee_bps = read_u64_le(data, 144);
    let fee_config = read_pubkey(data, 152);

    Ok(CpmmPool {
        venue: Venue::CpmmA,
        base_vault,
        quote_vault,
        base_mint,
        quote_mint,
        lp_supply,
        fee_bps: if fee_config == Pubkey::ZERO {
            Some(fee_bps)
        } else {
            None
        },
        fee_numerator: 0,
        fee_denominator: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::CPMM_A_DISCRIMINATOR;

    fn sample_bytes(fee_bps: u64, fee_config_zero: bool) -> Vec<u8> {
        let mut buf = vec![0u8; LEN];
        buf[..8].copy_from_slice(&CPMM_A_DISCRIMINATOR);
        buf[8..40].copy_from_slice(&[1u8; 32]);
        buf[40..72].copy_from_slice(&[2u8; 32]);
        buf[72..104].copy_from_slice(&[3u8; 32]);
        buf[104..136].copy_from_slice(&[4u8; 32]);
        buf[136..144].copy_from_slice(&1_000_000u64.to_le_bytes());
        buf[144..152].copy_from_slice(&fee_bps.to_le_bytes());
        if !fee_config_zero {
            buf[152..184].copy_from_slice(&[9u8; 32]);
        }
        buf
    }

    #[test]
    fn decodes_inline_fee() {
        let bytes = sample_bytes(30, true);
        let pool = decode_cpmm_a_pool(&bytes).unwrap();
        assert_eq!(pool.fee_bps, Some(30));
        assert_eq!(pool.lp_supply, 1_000_000);
        assert_eq!(pool.venue, Venue::CpmmA);
    }

    #[test]
    fn external_fee_config_means_no_inline_fee() {
        let bytes = sample_bytes(30, false);
        let pool = decode_cpmm_a_pool(&bytes).unwrap();
        assert_eq!(pool.fee_bps, None);
    }

    #[test]
    fn rejects_short_data() {
        let bytes = vec![0u8; 10];
        assert_eq!(decode_cpmm_a_pool(&bytes), Err(DecodeError::BadLength(10)));
    }
}
