//! CPMM_B pool decoding. Identified by total data length + owning program,
//! not a discriminator (spec §4.1). Layout (little-endian, no leading
//! discriminator):
//!
//! ```text
//! 0    32  base_vault
//! 32   32  quote_vault
//! 64   32  base_mint
//! 96   32  quote_mint
//! 128  8   lp_supply
//! 136  8   fee_numerator
//! 144  8   fee_denominator
//! ...  padding out to CPMM_B_POOL_LEN
//! ```

use super::{read_pubkey, read_u64_le, DecodeError, CPMM_B_POOL_LEN};
use crate::model::{CpmmPool, Venue};

pub fn decode_cpmm_b_pool(data: &[u8]) -> Result<CpmmPool, DecodeError> {
    if data.len() != CPMM_B_POOL_LEN {
        return Err(DecodeError::BadLength(data.len()));
    }
    let base_vault = read_pubkey(data, 0);
    let quote_vault = read_pubkey(data, 32);
    let base_mint = read_pubkey(data, 64);
    let quote_mint = read_pubkey(data, 96);
    let lp_supply = read_u64_le(data, 128);
    let fee_numerator = read_u64_le(data, 136);
    let fee_denominator = read_u64_le(data, 144);

    Ok(CpmmPool {
        venue: Venue::CpmmB,
        base_vault,
        quote_vault,
        base_mint,
        quote_mint,
        lp_supply,
        fee_bps: None,
        fee_numerator,
        fee_denominator: fee_denominator.max(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::CPMM_B_PROGRAM;

    fn sample_bytes() -> Vec<u8> {
        let mut buf = vec![0u8; CPMM_B_POOL_LEN];
        buf[0..32].copy_from_slice(&[1u8; 32]);
        buf[32..64].copy_from_slice(&[2u8; 32]);
        buf[64..96].copy_from_slice(&[3u8; 32]);
        buf[96..128].copy_from_slice(&[4u8; 32]);
        buf[128..136].copy_from_slice(&500_000u64.to_le_bytes());
        buf[136..144].copy_from_slice(&25u64.to_le_bytes());
        buf[144..152].copy_from_slice(&10_000u64.to_le_bytes());
        buf
    }

    #[test]
    fn decodes_fee_ratio() {
        let bytes = sample_bytes();
        let pool = decode_cpmm_b_pool(&bytes).unwrap();
        assert_eq!(pool.fee_numerator, 25);
        assert_eq!(pool.fee_denominator, 10_000);
        assert_eq!(pool.venue, Venue::CpmmB);
        let _ = CPMM_B_PROGRAM;
    }

    #[test]
    fn rejects_wrong_length() {
        let bytes = vec![0u8; CPMM_B_POOL_LEN - 1];
        assert_eq!(decode_cpmm_b_pool(&bytes), Err(DecodeError::BadLength(CPMM_B_POOL_LEN - 1)));
    }
}
