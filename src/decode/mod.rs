//! Ingest decoders (spec §4.1, component C1).
//!
//! Every decoder is a pure `fn(&[u8], ..) -> Result<_, DecodeError>`: decode
//! failures never touch the cache, they are reported per-record and the
//! update is dropped with a reason code (spec §4.1, §7). Nothing here
//! allocates more than the record it returns.

mod clmm;
mod cpmm_a;
mod cpmm_b;
mod dependency;
mod dlmm;
mod tx_legs;

pub use clmm::decode_clmm_pool;
pub use cpmm_a::decode_cpmm_a_pool;
pub use cpmm_b::decode_cpmm_b_pool;
pub use dependency::{decode_bin_array, decode_config, decode_tick_array, decode_vault};
pub(crate) use dependency::{BIN_ARRAY_LEN, TICK_ARRAY_LEN};
pub use dlmm::decode_dlmm_pool;
pub use tx_legs::{decode_tx_legs, RawInstruction};

use crate::model::{PoolRecord, Venue};
use crate::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("no discriminator matched and owner/length rules did not identify a venue")]
    UnknownDiscriminator,
    #[error("account data length {0} does not match the expected layout")]
    BadLength(usize),
    #[error("dependency record truncated: expected at least {0} bytes, got {1}")]
    TruncatedDependency(usize, usize),
}

/// CPMM_A: leading 8 bytes match this fixed discriminator (spec §4.1).
pub const CPMM_A_DISCRIMINATOR: [u8; 8] = [0xf7, 0xed, 0xb3, 0x1d, 0x5d, 0x3a, 0x91, 0x04];
/// CPMM_B is identified by owner + a fixed total data length, not a
/// discriminator (spec §4.1).
pub const CPMM_B_PROGRAM: Pubkey = Pubkey::new([0x42; 32]);
pub const CPMM_B_POOL_LEN: usize = 392;
pub const CLMM_DISCRIMINATOR: [u8; 8] = [0x91, 0xa4, 0x45, 0x3b, 0x1e, 0xc6, 0x77, 0x2a];
pub const DLMM_DISCRIMINATOR: [u8; 8] = [0x21, 0xc1, 0x6e, 0x84, 0xf5, 0x0a, 0x9d, 0x63];
/// Owning program for CLMM pools, used as the PDA derivation program id for
/// tick-array accounts (spec §4.1, §4.3).
pub const CLMM_PROGRAM: Pubkey = Pubkey::new([0x43; 32]);
/// Owning program for DLMM pools, used as the PDA derivation program id for
/// bin-array accounts.
pub const DLMM_PROGRAM: Pubkey = Pubkey::new([0x44; 32]);
pub const TICK_ARRAY_DISCRIMINATOR: [u8; 8] = [0xc0, 0x73, 0x5b, 0x8e, 0x22, 0x41, 0x96, 0x0f];
pub const BIN_ARRAY_DISCRIMINATOR: [u8; 8] = [0x3d, 0x8a, 0x17, 0xb2, 0x55, 0xe0, 0x4c, 0x9b];
pub const CONFIG_DISCRIMINATOR: [u8; 8] = [0x5e, 0x02, 0xd1, 0x49, 0xaa, 0x3f, 0x88, 0x10];

/// Identify and decode a pool account from its raw bytes plus owning
/// program, per the discrimination rules of spec §4.1.
pub fn decode_pool(data: &[u8], owner: &Pubkey) -> Result<PoolRecord, DecodeError> {
    if data.len() >= 8 && data[..8] == CPMM_A_DISCRIMINATOR {
        return cpmm_a::decode_cpmm_a_pool(data).map(PoolRecord::Cpmm);
    }
    if data.len() == CPMM_B_POOL_LEN && *owner == CPMM_B_PROGRAM {
        return cpmm_b::decode_cpmm_b_pool(data).map(PoolRecord::Cpmm);
    }
    if data.len() >= 8 && data[..8] == CLMM_DISCRIMINATOR {
        return clmm::decode_clmm_pool(data).map(PoolRecord::Clmm);
    }
    if data.len() >= 8 && data[..8] == DLMM_DISCRIMINATOR {
        return dlmm::decode_dlmm_pool(data).map(PoolRecord::Dlmm);
    }
    Err(DecodeError::UnknownDiscriminator)
}

pub fn venue_of_pool(data: &[u8], owner: &Pubkey) -> Option<Venue> {
    decode_pool(data, owner).ok().map(|p| p.venue())
}

pub(crate) fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(data[offset..offset + 2].try_into().unwrap())
}

pub(crate) fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}

pub(crate) fn read_i32_le(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}

pub(crate) fn read_u64_le(data: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(data[offset..offset + 8].try_into().unwrap())
}

pub(crate) fn read_i64_le(data: &[u8], offset: usize) -> i64 {
    i64::from_le_bytes(data[offset..offset + 8].try_into().unwrap())
}

pub(crate) fn read_u128_le(data: &[u8], offset: usize) -> u128 {
    u128::from_le_bytes(data[offset..offset + 16].try_into().unwrap())
}

pub(crate) fn read_i128_le(data: &[u8], offset: usize) -> i128 {
    i128::from_le_bytes(data[offset..offset + 16].try_into().unwrap())
}

pub(crate) fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    Pubkey::from_slice(&data[offset..offset + 32]).expect("slice is exactly 32 bytes")
}
