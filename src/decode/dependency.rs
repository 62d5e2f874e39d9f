//! Tick-array / bin-array / config dependency decoders (spec §3, §4.1).
//! Each dependency record uses its own discriminator and fixed size.

use super::{
    read_i128_le, read_i32_le, read_i64_le, read_pubkey, read_u128_le, read_u64_le, DecodeError,
    BIN_ARRAY_DISCRIMINATOR, CONFIG_DISCRIMINATOR, TICK_ARRAY_DISCRIMINATOR,
};
use crate::model::{Bin, BinArray, ConfigRecord, Tick, TickArray, VaultRecord, BINS_PER_ARRAY, TICKS_PER_ARRAY};
use crate::pubkey::Pubkey;

pub(crate) const TICK_ARRAY_LEN: usize = 8 + 32 + 4 + TICKS_PER_ARRAY * 32;
pub(crate) const BIN_ARRAY_LEN: usize = 8 + 32 + 8 + BINS_PER_ARRAY * 16;
const CONFIG_LEN: usize = 8 + 8 + 8;
/// SPL-token-account layout: mint (32B) + owner (32B) + amount (u64) +
/// delegate option + state + is_native option + delegated_amount +
/// close_authority option.
const SPL_TOKEN_ACCOUNT_LEN: usize = 165;

pub fn decode_tick_array(data: &[u8]) -> Result<TickArray, DecodeError> {
    if data.len() != TICK_ARRAY_LEN {
        return Err(DecodeError::TruncatedDependency(TICK_ARRAY_LEN, data.len()));
    }
    if data[..8] != TICK_ARRAY_DISCRIMINATOR {
        return Err(DecodeError::UnknownDiscriminator);
    }
    let pool = read_pubkey(data, 8);
    let start_tick_index = read_i32_le(data, 40);

    let mut ticks = Box::new([Tick::default(); TICKS_PER_ARRAY]);
    let mut offset = 44;
    for tick in ticks.iter_mut() {
        tick.liquidity_net = read_i128_le(data, offset);
        tick.liquidity_gross = read_u128_le(data, offset + 16);
        offset += 32;
    }

    Ok(TickArray {
        pool,
        start_tick_index,
        ticks,
    })
}

pub fn decode_bin_array(data: &[u8]) -> Result<BinArray, DecodeError> {
    if data.len() != BIN_ARRAY_LEN {
        return Err(DecodeError::TruncatedDependency(BIN_ARRAY_LEN, data.len()));
    }
    if data[..8] != BIN_ARRAY_DISCRIMINATOR {
        return Err(DecodeError::UnknownDiscriminator);
    }
    let pool = read_pubkey(data, 8);
    let array_index = read_i64_le(data, 40);

    let mut bins = Box::new([Bin::default(); BINS_PER_ARRAY]);
    let mut offset = 48;
    for bin in bins.iter_mut() {
        bin.amount_x = read_u64_le(data, offset);
        bin.amount_y = read_u64_le(data, offset + 8);
        offset += 16;
    }

    Ok(BinArray {
        pool,
        array_index,
        bins,
    })
}

/// Decode a vault account (spec §6.1: a plain SPL-token-layout dependency,
/// not discriminator-tagged). `owner_program` is supplied by the caller
/// from the account update envelope, not read from the data.
pub fn decode_vault(data: &[u8], owner_program: Pubkey) -> Result<VaultRecord, DecodeError> {
    if data.len() < SPL_TOKEN_ACCOUNT_LEN {
        return Err(DecodeError::TruncatedDependency(SPL_TOKEN_ACCOUNT_LEN, data.len()));
    }
    Ok(VaultRecord {
        mint: read_pubkey(data, 0),
        owner_program,
        amount: read_u64_le(data, 64),
        data_len: data.len(),
    })
}

pub fn decode_config(data: &[u8]) -> Result<ConfigRecord, DecodeError> {
    if data.len() != CONFIG_LEN {
        return Err(DecodeError::BadLength(data.len()));
    }
    if data[..8] != CONFIG_DISCRIMINATOR {
        return Err(DecodeError::UnknownDiscriminator);
    }
    Ok(ConfigRecord {
        fee_bps: read_u64_le(data, 8),
        protocol_fee_bps: read_u64_le(data, 16),
    })
}
