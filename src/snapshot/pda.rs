//! Program-derived-address derivation and index math for tick/bin arrays
//! (spec §4.1, §4.3, §8 invariant 5 and round-trip laws).
//!
//! The encoding asymmetry is deliberate and load-bearing: tick-array seeds
//! encode the start-tick index **big-endian**; bin-array seeds encode the
//! signed array index **little-endian**. Getting this backwards silently
//! derives a different, non-existent account.

use crate::model::{BINS_PER_ARRAY, TICKS_PER_ARRAY};
use crate::pubkey::Pubkey;

const TICK_ARRAY_SEED: &[u8] = b"tick_array";
const BIN_ARRAY_SEED: &[u8] = b"bin_array";

fn to_solana_pubkey(pk: &Pubkey) -> solana_program::pubkey::Pubkey {
    solana_program::pubkey::Pubkey::new_from_array(*pk.as_bytes())
}

fn from_solana_pubkey(pk: &solana_program::pubkey::Pubkey) -> Pubkey {
    Pubkey::new(pk.to_bytes())
}

/// `floor(tickCurrent / (ticksPerArray * spacing)) * ticksPerArray * spacing`,
/// negative-safe (spec §4.3).
pub fn tick_array_start_index(tick_current: i32, tick_spacing: u16) -> i32 {
    let span = TICKS_PER_ARRAY as i32 * tick_spacing as i32;
    div_floor(tick_current, span) * span
}

/// Local offset of `tick` within the array starting at `start`, in
/// `[0, TICKS_PER_ARRAY)` (spec §8 round-trip law).
pub fn tick_local_offset(tick: i32, start: i32, tick_spacing: u16) -> i32 {
    (tick - start) / tick_spacing as i32
}

/// `floor(binId / binsPerArray)` (spec §4.3).
pub fn bin_array_index(bin_id: i32) -> i64 {
    div_floor(bin_id, BINS_PER_ARRAY as i32) as i64
}

/// Local offset of `bin_id` within its array, in `[0, BINS_PER_ARRAY)`
/// (spec §8 round-trip law).
pub fn bin_local_offset(bin_id: i32) -> i32 {
    bin_id - (bin_array_index(bin_id) as i32) * BINS_PER_ARRAY as i32
}

fn div_floor(a: i32, b: i32) -> i32 {
    let q = a / b;
    let r = a % b;
    if (r != 0) && ((r < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Derive a CLMM tick-array PDA from `["tick_array", pool, start_tick_be]`.
pub fn derive_tick_array_pda(program_id: &Pubkey, pool: &Pubkey, start_tick_index: i32) -> Pubkey {
    let start_be = start_tick_index.to_be_bytes();
    let seeds: &[&[u8]] = &[TICK_ARRAY_SEED, pool.as_bytes(), &start_be];
    let (pda, _bump) =
        solana_program::pubkey::Pubkey::find_program_address(seeds, &to_solana_pubkey(program_id));
    from_solana_pubkey(&pda)
}

/// Derive a DLMM bin-array PDA from `["bin_array", pool, array_index_le]`.
pub fn derive_bin_array_pda(program_id: &Pubkey, pool: &Pubkey, array_index: i64) -> Pubkey {
    let index_le = array_index.to_le_bytes();
    let seeds: &[&[u8]] = &[BIN_ARRAY_SEED, pool.as_bytes(), &index_le];
    let (pda, _bump) =
        solana_program::pubkey::Pubkey::find_program_address(seeds, &to_solana_pubkey(program_id));
    from_solana_pubkey(&pda)
}
