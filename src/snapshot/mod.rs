//! Slot-coherent snapshot assembly and PDA derivation (spec §4.1, §4.3,
//! component C3).

mod builder;
mod pda;

pub use builder::{build_snapshot, SimulationSnapshot, SnapshotError, SnapshotRadii};
pub use pda::{
    bin_array_index, bin_local_offset, derive_bin_array_pda, derive_tick_array_pda,
    tick_array_start_index, tick_local_offset,
};
