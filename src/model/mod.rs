//! Shared data model (spec §3).
//!
//! The four pool variants and their dependency records form a tagged union
//! rather than a trait-object hierarchy (spec §9): one `Venue` enum drives a
//! single match in the decoder and the simulator instead of dynamic
//! dispatch through a venue trait object.

mod cache_entry;
mod dependency;
mod lifecycle;
mod pool;
mod swap;

pub use cache_entry::{CacheEntry, UpdateSource};
pub use dependency::{Bin, BinArray, ConfigRecord, Tick, TickArray, BINS_PER_ARRAY, TICKS_PER_ARRAY};
pub use lifecycle::{FrozenTopology, PoolLifecycleState};
pub use pool::{ClmmPool, CpmmPool, DlmmPool, PoolRecord, Venue, VaultRecord};
pub use swap::{Direction, ExactSide, SwapLeg};
