use crate::pubkey::Pubkey;

pub const TICKS_PER_ARRAY: usize = 60;
pub const BINS_PER_ARRAY: usize = 70;

#[derive(Debug, Clone, Copy, Default)]
pub struct Tick {
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
}

impl Tick {
    /// Derived, not stored: a tick is initialized iff it carries any gross
    /// liquidity at all.
    pub fn initialized(&self) -> bool {
        self.liquidity_gross != 0
    }
}

#[derive(Debug, Clone)]
pub struct TickArray {
    pub pool: Pubkey,
    pub start_tick_index: i32,
    pub ticks: Box<[Tick; TICKS_PER_ARRAY]>,
}

impl TickArray {
    pub fn virtual_empty(pool: Pubkey, start_tick_index: i32) -> Self {
        Self {
            pool,
            start_tick_index,
            ticks: Box::new([Tick::default(); TICKS_PER_ARRAY]),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bin {
    pub amount_x: u64,
    pub amount_y: u64,
}

#[derive(Debug, Clone)]
pub struct BinArray {
    pub pool: Pubkey,
    pub array_index: i64,
    pub bins: Box<[Bin; BINS_PER_ARRAY]>,
}

impl BinArray {
    pub fn virtual_empty(pool: Pubkey, array_index: i64) -> Self {
        Self {
            pool,
            array_index,
            bins: Box::new([Bin::default(); BINS_PER_ARRAY]),
        }
    }
}

/// Venue-wide or per-family fee configuration, cached separately from pool
/// records so a config update never thrashes every pool that references it
/// (spec §3).
#[derive(Debug, Clone, Copy)]
pub struct ConfigRecord {
    pub fee_bps: u64,
    pub protocol_fee_bps: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_tick_has_zero_gross() {
        let t = Tick::default();
        assert!(!t.initialized());
    }

    #[test]
    fn tick_with_gross_liquidity_is_initialized() {
        let t = Tick {
            liquidity_net: 100,
            liquidity_gross: 100,
        };
        assert!(t.initialized());
    }
}
