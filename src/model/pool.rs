use crate::pubkey::Pubkey;

/// The four supported venue families (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Venue {
    CpmmA,
    CpmmB,
    Clmm,
    Dlmm,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::CpmmA => "CPMM_A",
            Venue::CpmmB => "CPMM_B",
            Venue::Clmm => "CLMM",
            Venue::Dlmm => "DLMM",
        }
    }

    pub fn is_concentrated(&self) -> bool {
        matches!(self, Venue::Clmm | Venue::Dlmm)
    }
}

/// A token vault: the amount field the simulators read directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultRecord {
    pub mint: Pubkey,
    pub owner_program: Pubkey,
    pub amount: u64,
    /// Raw account data length, checked against known token-program
    /// layouts at decode time (spec §4.1).
    pub data_len: usize,
}

/// Constant-product pool state common to both CPMM variants, plus the
/// fee-location split the two diverge on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpmmPool {
    pub venue: Venue,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_supply: u64,
    /// `Some` when the venue keeps fees on the pool account; `None` when
    /// they live in an external per-family config record (variant B).
    pub fee_bps: Option<u64>,
    /// Variant-B fee ratio, used only when `fee_bps` is `None`.
    pub fee_numerator: u64,
    pub fee_denominator: u64,
}

/// 1024-bit initialized-tick-array bitmap (16 x u64 words), covering the
/// default ±512-array range around the pool's current position.
pub type TickBitmap = [u64; 16];
/// 1024-bit initialized-bin-array bitmap for DLMM pools.
pub type BinBitmap = [u64; 16];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClmmPool {
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub amm_config: Pubkey,
    /// Q64.64 fixed-point current price.
    pub sqrt_price_x64: u128,
    pub tick_current: i32,
    pub tick_spacing: u16,
    pub liquidity: u128,
    pub tick_bitmap: TickBitmap,
    /// Present once a pool has arrays outside the default ±512 range.
    pub bitmap_extension: Option<Pubkey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DlmmPool {
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub active_id: i32,
    /// Basis-point price step between adjacent bins.
    pub bin_step: u16,
    pub base_factor: u16,
    pub variable_fee_control: u32,
    pub max_volatility_accumulator: u32,
    pub volatility_accumulator: u32,
    pub volatility_reference: u32,
    pub filter_period: u16,
    pub decay_period: u16,
    pub reduction_factor: u16,
    pub bin_array_bitmap: BinBitmap,
}

/// One of the four pool variants, tagged by [`Venue`].
#[derive(Debug, Clone, Copy)]
pub enum PoolRecord {
    Cpmm(CpmmPool),
    Clmm(ClmmPool),
    Dlmm(DlmmPool),
}

impl PoolRecord {
    pub fn venue(&self) -> Venue {
        match self {
            PoolRecord::Cpmm(p) => p.venue,
            PoolRecord::Clmm(_) => Venue::Clmm,
            PoolRecord::Dlmm(_) => Venue::Dlmm,
        }
    }

    pub fn base_mint(&self) -> Pubkey {
        match self {
            PoolRecord::Cpmm(p) => p.base_mint,
            PoolRecord::Clmm(p) => p.base_mint,
            PoolRecord::Dlmm(p) => p.base_mint,
        }
    }

    pub fn quote_mint(&self) -> Pubkey {
        match self {
            PoolRecord::Cpmm(p) => p.quote_mint,
            PoolRecord::Clmm(p) => p.quote_mint,
            PoolRecord::Dlmm(p) => p.quote_mint,
        }
    }

    pub fn base_vault(&self) -> Pubkey {
        match self {
            PoolRecord::Cpmm(p) => p.base_vault,
            PoolRecord::Clmm(p) => p.base_vault,
            PoolRecord::Dlmm(p) => p.base_vault,
        }
    }

    pub fn quote_vault(&self) -> Pubkey {
        match self {
            PoolRecord::Cpmm(p) => p.quote_vault,
            PoolRecord::Clmm(p) => p.quote_vault,
            PoolRecord::Dlmm(p) => p.quote_vault,
        }
    }
}
