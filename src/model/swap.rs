use crate::model::pool::Venue;
use crate::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sell the pool's base asset for quote.
    BaseToQuote,
    /// Sell the pool's quote asset for base.
    QuoteToBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactSide {
    Input,
    Output,
}

/// One leg of a (possibly multi-hop) pending-transaction swap, decoded from
/// the pending-tx stream (spec §4.1).
#[derive(Debug, Clone)]
pub struct SwapLeg {
    pub venue: Venue,
    pub pool: Pubkey,
    pub direction: Direction,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub input_amount: u64,
    pub min_output_amount: u64,
    pub exact_side: ExactSide,
    pub sqrt_price_limit_x64: Option<u128>,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
}
