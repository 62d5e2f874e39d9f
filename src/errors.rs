//! The closed error-kind set shared across every component (spec §7).
//!
//! Decode errors stay local to the update that produced them (never
//! surfaced here); everything that can abort a snapshot, a simulation, or a
//! submission funnels through [`ErrorKind`] so the engine's skip-reasons map
//! (see [`crate::engine::stats`]) can accumulate a stable, closed set of
//! string keys instead of ad-hoc formatted messages.

use crate::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    #[error("decode")]
    Decode,
    #[error("stale_update")]
    StaleUpdate,
    #[error("missing_dependency")]
    MissingDependency,
    #[error("slot_inconsistent")]
    SlotInconsistent,
    #[error("rpc_timeout")]
    RpcTimeout,
    #[error("rpc_stale_context")]
    RpcStaleContext,
    #[error("math_overflow")]
    MathOverflow,
    #[error("insufficient_liquidity")]
    InsufficientLiquidity,
    #[error("slippage")]
    Slippage,
    #[error("expired_blockhash")]
    ExpiredBlockhash,
    #[error("rate_limited")]
    RateLimited,
    #[error("guard_tripped")]
    GuardTripped,
    #[error("unknown")]
    Unknown,
}

impl ErrorKind {
    /// The stable string key this kind contributes to the skip-reasons map.
    pub fn reason_key(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::StaleUpdate => "stale_update",
            ErrorKind::MissingDependency => "missing_dependency",
            ErrorKind::SlotInconsistent => "slot_inconsistent",
            ErrorKind::RpcTimeout => "rpc_timeout",
            ErrorKind::RpcStaleContext => "rpc_stale_context",
            ErrorKind::MathOverflow => "math_overflow",
            ErrorKind::InsufficientLiquidity => "insufficient_liquidity",
            ErrorKind::Slippage => "slippage",
            ErrorKind::ExpiredBlockhash => "expired_blockhash",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::GuardTripped => "guard_tripped",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// An [`ErrorKind`] with the pubkey/mint context needed to trace it back to
/// a specific pool, dependency, or mint without re-deriving it downstream.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {detail}{}", context.map(|c| format!(" (pubkey={c})")).unwrap_or_default())]
pub struct EngineError {
    pub kind: ErrorKind,
    pub detail: String,
    pub context: Option<Pubkey>,
}

impl EngineError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, pubkey: Pubkey) -> Self {
        self.context = Some(pubkey);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_key_is_stable() {
        assert_eq!(ErrorKind::StaleUpdate.reason_key(), "stale_update");
        assert_eq!(ErrorKind::ExpiredBlockhash.reason_key(), "expired_blockhash");
    }

    #[test]
    fn error_display_includes_context() {
        let err = EngineError::new(ErrorKind::MissingDependency, "tick array absent")
            .with_context(Pubkey::new([1u8; 32]));
        let msg = format!("{err}");
        assert!(msg.contains("missing_dependency"));
        assert!(msg.contains("tick array absent"));
    }
}
