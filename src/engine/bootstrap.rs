//! Bootstrap RPC contract (spec §6.4): one multi-account fetch, chunked
//! to an implementation-defined batch limit, validated against an
//! optional `min_context_slot`. Modeled as a trait so the core never
//! links a concrete RPC client (spec §9 "Dynamic dispatch" note applies
//! at every external interface, not just the detector).

use async_trait::async_trait;

use crate::pubkey::Pubkey;
use crate::slot::Slot;

/// Accounts per call before `fetch_chunked` splits the request.
pub const MAX_ACCOUNTS_PER_CALL: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapRpcError {
    #[error("rpc call failed")]
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapFetchError {
    #[error("rpc call failed")]
    Transport,
    #[error("rpc returned a zero context slot")]
    ZeroContextSlot,
    #[error("rpc context slot {context_slot} is below the required minimum {min_context_slot}")]
    StaleContext { context_slot: Slot, min_context_slot: Slot },
}

/// One multi-account RPC call. Accounts are returned in request order;
/// `None` at a position encodes nonexistence (spec §6.4).
#[async_trait]
pub trait BootstrapRpc: Send + Sync {
    async fn fetch_accounts(&self, pubkeys: &[Pubkey]) -> Result<(Slot, Vec<Option<Vec<u8>>>), BootstrapRpcError>;
}

/// Fetch `pubkeys` in request order, chunked to [`MAX_ACCOUNTS_PER_CALL`],
/// and validate the minimum context slot observed across every chunk
/// against `min_context_slot`. A response with `contextSlot = 0` is
/// always rejected (spec: "must carry a non-zero contextSlot"); a stale
/// response is rejected wholesale, not accepted partially.
pub async fn fetch_chunked(
    rpc: &dyn BootstrapRpc,
    pubkeys: &[Pubkey],
    min_context_slot: Option<Slot>,
) -> Result<(Slot, Vec<Option<Vec<u8>>>), BootstrapFetchError> {
    let mut results = Vec::with_capacity(pubkeys.len());
    let mut min_slot: Option<Slot> = None;

    for chunk in pubkeys.chunks(MAX_ACCOUNTS_PER_CALL) {
        let (context_slot, accounts) = rpc
            .fetch_accounts(chunk)
            .await
            .map_err(|_| BootstrapFetchError::Transport)?;
        if context_slot == 0 {
            return Err(BootstrapFetchError::ZeroContextSlot);
        }
        min_slot = Some(min_slot.map_or(context_slot, |m: Slot| m.min(context_slot)));
        results.extend(accounts);
    }

    let context_slot = min_slot.unwrap_or(0);
    if let Some(target) = min_context_slot {
        if context_slot < target {
            return Err(BootstrapFetchError::StaleContext { context_slot, min_context_slot: target });
        }
    }
    Ok((context_slot, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRpc {
        context_slot: Slot,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BootstrapRpc for FixedRpc {
        async fn fetch_accounts(&self, pubkeys: &[Pubkey]) -> Result<(Slot, Vec<Option<Vec<u8>>>), BootstrapRpcError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok((self.context_slot, pubkeys.iter().map(|_| None).collect()))
        }
    }

    #[tokio::test]
    async fn null_entries_preserve_request_order_and_nonexistence() {
        let rpc = FixedRpc { context_slot: 1_000, calls: AtomicUsize::new(0) };
        let pubkeys = vec![Pubkey::new([1u8; 32]), Pubkey::new([2u8; 32])];
        let (context_slot, accounts) = fetch_chunked(&rpc, &pubkeys, None).await.unwrap();
        assert_eq!(context_slot, 1_000);
        assert_eq!(accounts.len(), 2);
        assert!(accounts.iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn stale_context_slot_is_rejected() {
        let rpc = FixedRpc { context_slot: 950, calls: AtomicUsize::new(0) };
        let pubkeys = vec![Pubkey::new([1u8; 32])];
        let err = fetch_chunked(&rpc, &pubkeys, Some(1_000)).await.unwrap_err();
        assert_eq!(err, BootstrapFetchError::StaleContext { context_slot: 950, min_context_slot: 1_000 });
    }

    #[tokio::test]
    async fn large_request_is_chunked() {
        let rpc = FixedRpc { context_slot: 5, calls: AtomicUsize::new(0) };
        let pubkeys: Vec<Pubkey> = (0..(MAX_ACCOUNTS_PER_CALL + 10))
            .map(|i| Pubkey::new([(i % 255) as u8; 32]))
            .collect();
        let (_, accounts) = fetch_chunked(&rpc, &pubkeys, None).await.unwrap();
        assert_eq!(accounts.len(), pubkeys.len());
        assert_eq!(rpc.calls.load(Ordering::Relaxed), 2);
    }
}
