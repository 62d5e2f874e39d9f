//! Signer/submitter abstractions and bundle assembly (spec §4.6). Both
//! traits are object-safe and message-passing only -- no concrete Solana
//! SDK type crosses this boundary (spec §9: keep the engine venue- and
//! runtime-agnostic at its seams).

use rand::Rng;

use super::blockhash::Blockhash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerRole {
    Payer,
    TipAuth,
}

#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    pub instructions: Vec<Vec<u8>>,
    pub signer_role: SignerRole,
}

#[derive(Debug, Clone)]
pub struct SignedTransaction(pub Vec<u8>);

#[async_trait::async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, tx: UnsignedTransaction, blockhash: Blockhash) -> anyhow::Result<SignedTransaction>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    ExpiredBlockhash,
    RateLimited,
    Rejected,
}

#[async_trait::async_trait]
pub trait BundleSubmitter: Send + Sync {
    async fn submit(&self, transactions: Vec<SignedTransaction>) -> anyhow::Result<SubmitOutcome>;
}

#[async_trait::async_trait]
pub trait BlockhashProvider: Send + Sync {
    async fn fetch(&self, force: bool) -> anyhow::Result<Blockhash>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("no tip recipients configured")]
    NoTipRecipients,
}

/// An arb (+ optional victim, + tip) bundle, ready for signing once a
/// blockhash is chosen (spec §4.6 points 1-3).
#[derive(Debug, Clone)]
pub struct BundlePlan {
    pub victim: Option<Vec<u8>>,
    pub arb_instructions: Vec<Vec<u8>>,
    pub tip_lamports: u64,
    pub tip_recipient: [u8; 32],
}

/// Compose a bundle, choosing the tip recipient uniformly at random from
/// `tip_recipients` (spec §4.6 point 3).
pub fn compose_bundle(
    victim: Option<Vec<u8>>,
    arb_instructions: Vec<Vec<u8>>,
    tip_lamports: u64,
    tip_recipients: &[[u8; 32]],
) -> Result<BundlePlan, ComposeError> {
    if tip_recipients.is_empty() {
        return Err(ComposeError::NoTipRecipients);
    }
    let index = rand::thread_rng().gen_range(0..tip_recipients.len());
    Ok(BundlePlan {
        victim,
        arb_instructions,
        tip_lamports,
        tip_recipient: tip_recipients[index],
    })
}

/// Submit, honoring the spec's one-retry-on-expired-blockhash rule (spec
/// §4.6, §7): a second `ExpiredBlockhash` propagates as-is rather than
/// retrying again.
pub async fn submit_with_retry<F>(
    submitter: &dyn BundleSubmitter,
    provider: &dyn BlockhashProvider,
    build: F,
) -> anyhow::Result<SubmitOutcome>
where
    F: Fn(Blockhash) -> Vec<SignedTransaction>,
{
    let hash = provider.fetch(false).await?;
    let outcome = submitter.submit(build(hash)).await?;
    if outcome != SubmitOutcome::ExpiredBlockhash {
        return Ok(outcome);
    }
    let fresh = provider.fetch(true).await?;
    submitter.submit(build(fresh)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn compose_bundle_rejects_empty_recipients() {
        let err = compose_bundle(None, vec![vec![1]], 1_000, &[]).unwrap_err();
        assert_eq!(err, ComposeError::NoTipRecipients);
    }

    #[test]
    fn compose_bundle_picks_a_listed_recipient() {
        let recipients = [[1u8; 32], [2u8; 32], [3u8; 32]];
        let plan = compose_bundle(None, vec![vec![1]], 1_000, &recipients).unwrap();
        assert!(recipients.contains(&plan.tip_recipient));
    }

    struct FlakyProvider;
    #[async_trait::async_trait]
    impl BlockhashProvider for FlakyProvider {
        async fn fetch(&self, force: bool) -> anyhow::Result<Blockhash> {
            Ok(Blockhash(if force { [2u8; 32] } else { [1u8; 32] }))
        }
    }

    struct ExpiresOnceSubmitter {
        calls: AtomicU32,
    }
    #[async_trait::async_trait]
    impl BundleSubmitter for ExpiresOnceSubmitter {
        async fn submit(&self, _txs: Vec<SignedTransaction>) -> anyhow::Result<SubmitOutcome> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(if n == 0 { SubmitOutcome::ExpiredBlockhash } else { SubmitOutcome::Accepted })
        }
    }

    #[tokio::test]
    async fn expired_blockhash_retries_once_with_fresh_hash() {
        let submitter = ExpiresOnceSubmitter { calls: AtomicU32::new(0) };
        let provider = FlakyProvider;
        let outcome = submit_with_retry(&submitter, &provider, |h| vec![SignedTransaction(h.0.to_vec())])
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 2);
    }

    struct AlwaysExpiredSubmitter;
    #[async_trait::async_trait]
    impl BundleSubmitter for AlwaysExpiredSubmitter {
        async fn submit(&self, _txs: Vec<SignedTransaction>) -> anyhow::Result<SubmitOutcome> {
            Ok(SubmitOutcome::ExpiredBlockhash)
        }
    }

    #[tokio::test]
    async fn second_expired_blockhash_propagates() {
        let outcome = submit_with_retry(&AlwaysExpiredSubmitter, &FlakyProvider, |h| vec![SignedTransaction(h.0.to_vec())])
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::ExpiredBlockhash);
    }
}
