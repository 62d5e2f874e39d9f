//! Bundle composition and submission (spec §4.6, component C6).

mod blockhash;
mod guards;
mod instructions;
mod submitter;

pub use blockhash::{Blockhash, BlockhashCache};
pub use guards::{check_guards, BundleCandidate, GuardConfig, GuardViolation};
pub use instructions::{encode_clmm_swap, encode_cpmm_a_swap, encode_cpmm_b_swap, encode_dlmm_swap};
pub use submitter::{
    compose_bundle, submit_with_retry, BlockhashProvider, BundlePlan, BundleSubmitter, ComposeError,
    SignedTransaction, Signer, SignerRole, SubmitOutcome, UnsignedTransaction,
};
