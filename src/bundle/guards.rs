//! Pre-submit size guards (spec §4.6): a single violation aborts the
//! opportunity with a reason code. Every threshold lives in
//! [`GuardConfig`] so the engine's risk surface (spec §6.5) maps onto it
//! one field at a time.

#[derive(Debug, Clone, Copy)]
pub struct GuardConfig {
    pub min_profit_lamports: i64,
    pub max_net_to_input_bps: i64,
    pub max_absolute_net_lamports: i64,
    pub canary_max_submissions_per_hour: u32,
    pub canary_max_input_lamports: u64,
    pub max_wallet_drawdown_lamports: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardViolation {
    #[error("expected net {0} below minProfitLamports")]
    BelowMinProfit(i64),
    #[error("netToInputBps {0} exceeds maxNetToInputBps")]
    NetToInputTooHigh(i64),
    #[error("absolute net {0} exceeds maxAbsoluteNetLamports")]
    AbsoluteNetTooHigh(i64),
    #[error("submissions this hour ({0}) exceed canaryMaxSubmissionsPerHour")]
    SubmissionRateExceeded(u32),
    #[error("input {0} exceeds canaryMaxInputLamports")]
    InputTooLarge(u64),
    #[error("observed drawdown {0} exceeds maxWalletDrawdownLamports")]
    DrawdownExceeded(i64),
}

/// What the engine knows about a candidate bundle right before submit.
#[derive(Debug, Clone, Copy)]
pub struct BundleCandidate {
    pub expected_net_lamports: i64,
    pub input_lamports: u64,
    pub submissions_this_hour: u32,
    pub observed_drawdown_lamports: i64,
}

/// Evaluate every guard; returns the first violation (spec: "a single
/// violation aborts the opportunity"), or `Ok(())` if all hold.
pub fn check_guards(candidate: &BundleCandidate, config: &GuardConfig) -> Result<(), GuardViolation> {
    if candidate.expected_net_lamports < config.min_profit_lamports {
        return Err(GuardViolation::BelowMinProfit(candidate.expected_net_lamports));
    }

    if candidate.input_lamports > 0 {
        let net_to_input_bps =
            (candidate.expected_net_lamports.unsigned_abs() as u128 * 10_000 / candidate.input_lamports as u128) as i64;
        if net_to_input_bps > config.max_net_to_input_bps {
            return Err(GuardViolation::NetToInputTooHigh(net_to_input_bps));
        }
    }

    if candidate.expected_net_lamports.unsigned_abs() as i64 > config.max_absolute_net_lamports {
        return Err(GuardViolation::AbsoluteNetTooHigh(candidate.expected_net_lamports));
    }

    if candidate.submissions_this_hour > config.canary_max_submissions_per_hour {
        return Err(GuardViolation::SubmissionRateExceeded(candidate.submissions_this_hour));
    }

    if candidate.input_lamports > config.canary_max_input_lamports {
        return Err(GuardViolation::InputTooLarge(candidate.input_lamports));
    }

    if candidate.observed_drawdown_lamports > config.max_wallet_drawdown_lamports {
        return Err(GuardViolation::DrawdownExceeded(candidate.observed_drawdown_lamports));
    }

    Ok(())
}
