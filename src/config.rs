//! Operator surface (spec §6.5): a single long-running entry point,
//! environment-driven configuration via [`clap`]'s derive + env support.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StrategyMode {
    CrossVenuePair,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "venue-arb-engine", about = "Cross-venue AMM arbitrage engine")]
pub struct Cli {
    /// Account-update stream endpoint.
    #[arg(long, env = "ARB_STREAM_ENDPOINT")]
    pub stream_endpoint: String,

    /// Pending-transaction stream endpoint.
    #[arg(long, env = "ARB_PENDING_TX_ENDPOINT")]
    pub pending_tx_endpoint: String,

    /// RPC endpoint used for bootstrap/refresh account fetches.
    #[arg(long, env = "ARB_RPC_ENDPOINT")]
    pub rpc_endpoint: String,

    /// RPC endpoint used to fetch recent blockhashes.
    #[arg(long, env = "ARB_BLOCKHASH_RPC_ENDPOINT")]
    pub blockhash_rpc_endpoint: String,

    /// Bundle submission endpoint.
    #[arg(long, env = "ARB_SUBMISSION_ENDPOINT")]
    pub submission_endpoint: String,

    /// Path to the arb payer's signing key.
    #[arg(long, env = "ARB_SIGNER_PATH")]
    pub signer_path: PathBuf,

    /// Path to the tip transaction's (possibly distinct) auth key.
    #[arg(long, env = "ARB_TIP_AUTH_PATH")]
    pub tip_auth_path: PathBuf,

    #[arg(long, env = "ARB_STRATEGY_MODE", value_enum, default_value = "cross-venue-pair")]
    pub strategy_mode: StrategyMode,

    #[arg(long, env = "ARB_DRY_RUN", default_value_t = false)]
    pub dry_run: bool,

    #[arg(long, env = "ARB_MIN_PROFIT_LAMPORTS", default_value_t = 5_000)]
    pub min_profit_lamports: i64,

    #[arg(long, env = "ARB_TIP_LAMPORTS", default_value_t = 10_000)]
    pub tip_lamports: u64,

    #[arg(long, env = "ARB_CU_LIMIT", default_value_t = 400_000)]
    pub cu_limit: u32,

    #[arg(long, env = "ARB_CU_PRICE_MICROLAMPORTS", default_value_t = 1_000)]
    pub cu_price_microlamports: u64,

    #[arg(long, env = "ARB_SLIPPAGE_BPS", default_value_t = 50)]
    pub slippage_bps: u32,

    #[arg(long, env = "ARB_EXECUTION_SLIPPAGE_BPS", default_value_t = 25)]
    pub execution_slippage_bps: u32,

    /// Conservative haircut applied to the detector's scalar price-only
    /// estimate before sizing a bundle (spec §9 open question: exact
    /// relationship to realized PnL left for empirical tuning).
    #[arg(long, env = "ARB_CONSERVATIVE_HAIRCUT_BPS", default_value_t = 20)]
    pub conservative_haircut_bps: u32,

    #[arg(long, env = "ARB_MAX_STATE_LAG_SLOTS", default_value_t = 5)]
    pub max_state_lag_slots: u64,

    #[arg(long, env = "ARB_MAX_NET_TO_INPUT_BPS", default_value_t = 5_000)]
    pub max_net_to_input_bps: i64,

    #[arg(long, env = "ARB_MAX_ABSOLUTE_NET_LAMPORTS", default_value_t = 1_000_000_000)]
    pub max_absolute_net_lamports: i64,

    #[arg(long, env = "ARB_CANARY_MAX_INPUT_LAMPORTS", default_value_t = 10_000_000_000)]
    pub canary_max_input_lamports: u64,

    #[arg(long, env = "ARB_CANARY_MAX_SUBMISSIONS_PER_HOUR", default_value_t = 60)]
    pub canary_max_submissions_per_hour: u32,

    #[arg(long, env = "ARB_MAX_WALLET_DRAWDOWN_LAMPORTS", default_value_t = 500_000_000)]
    pub max_wallet_drawdown_lamports: i64,

    #[arg(long, env = "ARB_TICK_ARRAY_RADIUS", default_value_t = 2)]
    pub tick_array_radius: i64,

    #[arg(long, env = "ARB_BIN_ARRAY_RADIUS", default_value_t = 2)]
    pub bin_array_radius: i64,

    #[arg(long, env = "ARB_INCLUDE_TOPOLOGY_FROZEN_POOLS", default_value_t = false)]
    pub include_topology_frozen_pools: bool,

    /// Reject a snapshot whose dependency slot precedes the pool's slot
    /// (spec §8 invariant 4). Off only for local replay against fixtures
    /// that don't guarantee slot ordering.
    #[arg(long, env = "ARB_STRICT_SNAPSHOTS", default_value_t = true)]
    pub strict_snapshots: bool,

    #[arg(long, env = "ARB_BLOCKHASH_REFRESH_INTERVAL_MS", default_value_t = 2_000)]
    pub blockhash_refresh_interval_ms: u64,

    #[arg(long, env = "ARB_BLOCKHASH_MIN_REFRESH_INTERVAL_MS", default_value_t = 400)]
    pub blockhash_min_refresh_interval_ms: u64,

    /// Directory `run-config.json`, `stats.jsonl`, `stats-latest.json`, and
    /// `bundle-results.jsonl` are written to.
    #[arg(long, env = "ARB_OUTPUT_DIR", default_value = "./run")]
    pub output_dir: PathBuf,

    #[arg(long, env = "ARB_MIN_SPREAD_BPS", default_value_t = 55)]
    pub min_spread_bps: i64,

    #[arg(long, env = "ARB_DEDUP_WINDOW_MS", default_value_t = 100)]
    pub dedup_window_ms: u64,

    #[arg(long, env = "ARB_PROBE_AMOUNT", default_value_t = 100_000_000)]
    pub probe_amount: u128,
}

impl Cli {
    pub fn detector_config(&self) -> crate::detector::DetectorConfig {
        crate::detector::DetectorConfig {
            probe_amount: self.probe_amount,
            min_spread_bps: self.min_spread_bps,
            dedup_window_ms: self.dedup_window_ms,
            ..crate::detector::DetectorConfig::default()
        }
    }

    pub fn snapshot_radii(&self) -> crate::snapshot::SnapshotRadii {
        crate::snapshot::SnapshotRadii {
            tick_array_radius: self.tick_array_radius,
            bin_array_radius: self.bin_array_radius,
        }
    }

    pub fn guard_config(&self) -> crate::bundle::GuardConfig {
        crate::bundle::GuardConfig {
            min_profit_lamports: self.min_profit_lamports,
            max_net_to_input_bps: self.max_net_to_input_bps,
            max_absolute_net_lamports: self.max_absolute_net_lamports,
            canary_max_submissions_per_hour: self.canary_max_submissions_per_hour,
            canary_max_input_lamports: self.canary_max_input_lamports,
            max_wallet_drawdown_lamports: self.max_wallet_drawdown_lamports,
        }
    }
}
