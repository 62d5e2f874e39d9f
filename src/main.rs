//! Entry point (spec §6.5): parse configuration, build the engine, run the
//! detection loop until a guard trips or the operator signals shutdown.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use venue_arb_engine::bundle::{check_guards, BundleCandidate, GuardViolation};
use venue_arb_engine::config::Cli;
use venue_arb_engine::detector::Opportunity;
use venue_arb_engine::engine::Engine;
use venue_arb_engine::errors::ErrorKind;

const STATS_TICK: Duration = Duration::from_secs(5);
const DETECT_TICK: Duration = Duration::from_millis(200);
const SUBMISSION_WINDOW: Duration = Duration::from_secs(3_600);

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(err) = std::fs::create_dir_all(&cli.output_dir) {
        error!(error = %err, "failed to create output directory");
        return ExitCode::FAILURE;
    }
    if let Err(err) = persist_run_config(&cli) {
        error!(error = %err, "failed to persist run-config.json");
        return ExitCode::FAILURE;
    }

    let engine = Arc::new(Engine::new(
        cli.detector_config(),
        cli.snapshot_radii(),
        cli.strict_snapshots,
    ));

    info!(
        stream = %cli.stream_endpoint,
        dry_run = cli.dry_run,
        "engine starting"
    );

    run(engine, &cli).await
}

/// Drive the detection/stats loop until `ctrl_c` or a guard trip. Stream
/// ingestion (account updates, pending-tx legs) is wired by the caller of
/// [`Engine::on_account_update`] at the transport layer; this loop owns the
/// periodic detect/size/guard cadence and shutdown sequencing. The concrete
/// submit transport is trait-injected elsewhere (`bundle::BundleSubmitter`);
/// a candidate that clears every guard here is ready to hand to it.
async fn run(engine: Arc<Engine>, cli: &Cli) -> ExitCode {
    let mut detect_interval = tokio::time::interval(DETECT_TICK);
    let mut stats_interval = tokio::time::interval(STATS_TICK);
    let guard = Arc::new(tokio::sync::Notify::new());
    let tripped: Arc<parking_lot::Mutex<Option<GuardViolation>>> = Arc::new(parking_lot::Mutex::new(None));
    let guard_config = cli.guard_config();

    let mut submissions_this_hour: u32 = 0;
    let mut submission_window_start = tokio::time::Instant::now();
    let observed_drawdown_lamports: i64 = 0;

    loop {
        tokio::select! {
            _ = detect_interval.tick() => {
                if submission_window_start.elapsed() >= SUBMISSION_WINDOW {
                    submissions_this_hour = 0;
                    submission_window_start = tokio::time::Instant::now();
                }

                let opportunities = engine.detect();
                if !opportunities.is_empty() {
                    info!(count = opportunities.len(), "opportunities detected");
                }

                for opportunity in &opportunities {
                    let candidate = size_candidate(opportunity, cli, submissions_this_hour, observed_drawdown_lamports);
                    match check_guards(&candidate, &guard_config) {
                        Ok(()) => {
                            submissions_this_hour += 1;
                            info!(
                                mint = %opportunity.mint,
                                expected_net_lamports = candidate.expected_net_lamports,
                                "candidate cleared guards"
                            );
                        }
                        Err(violation) => {
                            engine.stats.record_skip(ErrorKind::GuardTripped);
                            *tripped.lock() = Some(violation);
                            guard.notify_one();
                        }
                    }
                }
            }
            _ = stats_interval.tick() => {
                if let Err(err) = engine.persist_stats(&cli.output_dir) {
                    warn!(error = %err, "failed to persist stats snapshot");
                }
            }
            _ = guard.notified() => {
                let violation = tripped.lock().take();
                error!(?violation, "guard tripped, shutting down");
                let _ = engine.persist_stats(&cli.output_dir);
                return ExitCode::from(guard_exit_code(violation));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested, draining in-flight work");
                let _ = engine.persist_stats(&cli.output_dir);
                return ExitCode::SUCCESS;
            }
        }
    }
}

/// Size a detected opportunity into a guard-checkable candidate: the
/// detector reports a price-only gross/net spread, so the configured
/// haircut is applied before the guard sees it (spec §9 open question on
/// the detector's scalar price-only view vs. realized PnL).
fn size_candidate(
    opportunity: &Opportunity,
    cli: &Cli,
    submissions_this_hour: u32,
    observed_drawdown_lamports: i64,
) -> BundleCandidate {
    let input_lamports = u64::try_from(opportunity.probe_in).unwrap_or(u64::MAX);
    let haircut_bps = i64::from(cli.conservative_haircut_bps);
    let effective_net_bps = (opportunity.net_spread_bps - haircut_bps).max(0);
    let expected_net_lamports = ((input_lamports as i128 * effective_net_bps as i128) / 10_000) as i64;

    BundleCandidate {
        expected_net_lamports,
        input_lamports,
        submissions_this_hour,
        observed_drawdown_lamports,
    }
}

/// Guard trips are fatal (spec §7): map each violation to a distinct
/// nonzero exit code so an operator's process supervisor can tell them
/// apart without parsing logs. The opportunity that tripped the guard is
/// itself aborted (spec §4.6), and the engine then shuts down rather than
/// keep evaluating further opportunities against a risk surface it just
/// proved has been crossed.
fn guard_exit_code(violation: Option<GuardViolation>) -> u8 {
    match violation {
        Some(GuardViolation::BelowMinProfit(_)) => 10,
        Some(GuardViolation::NetToInputTooHigh(_)) => 11,
        Some(GuardViolation::AbsoluteNetTooHigh(_)) => 12,
        Some(GuardViolation::SubmissionRateExceeded(_)) => 13,
        Some(GuardViolation::InputTooLarge(_)) => 14,
        Some(GuardViolation::DrawdownExceeded(_)) => 15,
        None => 2,
    }
}

fn persist_run_config(cli: &Cli) -> std::io::Result<()> {
    #[derive(serde::Serialize)]
    struct RunConfig<'a> {
        stream_endpoint: &'a str,
        pending_tx_endpoint: &'a str,
        rpc_endpoint: &'a str,
        blockhash_rpc_endpoint: &'a str,
        submission_endpoint: &'a str,
        dry_run: bool,
        min_profit_lamports: i64,
        tip_lamports: u64,
        cu_limit: u32,
        cu_price_microlamports: u64,
        slippage_bps: u32,
        execution_slippage_bps: u32,
        conservative_haircut_bps: u32,
        max_state_lag_slots: u64,
        max_net_to_input_bps: i64,
        max_absolute_net_lamports: i64,
        canary_max_input_lamports: u64,
        canary_max_submissions_per_hour: u32,
        max_wallet_drawdown_lamports: i64,
        tick_array_radius: i64,
        bin_array_radius: i64,
        include_topology_frozen_pools: bool,
        blockhash_refresh_interval_ms: u64,
        blockhash_min_refresh_interval_ms: u64,
        min_spread_bps: i64,
        dedup_window_ms: u64,
        probe_amount: u128,
    }

    let dump = RunConfig {
        stream_endpoint: &cli.stream_endpoint,
        pending_tx_endpoint: &cli.pending_tx_endpoint,
        rpc_endpoint: &cli.rpc_endpoint,
        blockhash_rpc_endpoint: &cli.blockhash_rpc_endpoint,
        submission_endpoint: &cli.submission_endpoint,
        dry_run: cli.dry_run,
        min_profit_lamports: cli.min_profit_lamports,
        tip_lamports: cli.tip_lamports,
        cu_limit: cli.cu_limit,
        cu_price_microlamports: cli.cu_price_microlamports,
        slippage_bps: cli.slippage_bps,
        execution_slippage_bps: cli.execution_slippage_bps,
        conservative_haircut_bps: cli.conservative_haircut_bps,
        max_state_lag_slots: cli.max_state_lag_slots,
        max_net_to_input_bps: cli.max_net_to_input_bps,
        max_absolute_net_lamports: cli.max_absolute_net_lamports,
        canary_max_input_lamports: cli.canary_max_input_lamports,
        canary_max_submissions_per_hour: cli.canary_max_submissions_per_hour,
        max_wallet_drawdown_lamports: cli.max_wallet_drawdown_lamports,
        tick_array_radius: cli.tick_array_radius,
        bin_array_radius: cli.bin_array_radius,
        include_topology_frozen_pools: cli.include_topology_frozen_pools,
        blockhash_refresh_interval_ms: cli.blockhash_refresh_interval_ms,
        blockhash_min_refresh_interval_ms: cli.blockhash_min_refresh_interval_ms,
        min_spread_bps: cli.min_spread_bps,
        dedup_window_ms: cli.dedup_window_ms,
        probe_amount: cli.probe_amount,
    };

    let path = cli.output_dir.join("run-config.json");
    std::fs::write(path, serde_json::to_vec_pretty(&dump)?)
}
