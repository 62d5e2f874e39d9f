//! Strictly-additive engine counters and their periodic persistence (spec
//! §4.7, §6.5): opportunities, builds, submits, accept/reject, decode
//! failures, and skip reasons.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::errors::ErrorKind;

#[derive(Debug, Default)]
pub struct EngineStats {
    pub opportunities_detected: AtomicU64,
    pub bundles_built: AtomicU64,
    pub bundles_submitted: AtomicU64,
    pub bundles_accepted: AtomicU64,
    pub bundles_rejected: AtomicU64,
    pub decode_failures: AtomicU64,
    pub submit_retry_fresh_blockhash_failed: AtomicU64,
    pub pending_tx_dropped: AtomicU64,
    skip_reasons: RwLock<HashMap<&'static str, u64>>,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&self, kind: ErrorKind) {
        *self.skip_reasons.write().entry(kind.reason_key()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            opportunities_detected: self.opportunities_detected.load(Ordering::Relaxed),
            bundles_built: self.bundles_built.load(Ordering::Relaxed),
            bundles_submitted: self.bundles_submitted.load(Ordering::Relaxed),
            bundles_accepted: self.bundles_accepted.load(Ordering::Relaxed),
            bundles_rejected: self.bundles_rejected.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            submit_retry_fresh_blockhash_failed: self.submit_retry_fresh_blockhash_failed.load(Ordering::Relaxed),
            pending_tx_dropped: self.pending_tx_dropped.load(Ordering::Relaxed),
            skip_reasons: self.skip_reasons.read().clone(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatsSnapshot {
    pub opportunities_detected: u64,
    pub bundles_built: u64,
    pub bundles_submitted: u64,
    pub bundles_accepted: u64,
    pub bundles_rejected: u64,
    pub decode_failures: u64,
    pub submit_retry_fresh_blockhash_failed: u64,
    pub pending_tx_dropped: u64,
    pub skip_reasons: HashMap<&'static str, u64>,
}

/// Appends `snapshot` as one JSON line to `stats.jsonl` and overwrites
/// `stats-latest.json` with the same record (spec §6.5).
pub fn persist_snapshot(dir: &std::path::Path, snapshot: &StatsSnapshot) -> std::io::Result<()> {
    use std::io::Write;

    let line = serde_json::to_string(snapshot)?;
    let mut jsonl = std::fs::OpenOptions::new().create(true).append(true).open(dir.join("stats.jsonl"))?;
    writeln!(jsonl, "{line}")?;

    std::fs::write(dir.join("stats-latest.json"), serde_json::to_vec_pretty(snapshot)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_snapshot_is_consistent() {
        let stats = EngineStats::new();
        stats.opportunities_detected.fetch_add(3, Ordering::Relaxed);
        stats.record_skip(ErrorKind::StaleUpdate);
        stats.record_skip(ErrorKind::StaleUpdate);
        stats.record_skip(ErrorKind::MissingDependency);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.opportunities_detected, 3);
        assert_eq!(snapshot.skip_reasons["stale_update"], 2);
        assert_eq!(snapshot.skip_reasons["missing_dependency"], 1);
    }

    #[test]
    fn persist_snapshot_writes_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let stats = EngineStats::new();
        stats.bundles_submitted.fetch_add(1, Ordering::Relaxed);
        persist_snapshot(tmp.path(), &stats.snapshot()).unwrap();

        assert!(tmp.path().join("stats.jsonl").exists());
        assert!(tmp.path().join("stats-latest.json").exists());
    }
}
