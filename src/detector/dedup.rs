//! Sliding-window de-duplication, keyed by mint (spec §4.5 point 5).
//!
//! `now` is always caller-supplied rather than read from the clock
//! internally, so tests can drive the window deterministically.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::pubkey::Pubkey;

pub struct DedupWindow {
    window: Duration,
    last_emitted: RwLock<HashMap<Pubkey, Instant>>,
}

impl DedupWindow {
    pub fn new(window: Duration) -> Self {
        Self { window, last_emitted: RwLock::new(HashMap::new()) }
    }

    /// Returns `true` (and records `now`) iff `mint`'s last emission, if
    /// any, is older than the window.
    pub fn should_emit(&self, mint: Pubkey, now: Instant) -> bool {
        let mut map = self.last_emitted.write();
        match map.get(&mint) {
            Some(&last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                map.insert(mint, now);
                true
            }
        }
    }
}
