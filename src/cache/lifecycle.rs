//! Pool lifecycle FSM (spec §4.2): `DISCOVERED → BOOTSTRAPPING → ACTIVE →
//! REFRESHING → ACTIVE | FROZEN_TOPOLOGY`.
//!
//! Transitions fire a listener so the pair index can add/remove venues
//! synchronously with the state change (spec §5: "updated synchronously
//! after a cache write that changes a pool's lifecycle state").

use crate::model::{FrozenTopology, PoolLifecycleState, Venue};
use crate::pubkey::Pubkey;
use crate::slot::Slot;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub type LifecycleListener =
    Arc<dyn Fn(Pubkey, Venue, PoolLifecycleState, PoolLifecycleState) + Send + Sync>;

#[derive(Debug, Clone)]
struct Record {
    venue: Venue,
    state: PoolLifecycleState,
    discovered_slot: Slot,
    frozen: Option<FrozenTopology>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapError {
    #[error("rpc context slot {context_slot} is below the required target slot {target_slot}")]
    StaleContext { context_slot: Slot, target_slot: Slot },
    #[error("pool is not in a state that can bootstrap")]
    WrongState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("pool is not ACTIVE, cannot begin a refresh")]
    WrongState,
}

/// Owns every pool's lifecycle state. Single-owner (the engine), matching
/// the rest of the cache layer (spec §5).
pub struct LifecycleManager {
    records: RwLock<HashMap<Pubkey, Record>>,
    listener: RwLock<Option<LifecycleListener>>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            listener: RwLock::new(None),
        }
    }

    pub fn set_listener(&self, listener: LifecycleListener) {
        *self.listener.write() = Some(listener);
    }

    fn fire(&self, pool: Pubkey, venue: Venue, from: PoolLifecycleState, to: PoolLifecycleState) {
        if from == to {
            return;
        }
        if let Some(listener) = self.listener.read().as_ref() {
            listener(pool, venue, from, to);
        }
    }

    pub fn state(&self, pool: &Pubkey) -> Option<PoolLifecycleState> {
        self.records.read().get(pool).map(|r| r.state)
    }

    pub fn frozen_topology(&self, pool: &Pubkey) -> Option<FrozenTopology> {
        self.records.read().get(pool).and_then(|r| r.frozen.clone())
    }

    /// A pool is learned from the stream for the first time. CPMM pools have
    /// no off-pool dependencies and never leave `ACTIVE` (spec §3); callers
    /// should not drive them through `begin_bootstrap` at all.
    pub fn discover(&self, pool: Pubkey, venue: Venue, slot: Slot) {
        let mut records = self.records.write();
        records.entry(pool).or_insert(Record {
            venue,
            state: PoolLifecycleState::Discovered,
            discovered_slot: slot,
            frozen: None,
        });
    }

    /// CPMM pools carry no dependency topology and are routable the moment
    /// they're decoded.
    pub fn activate_trivial(&self, pool: Pubkey, venue: Venue, slot: Slot) {
        let mut records = self.records.write();
        let prev = records
            .get(&pool)
            .map(|r| r.state)
            .unwrap_or(PoolLifecycleState::Discovered);
        records.insert(
            pool,
            Record {
                venue,
                state: PoolLifecycleState::Active,
                discovered_slot: slot,
                frozen: Some(FrozenTopology::new(slot, [])),
            },
        );
        drop(records);
        self.fire(pool, venue, prev, PoolLifecycleState::Active);
    }

    pub fn begin_bootstrap(&self, pool: &Pubkey) -> Result<(), BootstrapError> {
        let mut records = self.records.write();
        let record = records.get_mut(pool).ok_or(BootstrapError::WrongState)?;
        if record.state != PoolLifecycleState::Discovered {
            return Err(BootstrapError::WrongState);
        }
        let venue = record.venue;
        record.state = PoolLifecycleState::Bootstrapping;
        drop(records);
        self.fire(*pool, venue, PoolLifecycleState::Discovered, PoolLifecycleState::Bootstrapping);
        Ok(())
    }

    /// Complete (or abort) an in-flight bootstrap. The bootstrap chooses a
    /// `target_slot` at least as recent as discovery; if `context_slot` is
    /// below it the attempt is aborted and the pool reverts to
    /// `DISCOVERED` (spec §4.2, §7: "never freezes at slot 0").
    pub fn finish_bootstrap(
        &self,
        pool: &Pubkey,
        target_slot: Slot,
        context_slot: Slot,
        dependency_indices: impl IntoIterator<Item = i64>,
    ) -> Result<(), BootstrapError> {
        let mut records = self.records.write();
        let record = records.get_mut(pool).ok_or(BootstrapError::WrongState)?;
        if record.state != PoolLifecycleState::Bootstrapping {
            return Err(BootstrapError::WrongState);
        }
        let venue = record.venue;
        if context_slot < target_slot {
            record.state = PoolLifecycleState::Discovered;
            drop(records);
            self.fire(*pool, venue, PoolLifecycleState::Bootstrapping, PoolLifecycleState::Discovered);
            return Err(BootstrapError::StaleContext { context_slot, target_slot });
        }
        record.frozen = Some(FrozenTopology::new(context_slot, dependency_indices));
        record.state = PoolLifecycleState::Active;
        drop(records);
        self.fire(*pool, venue, PoolLifecycleState::Bootstrapping, PoolLifecycleState::Active);
        Ok(())
    }

    /// The pool's price moved within `bufferArrays` of the frozen window's
    /// edge; re-bootstrap its topology.
    pub fn begin_refresh(&self, pool: &Pubkey) -> Result<(), RefreshError> {
        let mut records = self.records.write();
        let record = records.get_mut(pool).ok_or(RefreshError::WrongState)?;
        if record.state != PoolLifecycleState::Active {
            return Err(RefreshError::WrongState);
        }
        let venue = record.venue;
        record.state = PoolLifecycleState::Refreshing;
        drop(records);
        self.fire(*pool, venue, PoolLifecycleState::Active, PoolLifecycleState::Refreshing);
        Ok(())
    }

    pub fn complete_refresh(
        &self,
        pool: &Pubkey,
        frozen_at_slot: Slot,
        dependency_indices: impl IntoIterator<Item = i64>,
    ) -> Result<(), RefreshError> {
        let mut records = self.records.write();
        let record = records.get_mut(pool).ok_or(RefreshError::WrongState)?;
        if record.state != PoolLifecycleState::Refreshing {
            return Err(RefreshError::WrongState);
        }
        let venue = record.venue;
        record.frozen = Some(FrozenTopology::new(frozen_at_slot, dependency_indices));
        record.state = PoolLifecycleState::Active;
        drop(records);
        self.fire(*pool, venue, PoolLifecycleState::Refreshing, PoolLifecycleState::Active);
        Ok(())
    }

    /// RPC error during refresh: revert atomically to `ACTIVE` with the
    /// prior topology intact (spec §4.2, §7).
    pub fn abort_refresh(&self, pool: &Pubkey) -> Result<(), RefreshError> {
        let mut records = self.records.write();
        let record = records.get_mut(pool).ok_or(RefreshError::WrongState)?;
        if record.state != PoolLifecycleState::Refreshing {
            return Err(RefreshError::WrongState);
        }
        let venue = record.venue;
        record.state = PoolLifecycleState::Active;
        drop(records);
        self.fire(*pool, venue, PoolLifecycleState::Refreshing, PoolLifecycleState::Active);
        Ok(())
    }

    /// Enter the terminal error state; excluded from routing unless the
    /// operator opts in (spec §4.2).
    pub fn mark_frozen_topology_error(&self, pool: &Pubkey) {
        let mut records = self.records.write();
        if let Some(record) = records.get_mut(pool) {
            let from = record.state;
            let venue = record.venue;
            record.state = PoolLifecycleState::FrozenTopology;
            drop(records);
            self.fire(*pool, venue, from, PoolLifecycleState::FrozenTopology);
        }
    }

    pub fn discovered_slot(&self, pool: &Pubkey) -> Option<Slot> {
        self.records.read().get(pool).map(|r| r.discovered_slot)
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
