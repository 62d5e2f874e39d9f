use crate::slot::Slot;
use std::collections::HashSet;

/// CLMM/DLMM pool lifetime (spec §4.2). Trivial for CPMM pools, which have
/// no off-pool dependencies and are always treated as `ACTIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PoolLifecycleState {
    Discovered,
    Bootstrapping,
    Active,
    Refreshing,
    FrozenTopology,
}

impl PoolLifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolLifecycleState::Discovered => "DISCOVERED",
            PoolLifecycleState::Bootstrapping => "BOOTSTRAPPING",
            PoolLifecycleState::Active => "ACTIVE",
            PoolLifecycleState::Refreshing => "REFRESHING",
            PoolLifecycleState::FrozenTopology => "FROZEN_TOPOLOGY",
        }
    }

    /// Only `ACTIVE`/`REFRESHING` pools are routable; `FROZEN_TOPOLOGY` is a
    /// terminal error state excluded from candidate routing unless the
    /// operator opts in (spec §4.2).
    pub fn is_routable(&self, include_frozen: bool) -> bool {
        match self {
            PoolLifecycleState::Active | PoolLifecycleState::Refreshing => true,
            PoolLifecycleState::FrozenTopology => include_frozen,
            PoolLifecycleState::Discovered | PoolLifecycleState::Bootstrapping => false,
        }
    }
}

/// The set of tick-/bin-array indices materialized at activation, plus the
/// slot the freeze occurred at. While a pool is `ACTIVE`, no simulation may
/// consult a dependency outside this set (spec §3, invariant 3 in §8).
#[derive(Debug, Clone)]
pub struct FrozenTopology {
    pub frozen_at_slot: Slot,
    /// Tick-array start-tick indices (CLMM) or bin-array indices (DLMM),
    /// stored as signed 64-bit so both venues share one representation.
    pub dependency_indices: HashSet<i64>,
}

impl FrozenTopology {
    pub fn new(frozen_at_slot: Slot, indices: impl IntoIterator<Item = i64>) -> Self {
        Self {
            frozen_at_slot,
            dependency_indices: indices.into_iter().collect(),
        }
    }

    pub fn contains(&self, index: i64) -> bool {
        self.dependency_indices.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_topology_is_not_routable_by_default() {
        assert!(!PoolLifecycleState::FrozenTopology.is_routable(false));
        assert!(PoolLifecycleState::FrozenTopology.is_routable(true));
    }

    #[test]
    fn active_and_refreshing_are_routable() {
        assert!(PoolLifecycleState::Active.is_routable(false));
        assert!(PoolLifecycleState::Refreshing.is_routable(false));
    }

    #[test]
    fn discovered_and_bootstrapping_are_not_routable() {
        assert!(!PoolLifecycleState::Discovered.is_routable(true));
        assert!(!PoolLifecycleState::Bootstrapping.is_routable(true));
    }

    #[test]
    fn frozen_topology_confines_indices() {
        let topo = FrozenTopology::new(100, [0, 1, -1]);
        assert!(topo.contains(0));
        assert!(topo.contains(-1));
        assert!(!topo.contains(2));
    }
}
