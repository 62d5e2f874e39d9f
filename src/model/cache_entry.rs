use crate::slot::{Slot, WriteVersion};

/// Where an entry's bytes came from -- the streaming feed, or an RPC
/// bootstrap fetch. Bootstrap entries are the only ones allowed to
/// materialize a `BOOTSTRAPPING` pool's dependencies (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum UpdateSource {
    Stream,
    Bootstrap,
}

/// A cached payload plus the provenance needed to order and trace it.
///
/// Invariant: an entry's `slot` never regresses once inserted into a cache
/// -- enforced by the cache's `set`, not by this type, since replacement
/// has to compare against the *previous* entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub slot: Slot,
    pub write_version: WriteVersion,
    /// Monotonic ingest timestamp (nanoseconds), independent of chain slot.
    pub ingested_at_nanos: u64,
    pub source: UpdateSource,
}

impl<T> CacheEntry<T> {
    pub fn new(
        payload: T,
        slot: Slot,
        write_version: WriteVersion,
        ingested_at_nanos: u64,
        source: UpdateSource,
    ) -> Self {
        Self {
            payload,
            slot,
            write_version,
            ingested_at_nanos,
            source,
        }
    }

    pub fn slot_version(&self) -> crate::slot::SlotVersion {
        crate::slot::SlotVersion::new(self.slot, self.write_version)
    }
}
