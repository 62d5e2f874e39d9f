//! Generic typed cache (spec §4.2): `get / set / delete / has`, stale
//! rejection by `(slot, write_version)`, and an optional layout guard.

use crate::model::{CacheEntry, UpdateSource};
use crate::pubkey::Pubkey;
use crate::slot::{Slot, SlotVersion, WriteVersion};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::trace::{TraceEvent, TraceHandler, TraceKind};

/// Outcome of a `set` call, distinct from the trace event so callers that
/// don't care about tracing can still branch on it cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Accepted,
    StaleRejected,
    LayoutRejected,
}

/// A single-owner, interior-mutable store of `CacheEntry<T>` keyed by
/// pubkey. Mutation is non-suspending CPU work (spec §5), so `parking_lot`
/// is used instead of `tokio::sync::RwLock` -- no lock is ever held across
/// an `.await`.
pub struct TypedCache<T> {
    entries: RwLock<HashMap<Pubkey, CacheEntry<T>>>,
    last_seen_slot: RwLock<Slot>,
    trace_handler: RwLock<Option<TraceHandler>>,
    /// Defensive check against mis-routed updates: returns `true` if a raw
    /// byte length is one this cache must never accept (spec §4.2 point 3,
    /// §8 invariant 2). `None` for caches with no cross-venue collision risk.
    layout_guard: Option<fn(usize) -> bool>,
}

impl<T: Clone> TypedCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_seen_slot: RwLock::new(0),
            trace_handler: RwLock::new(None),
            layout_guard: None,
        }
    }

    pub fn with_layout_guard(guard: fn(usize) -> bool) -> Self {
        Self {
            layout_guard: Some(guard),
            ..Self::new()
        }
    }

    pub fn set_trace_handler(&self, handler: TraceHandler) {
        *self.trace_handler.write() = Some(handler);
    }

    fn emit(&self, event: TraceEvent) {
        if let Some(handler) = self.trace_handler.read().as_ref() {
            handler(&event);
        }
    }

    pub fn get(&self, key: &Pubkey) -> Option<CacheEntry<T>> {
        self.entries.read().get(key).cloned()
    }

    pub fn has(&self, key: &Pubkey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn delete(&self, key: &Pubkey) -> Option<CacheEntry<T>> {
        let removed = self.entries.write().remove(key);
        if let Some(ref entry) = removed {
            self.emit(TraceEvent {
                kind: TraceKind::Deleted,
                pubkey: *key,
                slot: entry.slot,
                write_version: entry.write_version,
                source: entry.source,
                reason: None,
            });
        }
        removed
    }

    pub fn last_seen_slot(&self) -> Slot {
        *self.last_seen_slot.read()
    }

    /// Insert or replace an entry, enforcing the stale-rejection and
    /// layout-safety invariants of spec §4.2. `raw_len` is the raw account
    /// data length the update was decoded from; pool caches pass their
    /// layout guard against it, dependency caches pass `None` since the
    /// mis-routing risk runs the other direction.
    pub fn set(
        &self,
        key: Pubkey,
        payload: T,
        slot: Slot,
        write_version: WriteVersion,
        ingested_at_nanos: u64,
        source: UpdateSource,
        raw_len: Option<usize>,
    ) -> SetOutcome {
        if let (Some(guard), Some(len)) = (self.layout_guard, raw_len) {
            if guard(len) {
                self.emit(TraceEvent {
                    kind: TraceKind::LayoutRejected,
                    pubkey: key,
                    slot,
                    write_version,
                    source,
                    reason: Some("data length matches a tick/bin array layout"),
                });
                return SetOutcome::LayoutRejected;
            }
        }

        let incoming = SlotVersion::new(slot, write_version);
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&key) {
            if !incoming.supersedes(&existing.slot_version()) {
                drop(entries);
                self.emit(TraceEvent {
                    kind: TraceKind::StaleRejected,
                    pubkey: key,
                    slot,
                    write_version,
                    source,
                    reason: Some("stale (slot, write_version)"),
                });
                return SetOutcome::StaleRejected;
            }
        }

        entries.insert(
            key,
            CacheEntry::new(payload, slot, write_version, ingested_at_nanos, source),
        );
        drop(entries);

        let mut last_seen = self.last_seen_slot.write();
        if slot > *last_seen {
            *last_seen = slot;
        }
        drop(last_seen);

        self.emit(TraceEvent {
            kind: TraceKind::Accepted,
            pubkey: key,
            slot,
            write_version,
            source,
            reason: None,
        });
        SetOutcome::Accepted
    }
}

impl<T: Clone> Default for TypedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
