//! Structured trace events emitted by every typed cache (spec §4.2).
//!
//! Traces are delivered through an injectable handler rather than logged
//! directly so tests can assert on accepted/rejected updates without
//! scraping log output; the engine's default handler forwards each event
//! through `tracing`.

use crate::pubkey::Pubkey;
use crate::slot::{Slot, WriteVersion};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Accepted,
    StaleRejected,
    LayoutRejected,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub kind: TraceKind,
    pub pubkey: Pubkey,
    pub slot: Slot,
    pub write_version: WriteVersion,
    pub source: crate::model::UpdateSource,
    pub reason: Option<&'static str>,
}

pub type TraceHandler = Arc<dyn Fn(&TraceEvent) + Send + Sync>;

/// The handler installed by default: forwards every event to `tracing` at
/// debug level, with rejects bumped to warn.
pub fn tracing_trace_handler() -> TraceHandler {
    Arc::new(|event: &TraceEvent| match event.kind {
        TraceKind::Accepted => tracing::debug!(
            pubkey = %event.pubkey,
            slot = event.slot,
            write_version = event.write_version,
            "cache accept"
        ),
        TraceKind::Deleted => tracing::debug!(pubkey = %event.pubkey, "cache delete"),
        TraceKind::StaleRejected | TraceKind::LayoutRejected => tracing::warn!(
            pubkey = %event.pubkey,
            slot = event.slot,
            write_version = event.write_version,
            reason = event.reason.unwrap_or("unknown"),
            "cache reject"
        ),
    })
}
