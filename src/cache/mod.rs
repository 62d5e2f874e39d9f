//! Typed caches and the pool lifecycle FSM (spec §3, §4.2, component C2).

mod dependency_cache;
mod lifecycle;
mod registry;
mod trace;
mod typed_cache;

pub use dependency_cache::{BinArrayCache, DependencyCache, DependencyKey, TickArrayCache};
pub use lifecycle::{BootstrapError, LifecycleListener, LifecycleManager, RefreshError};
pub use registry::CacheRegistry;
pub use trace::{tracing_trace_handler, TraceEvent, TraceHandler, TraceKind};
pub use typed_cache::{SetOutcome, TypedCache};
