//! Synchronization engine
//!
//! Keeps the flowing document continuously consistent with the
//! structured screenplay model: full rebuilds, minimal incremental
//! edits, debounced pagination, and cursor-to-page queries.

mod debounce;
mod engine;
mod segment;
mod tracker;

pub use debounce::DebounceTimer;
pub use engine::{SyncEngine, SyncEvent, BOUNDARY_DEBOUNCE, RELOAD_DEBOUNCE};
pub use segment::SegmentMap;
pub use tracker::ModificationTracker;
