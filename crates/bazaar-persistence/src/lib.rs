//! Price snapshot persistence for the bazaar engine.
//!
//! Stores the per-item price quotes written at the end of each
//! reconciliation cycle and restores them at startup. The in-memory price
//! table always remains authoritative; a failed save is logged and retried
//! at the next cycle.

pub mod error;
pub mod snapshot;

pub use error::{PersistenceError, PersistenceResult};
pub use snapshot::SnapshotStore;
