//! State management module
//!
//! Persists the cursor of the last committed page so that a sync can resume
//! where the previous run stopped.
//!
//! # Overview
//!
//! The state module provides:
//! - `SyncState` - the persisted record `{last_cursor, updated_at}`
//! - `StateStore` - the persistence seam the engine is handed
//! - `FileStateStore` - one JSON file per connector instance, atomic writes
//! - `MemoryStateStore` - shared in-memory record for tests and embedding

mod store;
mod types;

pub use store::{FileStateStore, MemoryStateStore, StateStore};
pub use types::SyncState;
