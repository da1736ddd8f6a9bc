// file: src/storage/mod.rs
// description: snapshot and history persistence module exports
// reference: internal module structure

pub mod atomic;
pub mod history;
pub mod snapshot;

pub use history::{DEFAULT_RETENTION, HistoryLedger};
pub use snapshot::SnapshotStore;
