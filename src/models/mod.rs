// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod history;
pub mod project;
pub mod repository;
pub mod snapshot;

pub use history::{HistoryRecord, week_id};
pub use project::{Category, Project, Trend};
pub use repository::RawRepository;
pub use snapshot::Snapshot;
