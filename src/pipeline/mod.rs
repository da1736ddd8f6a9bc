// file: src/pipeline/mod.rs
// description: refresh pipeline module exports and public api
// reference: pipeline orchestration

pub mod orchestrator;
pub mod progress;
pub mod ranking;

pub use orchestrator::{RefreshOptions, RefreshOutcome, RefreshPipeline, RefreshStats};
pub use progress::{EnhancementStats, ProgressTracker};
pub use ranking::{dedupe, rank, truncate};
