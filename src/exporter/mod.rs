// file: src/exporter/mod.rs
// description: snapshot statistics and report export
// reference: internal module structure

pub mod report;
pub mod stats;

pub use report::ReportExporter;
pub use stats::SnapshotStats;
