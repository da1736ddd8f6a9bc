// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod classifier;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod exporter;
pub mod github;
pub mod lookup;
pub mod models;
pub mod pipeline;
pub mod settings;
pub mod storage;
pub mod utils;

pub use classifier::{ProjectClassifier, VelocityIndex};
pub use config::{AiConfig, Config, GithubConfig, LookupConfig, PipelineConfig, StorageConfig};
pub use enhancer::{Enhancer, Provider};
pub use error::{PipelineError, Result};
pub use exporter::{ReportExporter, SnapshotStats};
pub use github::{FetchReport, FetchResult, GithubClient};
pub use lookup::{ReadmeLookup, ReadmeSource, TaskId, TaskPoll};
pub use models::{Category, HistoryRecord, Project, RawRepository, Snapshot, Trend};
pub use pipeline::{ProgressTracker, RefreshOptions, RefreshOutcome, RefreshPipeline, RefreshStats};
pub use settings::{AiOverrides, AiSettingsView, GithubOverrides, SettingsOverrides, SettingsStore};
pub use storage::{HistoryLedger, SnapshotStore};
pub use utils::{OperationTimer, PerformanceMetrics, Validator};
