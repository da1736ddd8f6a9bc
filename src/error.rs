// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Rate limited by upstream (status {status})")]
    RateLimited { status: u16 },

    #[error("Malformed upstream item: {0}")]
    MalformedUpstreamItem(String),

    #[error("Malformed local store {path}: {message}")]
    MalformedLocalStore { path: PathBuf, message: String },

    #[error("Augmentation failed: {0}")]
    AugmentationFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::NetworkFailure(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl PipelineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::NotFound(_))
    }
}
