// file: src/github/parser.rs
// description: shape checks and conversion of raw search-api items
// reference: https://docs.rs/serde_json/latest/serde_json/enum.Value.html

use crate::classifier::ProjectClassifier;
use crate::error::{PipelineError, Result};
use crate::models::{Project, RawRepository};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<Value>,
}

pub fn parse_search_response(body: &str) -> Result<SearchResponse> {
    serde_json::from_str(body).map_err(|e| {
        PipelineError::MalformedUpstreamItem(format!("search response: {}", e))
    })
}

/// Decode one item; failures are per-item and never poison the batch.
pub fn parse_item(item: &Value, classifier: &ProjectClassifier) -> Result<Project> {
    let raw = RawRepository::deserialize(item)
        .map_err(|e| PipelineError::MalformedUpstreamItem(e.to_string()))?;
    classifier.classify(&raw)
}
