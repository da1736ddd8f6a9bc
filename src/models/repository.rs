// file: src/models/repository.rs
// description: raw repository item as returned by the search API
// reference: https://docs.github.com/en/rest/search/search#search-repositories

use serde::Deserialize;

/// Subset of a search-API repository item that the pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRepository {
    pub full_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub stargazers_since_last_analytic: Option<i64>,
}

impl RawRepository {
    pub fn short_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.full_name.rsplit('/').next().unwrap_or(&self.full_name),
        }
    }

    pub fn topics(&self) -> &[String] {
        self.topics.as_deref().unwrap_or(&[])
    }
}
