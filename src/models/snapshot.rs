// file: src/models/snapshot.rs
// description: current ranked project list document
// reference: internal data structures

use crate::models::Project;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(alias = "last_updated", deserialize_with = "utc_or_naive")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(alias = "total_projects", default)]
    pub count: usize,
}

impl Snapshot {
    pub fn new(projects: Vec<Project>) -> Self {
        Self::at(Utc::now(), projects)
    }

    pub fn at(timestamp: DateTime<Utc>, projects: Vec<Project>) -> Self {
        let count = projects.len();
        Self {
            timestamp,
            projects,
            count,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.matches_name(key))
    }
}

/// RFC 3339, or an offset-less timestamp read as UTC.
fn utc_or_naive<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
