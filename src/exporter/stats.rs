// file: src/exporter/stats.rs
// description: aggregate counts over a project snapshot
// reference: internal data structures

use crate::models::Snapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotStats {
    pub total_projects: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub languages: BTreeMap<String, usize>,
    pub categories: BTreeMap<String, usize>,
    pub last_updated: DateTime<Utc>,
}

impl SnapshotStats {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut languages = BTreeMap::new();
        let mut categories = BTreeMap::new();

        for project in &snapshot.projects {
            *languages.entry(project.language.clone()).or_insert(0) += 1;
            *categories
                .entry(project.category.label().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total_projects: snapshot.projects.len(),
            total_stars: snapshot.projects.iter().map(|p| p.stars).sum(),
            total_forks: snapshot.projects.iter().map(|p| p.forks).sum(),
            languages,
            categories,
            last_updated: snapshot.timestamp,
        }
    }
}
