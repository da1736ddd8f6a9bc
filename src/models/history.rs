// file: src/models/history.rs
// description: weekly history record with ISO week identifiers
// reference: https://docs.rs/chrono/latest/chrono/struct.IsoWeek.html

use crate::models::Project;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    #[serde(alias = "week")]
    pub label: String,
    pub date: String,
    pub total_projects: usize,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl HistoryRecord {
    /// Build the week record for `date`, copying the projects as they are now.
    pub fn for_snapshot(date: NaiveDate, projects: &[Project]) -> Self {
        let iso = date.iso_week();
        Self {
            id: week_id(date),
            label: format!("Week {}, {}", iso.week(), iso.year()),
            date: date.format("%Y-%m-%d").to_string(),
            total_projects: projects.len(),
            projects: projects.to_vec(),
        }
    }
}

/// `{iso_year}-W{iso_week}`. The ISO week-based year keeps late-December
/// dates that fall in week 1 from colliding with the January week 1.
pub fn week_id(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{}", iso.year(), iso.week())
}
