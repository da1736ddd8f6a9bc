// file: src/pipeline/ranking.rs
// description: dedupe, star ranking and top-k selection
// reference: https://doc.rust-lang.org/std/primitive.slice.html#method.sort_by

use crate::models::Project;
use std::collections::HashSet;

/// Keep the first occurrence of each `full_name`, preserving order.
pub fn dedupe(projects: Vec<Project>) -> Vec<Project> {
    let mut seen = HashSet::with_capacity(projects.len());
    projects
        .into_iter()
        .filter(|p| seen.insert(p.full_name.clone()))
        .collect()
}

/// Stable sort by stars, highest first.
pub fn rank(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| b.stars.cmp(&a.stars));
    projects
}

pub fn truncate(mut projects: Vec<Project>, top_k: usize) -> Vec<Project> {
    projects.truncate(top_k);
    projects
}
