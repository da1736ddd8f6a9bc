// file: src/classifier/mod.rs
// description: turns raw repository records into classified projects
// reference: internal module structure

pub mod rules;
pub mod trend;
pub mod usage;

pub use rules::{CATEGORY_RULES, CategoryRule, Predicate, categorize};
pub use trend::{VelocityIndex, trend};
pub use usage::usage_steps;

use crate::error::{PipelineError, Result};
use crate::models::{Project, RawRepository};

pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_LANGUAGE: &str = "Other";

pub struct ProjectClassifier {
    velocity: VelocityIndex,
}

impl ProjectClassifier {
    pub fn new(velocity: VelocityIndex) -> Self {
        Self { velocity }
    }

    pub fn classify(&self, raw: &RawRepository) -> Result<Project> {
        let full_name = raw.full_name.trim();
        if full_name.is_empty() || !full_name.contains('/') {
            return Err(PipelineError::MalformedUpstreamItem(format!(
                "invalid full_name {:?}",
                raw.full_name
            )));
        }

        let url = raw
            .html_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://github.com/{}", full_name));
        let language = raw
            .language
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let description = raw
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        Ok(Project {
            name: raw.short_name().to_string(),
            full_name: full_name.to_string(),
            fork_url: format!("{}/fork", url),
            issues_url: format!("{}/issues", url),
            url,
            description,
            stars: raw.stargazers_count,
            forks: raw.forks_count,
            issues: raw.open_issues_count,
            category: categorize(raw),
            trend: trend(self.velocity.velocity_for(raw)),
            usage_steps: usage_steps(full_name, &language),
            language,
        })
    }
}

impl Default for ProjectClassifier {
    fn default() -> Self {
        Self::new(VelocityIndex::new())
    }
}
