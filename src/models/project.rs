// file: src/models/project.rs
// description: ranked project record with category and trend labels
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI/ML")]
    AiMl,
    #[serde(rename = "Data Analysis")]
    DataAnalysis,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "DevOps")]
    DevOps,
    #[serde(rename = "Python Ecosystem")]
    PythonEcosystem,
    #[serde(rename = "Java Ecosystem")]
    JavaEcosystem,
    #[serde(rename = "Frontend")]
    Frontend,
    #[serde(rename = "Go Ecosystem")]
    GoEcosystem,
    #[serde(rename = "General Tools")]
    GeneralTools,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::AiMl,
        Category::DataAnalysis,
        Category::WebDevelopment,
        Category::MobileDevelopment,
        Category::DevOps,
        Category::PythonEcosystem,
        Category::JavaEcosystem,
        Category::Frontend,
        Category::GoEcosystem,
        Category::GeneralTools,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::AiMl => "AI/ML",
            Category::DataAnalysis => "Data Analysis",
            Category::WebDevelopment => "Web Development",
            Category::MobileDevelopment => "Mobile Development",
            Category::DevOps => "DevOps",
            Category::PythonEcosystem => "Python Ecosystem",
            Category::JavaEcosystem => "Java Ecosystem",
            Category::Frontend => "Frontend",
            Category::GoEcosystem => "Go Ecosystem",
            Category::GeneralTools => "General Tools",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category label: {}", wanted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    #[default]
    Stable,
    Falling,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Rising => "rising",
            Trend::Stable => "stable",
            Trend::Falling => "falling",
        };
        f.write_str(s)
    }
}

/// A classified repository as it appears in a snapshot.
///
/// Only the enhancer may change `description`, `category` and `usage_steps`
/// after construction; identity and metrics stay as fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub fork_url: String,
    pub issues_url: String,
    pub description: String,
    pub language: String,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    pub category: Category,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub usage_steps: Vec<String>,
}

impl Project {
    /// True when `key` names this project either by short or full name.
    pub fn matches_name(&self, key: &str) -> bool {
        self.name == key || self.full_name == key
    }
}
