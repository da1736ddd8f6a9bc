// file: src/classifier/rules.rs
// description: ordered category decision table for repository records
// reference: first-match keyword rules

use crate::models::{Category, RawRepository};

/// Lowercased view of the fields the rule table inspects.
pub struct RecordSignals<'a> {
    topics: &'a [String],
    description: String,
    name: String,
    language: &'a str,
}

impl<'a> RecordSignals<'a> {
    pub fn from_record(record: &'a RawRepository) -> Self {
        Self {
            topics: record.topics(),
            description: record.description.as_deref().unwrap_or("").to_lowercase(),
            name: record.name.as_deref().unwrap_or("").to_lowercase(),
            language: record.language.as_deref().unwrap_or(""),
        }
    }
}

pub enum Predicate {
    /// Exact topic match or substring of the description (and optionally the name).
    Keywords {
        keywords: &'static [&'static str],
        search_name: bool,
    },
    Language(&'static [&'static str]),
    Always,
}

impl Predicate {
    pub fn matches(&self, signals: &RecordSignals<'_>) -> bool {
        match self {
            Predicate::Keywords {
                keywords,
                search_name,
            } => keywords.iter().any(|kw| {
                signals.topics.iter().any(|t| t == kw)
                    || signals.description.contains(kw)
                    || (*search_name && signals.name.contains(kw))
            }),
            Predicate::Language(languages) => languages.iter().any(|l| *l == signals.language),
            Predicate::Always => true,
        }
    }
}

pub struct CategoryRule {
    pub predicate: Predicate,
    pub label: Category,
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        predicate: Predicate::Keywords {
            keywords: &["ai", "ml", "deep-learning", "neural", "llm", "gpt", "transformer"],
            search_name: false,
        },
        label: Category::AiMl,
    },
    CategoryRule {
        predicate: Predicate::Keywords {
            keywords: &[
                "data-science",
                "data-analysis",
                "analytics",
                "statistics",
                "pandas",
            ],
            search_name: true,
        },
        label: Category::DataAnalysis,
    },
    CategoryRule {
        predicate: Predicate::Keywords {
            keywords: &["web", "frontend", "backend", "http", "api", "server"],
            search_name: false,
        },
        label: Category::WebDevelopment,
    },
    CategoryRule {
        predicate: Predicate::Keywords {
            keywords: &["mobile", "android", "ios", "app"],
            search_name: false,
        },
        label: Category::MobileDevelopment,
    },
    CategoryRule {
        predicate: Predicate::Keywords {
            keywords: &["devops", "docker", "kubernetes", "ci-cd", "deployment"],
            search_name: false,
        },
        label: Category::DevOps,
    },
    CategoryRule {
        predicate: Predicate::Language(&["Python"]),
        label: Category::PythonEcosystem,
    },
    CategoryRule {
        predicate: Predicate::Language(&["Java"]),
        label: Category::JavaEcosystem,
    },
    CategoryRule {
        predicate: Predicate::Language(&["JavaScript", "TypeScript"]),
        label: Category::Frontend,
    },
    CategoryRule {
        predicate: Predicate::Language(&["Go"]),
        label: Category::GoEcosystem,
    },
    CategoryRule {
        predicate: Predicate::Always,
        label: Category::GeneralTools,
    },
];

/// Walk the rule table and return the first matching label.
pub fn categorize(record: &RawRepository) -> Category {
    let signals = RecordSignals::from_record(record);

    CATEGORY_RULES
        .iter()
        .find(|rule| rule.predicate.matches(&signals))
        .map(|rule| rule.label)
        .unwrap_or(Category::GeneralTools)
}
