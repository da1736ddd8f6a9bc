// file: src/enhancer/prompt.rs
// description: enhancement prompt construction and completion parsing
// reference: https://docs.rs/regex

use crate::error::{PipelineError, Result};
use crate::models::{Category, Project};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

pub const SYSTEM_PROMPT: &str =
    "You are an open-source project analyst. Reply with a single JSON object only.";

pub const PROBE_PROMPT: &str = "Reply with the word OK.";

lazy_static! {
    // greedy: first '{' through last '}'
    static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").expect("JSON_OBJECT regex is valid");
}

#[derive(Debug, Deserialize)]
struct EnhancementPayload {
    #[serde(default)]
    enhanced_description: Option<String>,
    #[serde(default)]
    usage_steps: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
}

/// Fields a completion may replace on a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    pub description: String,
    pub usage_steps: Vec<String>,
    pub category: Option<Category>,
}

impl Enhancement {
    /// Apply onto `project`; identity, metrics and trend are left alone.
    pub fn apply(self, mut project: Project) -> Project {
        project.description = self.description;
        project.usage_steps = self.usage_steps;
        if let Some(category) = self.category {
            project.category = category;
        }
        project
    }
}

pub fn build_prompt(project: &Project) -> String {
    format!(
        "Analyze the following GitHub project and write a richer description and a short usage guide.\n\
         \n\
         Project: {}\n\
         Description: {}\n\
         Language: {}\n\
         Stars: {}\n\
         Forks: {}\n\
         \n\
         Return JSON in exactly this shape:\n\
         {{\n  \"enhanced_description\": \"a detailed description of 100-200 words\",\n  \
         \"usage_steps\": [\"step 1\", \"step 2\", \"step 3\"],\n  \
         \"category\": \"one of: {}\"\n}}\n",
        project.full_name,
        project.description,
        project.language,
        project.stars,
        project.forks,
        Category::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

pub fn extract_json(content: &str) -> Option<&str> {
    JSON_OBJECT.find(content).map(|m| m.as_str())
}

/// Decode a completion body; any missing or empty field is a failure.
pub fn parse_completion(content: &str) -> Result<Enhancement> {
    let json = extract_json(content).ok_or_else(|| {
        PipelineError::AugmentationFailure("no JSON object in completion".to_string())
    })?;

    let payload: EnhancementPayload = serde_json::from_str(json)
        .map_err(|e| PipelineError::AugmentationFailure(format!("invalid JSON: {}", e)))?;

    let description = payload
        .enhanced_description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            PipelineError::AugmentationFailure("missing enhanced_description".to_string())
        })?;

    let usage_steps: Vec<String> = payload
        .usage_steps
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if usage_steps.is_empty() {
        return Err(PipelineError::AugmentationFailure(
            "missing usage_steps".to_string(),
        ));
    }

    let category = match payload.category.as_deref() {
        Some(label) => match label.parse::<Category>() {
            Ok(category) => Some(category),
            Err(e) => {
                debug!("Keeping classifier category: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(Enhancement {
        description,
        usage_steps,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_project;

    #[test]
    fn test_prompt_mentions_project_fields() {
        let project = sample_project("acme/widget", 4321);
        let prompt = build_prompt(&project);
        assert!(prompt.contains("acme/widget"));
        assert!(prompt.contains("4321"));
        assert!(prompt.contains("enhanced_description"));
        assert!(prompt.contains("General Tools"));
    }

    #[test]
    fn test_extract_outermost_object() {
        let content = "Here you go: {\"a\": {\"b\": 1}} hope it helps";
        assert_eq!(extract_json(content), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json("no braces here"), None);
    }

    #[test]
    fn test_parse_completion_with_prose() {
        let content = "```json\n{\"enhanced_description\": \"A fast widget\", \
                       \"usage_steps\": [\"install\", \"run\"], \"category\": \"devops\"}\n```";
        let enhancement = parse_completion(content).unwrap();
        assert_eq!(enhancement.description, "A fast widget");
        assert_eq!(enhancement.usage_steps, vec!["install", "run"]);
        assert_eq!(enhancement.category, Some(Category::DevOps));
    }

    #[test]
    fn test_unknown_category_is_dropped() {
        let content = r#"{"enhanced_description": "x", "usage_steps": ["y"], "category": "Gardening"}"#;
        assert_eq!(parse_completion(content).unwrap().category, None);
    }

    #[test]
    fn test_missing_fields_fail() {
        for content in [
            r#"{"usage_steps": ["y"]}"#,
            r#"{"enhanced_description": "  ", "usage_steps": ["y"]}"#,
            r#"{"enhanced_description": "x", "usage_steps": []}"#,
            r#"{"enhanced_description": "x"}"#,
            "{not json}",
            "plain text",
        ] {
            assert!(
                matches!(
                    parse_completion(content),
                    Err(PipelineError::AugmentationFailure(_))
                ),
                "{}",
                content
            );
        }
    }

    #[test]
    fn test_apply_keeps_metrics() {
        let project = sample_project("acme/widget", 10);
        let enhanced = Enhancement {
            description: "new".to_string(),
            usage_steps: vec!["go".to_string()],
            category: None,
        }
        .apply(project.clone());

        assert_eq!(enhanced.description, "new");
        assert_eq!(enhanced.category, project.category);
        assert_eq!(enhanced.stars, project.stars);
        assert_eq!(enhanced.full_name, project.full_name);
        assert_eq!(enhanced.trend, project.trend);
    }
}
