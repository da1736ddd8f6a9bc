// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use lazy_static::lazy_static;
use regex::Regex;

pub const MAX_PER_PAGE: u32 = 50;

lazy_static! {
    static ref WEEK_ID: Regex =
        Regex::new(r"^\d{4}-W([1-9]|[1-4][0-9]|5[0-3])$").expect("WEEK_ID regex is valid");
    static ref FULL_NAME: Regex =
        Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("FULL_NAME regex is valid");
}

pub struct Validator;

impl Validator {
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_per_page(per_page: u32) -> Result<()> {
        if per_page == 0 {
            return Err(PipelineError::Validation(
                "per_page must be greater than 0".to_string(),
            ));
        }

        if per_page > MAX_PER_PAGE {
            return Err(PipelineError::Validation(format!(
                "per_page too large (max {})",
                MAX_PER_PAGE
            )));
        }

        Ok(())
    }

    pub fn validate_week_id(id: &str) -> Result<()> {
        if !WEEK_ID.is_match(id) {
            return Err(PipelineError::Validation(format!(
                "Invalid week id (expected YYYY-W<week>): {}",
                id
            )));
        }
        Ok(())
    }

    pub fn validate_full_name(full_name: &str) -> Result<()> {
        if !FULL_NAME.is_match(full_name) {
            return Err(PipelineError::Validation(format!(
                "Invalid repository name (expected owner/repo): {}",
                full_name
            )));
        }
        Ok(())
    }

    /// Cut `text` to at most `max_chars` characters, appending an ellipsis when cut.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            None => text.to_string(),
            Some((idx, _)) => format!("{}...", &text[..idx]),
        }
    }
}
