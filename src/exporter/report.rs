// file: src/exporter/report.rs
// description: markdown weekly report export
// reference: https://docs.rs/tokio/latest/tokio/fs/index.html

use crate::error::{PipelineError, Result};
use crate::models::{Snapshot, week_id};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn file_name(date: NaiveDate) -> String {
        format!("github-weekly-report-{}.md", date.format("%Y-%m-%d"))
    }

    pub fn render_weekly(snapshot: &Snapshot, date: NaiveDate) -> String {
        let mut content = String::new();

        let _ = writeln!(content, "# GitHub Weekly Trending Report");
        let _ = writeln!(content);
        let _ = writeln!(
            content,
            "Generated {} ({}), snapshot taken {}",
            date.format("%Y-%m-%d"),
            week_id(date),
            snapshot.timestamp.format("%Y-%m-%d %H:%M UTC")
        );
        let _ = writeln!(content);
        let _ = writeln!(content, "## Top {} projects", snapshot.projects.len());
        let _ = writeln!(content);

        for (idx, project) in snapshot.projects.iter().enumerate() {
            let _ = writeln!(content, "### {}. [{}]({})", idx + 1, project.name, project.url);
            let _ = writeln!(content);
            let _ = writeln!(content, "- **Description**: {}", project.description);
            let _ = writeln!(content, "- **Language**: {}", project.language);
            let _ = writeln!(content, "- **Stars**: {}", project.stars);
            let _ = writeln!(content, "- **Repository**: [{}]({})", project.url, project.url);
            let _ = writeln!(content, "- **Usage steps**:");
            for step in &project.usage_steps {
                let _ = writeln!(content, "  - {}", step);
            }
            let _ = writeln!(content);
        }

        let _ = writeln!(content, "---");
        content
    }

    /// Write the report for `date` and return its path.
    pub async fn export_weekly(&self, snapshot: &Snapshot, date: NaiveDate) -> Result<PathBuf> {
        info!("Exporting weekly report to {:?}", self.output_dir);

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(Self::file_name(date));
        fs::write(&path, Self::render_weekly(snapshot, date))
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: path.clone(),
                source,
            })?;

        info!(
            "Export complete: {} projects written to {}",
            snapshot.projects.len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_project;
    use tempfile::tempdir;

    #[test]
    fn test_render_numbers_sections() {
        let snapshot = Snapshot::new(vec![
            sample_project("acme/widget", 10),
            sample_project("acme/gadget", 5),
        ]);
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let report = ReportExporter::render_weekly(&snapshot, date);

        assert!(report.contains("### 1. [widget](https://github.com/acme/widget)"));
        assert!(report.contains("### 2. [gadget](https://github.com/acme/gadget)"));
        assert!(report.contains("- **Stars**: 10"));
        assert!(report.contains("2025-W2"));
    }

    #[tokio::test]
    async fn test_export_writes_dated_file() {
        let dir = tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path().join("reports"));
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();

        let path = exporter
            .export_weekly(&Snapshot::new(vec![sample_project("acme/widget", 1)]), date)
            .await
            .unwrap();

        assert!(path.ends_with("github-weekly-report-2025-03-07.md"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("acme/widget"));
    }
}
