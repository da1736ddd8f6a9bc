// file: src/pipeline/orchestrator.rs
// description: coordinates fetching, ranking, enhancement and persistence
// reference: orchestrates one asynchronous refresh run

use crate::classifier::{ProjectClassifier, VelocityIndex};
use crate::config::Config;
use crate::enhancer::Enhancer;
use crate::error::Result;
use crate::github::GithubClient;
use crate::models::{HistoryRecord, Project};
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::ranking::{dedupe, rank, truncate};
use crate::storage::{HistoryLedger, SnapshotStore};
use crate::utils::OperationTimer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub days: Option<u32>,
    pub per_page: Option<u32>,
    pub top_k: Option<usize>,
    /// `false` skips enhancement even when it is configured.
    pub enhance: bool,
    pub show_progress: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            days: None,
            per_page: None,
            top_k: None,
            enhance: true,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshStats {
    pub queries_issued: usize,
    pub queries_failed: usize,
    pub rate_limited: bool,
    pub items_fetched: usize,
    pub items_skipped: usize,
    pub duplicates_removed: usize,
    pub projects_enhanced: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    pub message: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub projects_count: usize,
    pub stats: RefreshStats,
}

pub struct RefreshPipeline {
    config: Config,
    github: GithubClient,
    enhancer: Option<Enhancer>,
    snapshots: SnapshotStore,
    history: HistoryLedger,
    in_flight: Mutex<()>,
}

impl RefreshPipeline {
    pub fn new(config: Config) -> Result<Self> {
        let github = GithubClient::new(config.github.clone())?;

        let enhancer = if config.ai.is_usable() {
            match Enhancer::from_config(&config.ai) {
                Ok(enhancer) => Some(enhancer),
                Err(e) => {
                    warn!("Enhancement disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let snapshots = SnapshotStore::new(config.projects_path());
        let history =
            HistoryLedger::with_retention(config.history_path(), config.storage.history_retention);

        Ok(Self {
            config,
            github,
            enhancer,
            snapshots,
            history,
            in_flight: Mutex::new(()),
        })
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn enhancement_enabled(&self) -> bool {
        self.enhancer.is_some()
    }

    /// One full refresh. Always completes; persistence failures show up as
    /// `success == false` rather than an error.
    pub async fn run(&self, options: RefreshOptions) -> RefreshOutcome {
        let _guard = self.in_flight.lock().await;
        let timer = OperationTimer::new("refresh");

        let days = options.days.unwrap_or(self.config.github.lookback_days);
        let per_page = options.per_page.unwrap_or(self.config.github.per_page);
        let top_k = options.top_k.unwrap_or(self.config.pipeline.top_k).max(1);

        let velocity = if self.config.pipeline.derive_velocity {
            VelocityIndex::from_snapshot(&self.snapshots.load().await)
        } else {
            VelocityIndex::new()
        };
        let classifier = ProjectClassifier::new(velocity);

        let fetched = self.github.fetch_trending(&classifier, days, per_page).await;
        timer.checkpoint("fetch complete");

        let mut stats = RefreshStats {
            queries_issued: fetched.report.queries_issued,
            queries_failed: fetched.report.queries_failed,
            rate_limited: fetched.report.rate_limited,
            items_fetched: fetched.report.items_received,
            items_skipped: fetched.report.items_skipped,
            ..RefreshStats::default()
        };

        let fetched_count = fetched.projects.len();
        let unique = dedupe(fetched.projects);
        stats.duplicates_removed = fetched_count - unique.len();
        let mut projects = truncate(rank(unique), top_k);

        if options.enhance
            && let Some(enhancer) = &self.enhancer
            && !projects.is_empty()
        {
            let tracker = if options.show_progress {
                ProgressTracker::new(projects.len())
            } else {
                ProgressTracker::hidden(projects.len())
            };
            projects = enhancer.enhance_all(projects, &tracker).await;
            tracker.finish();
            let enhancement = tracker.get_stats();
            info!(
                "Enhanced {}/{} projects ({:.1}%)",
                enhancement.enhanced,
                enhancement.total(),
                enhancement.success_rate()
            );
            stats.projects_enhanced = enhancement.enhanced;
        }

        let projects_count = projects.len();
        let mut outcome = match self.persist(projects).await {
            Ok(last_updated) => {
                let mut message = format!("Fetched {} projects", projects_count);
                if stats.rate_limited {
                    message.push_str(" (stopped early by rate limit)");
                }
                RefreshOutcome {
                    success: true,
                    message,
                    last_updated: Some(last_updated),
                    projects_count,
                    stats,
                }
            }
            Err(e) => {
                error!("Failed to persist refresh results: {}", e);
                RefreshOutcome {
                    success: false,
                    message: format!("Failed to save projects: {}", e),
                    last_updated: self.snapshots.last_updated().await,
                    projects_count,
                    stats,
                }
            }
        };

        outcome.stats.duration_ms = timer.finish_with_count(projects_count).as_millis() as u64;
        outcome
    }

    async fn persist(&self, projects: Vec<Project>) -> Result<DateTime<Utc>> {
        let snapshot = self.snapshots.save(projects).await?;

        let record = HistoryRecord::for_snapshot(snapshot.timestamp.date_naive(), &snapshot.projects);
        self.history.upsert(record).await?;

        info!(
            "Refresh stored {} projects at {}",
            snapshot.count,
            snapshot.timestamp.to_rfc3339()
        );
        Ok(snapshot.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Snapshot, Trend, week_id};
    use crate::storage::atomic::write_json_atomic;
    use chrono::TimeDelta;
    use crate::test_support::spawn_server;
    use axum::Router;
    use axum::extract::State;
    use axum::routing::{get, post};
    use serde_json::{Value, json};
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::tempdir;

    fn item(full_name: &str, stars: u64) -> Value {
        json!({
            "full_name": full_name,
            "html_url": format!("https://github.com/{}", full_name),
            "description": "command line tooling",
            "language": "Go",
            "stargazers_count": stars,
            "forks_count": 2,
            "open_issues_count": 1,
            "topics": []
        })
    }

    /// Two queries; the second repeats one repository. `bump` is added to
    /// the stars of `acme/fast`.
    async fn github_mock(bump: Arc<AtomicU64>) -> String {
        let app = Router::new()
            .route(
                "/search/repositories",
                get(|State(bump): State<Arc<AtomicU64>>| async move {
                    let extra = bump.load(Ordering::SeqCst);
                    axum::Json(json!({
                        "items": [
                            item("acme/slow", 300),
                            item("acme/fast", 200 + extra),
                            item("acme/mid", 250),
                        ]
                    }))
                }),
            )
            .with_state(bump);
        spawn_server(app).await
    }

    async fn age_snapshot(pipeline: &RefreshPipeline, by: TimeDelta) {
        let current = pipeline.snapshots().load().await;
        let aged = Snapshot::at(current.timestamp - by, current.projects);
        write_json_atomic(pipeline.snapshots().path(), &aged).await.unwrap();
    }

    fn test_config(data_dir: &Path, api_base: String) -> Config {
        let mut config = Config::default_config();
        config.storage.data_dir = data_dir.to_path_buf();
        config.github.api_base = api_base;
        config.github.inter_query_delay_ms = 0;
        config.github.timeout_secs = 5;
        config.github.queries = vec![
            "created:>{since} sort:stars".to_string(),
            "topic:cli created:>{since}".to_string(),
        ];
        config
    }

    #[tokio::test]
    async fn test_refresh_ranks_dedupes_and_persists() {
        let dir = tempdir().unwrap();
        let base = github_mock(Arc::new(AtomicU64::new(0))).await;
        let pipeline = RefreshPipeline::new(test_config(dir.path(), base)).unwrap();
        assert!(!pipeline.enhancement_enabled());

        let outcome = pipeline.run(RefreshOptions::default()).await;

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.projects_count, 3);
        assert_eq!(outcome.stats.queries_issued, 2);
        assert_eq!(outcome.stats.items_fetched, 6);
        assert_eq!(outcome.stats.duplicates_removed, 3);

        let snapshot = pipeline.snapshots().load().await;
        let names: Vec<_> = snapshot.projects.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, vec!["acme/slow", "acme/mid", "acme/fast"]);
        assert_eq!(Some(snapshot.timestamp), outcome.last_updated);

        let history = pipeline.history().list().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, week_id(snapshot.timestamp.date_naive()));
        assert_eq!(history[0].total_projects, 3);
    }

    #[tokio::test]
    async fn test_second_refresh_derives_velocity() {
        let dir = tempdir().unwrap();
        let bump = Arc::new(AtomicU64::new(0));
        let base = github_mock(bump.clone()).await;
        let pipeline = RefreshPipeline::new(test_config(dir.path(), base)).unwrap();

        pipeline.run(RefreshOptions::default()).await;
        age_snapshot(&pipeline, TimeDelta::days(7)).await;
        bump.store(5000, Ordering::SeqCst);
        let outcome = pipeline.run(RefreshOptions::default()).await;
        assert!(outcome.success);

        let snapshot = pipeline.snapshots().load().await;
        assert_eq!(snapshot.find("acme/fast").unwrap().trend, Trend::Rising);
        assert_eq!(snapshot.find("acme/slow").unwrap().trend, Trend::Falling);
        assert_eq!(pipeline.history().list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_refresh_keeps_trends_stable() {
        let dir = tempdir().unwrap();
        let bump = Arc::new(AtomicU64::new(0));
        let base = github_mock(bump.clone()).await;
        let pipeline = RefreshPipeline::new(test_config(dir.path(), base)).unwrap();

        pipeline.run(RefreshOptions::default()).await;
        bump.store(5000, Ordering::SeqCst);
        pipeline.run(RefreshOptions::default()).await;

        let snapshot = pipeline.snapshots().load().await;
        assert!(snapshot.projects.iter().all(|p| p.trend == Trend::Stable));
    }

    #[tokio::test]
    async fn test_top_k_option_truncates() {
        let dir = tempdir().unwrap();
        let base = github_mock(Arc::new(AtomicU64::new(0))).await;
        let pipeline = RefreshPipeline::new(test_config(dir.path(), base)).unwrap();

        let outcome = pipeline
            .run(RefreshOptions {
                top_k: Some(1),
                ..RefreshOptions::default()
            })
            .await;

        assert_eq!(outcome.projects_count, 1);
        assert_eq!(pipeline.snapshots().projects().await[0].full_name, "acme/slow");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_still_completes() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path(), "http://127.0.0.1:1".to_string());
        config.github.timeout_secs = 2;
        let pipeline = RefreshPipeline::new(config).unwrap();

        let outcome = pipeline.run(RefreshOptions::default()).await;
        assert!(outcome.success);
        assert_eq!(outcome.projects_count, 0);
        assert_eq!(outcome.stats.queries_failed, 2);
    }

    #[tokio::test]
    async fn test_persistence_failure_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let base = github_mock(Arc::new(AtomicU64::new(0))).await;
        let pipeline = RefreshPipeline::new(test_config(&blocker, base)).unwrap();

        let outcome = pipeline.run(RefreshOptions::default()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.projects_count, 3);
        assert!(outcome.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_refresh_with_enhancement() {
        let dir = tempdir().unwrap();
        let github = github_mock(Arc::new(AtomicU64::new(0))).await;
        let ai = spawn_server(Router::new().route(
            "/chat/completions",
            post(|| async {
                axum::Json(json!({"choices": [{"message": {"content":
                    "{\"enhanced_description\": \"Richer text\", \"usage_steps\": [\"go run .\"], \"category\": \"DevOps\"}"
                }}]}))
            }),
        ))
        .await;

        let mut config = test_config(dir.path(), github);
        config.ai.enabled = true;
        config.ai.api_key = Some("sk-test".to_string());
        config.ai.endpoint = Some(ai);
        config.ai.timeout_secs = 5;
        let pipeline = RefreshPipeline::new(config).unwrap();
        assert!(pipeline.enhancement_enabled());

        let outcome = pipeline.run(RefreshOptions::default()).await;
        assert_eq!(outcome.stats.projects_enhanced, 3);
        let project = pipeline.snapshots().find("acme/mid").await.unwrap();
        assert_eq!(project.description, "Richer text");
        assert_eq!(project.stars, 250);

        let skipped = pipeline
            .run(RefreshOptions {
                enhance: false,
                ..RefreshOptions::default()
            })
            .await;
        assert_eq!(skipped.stats.projects_enhanced, 0);
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_serialized() {
        let dir = tempdir().unwrap();
        let base = github_mock(Arc::new(AtomicU64::new(0))).await;
        let pipeline = RefreshPipeline::new(test_config(dir.path(), base)).unwrap();

        let (a, b) = tokio::join!(
            pipeline.run(RefreshOptions::default()),
            pipeline.run(RefreshOptions::default())
        );
        assert!(a.success && b.success);
        assert_eq!(pipeline.history().list().await.len(), 1);
        assert_eq!(pipeline.snapshots().load().await.count, 3);
    }
}
