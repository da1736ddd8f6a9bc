// file: src/github/client.rs
// description: rate-limit aware repository search and readme retrieval
// reference: https://docs.github.com/en/rest/search/search

use crate::classifier::ProjectClassifier;
use crate::config::GithubConfig;
use crate::error::{PipelineError, Result};
use crate::github::parser::{parse_item, parse_search_response};
use crate::models::Project;
use crate::utils::validation::MAX_PER_PAGE;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{Days, NaiveDate, Utc};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    pub queries_issued: usize,
    pub queries_failed: usize,
    pub rate_limited: bool,
    pub items_received: usize,
    pub items_skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub projects: Vec<Project>,
    pub report: FetchReport,
}

#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    fn token(&self) -> Option<&str> {
        self.config.token.as_deref().filter(|t| !t.is_empty())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Expand the configured query templates for a lookback window ending at `today`.
    pub fn build_queries(&self, days: u32, today: NaiveDate) -> Vec<String> {
        let since = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string();

        self.config
            .queries
            .iter()
            .map(|template| template.replace("{since}", &since))
            .collect()
    }

    /// Run every configured query in order and collect the parsed projects.
    ///
    /// Never fails: a rate-limit response stops further queries, any other
    /// failure is logged and the next query runs.
    pub async fn fetch_trending(
        &self,
        classifier: &ProjectClassifier,
        days: u32,
        per_page: u32,
    ) -> FetchResult {
        let queries = self.build_queries(days, Utc::now().date_naive());
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let delay = self.config.inter_query_delay();

        if !self.has_token() {
            info!("No GitHub token configured, using unauthenticated rate limit");
        }

        let mut result = FetchResult::default();

        for (idx, query) in queries.iter().enumerate() {
            if idx > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            result.report.queries_issued += 1;

            match self.search(query, per_page).await {
                Ok(items) => {
                    result.report.items_received += items.len();
                    for item in &items {
                        match parse_item(item, classifier) {
                            Ok(project) => result.projects.push(project),
                            Err(e) => {
                                result.report.items_skipped += 1;
                                debug!("Skipping search item: {}", e);
                            }
                        }
                    }
                    debug!("Query {:?} returned {} items", query, items.len());
                }
                Err(PipelineError::RateLimited { status }) => {
                    warn!(
                        "GitHub rate limit hit (status {}), stopping after {} queries",
                        status, result.report.queries_issued
                    );
                    result.report.rate_limited = true;
                    break;
                }
                Err(e) => {
                    result.report.queries_failed += 1;
                    warn!("Query {:?} failed: {}", query, e);
                }
            }
        }

        info!(
            "Fetched {} projects from {} queries ({} failed, {} items skipped)",
            result.projects.len(),
            result.report.queries_issued,
            result.report.queries_failed,
            result.report.items_skipped
        );

        result
    }

    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<serde_json::Value>> {
        let mut request = self
            .client
            .get(self.endpoint("search/repositories"))
            .query(&[("q", query.to_string()), ("per_page", per_page.to_string())])
            .header(ACCEPT, GITHUB_ACCEPT);

        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimited {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(PipelineError::NetworkFailure(format!(
                "search returned status {}",
                status
            )));
        }

        let body = response.text().await?;
        Ok(parse_search_response(&body)?.items)
    }

    /// README text for `full_name`; `None` when absent or on any failure.
    pub async fn fetch_readme(&self, full_name: &str) -> Option<String> {
        match self.try_fetch_readme(full_name).await {
            Ok(readme) => readme,
            Err(e) => {
                warn!("Failed to fetch README for {}: {}", full_name, e);
                None
            }
        }
    }

    async fn try_fetch_readme(&self, full_name: &str) -> Result<Option<String>> {
        let mut request = self
            .client
            .get(self.endpoint(&format!("repos/{}/readme", full_name)))
            .header(ACCEPT, GITHUB_ACCEPT);

        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("{} has no README", full_name);
            return Ok(None);
        }

        if !status.is_success() {
            return Err(PipelineError::NetworkFailure(format!(
                "readme returned status {}",
                status
            )));
        }

        let readme: ReadmeResponse = response.json().await?;
        decode_readme(readme).map(Some)
    }
}

fn decode_readme(readme: ReadmeResponse) -> Result<String> {
    match readme.encoding.as_deref() {
        None | Some("base64") => {
            let cleaned: String = readme
                .content
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let bytes = STANDARD.decode(cleaned).map_err(|e| {
                PipelineError::MalformedUpstreamItem(format!("readme content: {}", e))
            })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some(_) => Ok(readme.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::Router;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_config(api_base: String) -> GithubConfig {
        GithubConfig {
            api_base,
            inter_query_delay_ms: 0,
            timeout_secs: 5,
            ..GithubConfig::default()
        }
    }

    fn item(full_name: &str, stars: u64) -> Value {
        json!({
            "full_name": full_name,
            "html_url": format!("https://github.com/{}", full_name),
            "description": "tooling",
            "language": "Rust",
            "stargazers_count": stars,
            "forks_count": 1,
            "open_issues_count": 0,
            "topics": []
        })
    }

    #[test]
    fn test_build_queries_substitutes_since() {
        let client = GithubClient::new(GithubConfig::default()).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let queries = client.build_queries(7, today);
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[0], "created:>2025-03-03 sort:stars");
        assert!(queries.iter().all(|q| !q.contains("{since}")));
    }

    #[tokio::test]
    async fn test_fetch_skips_malformed_items() {
        let app = Router::new().route(
            "/search/repositories",
            get(|| async {
                (
                    AxumStatus::OK,
                    axum::Json(json!({
                        "total_count": 3,
                        "items": [item("acme/widget", 10), {"full_name": 42}, "junk"]
                    })),
                )
            }),
        );
        let base = spawn_server(app).await;

        let mut config = test_config(base);
        config.queries = vec!["created:>{since}".to_string()];
        let client = GithubClient::new(config).unwrap();

        let result = client
            .fetch_trending(&ProjectClassifier::default(), 7, 10)
            .await;
        assert_eq!(result.projects.len(), 1);
        assert_eq!(result.report.items_received, 3);
        assert_eq!(result.report.items_skipped, 2);
        assert!(!result.report.rate_limited);
    }

    #[tokio::test]
    async fn test_rate_limit_stops_further_queries() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/search/repositories",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        let q = params.get("q").cloned().unwrap_or_default();
                        (AxumStatus::OK, axum::Json(json!({"items": [item(&format!("acme/{}", q.len()), 5)]})))
                    } else {
                        (AxumStatus::FORBIDDEN, axum::Json(json!({"message": "API rate limit exceeded"})))
                    }
                }
            }),
        );
        let base = spawn_server(app).await;
        let client = GithubClient::new(test_config(base)).unwrap();

        let result = client
            .fetch_trending(&ProjectClassifier::default(), 7, 10)
            .await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(result.projects.len(), 1);
        assert!(result.report.rate_limited);
        assert_eq!(result.report.queries_issued, 2);
    }

    #[tokio::test]
    async fn test_delay_only_between_queries() {
        let arrivals = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = arrivals.clone();
        let app = Router::new().route(
            "/search/repositories",
            get(move || {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(std::time::Instant::now());
                    axum::Json(json!({"items": []}))
                }
            }),
        );
        let base = spawn_server(app).await;

        let delay = std::time::Duration::from_millis(200);
        let mut config = test_config(base);
        config.inter_query_delay_ms = 200;
        config.queries = vec![
            "created:>{since}".to_string(),
            "pushed:>{since}".to_string(),
            "stars:>100 pushed:>{since}".to_string(),
        ];
        let client = GithubClient::new(config).unwrap();

        let started = std::time::Instant::now();
        let result = client
            .fetch_trending(&ProjectClassifier::default(), 7, 10)
            .await;
        assert_eq!(result.report.queries_issued, 3);

        let arrivals = arrivals.lock().unwrap().clone();
        assert_eq!(arrivals.len(), 3);
        assert!(arrivals[0].duration_since(started) < delay);
        for pair in arrivals.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= delay);
        }
    }

    #[tokio::test]
    async fn test_single_query_is_not_delayed() {
        let app = Router::new().route(
            "/search/repositories",
            get(|| async { axum::Json(json!({"items": [item("acme/widget", 3)]})) }),
        );
        let base = spawn_server(app).await;

        let mut config = test_config(base);
        config.inter_query_delay_ms = 500;
        config.queries = vec!["created:>{since}".to_string()];
        let client = GithubClient::new(config).unwrap();

        let started = std::time::Instant::now();
        let result = client
            .fetch_trending(&ProjectClassifier::default(), 7, 10)
            .await;

        assert_eq!(result.projects.len(), 1);
        assert!(started.elapsed() < std::time::Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_server_error_continues_to_next_query() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/search/repositories",
            get(move || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        (AxumStatus::INTERNAL_SERVER_ERROR, axum::Json(json!({})))
                    } else {
                        (AxumStatus::OK, axum::Json(json!({"items": [item(&format!("acme/repo{}", n), n as u64)]})))
                    }
                }
            }),
        );
        let base = spawn_server(app).await;
        let client = GithubClient::new(test_config(base)).unwrap();

        let result = client
            .fetch_trending(&ProjectClassifier::default(), 7, 10)
            .await;

        assert_eq!(hits.load(Ordering::SeqCst), 4);
        assert_eq!(result.report.queries_failed, 1);
        assert_eq!(result.projects.len(), 3);
        assert!(!result.report.rate_limited);
    }

    #[tokio::test]
    async fn test_bearer_token_and_per_page_are_sent() {
        let app = Router::new().route(
            "/search/repositories",
            get(|headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                let per_page = params.get("per_page").cloned().unwrap_or_default();
                if auth == "Bearer secret" && per_page == "50" {
                    (AxumStatus::OK, axum::Json(json!({"items": [item("acme/widget", 1)]})))
                } else {
                    (AxumStatus::BAD_REQUEST, axum::Json(json!({})))
                }
            }),
        );
        let base = spawn_server(app).await;

        let mut config = test_config(base);
        config.token = Some("secret".to_string());
        config.queries = vec!["created:>{since}".to_string()];
        let client = GithubClient::new(config).unwrap();

        let result = client
            .fetch_trending(&ProjectClassifier::default(), 7, 500)
            .await;
        assert_eq!(result.projects.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_returns_empty() {
        let mut config = test_config("http://127.0.0.1:1".to_string());
        config.timeout_secs = 2;
        let client = GithubClient::new(config).unwrap();

        let result = client
            .fetch_trending(&ProjectClassifier::default(), 7, 10)
            .await;
        assert!(result.projects.is_empty());
        assert_eq!(result.report.queries_failed, 4);
    }

    #[tokio::test]
    async fn test_fetch_readme_decodes_base64() {
        let app = Router::new()
            .route(
                "/repos/acme/widget/readme",
                get(|| async {
                    axum::Json(json!({
                        "content": "IyBXaWRn\nZXQK",
                        "encoding": "base64"
                    }))
                }),
            )
            .route(
                "/repos/acme/missing/readme",
                get(|| async { (AxumStatus::NOT_FOUND, axum::Json(json!({}))) }),
            );
        let base = spawn_server(app).await;
        let client = GithubClient::new(test_config(base)).unwrap();

        assert_eq!(
            client.fetch_readme("acme/widget").await.as_deref(),
            Some("# Widget\n")
        );
        assert_eq!(client.fetch_readme("acme/missing").await, None);
    }
}
