// file: src/enhancer/client.rs
// description: chat-completion integration for optional project enhancement
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::config::AiConfig;
use crate::enhancer::prompt::{PROBE_PROMPT, SYSTEM_PROMPT, build_prompt, parse_completion};
use crate::enhancer::provider::Provider;
use crate::error::{PipelineError, Result};
use crate::models::Project;
use crate::pipeline::progress::ProgressTracker;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct Enhancer {
    client: Client,
    provider: Provider,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    concurrency: usize,
}

impl Enhancer {
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PipelineError::Config("ai.api_key is not set".to_string()))?
            .to_string();

        let provider = Provider::from_name(&config.provider);
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| provider.default_endpoint().to_string());
        let model = config
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            provider,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            concurrency: config.concurrency.max(1),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Requesting completion from {} for {} chars", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PipelineError::AugmentationFailure(format!("Failed to send completion request: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::AugmentationFailure(format!(
                "Completion request failed with status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            PipelineError::AugmentationFailure(format!("Failed to parse completion response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PipelineError::AugmentationFailure("No completion content returned".to_string())
            })
    }

    pub async fn try_enhance(&self, project: &Project) -> Result<Project> {
        let content = self.complete(&build_prompt(project)).await?;
        let enhancement = parse_completion(&content)?;
        Ok(enhancement.apply(project.clone()))
    }

    /// Enhanced copy of `project`, or the original when anything goes wrong.
    pub async fn enhance_project(&self, project: Project) -> Project {
        match self.try_enhance(&project).await {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!("Enhancement failed for {}: {}", project.full_name, e);
                project
            }
        }
    }

    /// Enhance every project, preserving input order.
    pub async fn enhance_all(&self, projects: Vec<Project>, tracker: &ProgressTracker) -> Vec<Project> {
        info!(
            "Enhancing {} projects with {} ({}), concurrency {}",
            projects.len(),
            self.provider,
            self.model,
            self.concurrency
        );

        stream::iter(projects)
            .map(|project| async move {
                tracker.set_message(format!("Enhancing {}", project.full_name));
                match self.try_enhance(&project).await {
                    Ok(enhanced) => {
                        tracker.inc_enhanced();
                        enhanced
                    }
                    Err(e) => {
                        warn!("Enhancement failed for {}: {}", project.full_name, e);
                        tracker.inc_unchanged();
                        project
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Send a short test prompt and return the completion text.
    pub async fn probe(&self) -> Result<String> {
        let reply = self.complete(PROBE_PROMPT).await?;
        info!("Provider {} answered probe with {} chars", self.provider, reply.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::test_support::{sample_project, spawn_server};
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};

    fn ai_config(endpoint: String) -> AiConfig {
        AiConfig {
            enabled: true,
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            endpoint: Some(endpoint),
            timeout_secs: 5,
            ..AiConfig::default()
        }
    }

    fn completion(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn test_requires_api_key() {
        let config = AiConfig {
            enabled: true,
            ..AiConfig::default()
        };
        assert!(matches!(
            Enhancer::from_config(&config),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_provider_defaults_apply() {
        let config = AiConfig {
            api_key: Some("k".to_string()),
            ..AiConfig::default()
        };
        let enhancer = Enhancer::from_config(&config).unwrap();
        assert_eq!(enhancer.provider(), Provider::Qwen);
        assert_eq!(enhancer.model(), "qwen-plus");
        assert_eq!(
            enhancer.endpoint(),
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );
    }

    #[tokio::test]
    async fn test_error_status_leaves_project_unchanged() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_server(app).await;
        let enhancer = Enhancer::from_config(&ai_config(base)).unwrap();

        let project = sample_project("acme/widget", 10);
        assert_eq!(enhancer.enhance_project(project.clone()).await, project);
    }

    #[tokio::test]
    async fn test_embedded_json_is_applied() {
        let app = Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, axum::Json(body): axum::Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer sk-test");
                let well_formed = body["messages"][0]["role"] == "system"
                    && body["messages"][1]["role"] == "user"
                    && body["model"] == "gpt-4";
                if !(authorized && well_formed) {
                    return (StatusCode::BAD_REQUEST, axum::Json(json!({})));
                }
                (
                    StatusCode::OK,
                    axum::Json(completion(
                        "Sure! {\"enhanced_description\": \"A sharper widget\", \
                         \"usage_steps\": [\"cargo install widget\"], \"category\": \"DevOps\"} Enjoy.",
                    )),
                )
            }),
        );
        let base = spawn_server(app).await;
        let enhancer = Enhancer::from_config(&ai_config(base)).unwrap();

        let project = sample_project("acme/widget", 10);
        let enhanced = enhancer.enhance_project(project.clone()).await;

        assert_eq!(enhanced.description, "A sharper widget");
        assert_eq!(enhanced.usage_steps, vec!["cargo install widget"]);
        assert_eq!(enhanced.category, Category::DevOps);
        assert_eq!(enhanced.stars, project.stars);
        assert_eq!(enhanced.forks, project.forks);
        assert_eq!(enhanced.url, project.url);
    }

    #[tokio::test]
    async fn test_garbage_completion_leaves_project_unchanged() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { axum::Json(completion("I cannot help with that.")) }),
        );
        let base = spawn_server(app).await;
        let enhancer = Enhancer::from_config(&ai_config(base)).unwrap();

        let project = sample_project("acme/widget", 10);
        assert_eq!(enhancer.enhance_project(project.clone()).await, project);
    }

    #[tokio::test]
    async fn test_enhance_all_preserves_order() {
        let app = Router::new().route(
            "/chat/completions",
            post(|axum::Json(body): axum::Json<Value>| async move {
                let prompt = body["messages"][1]["content"].as_str().unwrap_or("").to_string();
                if prompt.contains("acme/second") {
                    return (StatusCode::SERVICE_UNAVAILABLE, axum::Json(json!({})));
                }
                (
                    StatusCode::OK,
                    axum::Json(completion(
                        r#"{"enhanced_description": "done", "usage_steps": ["go"], "category": "Nonsense"}"#,
                    )),
                )
            }),
        );
        let base = spawn_server(app).await;
        let mut config = ai_config(base);
        config.concurrency = 3;
        let enhancer = Enhancer::from_config(&config).unwrap();

        let projects = vec![
            sample_project("acme/first", 3),
            sample_project("acme/second", 2),
            sample_project("acme/third", 1),
        ];
        let tracker = ProgressTracker::hidden(projects.len());
        let out = enhancer.enhance_all(projects.clone(), &tracker).await;

        let names: Vec<_> = out.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, vec!["acme/first", "acme/second", "acme/third"]);
        assert_eq!(out[0].description, "done");
        assert_eq!(out[0].category, projects[0].category);
        assert_eq!(out[1], projects[1]);

        let stats = tracker.get_stats();
        assert_eq!(stats.enhanced, 2);
        assert_eq!(stats.unchanged, 1);
    }

    #[tokio::test]
    async fn test_probe_returns_reply() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { axum::Json(completion("OK")) }),
        );
        let base = spawn_server(app).await;
        let enhancer = Enhancer::from_config(&ai_config(base)).unwrap();
        assert_eq!(enhancer.probe().await.unwrap(), "OK");
    }
}
