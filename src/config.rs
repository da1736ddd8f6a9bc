// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "TREND_HARVEST";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub lookback_days: u32,
    pub per_page: u32,
    /// Search query templates; `{since}` becomes the lookback date.
    pub queries: Vec<String>,
    pub inter_query_delay_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: bool,
    pub provider: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub history_retention: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub derive_velocity: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupConfig {
    pub task_ttl_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            user_agent: "trend-harvest/0.1".to_string(),
            lookback_days: 7,
            per_page: 10,
            queries: vec![
                "created:>{since} sort:stars".to_string(),
                "topic:data-science created:>{since}".to_string(),
                "topic:machine-learning created:>{since}".to_string(),
                "topic:artificial-intelligence created:>{since}".to_string(),
            ],
            inter_query_delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "qwen".to_string(),
            api_key: None,
            endpoint: None,
            model: None,
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 60,
            concurrency: 1,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            history_retention: 12,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 20,
            derive_velocity: true,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self { task_ttl_secs: 600 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl GithubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn inter_query_delay(&self) -> Duration {
        Duration::from_millis(self.inter_query_delay_ms)
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Enabled and carrying a non-empty api key.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if config.github.token.is_none() {
            config.github.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            github: GithubConfig::default(),
            ai: AiConfig::default(),
            storage: StorageConfig::default(),
            pipeline: PipelineConfig::default(),
            lookup: LookupConfig::default(),
        }
    }

    pub fn projects_path(&self) -> PathBuf {
        self.storage.data_dir.join("projects.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.storage.data_dir.join("history.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.storage.data_dir.join("settings.json")
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.top_k == 0 {
            return Err(PipelineError::Config(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if self.storage.history_retention == 0 {
            return Err(PipelineError::Config(
                "history_retention must be greater than 0".to_string(),
            ));
        }

        if self.ai.concurrency == 0 {
            return Err(PipelineError::Config(
                "ai.concurrency must be greater than 0".to_string(),
            ));
        }

        Validator::validate_url(&self.github.api_base)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Validator::validate_per_page(self.github.per_page)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if let Some(endpoint) = &self.ai.endpoint {
            Validator::validate_url(endpoint).map_err(|e| PipelineError::Config(e.to_string()))?;
        }

        Ok(())
    }
}
