// file: src/settings.rs
// description: typed, persisted overrides for ai provider and github token
// reference: https://serde.rs/attr-skip-serializing.html

use crate::config::Config;
use crate::enhancer::Provider;
use crate::error::{PipelineError, Result};
use crate::storage::atomic::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GithubOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Everything a user may persist on top of the file/env configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubOverrides>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AiOverrides {
    /// Field-wise merge; a present, non-empty field in `other` wins.
    pub fn merge(self, other: AiOverrides) -> AiOverrides {
        AiOverrides {
            enabled: other.enabled.or(self.enabled),
            provider: non_empty(other.provider).or(self.provider),
            model: non_empty(other.model).or(self.model),
            endpoint: non_empty(other.endpoint).or(self.endpoint),
            api_key: non_empty(other.api_key).or(self.api_key),
        }
    }
}

impl GithubOverrides {
    pub fn merge(self, other: GithubOverrides) -> GithubOverrides {
        GithubOverrides {
            token: non_empty(other.token).or(self.token),
        }
    }
}

impl SettingsOverrides {
    pub fn merge(self, other: SettingsOverrides) -> SettingsOverrides {
        SettingsOverrides {
            ai: match (self.ai, other.ai) {
                (Some(base), Some(over)) => Some(base.merge(over)),
                (base, over) => over.or(base),
            },
            github: match (self.github, other.github) {
                (Some(base), Some(over)) => Some(base.merge(over)),
                (base, over) => over.or(base),
            },
        }
    }

    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ai) = &self.ai {
            if let Some(enabled) = ai.enabled {
                config.ai.enabled = enabled;
            }
            if let Some(provider) = &ai.provider {
                config.ai.provider = provider.clone();
            }
            if let Some(model) = &ai.model {
                config.ai.model = Some(model.clone());
            }
            if let Some(endpoint) = &ai.endpoint {
                config.ai.endpoint = Some(endpoint.clone());
            }
            if let Some(api_key) = &ai.api_key {
                config.ai.api_key = Some(api_key.clone());
            }
        }

        if let Some(token) = self.github.as_ref().and_then(|g| g.token.as_ref()) {
            config.github.token = Some(token.clone());
        }
    }
}

/// What may be shown about stored ai settings; the key itself never leaves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiSettingsView {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub has_api_key: bool,
}

impl AiSettingsView {
    pub fn from_config(config: &Config) -> Self {
        let provider = Provider::from_name(&config.ai.provider);
        Self {
            enabled: config.ai.enabled,
            provider: config.ai.provider.clone(),
            model: config
                .ai
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            endpoint: config
                .ai
                .endpoint
                .clone()
                .unwrap_or_else(|| provider.default_endpoint().to_string()),
            has_api_key: config
                .ai
                .api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty()),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored overrides; missing or corrupt documents read as empty.
    pub async fn load(&self) -> SettingsOverrides {
        match read_json::<SettingsOverrides>(&self.path).await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!("No settings found at {}", self.path.display());
                SettingsOverrides::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable settings: {}", e);
                SettingsOverrides::default()
            }
        }
    }

    async fn save(&self, settings: &SettingsOverrides) -> Result<()> {
        write_json_atomic(&self.path, settings).await
    }

    /// Replace the stored ai settings with `update` and enable enhancement.
    ///
    /// Only the api key carries over: an absent or empty key keeps the stored
    /// one, and with nothing stored the update is rejected. Provider, model and
    /// endpoint come from `update`; an absent model resolves to the provider
    /// default and an absent endpoint stays unset.
    pub async fn update_ai(&self, update: AiOverrides) -> Result<AiOverrides> {
        let _guard = self.write_lock.lock().await;

        let mut settings = self.load().await;
        let stored_key = settings.ai.take().and_then(|ai| ai.api_key);

        let Some(api_key) = non_empty(update.api_key).or(stored_key) else {
            return Err(PipelineError::Validation(
                "API key must not be empty".to_string(),
            ));
        };

        let provider = non_empty(update.provider).unwrap_or_else(|| "qwen".to_string());
        let model = non_empty(update.model).unwrap_or_else(|| {
            Provider::from_name(&provider).default_model().to_string()
        });

        let saved = AiOverrides {
            enabled: Some(true),
            provider: Some(provider),
            model: Some(model),
            endpoint: non_empty(update.endpoint),
            api_key: Some(api_key),
        };

        settings.ai = Some(saved.clone());
        self.save(&settings).await?;

        info!(
            "Saved ai settings for provider {}",
            saved.provider.as_deref().unwrap_or("qwen")
        );
        Ok(saved)
    }

    /// Remove stored ai settings; `false` when there were none.
    pub async fn clear_ai(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut settings = self.load().await;
        if settings.ai.take().is_none() {
            return Ok(false);
        }

        self.save(&settings).await?;
        info!("Cleared ai settings");
        Ok(true)
    }

    /// Store `token`, or drop the stored one when it is empty.
    pub async fn set_github_token(&self, token: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut settings = self.load().await;
        let token = token.trim();
        settings.github = if token.is_empty() {
            None
        } else {
            Some(GithubOverrides {
                token: Some(token.to_string()),
            })
        };

        self.save(&settings).await?;
        let has_token = settings.github.is_some();
        info!("Saved GitHub settings (token configured: {})", has_token);
        Ok(has_token)
    }
}
