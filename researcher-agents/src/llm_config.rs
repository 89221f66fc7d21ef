//! Per-role model configuration resolved from the researcher configuration

use researcher_core::{
    config_error, env, LlmProvider, ModelRole, ModelSpec, ResearchResult, ResearcherConfig,
};
use serde::Serialize;

/// API key sent to local OpenAI-compatible servers, which ignore it
pub const LOCAL_API_KEY: &str = "local";

/// Everything needed to build a chat client for one model role
#[derive(Clone, Serialize)]
pub struct ModelConfig {
    pub role: ModelRole,
    pub provider: LlmProvider,
    pub model: String,
    #[serde(skip)]
    pub api_key: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("role", &self.role)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl ModelConfig {
    /// Resolve the model selected for `role`
    pub fn resolve(config: &ResearcherConfig, role: ModelRole) -> ResearchResult<Self> {
        let ModelSpec { provider, model } = config.models.get(role).clone();

        let api_key = match provider.api_key_var() {
            Some(var) => config
                .api_keys
                .get(provider)
                .map(str::to_string)
                .ok_or_else(|| {
                    config_error!(
                        format!(
                            "{} model uses provider '{}' but {} is not set",
                            role, provider, var
                        ),
                        "llm_config"
                    )
                })?,
            None => LOCAL_API_KEY.to_string(),
        };

        let base_url = match provider.default_base_url() {
            Some(url) => url.to_string(),
            None => config.local_model_url.clone().ok_or_else(|| {
                config_error!(
                    format!(
                        "{} model uses provider '{}' but {} is not set",
                        role,
                        provider,
                        env::LOCAL_MODEL_URL
                    ),
                    "llm_config"
                )
            })?,
        };

        Ok(Self {
            role,
            provider,
            model,
            api_key,
            base_url,
            temperature: None,
            max_tokens: None,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn spec(&self) -> ModelSpec {
        ModelSpec {
            provider: self.provider,
            model: self.model.clone(),
        }
    }
}

/// Model configuration for the three roles
#[derive(Debug, Clone, Serialize)]
pub struct LlmConfig {
    pub reasoning: ModelConfig,
    pub main: ModelConfig,
    pub fast: ModelConfig,
}

impl LlmConfig {
    pub fn from_config(config: &ResearcherConfig) -> ResearchResult<Self> {
        Ok(Self {
            reasoning: ModelConfig::resolve(config, ModelRole::Reasoning)?,
            main: ModelConfig::resolve(config, ModelRole::Main)?,
            fast: ModelConfig::resolve(config, ModelRole::Fast)?,
        })
    }

    pub fn get(&self, role: ModelRole) -> &ModelConfig {
        match role {
            ModelRole::Reasoning => &self.reasoning,
            ModelRole::Main => &self.main,
            ModelRole::Fast => &self.fast,
        }
    }
}

/// Whether the model's endpoint honors JSON-only output reliably
///
/// Only the first-party OpenAI and Anthropic endpoints qualify.
pub fn model_supports_structured_output(model: &ModelConfig) -> bool {
    let host = model
        .base_url
        .split("://")
        .nth(1)
        .unwrap_or(&model.base_url)
        .split(['/', ':'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    ["openai.com", "anthropic.com"]
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}
