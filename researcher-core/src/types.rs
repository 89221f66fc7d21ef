//! Core data types shared across the researcher crates

use crate::env;
use crate::error::{ErrorContext, ResearchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// LLM vendors selectable through `*_MODEL_PROVIDER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    DeepSeek,
    OpenRouter,
    Gemini,
    Anthropic,
    Perplexity,
    HuggingFace,
    Local,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 8] = [
        LlmProvider::OpenAi,
        LlmProvider::DeepSeek,
        LlmProvider::OpenRouter,
        LlmProvider::Gemini,
        LlmProvider::Anthropic,
        LlmProvider::Perplexity,
        LlmProvider::HuggingFace,
        LlmProvider::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::DeepSeek => "deepseek",
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::Gemini => "gemini",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Perplexity => "perplexity",
            LlmProvider::HuggingFace => "huggingface",
            LlmProvider::Local => "local",
        }
    }

    /// Variable holding this provider's API key; `None` for `local`
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAi => Some(env::OPENAI_API_KEY),
            LlmProvider::DeepSeek => Some(env::DEEPSEEK_API_KEY),
            LlmProvider::OpenRouter => Some(env::OPENROUTER_API_KEY),
            LlmProvider::Gemini => Some(env::GEMINI_API_KEY),
            LlmProvider::Anthropic => Some(env::ANTHROPIC_API_KEY),
            LlmProvider::Perplexity => Some(env::PERPLEXITY_API_KEY),
            LlmProvider::HuggingFace => Some(env::HUGGINGFACE_API_KEY),
            LlmProvider::Local => None,
        }
    }

    /// Default API base URL; `local` takes it from `LOCAL_MODEL_URL`
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAi => Some("https://api.openai.com/v1"),
            LlmProvider::DeepSeek => Some("https://api.deepseek.com/v1"),
            LlmProvider::OpenRouter => Some("https://openrouter.ai/api/v1"),
            LlmProvider::Gemini => {
                Some("https://generativelanguage.googleapis.com/v1beta/openai")
            }
            LlmProvider::Anthropic => Some("https://api.anthropic.com/v1"),
            LlmProvider::Perplexity => Some("https://api.perplexity.ai"),
            LlmProvider::HuggingFace => Some("https://router.huggingface.co/v1"),
            LlmProvider::Local => None,
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LlmProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ResearchError::Validation {
                message: format!(
                    "Unsupported LLM provider '{}'. Supported providers: {}",
                    s,
                    LlmProvider::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                field: None,
                context: ErrorContext::new("types").with_operation("parse_llm_provider"),
            })
    }
}

/// Named model slots used by the agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelRole {
    Reasoning,
    Main,
    Fast,
}

impl ModelRole {
    pub const ALL: [ModelRole; 3] = [ModelRole::Reasoning, ModelRole::Main, ModelRole::Fast];

    pub fn provider_var(&self) -> &'static str {
        match self {
            ModelRole::Reasoning => env::REASONING_MODEL_PROVIDER,
            ModelRole::Main => env::MAIN_MODEL_PROVIDER,
            ModelRole::Fast => env::FAST_MODEL_PROVIDER,
        }
    }

    pub fn model_var(&self) -> &'static str {
        match self {
            ModelRole::Reasoning => env::REASONING_MODEL,
            ModelRole::Main => env::MAIN_MODEL,
            ModelRole::Fast => env::FAST_MODEL,
        }
    }

    /// Model used when the role's variables are unset
    pub fn default_spec(&self) -> ModelSpec {
        let model = match self {
            ModelRole::Reasoning => "o3-mini",
            ModelRole::Main => "gpt-4o",
            ModelRole::Fast => "gpt-4o-mini",
        };
        ModelSpec {
            provider: LlmProvider::OpenAi,
            model: model.to_string(),
        }
    }
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRole::Reasoning => f.write_str("reasoning"),
            ModelRole::Main => f.write_str("main"),
            ModelRole::Fast => f.write_str("fast"),
        }
    }
}

/// Provider and model identifier for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub provider: LlmProvider,
    pub model: String,
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Web search backend selected by `SEARCH_PROVIDER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Serper,
    OpenAi,
}

impl SearchProvider {
    pub const ALLOWED: [&'static str; 2] = ["serper", "openai"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProvider::Serper => "serper",
            SearchProvider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchProvider {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serper" => Ok(SearchProvider::Serper),
            "openai" => Ok(SearchProvider::OpenAi),
            _ => Err(ResearchError::Validation {
                message: format!(
                    "Invalid search provider '{}'. Allowed values: {}",
                    s,
                    SearchProvider::ALLOWED.join(" or ")
                ),
                field: Some(env::SEARCH_PROVIDER.to_string()),
                context: ErrorContext::new("types").with_operation("parse_search_provider"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAi);
        assert_eq!(" deepseek ".parse::<LlmProvider>().unwrap(), LlmProvider::DeepSeek);
        assert_eq!("LOCAL".parse::<LlmProvider>().unwrap(), LlmProvider::Local);
        assert!("mistral".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_provider_round_trips_through_display() {
        for provider in LlmProvider::ALL {
            assert_eq!(provider.to_string().parse::<LlmProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_every_remote_provider_has_key_and_url() {
        for provider in LlmProvider::ALL {
            if provider == LlmProvider::Local {
                assert!(provider.api_key_var().is_none());
                assert!(provider.default_base_url().is_none());
            } else {
                assert!(provider.api_key_var().is_some());
                let url = provider.default_base_url().unwrap();
                assert!(!url.ends_with('/'), "{} has a trailing slash", url);
            }
        }
    }

    #[test]
    fn test_search_provider_allowed_values() {
        assert_eq!("serper".parse::<SearchProvider>().unwrap(), SearchProvider::Serper);
        assert_eq!("OpenAI".parse::<SearchProvider>().unwrap(), SearchProvider::OpenAi);

        match "bing".parse::<SearchProvider>() {
            Err(ResearchError::Validation { field, message, .. }) => {
                assert_eq!(field.as_deref(), Some("SEARCH_PROVIDER"));
                assert!(message.contains("serper or openai"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_role_defaults() {
        assert_eq!(ModelRole::Reasoning.default_spec().to_string(), "openai/o3-mini");
        assert_eq!(ModelRole::Main.default_spec().to_string(), "openai/gpt-4o");
        assert_eq!(ModelRole::Fast.default_spec().to_string(), "openai/gpt-4o-mini");
        assert_eq!(ModelRole::Fast.provider_var(), "FAST_MODEL_PROVIDER");
        assert_eq!(ModelRole::Main.model_var(), "MAIN_MODEL");
    }
}
