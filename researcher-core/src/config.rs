//! Typed configuration built from the environment contract

use crate::env::{self, lookup, EnvSource};
use crate::error::{ErrorContext, ResearchError, ResearchResult};
use crate::types::{LlmProvider, ModelRole, ModelSpec, SearchProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API keys for the LLM providers, keyed by provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    keys: BTreeMap<LlmProvider, String>,
}

impl ApiKeys {
    pub fn get(&self, provider: LlmProvider) -> Option<&str> {
        self.keys.get(&provider).map(String::as_str)
    }

    pub fn set(&mut self, provider: LlmProvider, key: impl Into<String>) {
        self.keys.insert(provider, key.into());
    }

    pub fn configured(&self) -> impl Iterator<Item = LlmProvider> + '_ {
        self.keys.keys().copied()
    }
}

/// Web search settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub provider: SearchProvider,
    pub serper_api_key: Option<String>,
}

/// Azure AI Search connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSearchSettings {
    pub endpoint: String,
    pub api_key: String,
    pub index_name: String,
}

/// Provider/model per role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub reasoning: ModelSpec,
    pub main: ModelSpec,
    pub fast: ModelSpec,
}

impl ModelSelection {
    pub fn get(&self, role: ModelRole) -> &ModelSpec {
        match role {
            ModelRole::Reasoning => &self.reasoning,
            ModelRole::Main => &self.main,
            ModelRole::Fast => &self.fast,
        }
    }
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            reasoning: ModelRole::Reasoning.default_spec(),
            main: ModelRole::Main.default_spec(),
            fast: ModelRole::Fast.default_spec(),
        }
    }
}

/// Complete researcher configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearcherConfig {
    pub api_keys: ApiKeys,
    pub local_model_url: Option<String>,
    pub search: SearchSettings,
    /// Set only when all three Azure variables are present
    pub azure: Option<AzureSearchSettings>,
    pub models: ModelSelection,
    /// Azure variables that were set while others were missing
    partial_azure: Vec<&'static str>,
}

impl ResearcherConfig {
    /// Build the configuration from an environment source
    ///
    /// Unknown provider names and search providers are rejected here; missing
    /// credentials are left to [`ResearcherConfig::validate`].
    pub fn from_env(source: &dyn EnvSource) -> ResearchResult<Self> {
        let mut api_keys = ApiKeys::default();
        for provider in LlmProvider::ALL {
            if let Some(var) = provider.api_key_var() {
                if let Some(key) = lookup(source, var) {
                    api_keys.set(provider, key);
                }
            }
        }

        let search_provider = match lookup(source, env::SEARCH_PROVIDER) {
            Some(value) => value.parse::<SearchProvider>()?,
            None => SearchProvider::default(),
        };

        let azure_vars = [
            env::AZURE_SEARCH_ENDPOINT,
            env::AZURE_SEARCH_KEY,
            env::AZURE_SEARCH_INDEX_NAME,
        ];
        let azure_values: Vec<Option<String>> =
            azure_vars.iter().map(|var| lookup(source, var)).collect();
        let (azure, partial_azure) = match azure_values.as_slice() {
            [Some(endpoint), Some(api_key), Some(index_name)] => (
                Some(AzureSearchSettings {
                    endpoint: endpoint.clone(),
                    api_key: api_key.clone(),
                    index_name: index_name.clone(),
                }),
                Vec::new(),
            ),
            values => (
                None,
                azure_vars
                    .iter()
                    .zip(values)
                    .filter(|(_, value)| value.is_some())
                    .map(|(var, _)| *var)
                    .collect(),
            ),
        };

        let models = ModelSelection {
            reasoning: Self::model_spec(source, ModelRole::Reasoning)?,
            main: Self::model_spec(source, ModelRole::Main)?,
            fast: Self::model_spec(source, ModelRole::Fast)?,
        };

        Ok(Self {
            api_keys,
            local_model_url: lookup(source, env::LOCAL_MODEL_URL),
            search: SearchSettings {
                provider: search_provider,
                serper_api_key: lookup(source, env::SERPER_API_KEY),
            },
            azure,
            models,
            partial_azure,
        })
    }

    /// Build the configuration from the process environment
    pub fn from_process_env() -> ResearchResult<Self> {
        Self::from_env(&env::ProcessEnv)
    }

    fn model_spec(source: &dyn EnvSource, role: ModelRole) -> ResearchResult<ModelSpec> {
        let default = role.default_spec();
        let provider = match lookup(source, role.provider_var()) {
            Some(value) => value.parse::<LlmProvider>().map_err(|e| match e {
                ResearchError::Validation {
                    message, context, ..
                } => ResearchError::Validation {
                    message,
                    field: Some(role.provider_var().to_string()),
                    context,
                },
                other => other,
            })?,
            None => default.provider,
        };
        let model = lookup(source, role.model_var()).unwrap_or(default.model);
        Ok(ModelSpec { provider, model })
    }

    /// Check that every selected provider has what it needs
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for role in ModelRole::ALL {
            let spec = self.models.get(role);
            match spec.provider.api_key_var() {
                Some(var) if self.api_keys.get(spec.provider).is_none() => {
                    report.error(
                        var,
                        format!(
                            "{} model uses provider '{}' but {} is not set",
                            role, spec.provider, var
                        ),
                    );
                }
                None if self.local_model_url.is_none() => {
                    report.error(
                        env::LOCAL_MODEL_URL,
                        format!(
                            "{} model uses provider 'local' but {} is not set",
                            role,
                            env::LOCAL_MODEL_URL
                        ),
                    );
                }
                _ => {}
            }
        }

        match self.search.provider {
            SearchProvider::Serper if self.search.serper_api_key.is_none() => {
                report.error(
                    env::SERPER_API_KEY,
                    "SEARCH_PROVIDER is 'serper' but SERPER_API_KEY is not set".to_string(),
                );
            }
            SearchProvider::OpenAi if self.api_keys.get(LlmProvider::OpenAi).is_none() => {
                report.error(
                    env::OPENAI_API_KEY,
                    "SEARCH_PROVIDER is 'openai' but OPENAI_API_KEY is not set".to_string(),
                );
            }
            _ => {}
        }

        if !self.partial_azure.is_empty() {
            report.error(
                env::AZURE_SEARCH_ENDPOINT,
                format!(
                    "Azure AI Search is partially configured (set: {}). Set AZURE_SEARCH_ENDPOINT, AZURE_SEARCH_KEY, and AZURE_SEARCH_INDEX_NAME together",
                    self.partial_azure.join(", ")
                ),
            );
        } else if self.azure.is_none() {
            report.warn(
                env::AZURE_SEARCH_ENDPOINT,
                "Azure AI Search is not configured; the azure commands and agent are unavailable"
                    .to_string(),
            );
        }

        report
    }

    /// Serializable view with secrets masked
    pub fn redacted(&self) -> RedactedConfig {
        let api_keys = LlmProvider::ALL
            .iter()
            .filter_map(|provider| {
                self.api_keys
                    .get(*provider)
                    .map(|key| (provider.to_string(), mask_secret(key)))
            })
            .collect();

        RedactedConfig {
            api_keys,
            local_model_url: self.local_model_url.clone(),
            search: RedactedSearch {
                provider: self.search.provider.to_string(),
                serper_api_key: self.search.serper_api_key.as_deref().map(mask_secret),
            },
            azure: self.azure.as_ref().map(|azure| RedactedAzure {
                endpoint: azure.endpoint.clone(),
                index_name: azure.index_name.clone(),
                api_key: mask_secret(&azure.api_key),
            }),
            models: ModelRole::ALL
                .iter()
                .map(|role| (role.to_string(), self.models.get(*role).to_string()))
                .collect(),
        }
    }
}

/// Mask a secret for display, keeping its first four characters
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "…".to_string()
    } else {
        format!("{}…", visible)
    }
}

/// Configuration view safe to print
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedConfig {
    pub api_keys: BTreeMap<String, String>,
    pub local_model_url: Option<String>,
    pub search: RedactedSearch,
    pub azure: Option<RedactedAzure>,
    pub models: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedSearch {
    pub provider: String,
    pub serper_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedAzure {
    pub endpoint: String,
    pub index_name: String,
    pub api_key: String,
}

impl RedactedConfig {
    pub fn to_toml(&self) -> ResearchResult<String> {
        toml::to_string_pretty(self).map_err(|e| ResearchError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Configuration validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, message: String) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message,
        });
    }

    fn warn(&mut self, field: &str, message: String) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message,
        });
    }

    /// Convert an invalid report into a configuration error
    pub fn into_result(self) -> ResearchResult<()> {
        if self.is_valid() {
            return Ok(());
        }
        let fields: Vec<&str> = self.errors.iter().map(|e| e.field.as_str()).collect();
        let mut context = ErrorContext::new("config")
            .with_operation("validate")
            .with_metadata("fields", &fields.join(","));
        for issue in &self.errors {
            context = context.with_suggestion(&issue.message);
        }
        Err(ResearchError::Config {
            message: format!(
                "{} configuration error(s): {}",
                self.errors.len(),
                self.errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            source: None,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    fn complete_env() -> MapEnv {
        MapEnv::new()
            .with("OPENAI_API_KEY", "sk-openai-123")
            .with("SERPER_API_KEY", "serper-456")
    }

    #[test]
    fn test_defaults_with_minimal_env() {
        let config = ResearcherConfig::from_env(&complete_env()).unwrap();

        assert_eq!(config.models, ModelSelection::default());
        assert_eq!(config.search.provider, SearchProvider::Serper);
        assert_eq!(config.api_keys.get(LlmProvider::OpenAi), Some("sk-openai-123"));
        assert!(config.azure.is_none());

        let report = config.validate();
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_role_selection_from_env() {
        let env = complete_env()
            .with("DEEPSEEK_API_KEY", "ds-key")
            .with("DR_REASONING_MODEL_PROVIDER", "DeepSeek")
            .with("REASONING_MODEL", "deepseek-reasoner")
            .with("FAST_MODEL_PROVIDER", "local")
            .with("FAST_MODEL", "llama3.2")
            .with("LOCAL_MODEL_URL", "http://localhost:11434/v1");
        let config = ResearcherConfig::from_env(&env).unwrap();

        assert_eq!(config.models.reasoning.provider, LlmProvider::DeepSeek);
        assert_eq!(config.models.reasoning.model, "deepseek-reasoner");
        assert_eq!(config.models.main, ModelRole::Main.default_spec());
        assert_eq!(config.models.fast.provider, LlmProvider::Local);
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_unknown_role_provider_names_the_variable() {
        let env = complete_env().with("MAIN_MODEL_PROVIDER", "mistral");
        match ResearcherConfig::from_env(&env) {
            Err(ResearchError::Validation { field, .. }) => {
                assert_eq!(field.as_deref(), Some("MAIN_MODEL_PROVIDER"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_search_provider_is_rejected() {
        let env = complete_env().with("SEARCH_PROVIDER", "bing");
        assert!(matches!(
            ResearcherConfig::from_env(&env),
            Err(ResearchError::Validation { .. })
        ));
    }

    #[test]
    fn test_missing_keys_are_reported() {
        let env = MapEnv::new()
            .with("MAIN_MODEL_PROVIDER", "anthropic")
            .with("FAST_MODEL_PROVIDER", "local");
        let report = ResearcherConfig::from_env(&env).unwrap().validate();

        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"OPENAI_API_KEY"));
        assert!(fields.contains(&"ANTHROPIC_API_KEY"));
        assert!(fields.contains(&"LOCAL_MODEL_URL"));
        assert!(fields.contains(&"SERPER_API_KEY"));
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_openai_search_requires_openai_key() {
        let env = MapEnv::new()
            .with("SEARCH_PROVIDER", "openai")
            .with("REASONING_MODEL_PROVIDER", "gemini")
            .with("MAIN_MODEL_PROVIDER", "gemini")
            .with("FAST_MODEL_PROVIDER", "gemini")
            .with("GEMINI_API_KEY", "g-key");
        let report = ResearcherConfig::from_env(&env).unwrap().validate();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "OPENAI_API_KEY");
    }

    #[test]
    fn test_azure_requires_all_three_variables() {
        let env = complete_env()
            .with("AZURE_SEARCH_ENDPOINT", "contoso.search.windows.net")
            .with("AZURE_SEARCH_KEY", "azure-key");
        let config = ResearcherConfig::from_env(&env).unwrap();
        assert!(config.azure.is_none());

        let report = config.validate();
        assert!(!report.is_valid());
        assert!(report.errors[0].message.contains("AZURE_SEARCH_KEY"));

        let env = env.with("AZURE_SEARCH_INDEX_NAME", "reports");
        let config = ResearcherConfig::from_env(&env).unwrap();
        let azure = config.azure.as_ref().unwrap();
        assert_eq!(azure.endpoint, "contoso.search.windows.net");
        assert_eq!(azure.index_name, "reports");
        assert!(config.validate().warnings.is_empty());
    }

    #[test]
    fn test_redacted_view_masks_secrets() {
        let env = complete_env()
            .with("AZURE_SEARCH_ENDPOINT", "contoso.search.windows.net")
            .with("AZURE_SEARCH_KEY", "azure-secret")
            .with("AZURE_SEARCH_INDEX_NAME", "reports");
        let redacted = ResearcherConfig::from_env(&env).unwrap().redacted();

        assert_eq!(redacted.api_keys.get("openai").unwrap(), "sk-o…");
        assert_eq!(redacted.search.serper_api_key.as_deref(), Some("serp…"));
        assert_eq!(redacted.azure.as_ref().unwrap().api_key, "azur…");
        assert_eq!(redacted.models.get("fast").unwrap(), "openai/gpt-4o-mini");

        let toml = redacted.to_toml().unwrap();
        assert!(!toml.contains("sk-openai-123"));
        assert!(!toml.contains("azure-secret"));
    }

    #[test]
    fn test_mask_short_secret() {
        assert_eq!(mask_secret("abc"), "…");
        assert_eq!(mask_secret("abcdef"), "abcd…");
    }
}
