//! Environment variable contract
//!
//! Names of every variable the researcher reads, and lookup rules shared by
//! the typed configuration and the `.env` linter. Any variable may be given
//! with a `DR_` prefix, which takes precedence over the bare name.

use crate::error::{ErrorContext, ResearchError, ResearchResult};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Optional namespace prefix for all variables
pub const PREFIX: &str = "DR_";

// LLM api keys
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const PERPLEXITY_API_KEY: &str = "PERPLEXITY_API_KEY";
pub const HUGGINGFACE_API_KEY: &str = "HUGGINGFACE_API_KEY";
pub const LOCAL_MODEL_URL: &str = "LOCAL_MODEL_URL";

// Search provider
pub const SEARCH_PROVIDER: &str = "SEARCH_PROVIDER";
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

// Azure AI Search
pub const AZURE_SEARCH_ENDPOINT: &str = "AZURE_SEARCH_ENDPOINT";
pub const AZURE_SEARCH_KEY: &str = "AZURE_SEARCH_KEY";
pub const AZURE_SEARCH_INDEX_NAME: &str = "AZURE_SEARCH_INDEX_NAME";

// Selected LLM models
pub const REASONING_MODEL_PROVIDER: &str = "REASONING_MODEL_PROVIDER";
pub const REASONING_MODEL: &str = "REASONING_MODEL";
pub const MAIN_MODEL_PROVIDER: &str = "MAIN_MODEL_PROVIDER";
pub const MAIN_MODEL: &str = "MAIN_MODEL";
pub const FAST_MODEL_PROVIDER: &str = "FAST_MODEL_PROVIDER";
pub const FAST_MODEL: &str = "FAST_MODEL";

/// Every documented variable, in template order
pub const ALL_VARIABLES: [&str; 19] = [
    OPENAI_API_KEY,
    DEEPSEEK_API_KEY,
    OPENROUTER_API_KEY,
    GEMINI_API_KEY,
    ANTHROPIC_API_KEY,
    PERPLEXITY_API_KEY,
    HUGGINGFACE_API_KEY,
    LOCAL_MODEL_URL,
    SEARCH_PROVIDER,
    SERPER_API_KEY,
    AZURE_SEARCH_ENDPOINT,
    AZURE_SEARCH_KEY,
    AZURE_SEARCH_INDEX_NAME,
    REASONING_MODEL_PROVIDER,
    REASONING_MODEL,
    MAIN_MODEL_PROVIDER,
    MAIN_MODEL,
    FAST_MODEL_PROVIDER,
    FAST_MODEL,
];

/// Source of raw variable values
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory variables, used for linting parsed files and in tests
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl FromIterator<(String, String)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Whether a value is a template placeholder such as `<your_key>`
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.len() >= 2 && value.starts_with('<') && value.ends_with('>')
}

/// Strip the optional `DR_` prefix from a variable name
pub fn unprefixed(name: &str) -> &str {
    name.strip_prefix(PREFIX).unwrap_or(name)
}

/// Whether `name` is one of the documented variables, with or without prefix
pub fn is_known_variable(name: &str) -> bool {
    ALL_VARIABLES.contains(&unprefixed(name))
}

/// Look up a variable, preferring its `DR_`-prefixed form
///
/// Values are trimmed; empty and placeholder values count as unset.
pub fn lookup(source: &dyn EnvSource, name: &str) -> Option<String> {
    let prefixed = format!("{}{}", PREFIX, name);
    let found = [prefixed.as_str(), name]
        .into_iter()
        .filter_map(|key| source.get(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty() && !is_placeholder(value));
    found
}

/// Load a `.env` file into the process environment
///
/// Variables already present in the environment are left untouched. With no
/// explicit path a missing `.env` in the working directory is not an error.
pub fn load_dotenv(path: Option<&Path>) -> ResearchResult<Option<std::path::PathBuf>> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| ResearchError::Config {
                message: format!("Failed to load env file {}: {}", path.display(), e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("env")
                    .with_operation("load_dotenv")
                    .with_suggestion("Check that the file exists and uses KEY=value lines"),
            })?;
            info!("Loaded environment from {}", path.display());
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(found) => {
                info!("Loaded environment from {}", found.display());
                Ok(Some(found))
            }
            Err(e) if e.not_found() => {
                debug!("No .env file found, using process environment only");
                Ok(None)
            }
            Err(e) => Err(ResearchError::Config {
                message: format!("Failed to load .env file: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("env").with_operation("load_dotenv"),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_value_wins() {
        let env = MapEnv::new()
            .with("OPENAI_API_KEY", "sk-plain")
            .with("DR_OPENAI_API_KEY", "sk-prefixed");
        assert_eq!(lookup(&env, OPENAI_API_KEY).as_deref(), Some("sk-prefixed"));
    }

    #[test]
    fn test_falls_back_to_bare_name() {
        let env = MapEnv::new().with("SERPER_API_KEY", "  serper-key ");
        assert_eq!(lookup(&env, SERPER_API_KEY).as_deref(), Some("serper-key"));
    }

    #[test]
    fn test_empty_and_placeholder_values_are_unset() {
        let env = MapEnv::new()
            .with("DR_GEMINI_API_KEY", "   ")
            .with("GEMINI_API_KEY", "<your_key>")
            .with("ANTHROPIC_API_KEY", "");
        assert!(lookup(&env, GEMINI_API_KEY).is_none());
        assert!(lookup(&env, ANTHROPIC_API_KEY).is_none());
    }

    #[test]
    fn test_blank_prefixed_value_does_not_shadow_bare_name() {
        let env = MapEnv::new()
            .with("DR_MAIN_MODEL", "")
            .with("MAIN_MODEL", "gpt-4o");
        assert_eq!(lookup(&env, MAIN_MODEL).as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_variable_names_are_unique() {
        let mut names = ALL_VARIABLES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_VARIABLES.len());
    }

    #[test]
    fn test_known_variables() {
        assert!(is_known_variable("AZURE_SEARCH_KEY"));
        assert!(is_known_variable("DR_AZURE_SEARCH_KEY"));
        assert!(!is_known_variable("DATABASE_URL"));
        assert_eq!(unprefixed("DR_FAST_MODEL"), "FAST_MODEL");
    }

    #[test]
    fn test_load_dotenv_missing_explicit_path_fails() {
        let result = load_dotenv(Some(Path::new("/definitely/not/here/.env")));
        assert!(matches!(result, Err(ResearchError::Config { .. })));
    }
}
