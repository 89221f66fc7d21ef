//! Web search abstraction
//!
//! `SEARCH_PROVIDER` selects the backend: `serper` (Google results through
//! serper.dev) or `openai` (the Responses API web search tool).

use crate::openai_web::OpenAiWebSearch;
use crate::serper::SerperClient;
use async_trait::async_trait;
use researcher_core::{config_error, LlmProvider, ResearchResult, ResearcherConfig, SearchProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single web result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Results of one web search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchResponse {
    pub query: String,
    /// Provider-written summary, when the backend produces one
    pub summary: Option<String>,
    pub results: Vec<WebSearchResult>,
}

/// Trait for web search backends
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Backend name as used in `SEARCH_PROVIDER`
    fn name(&self) -> &'static str;

    /// Run a web search
    async fn search(&self, query: &str) -> ResearchResult<WebSearchResponse>;
}

/// Create the web search backend selected by the configuration
pub fn create_web_search(config: &ResearcherConfig) -> ResearchResult<Arc<dyn WebSearchProvider>> {
    match config.search.provider {
        SearchProvider::Serper => {
            let api_key = config.search.serper_api_key.clone().ok_or_else(|| {
                config_error!(
                    "SEARCH_PROVIDER is 'serper' but SERPER_API_KEY is not set",
                    "web_search"
                )
            })?;
            Ok(Arc::new(SerperClient::new(api_key)?))
        }
        SearchProvider::OpenAi => {
            let api_key = config
                .api_keys
                .get(LlmProvider::OpenAi)
                .ok_or_else(|| {
                    config_error!(
                        "SEARCH_PROVIDER is 'openai' but OPENAI_API_KEY is not set",
                        "web_search"
                    )
                })?
                .to_string();
            Ok(Arc::new(OpenAiWebSearch::new(api_key)?))
        }
    }
}
