//! Serper (Google search) client

use crate::http::{create_http_client, handle_response_error, transport_error, HttpClientConfig};
use crate::web::{WebSearchProvider, WebSearchResponse, WebSearchResult};
use async_trait::async_trait;
use researcher_core::{config_error, retry_async, ResearchResult, RetryConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";
pub const DEFAULT_NUM_RESULTS: usize = 10;

const PROVIDER: &str = "serper";

/// Serper API client
pub struct SerperClient {
    client: reqwest::Client,
    endpoint: String,
    num_results: usize,
    retry: RetryConfig,
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
    #[serde(default)]
    answer_box: Option<SerperAnswerBox>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct SerperAnswerBox {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>) -> ResearchResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(config_error!("SERPER_API_KEY is empty", PROVIDER));
        }
        let http = HttpClientConfig::default().with_header("X-API-KEY", &api_key);
        Ok(Self {
            client: create_http_client(&http)?,
            endpoint: SERPER_SEARCH_URL.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
            retry: RetryConfig::default(),
        })
    }

    /// Override the search endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn search_once(&self, query: &str) -> ResearchResult<SerperResponse> {
        debug!("Posting Serper search to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SerperRequest {
                q: query,
                num: self.num_results,
            })
            .send()
            .await
            .map_err(|e| transport_error(e, PROVIDER, "search"))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, PROVIDER, "search").await);
        }

        response
            .json::<SerperResponse>()
            .await
            .map_err(|e| transport_error(e, PROVIDER, "search"))
    }
}

#[async_trait]
impl WebSearchProvider for SerperClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> ResearchResult<WebSearchResponse> {
        let response = retry_async(|| self.search_once(query), &self.retry, "serper_search").await?;

        let results: Vec<WebSearchResult> = response
            .organic
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .map(|r| WebSearchResult {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
            })
            .collect();
        let summary = response
            .answer_box
            .and_then(|b| b.answer.or(b.snippet))
            .filter(|s| !s.is_empty());

        info!(query = query, results = results.len(), "Serper search completed");

        Ok(WebSearchResponse {
            query: query.to_string(),
            summary,
            results,
        })
    }
}
