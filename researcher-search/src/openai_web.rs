//! OpenAI web search through the Responses API `web_search_preview` tool

use crate::http::{create_http_client, handle_response_error, transport_error, HttpClientConfig};
use crate::web::{WebSearchProvider, WebSearchResponse, WebSearchResult};
use async_trait::async_trait;
use researcher_core::{config_error, retry_async, LlmProvider, ResearchResult, RetryConfig};
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, info};

pub const DEFAULT_WEB_SEARCH_MODEL: &str = "gpt-4o-mini";

const PROVIDER: &str = "openai";

/// OpenAI web search client
pub struct OpenAiWebSearch {
    client: reqwest::Client,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiWebSearch {
    pub fn new(api_key: impl Into<String>) -> ResearchResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(config_error!("OPENAI_API_KEY is empty", PROVIDER));
        }
        let http = HttpClientConfig::default()
            .with_header("Authorization", &format!("Bearer {}", api_key));
        Ok(Self {
            client: create_http_client(&http)?,
            base_url: LlmProvider::OpenAi
                .default_base_url()
                .unwrap_or("https://api.openai.com/v1")
                .to_string(),
            model: DEFAULT_WEB_SEARCH_MODEL.to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Override the API base URL (up to and including `/v1`)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }

    async fn search_once(&self, query: &str) -> ResearchResult<Value> {
        let url = self.responses_url();
        debug!("Posting OpenAI web search to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "model": self.model,
                "input": query,
                "tools": [{ "type": "web_search_preview" }],
            }))
            .send()
            .await
            .map_err(|e| transport_error(e, PROVIDER, "web_search"))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, PROVIDER, "web_search").await);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| transport_error(e, PROVIDER, "web_search"))
    }
}

/// Extract the answer text and cited pages from a Responses API payload
pub fn parse_responses_output(query: &str, body: &Value) -> WebSearchResponse {
    let mut texts = Vec::new();
    let mut results = Vec::new();
    let mut seen = HashSet::new();

    let contents = body["output"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|item| item["type"] == "message")
        .flat_map(|item| item["content"].as_array().into_iter().flatten())
        .filter(|content| content["type"] == "output_text");

    for content in contents {
        let text = content["text"].as_str().unwrap_or_default();
        if !text.is_empty() {
            texts.push(text.to_string());
        }

        let citations = content["annotations"]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|a| a["type"] == "url_citation");
        for citation in citations {
            let Some(url) = citation["url"].as_str() else {
                continue;
            };
            if !seen.insert(url.to_string()) {
                continue;
            }
            let snippet = match (citation["start_index"].as_u64(), citation["end_index"].as_u64()) {
                (Some(start), Some(end)) if end > start => text
                    .chars()
                    .skip(start as usize)
                    .take((end - start) as usize)
                    .collect(),
                _ => String::new(),
            };
            results.push(WebSearchResult {
                title: citation["title"].as_str().unwrap_or_default().to_string(),
                url: url.to_string(),
                snippet,
            });
        }
    }

    WebSearchResponse {
        query: query.to_string(),
        summary: (!texts.is_empty()).then(|| texts.join("\n\n")),
        results,
    }
}

#[async_trait]
impl WebSearchProvider for OpenAiWebSearch {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> ResearchResult<WebSearchResponse> {
        let body = retry_async(|| self.search_once(query), &self.retry, "openai_web_search").await?;
        let response = parse_responses_output(query, &body);

        info!(
            query = query,
            results = response.results.len(),
            "OpenAI web search completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_responses_output() {
        let body = json!({
            "output": [
                { "type": "web_search_call", "status": "completed" },
                {
                    "type": "message",
                    "content": [{
                        "type": "output_text",
                        "text": "Rust 1.80 stabilized LazyLock.",
                        "annotations": [
                            { "type": "url_citation", "url": "https://blog.rust-lang.org/a", "title": "Announcing Rust 1.80", "start_index": 0, "end_index": 9 },
                            { "type": "url_citation", "url": "https://blog.rust-lang.org/a", "title": "duplicate" },
                            { "type": "file_citation", "file_id": "f1" }
                        ]
                    }]
                }
            ]
        });

        let response = parse_responses_output("rust lazylock", &body);
        assert_eq!(response.summary.as_deref(), Some("Rust 1.80 stabilized LazyLock."));
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].title, "Announcing Rust 1.80");
        assert_eq!(response.results[0].snippet, "Rust 1.80");
    }

    #[test]
    fn test_parse_empty_output() {
        let response = parse_responses_output("q", &json!({}));
        assert!(response.summary.is_none());
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_responses_url() {
        let client = OpenAiWebSearch::new("sk-test")
            .unwrap()
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.responses_url(), "http://localhost:8080/v1/responses");
    }
}
