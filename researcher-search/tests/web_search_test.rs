//! Web search backends against mock services

use researcher_core::{ResearchError, RetryConfig};
use researcher_search::{OpenAiWebSearch, SerperClient, WebSearchProvider};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 2,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

#[tokio::test]
async fn test_serper_search() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "serper-key"))
        .and(body_json(json!({ "q": "rust async", "num": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answerBox": { "answer": "Futures driven by an executor" },
            "organic": [
                { "title": "Async Book", "link": "https://rust-lang.github.io/async-book/", "snippet": "Asynchronous programming in Rust" },
                { "title": "No link" },
                { "title": "Tokio", "link": "https://tokio.rs", "snippet": "An async runtime" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SerperClient::new("serper-key")
        .unwrap()
        .with_endpoint(format!("{}/search", server.uri()))
        .with_num_results(5);
    let response = client.search("rust async").await.unwrap();

    assert_eq!(client.name(), "serper");
    assert_eq!(response.query, "rust async");
    assert_eq!(response.summary.as_deref(), Some("Futures driven by an executor"));
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[1].url, "https://tokio.rs");
}

#[tokio::test]
async fn test_serper_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let client = SerperClient::new("serper-key")
        .unwrap()
        .with_endpoint(format!("{}/search", server.uri()))
        .with_retry(fast_retry());
    let result = client.search("q").await;
    assert!(matches!(result, Err(ResearchError::RateLimit { .. })));
}

#[test]
fn test_empty_keys_are_rejected() {
    assert!(SerperClient::new("").is_err());
    assert!(OpenAiWebSearch::new("  ").is_err());
}

#[tokio::test]
async fn test_openai_web_search() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "input": "latest tokio release",
            "tools": [{ "type": "web_search_preview" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [
                { "type": "web_search_call", "status": "completed" },
                {
                    "type": "message",
                    "content": [{
                        "type": "output_text",
                        "text": "Tokio 1.40 was released.",
                        "annotations": [
                            { "type": "url_citation", "url": "https://github.com/tokio-rs/tokio/releases", "title": "Releases" }
                        ]
                    }]
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiWebSearch::new("sk-test")
        .unwrap()
        .with_base_url(format!("{}/v1", server.uri()));
    let response = client.search("latest tokio release").await.unwrap();

    assert_eq!(client.name(), "openai");
    assert_eq!(response.summary.as_deref(), Some("Tokio 1.40 was released."));
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].title, "Releases");
}

#[tokio::test]
async fn test_openai_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = OpenAiWebSearch::new("sk-test")
        .unwrap()
        .with_base_url(format!("{}/v1", server.uri()))
        .with_retry(fast_retry());
    let result = client.search("q").await;
    assert!(matches!(result, Err(ResearchError::NotFound { .. })));
}
