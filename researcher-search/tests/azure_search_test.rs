//! Azure AI Search client tests against a mock service

use researcher_core::{ResearchError, RetryConfig};
use researcher_search::{AzureSearchClient, AzureSearchConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX: &str = "reports";

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

fn client_for(server: &MockServer) -> AzureSearchClient {
    let config = AzureSearchConfig::new(server.uri(), "test-key", INDEX).with_retry(fast_retry());
    AzureSearchClient::new(config).unwrap()
}

fn search_path() -> String {
    format!("/indexes/{}/docs/search", INDEX)
}

#[tokio::test]
async fn test_discovery_sends_filtered_query_and_dedupes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(search_path()))
        .and(query_param("api-version", "2024-07-01"))
        .and(header("api-key", "test-key"))
        .and(body_partial_json(json!({
            "search": "market outlook",
            "searchFields": "fileName",
            "select": "fileName,webUrl",
            "filter": "fileExtension eq '.pptx'",
            "top": 750
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "fileName": "Zeta outlook.pptx", "webUrl": "https://sp/zeta" },
                { "fileName": "Alpha outlook.pptx", "webUrl": "https://sp/alpha" },
                { "fileName": "Zeta outlook.pptx", "webUrl": "https://sp/zeta-copy" },
                { "webUrl": "https://sp/nameless" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reports = client_for(&server)
        .discover_powerpoint_reports("market outlook")
        .await
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].file_name, "Alpha outlook.pptx");
    assert_eq!(reports[1].file_name, "Zeta outlook.pptx");
    assert_eq!(reports[1].web_url, "https://sp/zeta");
}

#[tokio::test]
async fn test_retrieval_uses_hybrid_semantic_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(search_path()))
        .and(body_partial_json(json!({
            "search": "pricing",
            "queryType": "semantic",
            "semanticConfiguration": "default-semantic-config",
            "filter": "fileName eq 'Partner''s deck.pptx' and fileExtension eq '.pptx'",
            "top": 1000,
            "vectorQueries": [
                { "text": "pricing", "kind": "text", "fields": "embedding", "k": 1000 }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "fileName": "Partner's deck.pptx", "webUrl": "https://sp/deck", "slideNumber": 10, "embeddingContext": "Ten" },
                { "fileName": "Partner's deck.pptx", "webUrl": "https://sp/deck", "slideNumber": 2, "embeddingContext": "", "embeddingContent": "Two raw" },
                { "fileName": "Partner's deck.pptx", "webUrl": "https://sp/deck", "slideNumber": null, "embeddingContext": "No number" },
                { "fileName": "Partner's deck.pptx", "webUrl": "https://sp/deck", "slideNumber": 2, "embeddingContext": "Two duplicate" },
                { "fileName": "Partner's deck.pptx", "webUrl": "https://sp/deck", "slideNumber": "Appendix", "embeddingContext": "Extra" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server)
        .retrieve_powerpoint_report("Partner's deck.pptx", "pricing")
        .await
        .unwrap();

    assert_eq!(report.web_url, "https://sp/deck");
    let labels: Vec<&str> = report.slides.iter().map(|s| s.slide_number.as_str()).collect();
    assert_eq!(labels, vec!["2", "10", "Appendix", "Unknown"]);
    assert_eq!(report.slides[0].content, "Two raw");
}

#[tokio::test]
async fn test_retrieval_with_no_hits_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(search_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(&server)
        .await;

    let report = client_for(&server)
        .retrieve_powerpoint_report("Missing.pptx", "anything")
        .await
        .unwrap();
    assert_eq!(report.web_url, "");
    assert!(report.slides.is_empty());
}

#[tokio::test]
async fn test_retrieval_requires_file_name() {
    let server = MockServer::start().await;
    let result = client_for(&server).retrieve_powerpoint_report("  ", "q").await;
    assert!(matches!(result, Err(ResearchError::Validation { .. })));
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(search_path()))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).discover_powerpoint_reports("q").await;
    assert!(matches!(result, Err(ResearchError::Authentication { .. })));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(search_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(search_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "fileName": "Recovered.pptx", "webUrl": "https://sp/r" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reports = client_for(&server).discover_powerpoint_reports("q").await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].file_name, "Recovered.pptx");
}
