//! Azure AI Search client for the PowerPoint report knowledge base
//!
//! Two operations are exposed:
//! 1. Report discovery: find up to 750 relevant reports by file name.
//! 2. Report retrieval: fetch up to 1000 slide chunks of one report, ranked
//!    by a hybrid text + vector query with semantic reranking.

use crate::http::{create_http_client, handle_response_error, transport_error, HttpClientConfig};
use researcher_core::{
    retry_async, validation_error, AzureSearchSettings, ErrorContext, ResearchError,
    ResearchResult, ResearcherConfig, RetryConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

pub const API_VERSION: &str = "2024-07-01";
pub const VECTOR_FIELD: &str = "embedding";
pub const SELECT_FIELDS: &str =
    "embeddingContent, embeddingContext, fileName, webUrl, slideNumber, fileExtension";
pub const POWERPOINT_EXTENSION: &str = ".pptx";
pub const DISCOVERY_TOP: usize = 750;
pub const RETRIEVAL_TOP: usize = 1000;
pub const SEMANTIC_CONFIGURATION: &str = "default-semantic-config";
pub const UNKNOWN_SLIDE: &str = "Unknown";

const PROVIDER: &str = "azure_search";

/// Azure AI Search connection settings
#[derive(Debug, Clone)]
pub struct AzureSearchConfig {
    /// Service host such as `contoso.search.windows.net`, or a full base URL
    pub endpoint: String,
    pub api_key: String,
    pub index_name: String,
    pub api_version: String,
    pub http: HttpClientConfig,
    pub retry: RetryConfig,
}

impl AzureSearchConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            index_name: index_name.into(),
            api_version: API_VERSION.to_string(),
            http: HttpClientConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn from_settings(settings: &AzureSearchSettings) -> Self {
        Self::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
            settings.index_name.clone(),
        )
    }

    /// Extract the Azure settings from a full configuration
    pub fn from_config(config: &ResearcherConfig) -> ResearchResult<Self> {
        config
            .azure
            .as_ref()
            .map(Self::from_settings)
            .ok_or_else(incomplete_config_error)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Documents search endpoint of the configured index
    pub fn search_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        let base = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        };
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            base, self.index_name, self.api_version
        )
    }

    fn is_complete(&self) -> bool {
        [&self.endpoint, &self.api_key, &self.index_name]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

fn incomplete_config_error() -> ResearchError {
    ResearchError::Config {
        message: "Azure AI Search configuration is incomplete. Please set AZURE_SEARCH_ENDPOINT, AZURE_SEARCH_KEY, and AZURE_SEARCH_INDEX_NAME environment variables.".to_string(),
        source: None,
        context: ErrorContext::new(PROVIDER)
            .with_operation("configure")
            .with_suggestion("Set the three AZURE_SEARCH_* variables (optionally DR_-prefixed)"),
    }
}

/// A discovered report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRef {
    pub file_name: String,
    pub web_url: String,
}

/// One slide (or chunk) of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub slide_number: String,
    pub content: String,
}

/// Retrieved report content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerPointReport {
    pub file_name: String,
    pub web_url: String,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    search: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vector_queries: Vec<VectorQuery<'a>>,
    select: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_fields: Option<&'a str>,
    filter: String,
    top: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    semantic_configuration: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct VectorQuery<'a> {
    text: &'a str,
    kind: &'a str,
    fields: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchHit>,
}

/// A raw document returned by the index
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub slide_number: Option<Value>,
    #[serde(default)]
    pub embedding_context: Option<String>,
    #[serde(default)]
    pub embedding_content: Option<String>,
}

/// Quote a string literal for an OData filter
pub fn odata_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Deduplicate hits by file name (first wins) and sort by file name
pub fn dedupe_reports(hits: &[SearchHit]) -> Vec<ReportRef> {
    let mut unique: BTreeMap<&str, &str> = BTreeMap::new();
    for hit in hits {
        let Some(file_name) = hit.file_name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };
        unique
            .entry(file_name)
            .or_insert_with(|| hit.web_url.as_deref().unwrap_or_default());
    }
    unique
        .into_iter()
        .map(|(file_name, web_url)| ReportRef {
            file_name: file_name.to_string(),
            web_url: web_url.to_string(),
        })
        .collect()
}

/// Normalize a raw `slideNumber` value into a label
pub fn slide_label(raw: Option<&Value>) -> String {
    let label = match raw {
        None | Some(Value::Null) => return UNKNOWN_SLIDE.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };
    if label.is_empty() {
        UNKNOWN_SLIDE.to_string()
    } else {
        label
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SlideOrder<'a> {
    Numeric(i64),
    Label(&'a str),
    Unknown,
}

fn slide_order(label: &str) -> SlideOrder<'_> {
    if label == UNKNOWN_SLIDE {
        SlideOrder::Unknown
    } else if let Ok(n) = label.parse::<i64>() {
        SlideOrder::Numeric(n)
    } else {
        SlideOrder::Label(label)
    }
}

/// Deduplicate hits into slides and order them
///
/// Content prefers `embeddingContext` and falls back to `embeddingContent`.
/// Per slide number the first hit with non-empty content wins. Numeric slide
/// numbers sort first, then other labels, then `Unknown`.
pub fn collect_slides(hits: &[SearchHit]) -> Vec<Slide> {
    let mut slides: HashMap<String, Slide> = HashMap::new();
    for hit in hits {
        let slide_number = slide_label(hit.slide_number.as_ref());
        if slides.contains_key(&slide_number) {
            continue;
        }
        let content = hit
            .embedding_context
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(hit.embedding_content.as_deref())
            .unwrap_or_default();
        if content.is_empty() {
            continue;
        }
        slides.insert(
            slide_number.clone(),
            Slide {
                slide_number,
                content: content.to_string(),
            },
        );
    }

    let mut slides: Vec<Slide> = slides.into_values().collect();
    slides.sort_by(|a, b| slide_order(&a.slide_number).cmp(&slide_order(&b.slide_number)));
    slides
}

/// Azure AI Search client
pub struct AzureSearchClient {
    client: reqwest::Client,
    config: AzureSearchConfig,
}

impl AzureSearchClient {
    /// Create a new client, failing if any connection setting is blank
    pub fn new(config: AzureSearchConfig) -> ResearchResult<Self> {
        if !config.is_complete() {
            return Err(incomplete_config_error());
        }
        let http = config.http.clone().with_header("api-key", &config.api_key);
        let client = create_http_client(&http)?;

        info!(
            "Created Azure AI Search client for index {} at {}",
            config.index_name, config.endpoint
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AzureSearchConfig {
        &self.config
    }

    async fn search_once(
        &self,
        request: &SearchRequest<'_>,
        operation: &str,
    ) -> ResearchResult<SearchResponse> {
        let url = self.config.search_url();
        debug!("Posting Azure AI Search request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(e, PROVIDER, operation))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, PROVIDER, operation).await);
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| transport_error(e, PROVIDER, operation))
    }

    async fn search(
        &self,
        request: &SearchRequest<'_>,
        operation: &str,
    ) -> ResearchResult<Vec<SearchHit>> {
        let response = retry_async(
            || self.search_once(request, operation),
            &self.config.retry,
            operation,
        )
        .await?;
        Ok(response.value)
    }

    /// Find PowerPoint reports whose file name matches the query
    pub async fn discover_powerpoint_reports(&self, query: &str) -> ResearchResult<Vec<ReportRef>> {
        let request = SearchRequest {
            search: query,
            vector_queries: Vec::new(),
            select: "fileName,webUrl",
            search_fields: Some("fileName"),
            filter: format!("fileExtension eq {}", odata_quote(POWERPOINT_EXTENSION)),
            top: DISCOVERY_TOP,
            query_type: None,
            semantic_configuration: None,
        };

        let hits = self.search(&request, "discover_powerpoint_reports").await?;
        let reports = dedupe_reports(&hits);

        info!(
            query = query,
            hits = hits.len(),
            reports = reports.len(),
            "Discovered PowerPoint reports"
        );
        Ok(reports)
    }

    /// Retrieve the slides of one report most relevant to the query
    pub async fn retrieve_powerpoint_report(
        &self,
        file_name: &str,
        query: &str,
    ) -> ResearchResult<PowerPointReport> {
        if file_name.trim().is_empty() {
            return Err(validation_error!(
                "file_name must not be empty; run report discovery first",
                "file_name",
                PROVIDER
            ));
        }

        let request = SearchRequest {
            search: query,
            vector_queries: vec![VectorQuery {
                text: query,
                kind: "text",
                fields: VECTOR_FIELD,
                k: RETRIEVAL_TOP,
            }],
            select: SELECT_FIELDS,
            search_fields: None,
            filter: format!(
                "fileName eq {} and fileExtension eq {}",
                odata_quote(file_name),
                odata_quote(POWERPOINT_EXTENSION)
            ),
            top: RETRIEVAL_TOP,
            query_type: Some("semantic"),
            semantic_configuration: Some(SEMANTIC_CONFIGURATION),
        };

        let hits = self.search(&request, "retrieve_powerpoint_report").await?;
        let web_url = hits
            .first()
            .and_then(|hit| hit.web_url.clone())
            .unwrap_or_default();
        let slides = collect_slides(&hits);

        info!(
            file_name = file_name,
            hits = hits.len(),
            slides = slides.len(),
            "Retrieved PowerPoint report"
        );

        Ok(PowerPointReport {
            file_name: file_name.to_string(),
            web_url,
            slides,
        })
    }
}
