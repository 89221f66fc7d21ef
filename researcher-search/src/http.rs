//! Shared HTTP plumbing for the search clients

use researcher_core::{ErrorContext, ResearchError, ResearchResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER, USER_AGENT};
use std::collections::HashMap;

/// Configuration for HTTP clients
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Additional headers sent with every request
    pub headers: HashMap<String, String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            user_agent: format!("deep-researcher/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
        }
    }
}

impl HttpClientConfig {
    /// Set additional header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

fn header_error(
    component: &str,
    message: String,
    source: impl std::error::Error + Send + Sync + 'static,
) -> ResearchError {
    ResearchError::Config {
        message,
        source: Some(Box::new(source)),
        context: ErrorContext::new(component).with_operation("create_client"),
    }
}

/// Create an HTTP client with common configuration
pub fn create_http_client(config: &HttpClientConfig) -> ResearchResult<reqwest::Client> {
    let mut headers = HeaderMap::new();

    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .map_err(|e| header_error("http_client", format!("Invalid user agent: {}", e), e))?,
    );

    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            header_error("http_client", format!("Invalid header name '{}': {}", key, e), e)
        })?;
        let mut value = HeaderValue::from_str(value).map_err(|e| {
            header_error(
                "http_client",
                format!("Invalid header value for '{}': {}", key, e),
                e,
            )
        })?;
        if is_secret_header(key) {
            value.set_sensitive(true);
        }
        headers.insert(name, value);
    }

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| ResearchError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

fn is_secret_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "api-key" | "x-api-key" | "authorization"
    )
}

/// Map a transport failure to a typed error
pub fn transport_error(err: reqwest::Error, provider: &str, operation: &str) -> ResearchError {
    let context = ErrorContext::new(provider).with_operation(operation);
    if err.is_timeout() {
        ResearchError::Timeout {
            operation: format!("{} {}", provider, operation),
            duration_ms: 0,
            context: context.with_suggestion("Increase the request timeout"),
        }
    } else if err.is_decode() {
        ResearchError::Search {
            message: format!("Failed to decode {} response: {}", provider, err),
            provider: provider.to_string(),
            source: Some(Box::new(err)),
            context,
        }
    } else {
        ResearchError::Network {
            message: format!("Request to {} failed: {}", provider, err),
            source: Some(Box::new(err)),
            context: context.with_suggestion("Check network connectivity and the endpoint URL"),
        }
    }
}

/// Convert a non-success HTTP response into a typed error
pub async fn handle_response_error(
    response: reqwest::Response,
    provider: &str,
    operation: &str,
) -> ResearchError {
    let status = response.status();
    let url = response.url().clone();
    let retry_after_ms = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs * 1000);

    let body = response.text().await.unwrap_or_default();
    let detail = if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body
    };
    let message = format!(
        "HTTP {} from {} for {}{}: {}",
        status.as_u16(),
        provider,
        url.host_str().unwrap_or_default(),
        url.path(),
        detail
    );
    let context = ErrorContext::new(provider)
        .with_operation(operation)
        .with_metadata("status", &status.as_u16().to_string());

    match status.as_u16() {
        401 | 403 => ResearchError::Authentication {
            message,
            context: context.with_suggestion("Check the API key for this provider"),
        },
        404 => ResearchError::NotFound {
            resource: message,
            context: context.with_suggestion("Check the endpoint and index name"),
        },
        429 => ResearchError::RateLimit {
            message,
            retry_after_ms,
            context: context.with_suggestion("Reduce request rate or wait before retrying"),
        },
        500..=599 => ResearchError::Network {
            message,
            source: None,
            context: context.with_suggestion("The service may be temporarily unavailable"),
        },
        _ => ResearchError::Search {
            message,
            provider: provider.to_string(),
            source: None,
            context: context.with_suggestion("Check the request parameters"),
        },
    }
}
