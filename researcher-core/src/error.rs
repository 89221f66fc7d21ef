//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type ResearchResult<T> = Result<T, ResearchError>;

/// Boxed source error carried by the variants that wrap a lower-level failure
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the researcher workspace
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Search error ({provider}): {message}")]
    Search {
        message: String,
        provider: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after_ms: Option<u64>,
        context: ErrorContext,
    },

    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },

    #[error("Agent error ({agent}): {message}")]
    Agent {
        message: String,
        agent: String,
        context: ErrorContext,
    },

    #[error("Output parse error: {message}")]
    OutputParse {
        message: String,
        preview: String,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },
}

impl ResearchError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ResearchError::Config { context, .. } => Some(context),
            ResearchError::Validation { context, .. } => Some(context),
            ResearchError::Search { context, .. } => Some(context),
            ResearchError::Network { context, .. } => Some(context),
            ResearchError::Authentication { context, .. } => Some(context),
            ResearchError::NotFound { context, .. } => Some(context),
            ResearchError::Timeout { context, .. } => Some(context),
            ResearchError::RateLimit { context, .. } => Some(context),
            ResearchError::Llm { context, .. } => Some(context),
            ResearchError::Agent { context, .. } => Some(context),
            ResearchError::OutputParse { context, .. } => Some(context),
            ResearchError::Internal { context, .. } => Some(context),
            ResearchError::Io(_) | ResearchError::Serialization(_) => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ResearchError::Network { .. }
                | ResearchError::Timeout { .. }
                | ResearchError::RateLimit { .. }
        )
    }

    /// Get retry delay in milliseconds for recoverable errors
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            ResearchError::Network { .. } => Some(1000),
            ResearchError::Timeout { .. } => Some(2000),
            ResearchError::RateLimit { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            ResearchError::Internal { .. } => {
                error!(error_id = ?error_id, error = %self, "Internal error occurred");
            }
            ResearchError::Config { .. } | ResearchError::Validation { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration or validation error");
            }
            ResearchError::Network { .. }
            | ResearchError::Timeout { .. }
            | ResearchError::RateLimit { .. } => {
                warn!(
                    error_id = ?error_id,
                    error = %self,
                    "Network, timeout or rate limit error (may be recoverable)"
                );
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::ResearchError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your environment or .env file")
                .with_suggestion("Run 'researcher config check' to validate the configuration"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ResearchError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your environment or .env file"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::ResearchError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! search_error {
    ($msg:expr, $provider:expr, $component:expr) => {
        $crate::ResearchError::Search {
            message: $msg.to_string(),
            provider: $provider.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $provider:expr, $component:expr, $source:expr) => {
        $crate::ResearchError::Search {
            message: $msg.to_string(),
            provider: $provider.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::ResearchError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the resource name or index")
                .with_suggestion("Check if the resource exists and is accessible"),
        }
    };
}
