//! LLM client integration using siumai
//!
//! Agents talk to models through the [`ChatModel`] trait. The production
//! implementation wraps a siumai client; tests provide scripted models.

use crate::llm_config::ModelConfig;
use async_trait::async_trait;
use researcher_core::{
    with_timeout, ErrorContext, LlmProvider, ModelSpec, ResearchError, ResearchResult,
};
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Upper bound for a single chat completion
pub const CHAT_TIMEOUT_MS: u64 = 300_000;

/// Role of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A provider-independent conversation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMessage {
    pub role: MessageRole,
    pub content: String,
}

impl AgentMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat model that turns a conversation into a text reply
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[AgentMessage]) -> ResearchResult<String>;

    /// Provider and model name, for logs and errors
    fn model_info(&self) -> ModelSpec;
}

/// Chat client backed by siumai
pub struct ResearchLlmClient {
    client: Box<dyn LlmClient>,
    config: ModelConfig,
}

impl ResearchLlmClient {
    pub async fn new(config: ModelConfig) -> ResearchResult<Self> {
        let client = Self::build_client(&config).await?;

        info!(
            "Created LLM client for provider: {} with model: {}",
            config.provider, config.model
        );

        Ok(Self { client, config })
    }

    /// Build the siumai client for the configured provider
    ///
    /// Anthropic gets its native client. Every other provider exposes an
    /// OpenAI-compatible API and is reached through the OpenAI client with
    /// the provider's base URL.
    async fn build_client(config: &ModelConfig) -> ResearchResult<Box<dyn LlmClient>> {
        match config.provider {
            LlmProvider::Anthropic => {
                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&config.api_key)
                    .model(&config.model);

                if let Some(temperature) = config.temperature {
                    builder = builder.temperature(temperature);
                }
                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    llm_error(config, format!("Failed to build Anthropic client: {}", e))
                })?;

                Ok(Box::new(client))
            }
            _ => {
                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&config.api_key)
                    .model(&config.model)
                    .base_url(&config.base_url);

                if let Some(temperature) = config.temperature {
                    builder = builder.temperature(temperature);
                }
                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    llm_error(
                        config,
                        format!("Failed to build {} client: {}", config.provider, e),
                    )
                })?;

                Ok(Box::new(client))
            }
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[async_trait]
impl ChatModel for ResearchLlmClient {
    async fn complete(&self, messages: &[AgentMessage]) -> ResearchResult<String> {
        let start_time = Instant::now();
        debug!("Generating response with {} messages", messages.len());

        let messages: Vec<ChatMessage> = messages
            .iter()
            .map(|m| match m.role {
                MessageRole::System => ChatMessage::system(m.content.clone()).build(),
                MessageRole::User => ChatMessage::user(m.content.clone()).build(),
                MessageRole::Assistant => ChatMessage::assistant(m.content.clone()).build(),
            })
            .collect();

        let response = with_timeout(self.client.chat(messages), CHAT_TIMEOUT_MS, "llm_chat")
            .await?
            .map_err(|e| llm_error(&self.config, format!("LLM generation failed: {}", e)))?;

        let content = response
            .content_text()
            .map(|c| c.to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                llm_error(&self.config, "No text content in LLM response".to_string())
            })?;

        info!(
            "Generated response in {:?} ({} chars)",
            start_time.elapsed(),
            content.len()
        );
        Ok(content)
    }

    fn model_info(&self) -> ModelSpec {
        self.config.spec()
    }
}

fn llm_error(config: &ModelConfig, message: String) -> ResearchError {
    ResearchError::Llm {
        message,
        provider: Some(config.provider.to_string()),
        model: Some(config.model.clone()),
        context: ErrorContext::new("llm_client")
            .with_metadata("role", &config.role.to_string())
            .with_metadata("base_url", &config.base_url),
    }
}
