//! Agent that researches a query on the web

use crate::agent::ResearchAgent;
use crate::llm_client::{ChatModel, ResearchLlmClient};
use crate::llm_config::{model_supports_structured_output, LlmConfig};
use crate::tools::{ToolRegistry, WebSearchTool};
use crate::types::ToolAgentOutput;
use researcher_core::ResearchResult;
use researcher_search::WebSearchProvider;
use std::sync::Arc;

pub const WEB_SEARCH_AGENT_NAME: &str = "WebSearchAgent";

pub fn instructions() -> String {
    format!(
        r#"You are a research assistant that searches the web and summarizes what you find.

Use the web_search tool to find information relevant to the query. You may search several times with refined queries. If an entity website is given, prefer sources from it.

Write a concise summary of the findings that directly addresses the query, and list the URLs you relied on as sources. Do not invent sources.

Your final answer must be JSON only, matching this schema. Do not output anything else:
{}"#,
        ToolAgentOutput::json_schema()
    )
}

pub fn build_search_agent(
    model: Arc<dyn ChatModel>,
    structured_output: bool,
    provider: Arc<dyn WebSearchProvider>,
) -> ResearchAgent {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(WebSearchTool::new(provider)));

    ResearchAgent::new(WEB_SEARCH_AGENT_NAME, instructions(), model)
        .with_tools(tools)
        .with_structured_output(structured_output)
}

/// Create the web search agent on the fast model
pub async fn init_search_agent(
    config: &LlmConfig,
    provider: Arc<dyn WebSearchProvider>,
) -> ResearchResult<ResearchAgent> {
    let selected = &config.fast;
    let model = ResearchLlmClient::new(selected.clone()).await?;
    Ok(build_search_agent(
        Arc::new(model),
        model_supports_structured_output(selected),
        provider,
    ))
}
