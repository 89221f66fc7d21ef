//! Agent that answers questions from the internal PowerPoint report knowledge base
//!
//! Discovery always comes first: `discover_powerpoint_reports` finds relevant
//! file names, then `retrieve_powerpoint_report` fetches the slides of a
//! chosen report.

use crate::agent::ResearchAgent;
use crate::llm_client::{ChatModel, ResearchLlmClient};
use crate::llm_config::{model_supports_structured_output, LlmConfig};
use crate::tools::create_azure_search_tools;
use crate::types::ToolAgentOutput;
use researcher_core::ResearchResult;
use researcher_search::AzureSearchClient;
use std::sync::Arc;

pub const AZURE_SEARCH_AGENT_NAME: &str = "AzureSearchAgent";

pub fn instructions() -> String {
    format!(
        r#"You are a research assistant that specializes in retrieving and summarizing information from the internal knowledge base of PowerPoint reports.

You have two main capabilities:
1. PowerPoint Report Discovery: Use the discover_powerpoint_reports tool to find the most relevant PowerPoint reports for a query. Always use this first to identify which reports exist and are relevant (it searches by file name).
2. Specific PowerPoint Report Retrieval: Use the retrieve_powerpoint_report tool to get the content of a specific PowerPoint report. Only use this after you have identified a relevant file name in the discovery step. It returns the slides and their text.

When using these capabilities:
- Always start with discover_powerpoint_reports to find relevant file names
- Only use retrieve_powerpoint_report once you have a file name
- Always include citations (report name and link) in your summary
- Use headings and bullets to organize information when appropriate

Your final answer must be JSON only, matching this schema. Do not output anything else:
{}"#,
        ToolAgentOutput::json_schema()
    )
}

/// Assemble the agent around an existing model
pub fn build_azure_search_agent(
    model: Arc<dyn ChatModel>,
    structured_output: bool,
    client: Arc<AzureSearchClient>,
) -> ResearchAgent {
    ResearchAgent::new(AZURE_SEARCH_AGENT_NAME, instructions(), model)
        .with_tools(create_azure_search_tools(client))
        .with_structured_output(structured_output)
}

/// Create the Azure AI Search agent on the fast model
pub async fn init_azure_search_agent(
    config: &LlmConfig,
    client: AzureSearchClient,
) -> ResearchResult<ResearchAgent> {
    let selected = &config.fast;
    let model = ResearchLlmClient::new(selected.clone()).await?;
    Ok(build_azure_search_agent(
        Arc::new(model),
        model_supports_structured_output(selected),
        Arc::new(client),
    ))
}
