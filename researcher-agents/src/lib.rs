//! Researcher Agents - LLM-driven tool agents
//!
//! Agents combine a chat model (through siumai) with search tools and return
//! a [`ToolAgentOutput`] summary with sources.

pub mod agent;
pub mod azure_search_agent;
pub mod llm_client;
pub mod llm_config;
pub mod parse_output;
pub mod search_agent;
pub mod tools;
pub mod types;

pub use agent::{ResearchAgent, DEFAULT_MAX_TURNS};
pub use azure_search_agent::{build_azure_search_agent, init_azure_search_agent};
pub use llm_client::{AgentMessage, ChatModel, MessageRole, ResearchLlmClient};
pub use llm_config::{model_supports_structured_output, LlmConfig, ModelConfig};
pub use parse_output::{parse_strict_output, parse_typed_output};
pub use search_agent::{build_search_agent, init_search_agent};
pub use tools::{
    create_azure_search_tools, AgentTool, DiscoverReportsTool, RetrieveReportTool, ToolRegistry,
    WebSearchTool,
};
pub use types::{parse_agent_input, AgentTask, ToolAgentOutput};
