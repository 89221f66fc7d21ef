//! Agent input and output types

use serde::{Deserialize, Serialize};

/// A task handed to a tool agent by the research planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTask {
    /// The knowledge gap this task addresses
    pub focus_gap: String,
    /// Name of the agent expected to run the task
    pub agent: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_website: Option<String>,
}

impl AgentTask {
    /// Render the task as the user prompt of an agent run
    pub fn to_prompt(&self) -> String {
        let mut prompt = format!("Query: {}\nKnowledge gap: {}", self.query, self.focus_gap);
        if let Some(website) = self.entity_website.as_deref().filter(|w| !w.is_empty()) {
            prompt.push_str(&format!("\nEntity website: {}", website));
        }
        prompt
    }
}

/// Result of a tool agent run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAgentOutput {
    /// Summary of the findings
    pub output: String,
    /// Cited sources (URLs or report links)
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ToolAgentOutput {
    /// Schema description embedded in agent instructions
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "title": "ToolAgentOutput",
            "type": "object",
            "properties": {
                "output": { "type": "string", "description": "Summary of the findings" },
                "sources": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Sources cited in the summary"
                }
            },
            "required": ["output", "sources"]
        })
    }
}

/// Parse agent input, which is either an `AgentTask` as JSON or a plain query
pub fn parse_agent_input(input: &str) -> Option<AgentTask> {
    serde_json::from_str::<AgentTask>(input.trim()).ok()
}
