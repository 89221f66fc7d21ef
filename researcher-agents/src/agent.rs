//! Tool-using research agent
//!
//! The agent runs a plain-text protocol over any [`ChatModel`]: a reply that
//! is a JSON object `{"tool": name, "arguments": {...}}` is a tool call, and
//! the tool result is sent back as the next user message. Any other reply is
//! the final answer and must parse as [`ToolAgentOutput`].

use crate::llm_client::{AgentMessage, ChatModel};
use crate::parse_output::{parse_strict_output, parse_typed_output};
use crate::tools::ToolRegistry;
use crate::types::{parse_agent_input, ToolAgentOutput};
use researcher_core::{ErrorContext, ResearchError, ResearchResult};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_TURNS: usize = 10;

const TOOL_PROTOCOL: &str = r#"To call a tool, reply with only a JSON object of the form {"tool": "<tool name>", "arguments": {<arguments>}}. Call one tool per reply; the result arrives in the next message.
When you have gathered enough information, reply with only the final JSON object."#;

#[derive(Debug, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

/// An LLM agent with a fixed set of tools
pub struct ResearchAgent {
    name: String,
    instructions: String,
    tools: ToolRegistry,
    model: Arc<dyn ChatModel>,
    structured_output: bool,
    max_turns: usize,
}

impl ResearchAgent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: ToolRegistry::new(),
            model,
            structured_output: false,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Require the final answer to be a bare JSON document
    pub fn with_structured_output(mut self, structured_output: bool) -> Self {
        self.structured_output = structured_output;
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn structured_output(&self) -> bool {
        self.structured_output
    }

    fn system_prompt(&self) -> String {
        if self.tools.is_empty() {
            return self.instructions.clone();
        }
        format!(
            "{}\n\nAvailable tools:\n{}\n\n{}",
            self.instructions,
            self.tools.describe(),
            TOOL_PROTOCOL
        )
    }

    fn parse_tool_call(&self, reply: &str) -> Option<ToolCall> {
        if self.tools.is_empty() {
            return None;
        }
        parse_typed_output::<ToolCall>(reply).ok()
    }

    fn parse_final(&self, reply: &str) -> ResearchResult<ToolAgentOutput> {
        if self.structured_output {
            parse_strict_output(reply)
        } else {
            parse_typed_output(reply)
        }
    }

    /// Run the agent on an `AgentTask` JSON document or a plain query
    pub async fn run(&self, input: &str) -> ResearchResult<ToolAgentOutput> {
        let run_id = Uuid::new_v4();
        let prompt = parse_agent_input(input)
            .map(|task| task.to_prompt())
            .unwrap_or_else(|| input.trim().to_string());

        info!(
            agent = %self.name,
            run_id = %run_id,
            model = %self.model.model_info(),
            "Starting agent run"
        );

        let mut messages = vec![
            AgentMessage::system(self.system_prompt()),
            AgentMessage::user(prompt),
        ];

        for turn in 1..=self.max_turns {
            let reply = self.model.complete(&messages).await?;
            messages.push(AgentMessage::assistant(reply.clone()));

            if let Some(call) = self.parse_tool_call(&reply) {
                debug!(agent = %self.name, run_id = %run_id, turn, tool = %call.tool, "Tool call");
                let result = self.tools.invoke(&call.tool, call.arguments).await;
                messages.push(AgentMessage::user(format!(
                    "Result of {}:\n{}",
                    call.tool, result
                )));
                continue;
            }

            match self.parse_final(&reply) {
                Ok(output) => {
                    info!(
                        agent = %self.name,
                        run_id = %run_id,
                        turns = turn,
                        sources = output.sources.len(),
                        "Agent run completed"
                    );
                    return Ok(output);
                }
                Err(e) if turn < self.max_turns => {
                    warn!(
                        agent = %self.name,
                        run_id = %run_id,
                        error = %e,
                        "Unparseable reply, asking again"
                    );
                    messages.push(AgentMessage::user(format!(
                        "Your reply could not be parsed ({}). Reply with a tool call or with the final JSON object only.",
                        e
                    )));
                }
                Err(e) => {
                    return Err(ResearchError::Agent {
                        message: format!(
                            "No final answer after {} turns: {}",
                            self.max_turns, e
                        ),
                        agent: self.name.clone(),
                        context: ErrorContext::new("agent")
                            .with_operation("run")
                            .with_metadata("run_id", &run_id.to_string()),
                    });
                }
            }
        }

        Err(ResearchError::Agent {
            message: format!("No final answer after {} turns", self.max_turns),
            agent: self.name.clone(),
            context: ErrorContext::new("agent")
                .with_operation("run")
                .with_metadata("run_id", &run_id.to_string()),
        })
    }
}
