//! Tools callable by research agents

use async_trait::async_trait;
use researcher_core::{validation_error, ResearchResult};
use researcher_search::{AzureSearchClient, WebSearchProvider};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// A function an agent may call
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;

    async fn call(&self, arguments: Value) -> ResearchResult<Value>;
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> ResearchResult<T> {
    serde_json::from_value(arguments).map_err(|e| {
        validation_error!(
            format!("Invalid arguments for {}: {}", tool, e),
            "arguments",
            "tools"
        )
    })
}

/// Ordered set of tools available to one agent
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn AgentTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn AgentTool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn AgentTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool catalogue as shown to the model
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| {
                format!(
                    "- {}: {}\n  arguments schema: {}",
                    t.name(),
                    t.description(),
                    t.parameters()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Call a tool by name
    ///
    /// Failures come back as `{"error": message}` so the model can react.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Value {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "Model requested an unknown tool");
            return json!({
                "error": format!(
                    "Unknown tool '{}'. Available tools: {}",
                    name,
                    self.names().join(", ")
                )
            });
        };

        debug!(tool = name, "Invoking tool");
        match tool.call(arguments).await {
            Ok(value) => value,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                json!({ "error": e.to_string() })
            }
        }
    }
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Deserialize)]
struct RetrieveArgs {
    file_name: String,
    query: String,
}

/// Finds PowerPoint reports in the knowledge base by file name
pub struct DiscoverReportsTool {
    client: Arc<AzureSearchClient>,
}

impl DiscoverReportsTool {
    pub fn new(client: Arc<AzureSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentTool for DiscoverReportsTool {
    fn name(&self) -> &'static str {
        "discover_powerpoint_reports"
    }

    fn description(&self) -> &'static str {
        "Find the PowerPoint reports most relevant to a query. Searches file names and returns a list of {file_name, web_url}. Always call this first."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Keywords to match against report names" }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value) -> ResearchResult<Value> {
        let args: QueryArgs = parse_arguments(self.name(), arguments)?;
        let reports = self.client.discover_powerpoint_reports(&args.query).await?;
        Ok(serde_json::to_value(reports)?)
    }
}

/// Retrieves the slides of one PowerPoint report
pub struct RetrieveReportTool {
    client: Arc<AzureSearchClient>,
}

impl RetrieveReportTool {
    pub fn new(client: Arc<AzureSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentTool for RetrieveReportTool {
    fn name(&self) -> &'static str {
        "retrieve_powerpoint_report"
    }

    fn description(&self) -> &'static str {
        "Retrieve the slide content of one PowerPoint report, ranked by relevance to a query. Only call this with a file_name returned by discover_powerpoint_reports."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_name": { "type": "string", "description": "Exact report file name from discovery" },
                "query": { "type": "string", "description": "What to look for in the report" }
            },
            "required": ["file_name", "query"]
        })
    }

    async fn call(&self, arguments: Value) -> ResearchResult<Value> {
        let args: RetrieveArgs = parse_arguments(self.name(), arguments)?;
        let report = self
            .client
            .retrieve_powerpoint_report(&args.file_name, &args.query)
            .await?;
        Ok(serde_json::to_value(report)?)
    }
}

/// Searches the web with the configured provider
pub struct WebSearchTool {
    provider: Arc<dyn WebSearchProvider>,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn WebSearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl AgentTool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web. Returns an optional summary and a list of {title, url, snippet}."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query" }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value) -> ResearchResult<Value> {
        let args: QueryArgs = parse_arguments(self.name(), arguments)?;
        let response = self.provider.search(&args.query).await?;
        Ok(serde_json::to_value(response)?)
    }
}

/// Tools backed by the Azure AI Search knowledge base
pub fn create_azure_search_tools(client: Arc<AzureSearchClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DiscoverReportsTool::new(client.clone())));
    registry.register(Arc::new(RetrieveReportTool::new(client)));
    registry
}
