//! Researcher CLI - configuration tooling and search agents from the command line

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use researcher_agents::{init_azure_search_agent, init_search_agent, LlmConfig};
use researcher_core::env::load_dotenv;
use researcher_core::performance::measure_async;
use researcher_core::{
    init_logging, lint_env_file, log_operation_error, log_operation_start, log_operation_success,
    render_template, LoggingConfig, ResearcherConfig,
};
use researcher_search::{create_web_search, AzureSearchClient, AzureSearchConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "researcher")]
#[command(about = "Deep researcher configuration and search tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Env file to load instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Query the Azure AI Search report index
    Azure {
        #[command(subcommand)]
        action: AzureAction,
    },

    /// Run a web search with the configured provider
    Search {
        query: String,
    },

    /// Run a research agent
    Agent {
        #[command(subcommand)]
        agent: AgentKind,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with secrets masked
    Show,
    /// Validate the effective configuration
    Check,
    /// Print the .env template
    Template,
    /// Lint an env file against the documented variables
    Lint { file: PathBuf },
}

#[derive(Subcommand)]
enum AzureAction {
    /// Find PowerPoint reports relevant to a query
    Discover { query: String },
    /// Retrieve the slides of one report
    Retrieve { file_name: String, query: String },
}

#[derive(Subcommand)]
enum AgentKind {
    /// Answer from the PowerPoint report knowledge base
    Azure { query: String },
    /// Answer from the web
    Web { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting researcher CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config { action } => handle_config(action, cli.env_file).await,
        Commands::Azure { action } => {
            let config = load_config(cli.env_file)?;
            handle_azure(action, &config).await
        }
        Commands::Search { query } => {
            let config = load_config(cli.env_file)?;
            handle_search(&query, &config).await
        }
        Commands::Agent { agent } => {
            let config = load_config(cli.env_file)?;
            handle_agent(agent, &config).await
        }
    }
}

fn load_config(env_file: Option<PathBuf>) -> anyhow::Result<ResearcherConfig> {
    load_dotenv(env_file.as_deref())?;
    let config = ResearcherConfig::from_process_env()?;
    for warning in config.validate().warnings {
        warn!(field = %warning.field, "{}", warning.message);
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn handle_config(action: ConfigAction, env_file: Option<PathBuf>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(env_file)?;
            print!("{}", config.redacted().to_toml()?);
        }
        ConfigAction::Check => {
            let config = load_config(env_file)?;
            let report = config.validate();
            print_json(&report)?;
            if !report.is_valid() {
                bail!("configuration has {} error(s)", report.errors.len());
            }
        }
        ConfigAction::Template => {
            print!("{}", render_template());
        }
        ConfigAction::Lint { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let report = lint_env_file(&content);
            print_json(&report)?;
            if !report.is_valid() {
                bail!("{} has {} error(s)", file.display(), report.errors.len());
            }
        }
    }
    Ok(())
}

async fn handle_azure(action: AzureAction, config: &ResearcherConfig) -> anyhow::Result<()> {
    let client = AzureSearchClient::new(AzureSearchConfig::from_config(config)?)?;

    match action {
        AzureAction::Discover { query } => {
            log_operation_start!("azure_discover", query = %query);
            let reports = client.discover_powerpoint_reports(&query).await.map_err(|e| {
                log_operation_error!("azure_discover", e);
                e
            })?;
            log_operation_success!("azure_discover", reports = reports.len());
            print_json(&reports)
        }
        AzureAction::Retrieve { file_name, query } => {
            log_operation_start!("azure_retrieve", file_name = %file_name);
            let report = client
                .retrieve_powerpoint_report(&file_name, &query)
                .await
                .map_err(|e| {
                    log_operation_error!("azure_retrieve", e);
                    e
                })?;
            log_operation_success!("azure_retrieve", slides = report.slides.len());
            print_json(&report)
        }
    }
}

async fn handle_search(query: &str, config: &ResearcherConfig) -> anyhow::Result<()> {
    let provider = create_web_search(config)?;
    log_operation_start!("web_search", provider = provider.name());
    let response = provider.search(query).await.map_err(|e| {
        log_operation_error!("web_search", e);
        e
    })?;
    log_operation_success!("web_search", results = response.results.len());
    print_json(&response)
}

async fn handle_agent(agent: AgentKind, config: &ResearcherConfig) -> anyhow::Result<()> {
    let llm_config = LlmConfig::from_config(config)?;

    let (agent, query) = match agent {
        AgentKind::Azure { query } => {
            let client = AzureSearchClient::new(AzureSearchConfig::from_config(config)?)?;
            (init_azure_search_agent(&llm_config, client).await?, query)
        }
        AgentKind::Web { query } => {
            let provider = create_web_search(config)?;
            (init_search_agent(&llm_config, provider).await?, query)
        }
    };

    log_operation_start!("agent_run", agent = agent.name());
    let output = measure_async("agent_run", agent.run(&query)).await.map_err(|e| {
        log_operation_error!("agent_run", e);
        e
    })?;
    log_operation_success!("agent_run", sources = output.sources.len());
    print_json(&output)
}
