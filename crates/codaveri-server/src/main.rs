//! MCP server exposing remote code execution to tool-calling agents
//!
//! Speaks MCP over stdio, so all logging goes to stderr. The `exec`
//! subcommand runs one file through the same pipeline without an agent, which
//! is handy for checking credentials and backend reachability.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codaveri_core::{
    CodaveriMcpServer, ConfigLoader, ExecutionClient, ExecutionConfig, Language, ToolFactory,
};
use log::LevelFilter;
use rmcp::{transport::stdio, ServiceExt};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Codaveri MCP server - run code remotely from an agent")]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(long, short, help = "YAML configuration file; environment variables override its values")]
    config: Option<PathBuf>,

    #[clap(long, help = "Backend base URL (overrides CODAVERI_API_BASE_URL)")]
    base_url: Option<String>,

    #[clap(long, short, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the executeCode tool over stdio (default command)
    Serve,
    /// Execute a single source file and print its output
    Exec {
        #[clap(long, short, help = "Language of the source file, e.g. python or rust")]
        language: String,

        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let result = run(cli).await;
    if let Err(e) = &result {
        log::error!("Fatal error in main(): {:#}", e);
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref(), cli.base_url).await?;
    let client = ExecutionClient::new(config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(client).await,
        Commands::Exec { language, file } => exec(client, &language, &file).await,
    }
}

async fn load_config(path: Option<&PathBuf>, base_url: Option<String>) -> Result<ExecutionConfig> {
    let mut config = match path {
        Some(path) => {
            log::info!("Loading configuration from file: {}", path.display());
            ConfigLoader::from_file(path).await?
        }
        None => {
            let mut config = ExecutionConfig::default();
            config.apply_env_overrides()?;
            config
        }
    };

    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    config.validate()?;

    log::debug!("Using configuration: {:?}", config);
    Ok(config)
}

async fn serve(client: ExecutionClient) -> Result<()> {
    let registry = ToolFactory::create_default_registry(client);
    let server = CodaveriMcpServer::new(registry);

    log::info!("Codaveri MCP server running on stdio");
    let service = server
        .serve(stdio())
        .await
        .context("Failed to start MCP service")?;
    let reason = service.waiting().await?;

    log::info!("Codaveri MCP server stopped: {:?}", reason);
    Ok(())
}

async fn exec(client: ExecutionClient, language: &str, file: &Path) -> Result<()> {
    let language: Language = language.parse()?;
    let code = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let output = client.execute(&code, language.as_str()).await?;
    print!("{}", output);
    Ok(())
}
