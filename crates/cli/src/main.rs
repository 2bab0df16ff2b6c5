//! Companion CLI
//!
//! Main entry point for the companion command-line tool.
//! Answers messages through the retrieval-augmented chat pipeline, either
//! once from the terminal or continuously over HTTP.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{ChatCommand, PromptsCommand, ServeCommand};
use companion_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Companion - a caring chatbot grounded in your indexed content
#[derive(Parser, Debug)]
#[command(name = "companion")]
#[command(about = "A caring chatbot grounded in your indexed content", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "COMPANION_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output (NO_COLOR is also honoured)
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Completion provider (groq, openai, ollama)
    #[arg(short, long, global = true, env = "COMPANION_LLM_PROVIDER")]
    provider: Option<String>,

    /// Completion model identifier
    #[arg(short, long, global = true, env = "COMPANION_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one message and print the reply
    Chat(ChatCommand),

    /// Serve the chat endpoint over HTTP
    Serve(ServeCommand),

    /// List persona prompts available to `persona.promptFile`
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // File layers are merged inside the loader, before environment variables
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())
        .context("Failed to load configuration")?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.json_logs,
    );

    config.validate()?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.json_logs)?;

    tracing::info!("Companion starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.llm.provider);
    tracing::debug!("Model: {}", config.llm.model);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Serve(_) => "serve",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
