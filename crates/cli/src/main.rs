//! Baseera CLI
//!
//! Ask questions against the Quran/Hadith index and the web, inspect the
//! evidence for a question, ingest corpora, or run the HTTP service.

mod commands;

use baseera_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use clap::{Parser, Subcommand};
use commands::{AskCommand, ContextCommand, IngestCommand, ServeCommand};
use std::path::PathBuf;
use tracing::Instrument;

/// Baseera - bilingual Islamic Q&A over Quran, Hadith and the web
#[derive(Parser, Debug)]
#[command(name = "baseera")]
#[command(about = "Bilingual Islamic Q&A over Quran, Hadith and the web", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "BASEERA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "BASEERA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (azure, ollama)
    #[arg(short, long, global = true, env = "BASEERA_PROVIDER")]
    provider: Option<String>,

    /// Model or deployment name
    #[arg(short, long, global = true, env = "BASEERA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question and print the answer envelope
    Ask(AskCommand),

    /// Print the evidence assembled for a question, without calling the LLM
    Context(ContextCommand),

    /// Chunk, embed and store a corpus file
    Ingest(IngestCommand),

    /// Run the HTTP service
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // .env first so clap's env fallbacks see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // --workspace and --config decide which YAML file is merged
    let config = AppConfig::load_at(cli.workspace, cli.config, |key| std::env::var(key).ok())?
        .with_overrides(
            cli.provider,
            cli.model,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    logging::init_logging(
        config.log_level.as_deref(),
        config.no_color,
        LogFormat::parse(&config.log_format),
    )?;

    tracing::info!("Baseera starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Context(_) => "context",
        Commands::Ingest(_) => "ingest",
        Commands::Serve(_) => "serve",
    };
    let span = tracing::info_span!("command", name = command_name);

    let result = async {
        match cli.command {
            Commands::Ask(cmd) => cmd.execute(config).await,
            Commands::Context(cmd) => cmd.execute(&config).await,
            Commands::Ingest(cmd) => cmd.execute(&config).await,
            Commands::Serve(cmd) => cmd.execute(config).await,
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
