//! sectiondb CLI
//!
//! Main entry point for the sectiondb command-line tool.
//! Loads knowledge sections into Milvus and searches them by embedding.

mod commands;

use clap::{Parser, Subcommand};
use commands::{DropCommand, LoadCommand, QueryCommand, StatsCommand};
use sectiondb_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// sectiondb - knowledge sections on Milvus
#[derive(Parser, Debug)]
#[command(name = "sectiondb")]
#[command(about = "Store and search knowledge sections in Milvus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./sectiondb.yaml when present)
    #[arg(short, long, global = true, env = "SECTIONDB_CONFIG")]
    config: Option<PathBuf>,

    /// Milvus server address
    #[arg(short, long, global = true, env = "SECTIONDB_ADDR")]
    addr: Option<String>,

    /// Collection name
    #[arg(long, global = true, env = "SECTIONDB_COLLECTION")]
    collection: Option<String>,

    /// Embedding dimension
    #[arg(short, long, global = true, env = "SECTIONDB_DIM")]
    dim: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert sections from a JSON file
    Load(LoadCommand),

    /// Search the collection with an embedding
    Query(QueryCommand),

    /// Show collection statistics
    Stats(StatsCommand),

    /// Drop the collection
    Drop(DropCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.addr,
        cli.collection,
        cli.dim,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("sectiondb starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Milvus address: {}", config.milvus.addr);
    tracing::debug!("Collection: {}", config.milvus.collection);

    let command_name = match &cli.command {
        Commands::Load(_) => "load",
        Commands::Query(_) => "query",
        Commands::Stats(_) => "stats",
        Commands::Drop(_) => "drop",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Load(cmd) => cmd.execute(&config).await,
        Commands::Query(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Drop(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
