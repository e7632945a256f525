//! Pincer CLI — the main entry point.
//!
//! Commands:
//! - `init`  — write a default config file
//! - `tools` — print the assembled tool catalog
//! - `chat`  — interactive chat or single-message mode

use clap::{Parser, Subcommand};
use pincer_config::RuntimeConfig;
use std::path::PathBuf;

mod commands;
mod user;

#[derive(Parser)]
#[command(
    name = "pincer",
    about = "Pincer — an interruptible, tool-using agent runtime",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load configuration from this file instead of ~/.pincer/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Print the assembled tool catalog, including remote servers
    Tools,

    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RuntimeConfig::load_from(path)?,
        None => RuntimeConfig::load()?,
    };

    // RUST_LOG wins; then --verbose; then the configured filter.
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.filter.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Tools => commands::tools::run(config).await?,
        Commands::Chat { message } => commands::chat::run(config, message).await?,
    }

    Ok(())
}
