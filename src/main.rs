//! Agency Directory
//!
//! Serves paginated, filterable agency listings and agency detail lookups
//! over a document store, with five-minute caching of pages and counts.

use agency_core::{DirectoryConfig, ListingService, LogFormat, SystemClock};
use agency_infra::{init_logger, open_store, LoggerConfig};
use agency_serve::{ServerBuilder, ServerConfig};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "agency-directory")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Agency Directory - paginated, filterable agency listings")]
#[command(long_about = r#"
Agency Directory serves a listing of agencies filtered by service and location
tags, ten per page, sorted by name. Pages and match counts are cached for five
minutes.

The store is either an in-memory collection seeded from a JSON file or a
Firestore collection reached over its REST API.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,

        /// JSON seed file for the memory store (overrides configuration)
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Load and validate configuration
    Validate,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DirectoryConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }
    init_logger(LoggerConfig::from(&config.logging))?;

    info!("Starting Agency Directory v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Serve { host, port, seed }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if seed.is_some() {
                config.store.seed_path = seed;
            }
            handle_serve(config).await?;
        }
        Some(Commands::Validate) => handle_validate(&config)?,
        Some(Commands::Version) | None => handle_version(),
    }

    Ok(())
}

async fn handle_serve(config: DirectoryConfig) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    let store = open_store(&config.store).context("Failed to open agency store")?;
    let listing = Arc::new(ListingService::new(
        store,
        Arc::new(SystemClock),
        config.cache.max_capacity,
    ));

    let server = ServerBuilder::with_config(ServerConfig::from(&config.server)).build(listing);
    server.start().await?;
    Ok(())
}

fn handle_validate(config: &DirectoryConfig) -> anyhow::Result<()> {
    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Store backend: {}", config.store.backend);
            println!("  Cache capacity: {}", config.cache.max_capacity);
            Ok(())
        }
        Err(e) => {
            println!("Configuration is invalid: {}", e);
            Err(e.into())
        }
    }
}

fn handle_version() {
    println!("agency-directory {}", env!("CARGO_PKG_VERSION"));
    println!("  core:  {}", agency_core::VERSION);
    println!("  infra: {}", agency_infra::VERSION);
    println!("  serve: {}", agency_serve::VERSION);
}
