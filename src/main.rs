//! AstGraph proxy - ingest AST nodes and relationships into an object store

use astgraph::config::{self, ConfigOverrides};
use astgraph::store::HttpStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "astgraph-proxy")]
#[command(version)]
#[command(
    about = "AST graph ingestion proxy - writes AST nodes and typed edges into an object store"
)]
#[command(long_about = r#"
Serves the IngestAST RPC: a batch of AST nodes is written to the store as
ASTNode objects in one batched call, then each relationship is created as a
cross-reference, in order. Any store failure aborts the call.

Example usage:
  astgraph-proxy serve --store-host weaviate --store-port 8080
  astgraph-proxy ready
  astgraph-proxy init --path astgraph.toml
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for the store, then serve the RPC surface
    Serve {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Wait for the store to become ready and exit
    Ready {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Write a config file with default values
    Init {
        /// Where to write the config file
        #[arg(short, long, default_value = "astgraph.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Serve { overrides } => {
            let config = config::resolve_config(cli.config.as_deref(), overrides)?;
            tracing::info!("Starting AST graph proxy...");

            let store = HttpStore::connect(&config).await?;
            astgraph::server::start_server(&config, store).await?;
        }

        Commands::Ready { overrides } => {
            let config = config::resolve_config(cli.config.as_deref(), overrides)?;
            HttpStore::connect(&config).await?;
            println!("Store at {} is ready", config.store_base_url()?);
        }

        Commands::Init { path, force } => {
            config::write_config(&path, &astgraph::ProxyConfig::default(), force)?;
            println!("Wrote default config to {}", path.display());
        }
    }

    Ok(())
}
