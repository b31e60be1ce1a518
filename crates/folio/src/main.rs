//! Folio - content file lifecycle and reconciliation
//!
//! Main entry point for the Folio CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{cleanup, config, copy, delete, list, save, scan, upload};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Folio - content file lifecycle and reconciliation
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding config.toml (default: platform config dir)
    #[arg(long, global = true, env = "FOLIO_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a file to temporary storage
    Upload(upload::UploadArgs),

    /// Save content and reconcile its files
    Save(save::SaveArgs),

    /// List the file references in a parameter tree
    Scan(scan::ScanArgs),

    /// Remove expired temporary files
    Cleanup(cleanup::CleanupArgs),

    /// Delete a content object and its files
    Delete(delete::DeleteArgs),

    /// Duplicate a content object and its files
    Copy(copy::CopyArgs),

    /// List stored content objects
    List(list::ListArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = folio_config::load_config_with_options(None, cli.config_dir.as_deref())?;
    let config = loaded.config;

    // Initialize tracing: console (human-readable) + optional rotating JSON file
    let filter = if cli.verbose {
        "folio=debug,folio_content=debug,folio_semantics=debug,folio_storage=debug,folio_config=debug,info"
    } else {
        "folio=info,folio_content=info,folio_storage=info,warn"
    };

    let logging = config.logging();
    let (file_layer, _guard) = if logging.file_logging {
        let log_dir = logging
            .log_dir
            .clone()
            .or_else(|| {
                cli.config_dir
                    .clone()
                    .or_else(folio_config::user_config_dir)
                    .map(|d| d.join("logs"))
            })
            .unwrap_or_else(|| PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "folio.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (Some(non_blocking), Some(guard))
    } else {
        (None, None)
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "folio=trace,folio_content=trace,folio_semantics=trace,folio_storage=trace,folio_config=trace,info",
                ))
        }))
        .init();

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    // Create context for commands
    let ctx = commands::Context {
        config,
        config_sources: loaded.sources,
        config_dir: cli.config_dir,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Upload(args) => upload::run(args, &ctx).await,
        Commands::Save(args) => save::run(args, &ctx).await,
        Commands::Scan(args) => scan::run(args, &ctx).await,
        Commands::Cleanup(args) => cleanup::run(args, &ctx).await,
        Commands::Delete(args) => delete::run(args, &ctx).await,
        Commands::Copy(args) => copy::run(args, &ctx).await,
        Commands::List(args) => list::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
