//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};
use folio_config::FolioConfig;
use serde_json::json;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Write a config file holding the default settings
    Init {
        /// Create project-local config (./folio.toml) instead of user config
        #[arg(long)]
        local: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Init { local, force } => cmd_init(ctx, local, force),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let effective = ctx.config.resolved();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&effective)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let loaded: Vec<_> = ctx.config_sources.iter().filter(|s| s.loaded).collect();
    if loaded.is_empty() {
        println!("{}", dim.apply_to("No config files loaded (using defaults)"));
    } else {
        println!("{}", style("Config files:").bold());
        for source in loaded {
            println!("  {}", source.path.display());
        }
    }
    println!();
    print!("{}", effective.to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let sources: Vec<_> = ctx
            .config_sources
            .iter()
            .map(|s| json!({"path": s.path, "loaded": s.loaded}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&sources)?);
        return Ok(());
    }

    println!("Config file search order (later overrides earlier):\n");
    for source in &ctx.config_sources {
        let status = if source.loaded {
            style("✓ loaded").green()
        } else {
            style("· not found").dim()
        };
        println!("  {} {}", status, source.path.display());
    }
    Ok(())
}

fn cmd_init(ctx: &Context, local: bool, force: bool) -> Result<()> {
    let path = if local {
        folio_config::project_config_path(None)
    } else {
        user_config_file(ctx)?
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    folio_config::save_config(&FolioConfig::default().resolved(), &path)?;

    if ctx.json_output {
        println!("{}", json!({"path": path}));
    } else {
        println!("{} Created config file: {}", style("✓").green(), path.display());
    }
    Ok(())
}

fn user_config_file(ctx: &Context) -> Result<PathBuf> {
    match &ctx.config_dir {
        Some(dir) => Ok(folio_config::config_path_in(dir)),
        None => folio_config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}
