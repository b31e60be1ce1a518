//! Cleanup command - sweep expired temporary files.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the cleanup command.
#[derive(Args, Debug)]
pub struct CleanupArgs {}

/// Run the cleanup command.
pub async fn run(_args: CleanupArgs, ctx: &Context) -> Result<()> {
    let result = ctx.temporary().cleanup().await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    println!(
        "{} Removed {} of {} temporary files",
        green.apply_to("✓"),
        result.files_deleted,
        result.files_checked
    );
    if result.files_failed > 0 {
        let yellow = Style::new().yellow();
        println!(
            "  {}",
            yellow.apply_to(format!("{} could not be removed", result.files_failed))
        );
    }
    if ctx.verbose {
        for file in &result.deleted_files {
            println!("  {}", dim.apply_to(file));
        }
    }
    Ok(())
}
