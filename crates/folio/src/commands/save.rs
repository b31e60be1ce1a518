//! Save command - commit content and reconcile its files.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use console::{Style, style};
use folio_content::FileOutcome;
use folio_types::{ContentId, ContentMetadata, LibraryName};
use serde_json::Value;

use super::{Context, read_json};

/// Arguments for the save command.
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Parameters JSON file
    #[arg(short, long)]
    pub params: PathBuf,

    /// Metadata JSON file (h5p.json)
    #[arg(short, long)]
    pub metadata: PathBuf,

    /// Existing content id to update
    #[arg(long)]
    pub id: Option<String>,

    /// Main library, e.g. "H5P.Image 1.1" (default: from metadata)
    #[arg(short, long)]
    pub library: Option<LibraryName>,

    /// Owner performing the save
    #[arg(short, long)]
    pub owner: String,
}

/// Run the save command.
pub async fn run(args: SaveArgs, ctx: &Context) -> Result<()> {
    let params: Value = read_json(&args.params)?;
    let metadata: ContentMetadata = read_json(&args.metadata)?;
    let library = match args.library {
        Some(library) => library,
        None => metadata
            .main_library_name()
            .cloned()
            .with_context(|| {
                format!(
                    "main library {} is not among the preloaded dependencies",
                    metadata.main_library
                )
            })?,
    };
    let id = args.id.map(ContentId::from);

    let report = ctx
        .storer()
        .add_or_update_content(id.as_ref(), params, &metadata, &library, &args.owner)
        .await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let green = Style::new().green();
    let yellow = Style::new().yellow();
    let red = Style::new().red();
    let dim = Style::new().dim();

    let verb = if report.updated { "Updated" } else { "Created" };
    println!("{} {} content: {}", green.apply_to("✓"), verb, report.content_id);

    if report.outcomes.is_empty() {
        return Ok(());
    }
    println!();
    println!("{}", style("Files").bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    for file in &report.outcomes {
        match &file.outcome {
            FileOutcome::Copied => println!("  {} {}", green.apply_to("copied "), file.path),
            FileOutcome::Pasted { new_path } => println!(
                "  {} {} {}",
                green.apply_to("pasted "),
                file.path,
                dim.apply_to(format!("→ {new_path}"))
            ),
            FileOutcome::Blanked { reason } => println!(
                "  {} {} {}",
                red.apply_to("blanked"),
                file.path,
                dim.apply_to(format!("({reason})"))
            ),
            FileOutcome::Skipped { reason } => println!(
                "  {} {} {}",
                yellow.apply_to("kept   "),
                file.path,
                dim.apply_to(format!("({reason})"))
            ),
            FileOutcome::OrphanDeleted => {
                println!("  {} {}", dim.apply_to("removed"), file.path)
            }
            FileOutcome::OrphanDeleteFailed { reason } => println!(
                "  {} {} {}",
                yellow.apply_to("stale  "),
                file.path,
                dim.apply_to(format!("({reason})"))
            ),
        }
    }
    if ctx.verbose {
        println!();
        println!("{}", serde_json::to_string_pretty(&report.params)?);
    }
    Ok(())
}
