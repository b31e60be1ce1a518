//! Scan command - list the file references in a parameter tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use folio_types::LibraryName;
use serde::Serialize;
use serde_json::Value;

use super::{Context, read_json};

/// Arguments for the scan command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Parameters JSON file
    #[arg(short, long)]
    pub params: PathBuf,

    /// Main library, e.g. "H5P.Image 1.1"
    #[arg(short, long)]
    pub library: LibraryName,
}

#[derive(Debug, Serialize)]
struct ReferenceOutput {
    path: String,
    mime_type: Option<String>,
    temporary: bool,
    location: String,
}

/// Run the scan command.
pub async fn run(args: ScanArgs, ctx: &Context) -> Result<()> {
    let params: Value = read_json(&args.params)?;
    let references = ctx.scanner().scan(&params, &args.library).await?;

    if ctx.json_output {
        let output: Vec<_> = references
            .into_iter()
            .map(|r| ReferenceOutput {
                path: r.file_path,
                mime_type: r.mime_type,
                temporary: r.temporary,
                location: r.location,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let yellow = Style::new().yellow();
    println!("{}", style(format!("File references ({})", args.library)).bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if references.is_empty() {
        println!("{}", dim.apply_to("No file references found"));
        return Ok(());
    }
    for reference in &references {
        let marker = if reference.temporary {
            yellow.apply_to(" [temporary]").to_string()
        } else {
            String::new()
        };
        println!(
            "  {}{} {}",
            reference.stripped_path(),
            marker,
            dim.apply_to(&reference.location)
        );
    }
    Ok(())
}
