//! Upload command - add a file to temporary storage.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;
use serde::Serialize;

use super::Context;

/// Arguments for the upload command.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    /// Owner of the upload
    #[arg(short, long)]
    pub owner: String,

    /// Name to store the file under (default: the file's name)
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    name: String,
    owner: String,
    reference: String,
}

/// Run the upload command.
pub async fn run(args: UploadArgs, ctx: &Context) -> Result<()> {
    let desired = match args.name {
        Some(name) => name,
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", args.file.display()))?,
    };
    let file = tokio::fs::File::open(&args.file)
        .await
        .with_context(|| format!("opening {}", args.file.display()))?;

    let name = ctx
        .temporary()
        .add_file(&desired, Box::new(file), &args.owner)
        .await?;
    let reference = format!("{name}{}", folio_semantics::TEMPORARY_MARKER);

    if ctx.json_output {
        let output = UploadOutput {
            name,
            owner: args.owner,
            reference,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let green = Style::new().green();
        let dim = Style::new().dim();
        println!("{} Uploaded: {}", green.apply_to("✓"), name);
        println!("  {} {}", dim.apply_to("Reference:"), reference);
    }
    Ok(())
}
