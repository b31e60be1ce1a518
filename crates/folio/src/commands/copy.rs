//! Copy command - duplicate a content object.

use anyhow::Result;
use clap::Args;
use console::Style;
use folio_types::ContentId;

use super::Context;

/// Arguments for the copy command.
#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Content id to copy
    pub id: String,

    /// Owner of the copy
    #[arg(short, long)]
    pub owner: String,
}

/// Run the copy command.
pub async fn run(args: CopyArgs, ctx: &Context) -> Result<()> {
    let source = ContentId::from(args.id);
    let copy = ctx.storer().copy_content(&source, &args.owner).await?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "source": source, "content_id": copy }))?
        );
    } else {
        let green = Style::new().green();
        let dim = Style::new().dim();
        println!(
            "{} Copied content: {} {}",
            green.apply_to("✓"),
            copy,
            dim.apply_to(format!("(from {source})"))
        );
    }
    Ok(())
}
