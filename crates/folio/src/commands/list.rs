//! List command - show stored content objects.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use super::Context;

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Owner used to read metadata
    #[arg(short, long, default_value = "")]
    pub owner: String,

    /// Also list each object's files
    #[arg(short, long)]
    pub files: bool,
}

#[derive(Debug, Serialize)]
struct ContentSummary {
    id: String,
    title: String,
    main_library: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<Vec<String>>,
}

/// Run the list command.
pub async fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let content = ctx.content();
    let mut summaries = Vec::new();
    for id in content.list_content().await? {
        let metadata = content.get_metadata(&id, &args.owner).await?;
        let files = if args.files {
            Some(content.list_content_files(&id, &args.owner).await?)
        } else {
            None
        };
        summaries.push(ContentSummary {
            id: id.to_string(),
            title: metadata.title,
            main_library: metadata.main_library,
            files,
        });
    }

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style("Content").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if summaries.is_empty() {
        println!("{}", dim.apply_to("No content found"));
        return Ok(());
    }
    for summary in &summaries {
        println!(
            "{} {} {}",
            dim.apply_to(format!("[{}]", summary.id)),
            summary.title,
            dim.apply_to(&summary.main_library)
        );
        for file in summary.files.iter().flatten() {
            println!("    {}", file);
        }
    }
    Ok(())
}
