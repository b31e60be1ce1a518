//! Delete command - remove a content object and its files.

use anyhow::Result;
use clap::Args;
use console::Style;
use folio_types::ContentId;

use super::Context;

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Content id
    pub id: String,

    /// Owner performing the delete
    #[arg(short, long)]
    pub owner: String,
}

/// Run the delete command.
pub async fn run(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let id = ContentId::from(args.id);
    ctx.storer().delete_content(&id, &args.owner).await?;

    if ctx.json_output {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        let green = Style::new().green();
        println!("{} Deleted content: {}", green.apply_to("✓"), id);
    }
    Ok(())
}
