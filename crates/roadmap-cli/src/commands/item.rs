use clap::{Args, Subcommand};

use roadmap_core::snapshot::ItemSnapshot;
use roadmap_core::{Command, Effect, ValidationError};

use super::Context;

#[derive(Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Subcommand)]
enum ItemCommand {
    /// Append an item to a milestone
    Add {
        milestone: String,
        #[arg(short, long, default_value = "")]
        text: String,
        /// Status name (default: first status)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Remove an item
    Remove { milestone: String, item: String },
    /// Move an item, possibly into another milestone (0-based index)
    Move {
        from: String,
        item: String,
        to: String,
        index: usize,
    },
    /// Change the text
    Text {
        milestone: String,
        item: String,
        text: String,
    },
    /// Change the status
    Status {
        milestone: String,
        item: String,
        status: String,
    },
}

pub async fn run(ctx: &Context, args: ItemArgs) -> anyhow::Result<()> {
    let command = match args.command {
        ItemCommand::Add {
            milestone,
            text,
            status,
        } => {
            if let Some(status) = &status {
                let store = ctx.store()?;
                if !ctx.editor(&store).registry().contains(status) {
                    return Err(ValidationError::UnknownStatus(status.clone()).into());
                }
            }
            Command::AddItem {
                milestone,
                data: Some(ItemSnapshot {
                    id: None,
                    text,
                    status: status.unwrap_or_default(),
                }),
            }
        }
        ItemCommand::Remove { milestone, item } => Command::RemoveItem { milestone, item },
        ItemCommand::Move {
            from,
            item,
            to,
            index,
        } => Command::MoveItem {
            from_milestone: from,
            item,
            to_milestone: to,
            to_index: index,
        },
        ItemCommand::Text {
            milestone,
            item,
            text,
        } => Command::SetItemText {
            milestone,
            item,
            text,
        },
        ItemCommand::Status {
            milestone,
            item,
            status,
        } => Command::SetItemStatus {
            milestone,
            item,
            status,
        },
    };

    let (_, effect) = ctx.edit(command).await?;
    match effect {
        Effect::ItemCreated(id) => println!("Created item: {id}"),
        _ => println!("Item updated"),
    }
    Ok(())
}
