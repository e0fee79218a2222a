use clap::{Args, Subcommand};

use roadmap_core::{Command, Effect};

use super::Context;
use crate::output;

#[derive(Args)]
pub struct StatusArgs {
    #[command(subcommand)]
    command: StatusCommand,
}

#[derive(Subcommand)]
enum StatusCommand {
    /// List statuses with their indexes
    List,
    /// Add a status
    Add {
        #[arg(default_value = "")]
        name: String,
        #[arg(default_value = "")]
        icon: String,
    },
    /// Rename a status; items using it follow
    Rename { index: usize, name: String },
    /// Remove a status; its items fall back to the first status
    Remove { index: usize },
    /// Change a status icon
    Icon { index: usize, icon: String },
}

pub async fn run(ctx: &Context, args: StatusArgs) -> anyhow::Result<()> {
    let command = match args.command {
        StatusCommand::List => {
            let store = ctx.store()?;
            println!("{}", output::render_statuses(ctx.editor(&store).registry()));
            return Ok(());
        }
        StatusCommand::Add { name, icon } => Command::AddStatus { name, icon },
        StatusCommand::Rename { index, name } => Command::RenameStatus { index, name },
        StatusCommand::Remove { index } => Command::RemoveStatus { index },
        StatusCommand::Icon { index, icon } => Command::SetStatusIcon { index, icon },
    };

    let (_, effect) = ctx.edit(command).await?;
    match effect {
        Effect::StatusCreated(status) => println!("Added status: {} {}", status.icon, status.name),
        Effect::StatusesRewritten(p) => println!("Status updated ({} items changed)", p.len()),
        Effect::IconsRefreshed(p) => println!("Icon updated ({} items use it)", p.len()),
        Effect::Unchanged => println!("Nothing to change"),
        _ => println!("Status updated"),
    }
    Ok(())
}
