use clap::{Args, Subcommand};

use roadmap_core::document::parse_date;
use roadmap_core::snapshot::MilestoneSnapshot;
use roadmap_core::{Command, Effect};

use super::Context;

#[derive(Args)]
pub struct MilestoneArgs {
    #[command(subcommand)]
    command: MilestoneCommand,
}

#[derive(Subcommand)]
enum MilestoneCommand {
    /// Append a milestone
    Add {
        #[arg(short, long, default_value = "")]
        title: String,
        #[arg(short, long, default_value = "")]
        purpose: String,
        /// Target date, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Remove a milestone and its items
    Remove { id: String },
    /// Move a milestone to a new position (0-based)
    Move { id: String, index: usize },
    /// Change the title
    Title { id: String, title: String },
    /// Change the purpose
    Purpose { id: String, purpose: String },
    /// Change the target date; an empty value clears it
    Date { id: String, date: String },
}

pub async fn run(ctx: &Context, args: MilestoneArgs) -> anyhow::Result<()> {
    let command = match args.command {
        MilestoneCommand::Add {
            title,
            purpose,
            date,
        } => {
            let date = date.unwrap_or_default();
            if !date.trim().is_empty() {
                parse_date(&date)?;
            }
            Command::AddMilestone {
                data: Some(MilestoneSnapshot {
                    title,
                    purpose,
                    current_completion_date: date,
                    ..MilestoneSnapshot::default()
                }),
            }
        }
        MilestoneCommand::Remove { id } => Command::RemoveMilestone { milestone: id },
        MilestoneCommand::Move { id, index } => Command::MoveMilestone {
            milestone: id,
            to_index: index,
        },
        MilestoneCommand::Title { id, title } => Command::SetMilestoneTitle {
            milestone: id,
            title,
        },
        MilestoneCommand::Purpose { id, purpose } => Command::SetMilestonePurpose {
            milestone: id,
            purpose,
        },
        MilestoneCommand::Date { id, date } => Command::SetMilestoneDate {
            milestone: id,
            date,
        },
    };

    let (_, effect) = ctx.edit(command).await?;
    match effect {
        Effect::MilestoneCreated(id) => println!("Created milestone: {id}"),
        _ => println!("Milestone updated"),
    }
    Ok(())
}
