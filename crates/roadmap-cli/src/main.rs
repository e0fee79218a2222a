use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod auth_store;
mod commands;
mod config;
mod error;
mod output;
mod state;

use commands::{Commands, Context};

#[derive(Parser)]
#[command(name = "roadmap", version, about = "Plan milestones, checklists and statuses")]
struct Cli {
    /// Config file (default: ~/.roadmap/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Auth profile
    #[arg(long, global = true, default_value = "default")]
    profile: String,
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::new(config::load_config(cli.config.as_deref()), cli.profile);

    if let Err(e) = cli.command.run(&ctx).await {
        eprintln!("{}", error::format_error(&e));
        std::process::exit(1);
    }
}
