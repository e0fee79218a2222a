use std::path::PathBuf;

use clap::Args;

use roadmap_core::export::exporter_for;

use super::Context;

#[derive(Args)]
pub struct ExportArgs {
    /// markdown or json
    #[arg(short, long, default_value = "markdown")]
    format: String,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(ctx: &Context, args: ExportArgs) -> anyhow::Result<()> {
    let exporter = exporter_for(&args.format)
        .ok_or_else(|| anyhow::anyhow!("unsupported export format: {}", args.format))?;
    let session = ctx.working_copy().await?;
    let document = session.editor().read().await.export();
    let bytes = exporter.render(&document)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &bytes)?;
            println!("Exported {} to {}", exporter.format_id(), path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
        }
    }
    Ok(())
}
