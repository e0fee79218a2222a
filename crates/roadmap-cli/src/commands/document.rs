use clap::Args;

use roadmap_core::Command;

use super::Context;
use crate::output;

#[derive(Args)]
pub struct NewArgs {
    /// Roadmap name
    name: String,
}

#[derive(Args)]
pub struct RenameArgs {
    name: String,
}

pub async fn new(ctx: &Context, args: NewArgs) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let session = roadmap_sync::Session::new(
        ctx.editor(&store),
        std::sync::Arc::new(roadmap_sync::LocalGateway::new(store)),
    );
    session.new_roadmap(&args.name).await;
    session.save().await?;
    ctx.forget_remote(None)?;

    let editor = session.editor();
    println!("Started roadmap: {}", editor.read().await.roadmap().name);
    Ok(())
}

pub async fn show(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.working_copy().await?;
    let editor = session.editor();
    let editor = editor.read().await;
    println!("{}", output::render_roadmap(editor.roadmap(), editor.registry()));
    Ok(())
}

pub async fn rename(ctx: &Context, args: RenameArgs) -> anyhow::Result<()> {
    let (session, _) = ctx.edit(Command::RenameRoadmap { name: args.name }).await?;
    let editor = session.editor();
    println!("Renamed roadmap: {}", editor.read().await.roadmap().name);
    Ok(())
}
