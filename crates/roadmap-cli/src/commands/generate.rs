use clap::Args;

use roadmap_sync::GenerationClient;

use super::Context;
use crate::output;

#[derive(Args)]
pub struct GenerateArgs {
    /// What the project is about
    description: String,
}

pub async fn run(ctx: &Context, args: GenerateArgs) -> anyhow::Result<()> {
    let description = args.description.trim();
    if description.is_empty() {
        anyhow::bail!("a project description is required");
    }

    let http = ctx.http()?;
    let url = ctx
        .config
        .generate_url(Some(http.base_url()))
        .ok_or_else(|| anyhow::anyhow!("no generate_url configured"))?;
    let client = GenerationClient::new(http, url);
    let token = ctx.identity().map(|i| i.access_token);

    let store = ctx.store()?;
    let session = roadmap_sync::Session::new(
        ctx.editor(&store),
        std::sync::Arc::new(roadmap_sync::LocalGateway::new(store)),
    );
    session
        .generate(&client, description, token.as_deref())
        .await?;
    session.save_if_dirty().await?;
    ctx.forget_remote(Some(description.to_string()))?;

    let editor = session.editor();
    let editor = editor.read().await;
    println!("{}", output::render_roadmap(editor.roadmap(), editor.registry()));
    Ok(())
}
