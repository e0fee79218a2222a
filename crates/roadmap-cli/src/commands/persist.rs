use std::sync::Arc;

use clap::Args;

use roadmap_sync::{
    DocumentId, LoadReport, LocalGateway, PersistenceGateway, SaveMode, SaveOutcome, Session,
    SyncError,
};

use super::Context;
use crate::config::Backend;
use crate::output;

#[derive(Args)]
pub struct LoadArgs {
    /// Stored roadmap id (remote backend); default is the roadmap last saved or loaded
    id: Option<String>,
}

pub async fn save(ctx: &Context) -> anyhow::Result<()> {
    let working = ctx.working_copy().await?;
    match ctx.config.backend {
        Backend::Local => {
            if let SaveOutcome::Saved(_) = working.save().await? {
                println!("Saved to {}", ctx.data_dir()?.display());
            }
        }
        Backend::Remote => {
            let gateway = ctx.remote_gateway()?;
            let snapshot = working.editor().read().await.snapshot();
            let result = gateway.save(&snapshot, SaveMode::Manual).await;
            ctx.remember(&gateway)?;
            let receipt = result.map_err(SyncError::from)?;
            match receipt.id {
                Some(id) => println!("Saved roadmap {id}"),
                None => println!("Saved; the id will be looked up on the next save"),
            }
        }
    }
    Ok(())
}

pub async fn load(ctx: &Context, args: LoadArgs) -> anyhow::Result<()> {
    let id = args.id.map(DocumentId::new);
    let store = ctx.store()?;

    let report = match ctx.config.backend {
        Backend::Local => {
            let session = Session::new(ctx.editor(&store), Arc::new(LocalGateway::new(store)));
            session.load(id.as_ref()).await?
        }
        Backend::Remote => {
            let gateway = ctx.remote_gateway()?;
            let session = Session::new(ctx.editor(&store), gateway.clone());
            let report = session.load(id.as_ref()).await?;
            ctx.remember(&gateway)?;
            if let LoadReport::Loaded { .. } = report {
                let snapshot = session.editor().read().await.snapshot();
                LocalGateway::new(store)
                    .save(&snapshot, SaveMode::Manual)
                    .await
                    .map_err(SyncError::from)?;
            }
            report
        }
    };

    match report {
        LoadReport::Loaded { name, milestones } => {
            println!("Loaded {name} ({milestones} milestones)")
        }
        LoadReport::Empty => println!("No saved roadmap found"),
    }
    Ok(())
}

pub async fn list(ctx: &Context) -> anyhow::Result<()> {
    let documents = match ctx.config.backend {
        Backend::Local => {
            let store = ctx.store()?;
            LocalGateway::new(store).list().await.map_err(SyncError::from)?
        }
        Backend::Remote => ctx.remote_gateway()?.list().await.map_err(SyncError::from)?,
    };
    println!("{}", output::render_summaries(&documents));
    Ok(())
}
