//! Line-based editing shell. Each line is a command as JSON, e.g.
//! `{"action":"add_milestone"}`, or one of the words listed by `help`.

use std::sync::Arc;

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt, BufReader};

use roadmap_core::{Command, Effect, LoadOutcome};
use roadmap_sync::{
    LocalGateway, PersistenceGateway, SaveIndicator, SaveMode, SaveOutcome, Session, SyncError,
};

use super::Context;
use crate::config::Backend;
use crate::output;

const HELP: &str = r#"Commands:
  show                      print the roadmap
  statuses                  print the status list
  save                      save now
  help                      this text
  quit                      save pending changes and leave
  {"action": ...}           any edit, e.g.
      {"action":"add_milestone"}
      {"action":"set_milestone_date","milestone":"milestone-1","date":"2025-06-01"}
      {"action":"add_item","milestone":"milestone-1"}
      {"action":"rename_status","index":1,"name":"Active"}"#;

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let mut editor = ctx.editor(&store);
    let working = LocalGateway::new(store.clone());
    match working.load(None).await.map_err(SyncError::from)? {
        LoadOutcome::Loaded(snapshot) => editor
            .load(&snapshot)
            .context("could not read the working roadmap")?,
        LoadOutcome::NotFound => {}
        LoadOutcome::IncompatibleFormat => {
            return Err(SyncError::Format(roadmap_core::FormatError::Incompatible).into())
        }
        LoadOutcome::Corrupt(detail) => {
            return Err(SyncError::Format(roadmap_core::FormatError::Corrupt(detail)).into())
        }
    }

    let remote = match ctx.config.backend {
        Backend::Remote => Some(ctx.remote_gateway()?),
        Backend::Local => None,
    };
    let gateway: Arc<dyn PersistenceGateway> = match &remote {
        Some(remote) => remote.clone(),
        None => Arc::new(LocalGateway::new(store.clone())),
    };

    let (session, _worker) =
        Session::with_autosave(editor, gateway, ctx.config.autosave_delay()).await;
    let indicator = session.save_indicator().map(spawn_indicator);

    println!("Editing. Type `help` for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "show" => {
                let editor = session.editor();
                let editor = editor.read().await;
                println!("{}", output::render_roadmap(editor.roadmap(), editor.registry()));
            }
            "statuses" => {
                let editor = session.editor();
                println!("{}", output::render_statuses(editor.read().await.registry()));
            }
            "save" => match session.save().await {
                Ok(SaveOutcome::Saved(_)) | Ok(SaveOutcome::Skipped) => println!("Saved"),
                Err(e) => println!("Save failed: {e}"),
            },
            json => match serde_json::from_str::<Command>(json) {
                Ok(command) => match session.apply(command).await {
                    Ok(effect) => println!("{}", describe(&effect)),
                    Err(e) => println!("Rejected: {e}"),
                },
                Err(e) => println!("Not a command: {e}"),
            },
        }
    }

    session.close().await;
    if let Some(task) = indicator {
        task.abort();
    }

    if let Some(remote) = &remote {
        ctx.remember(remote)?;
        let snapshot = session.editor().read().await.snapshot();
        working
            .save(&snapshot, SaveMode::Auto)
            .await
            .map_err(SyncError::from)?;
    }
    Ok(())
}

fn describe(effect: &Effect) -> String {
    match effect {
        Effect::Unchanged => "No change".to_string(),
        Effect::Updated => "Updated".to_string(),
        Effect::MilestoneCreated(id) => format!("Created milestone {id}"),
        Effect::ItemCreated(id) => format!("Created item {id}"),
        Effect::StatusCreated(s) => format!("Added status {} {}", s.icon, s.name),
        Effect::StatusesRewritten(p) => format!("Status updated, {} items changed", p.len()),
        Effect::IconsRefreshed(p) => format!("Icon updated on {} items", p.len()),
    }
}

/// Print autosave results on stderr without interrupting input.
fn spawn_indicator(
    mut rx: tokio::sync::watch::Receiver<SaveIndicator>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state {
                SaveIndicator::Saved => eprintln!("  (saved)"),
                SaveIndicator::Failed(message) => eprintln!("  (autosave failed: {message})"),
                SaveIndicator::Idle | SaveIndicator::Saving => {}
            }
        }
    })
}
