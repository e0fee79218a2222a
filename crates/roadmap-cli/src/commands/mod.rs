pub mod auth;
pub mod document;
pub mod edit;
pub mod export;
pub mod generate;
pub mod item;
pub mod milestone;
pub mod persist;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Subcommand;
use tokio::sync::watch;

use roadmap_core::types::Roadmap;
use roadmap_core::{Command, Editor, Effect, StatusRegistry};
use roadmap_store::SlotStore;
use roadmap_sync::{HttpClient, Identity, LocalGateway, RemoteGateway, Session};

use crate::auth_store::{self, AuthProfile};
use crate::config::Config;
use crate::state::{self, RemoteState};

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new, empty roadmap
    New(document::NewArgs),
    /// Show the working roadmap
    Show,
    /// Rename the working roadmap
    Rename(document::RenameArgs),
    /// Manage milestones
    Milestone(milestone::MilestoneArgs),
    /// Manage checklist items
    Item(item::ItemArgs),
    /// Manage the status list
    Status(status::StatusArgs),
    /// Save the working roadmap to the configured backend
    Save,
    /// Load a roadmap from the configured backend
    Load(persist::LoadArgs),
    /// List roadmaps stored for the signed-in account
    List,
    /// Generate a roadmap from a project description
    Generate(generate::GenerateArgs),
    /// Sign up, sign in and out
    Auth(auth::AuthArgs),
    /// Export the working roadmap
    Export(export::ExportArgs),
    /// Interactive editing with autosave
    Edit,
}

impl Commands {
    pub async fn run(self, ctx: &Context) -> anyhow::Result<()> {
        match self {
            Commands::New(args) => document::new(ctx, args).await,
            Commands::Show => document::show(ctx).await,
            Commands::Rename(args) => document::rename(ctx, args).await,
            Commands::Milestone(args) => milestone::run(ctx, args).await,
            Commands::Item(args) => item::run(ctx, args).await,
            Commands::Status(args) => status::run(ctx, args).await,
            Commands::Save => persist::save(ctx).await,
            Commands::Load(args) => persist::load(ctx, args).await,
            Commands::List => persist::list(ctx).await,
            Commands::Generate(args) => generate::run(ctx, args).await,
            Commands::Auth(args) => auth::run(ctx, args).await,
            Commands::Export(args) => export::run(ctx, args).await,
            Commands::Edit => edit::run(ctx).await,
        }
    }
}

/// Settings and stores shared by every command.
pub struct Context {
    pub config: Config,
    pub profile: String,
}

impl Context {
    pub fn new(config: Config, profile: String) -> Self {
        Self { config, profile }
    }

    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        self.config.data_dir()
    }

    pub fn store(&self) -> anyhow::Result<SlotStore> {
        let dir = self.data_dir()?;
        SlotStore::open_or_init(&dir)
            .with_context(|| format!("could not open roadmap data in {}", dir.display()))
    }

    /// Empty editor over the persisted status list.
    pub fn editor(&self, store: &SlotStore) -> Editor {
        let registry = StatusRegistry::load(Box::new(store.status_store()));
        Editor::new(Roadmap::default(), registry)
    }

    pub fn auth_profile(&self) -> Option<AuthProfile> {
        auth_store::resolve_profile(&self.profile)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.auth_profile().map(|p| p.to_identity())
    }

    pub fn base_url(&self) -> Option<String> {
        self.config
            .base_url
            .clone()
            .or_else(|| self.auth_profile().map(|p| p.base_url))
    }

    pub fn http(&self) -> anyhow::Result<HttpClient> {
        let base_url = self
            .base_url()
            .ok_or_else(|| anyhow::anyhow!("no base_url configured for the hosted backend"))?;
        Ok(HttpClient::new(&base_url))
    }

    /// The working roadmap, read from the local slot.
    pub async fn working_copy(&self) -> anyhow::Result<Session> {
        let store = self.store()?;
        let session = Session::new(self.editor(&store), Arc::new(LocalGateway::new(store)));
        session
            .load(None)
            .await
            .context("could not read the working roadmap")?;
        Ok(session)
    }

    /// Apply one edit to the working roadmap and write it back.
    pub async fn edit(&self, command: Command) -> anyhow::Result<(Session, Effect)> {
        let session = self.working_copy().await?;
        let effect = session.apply(command).await?;
        session.save_if_dirty().await?;
        Ok((session, effect))
    }

    /// Remote gateway bound to whatever the last run left it bound to.
    pub fn remote_gateway(&self) -> anyhow::Result<Arc<RemoteGateway>> {
        let remembered = state::load_remote_state(&self.data_dir()?);
        let (_, identity) = watch::channel(self.identity());
        let gateway = RemoteGateway::resume(
            self.http()?,
            identity,
            remembered.binding(),
            remembered.owner.clone(),
        );
        if let Some(purpose) = &remembered.purpose {
            roadmap_sync::PersistenceGateway::set_purpose(&gateway, purpose);
        }
        Ok(Arc::new(gateway))
    }

    pub fn remember(&self, gateway: &RemoteGateway) -> anyhow::Result<()> {
        let dir = self.data_dir()?;
        let mut remembered = state::load_remote_state(&dir);
        remembered.record(&gateway.binding(), self.identity().map(|i| i.user_id));
        state::save_remote_state(&dir, &remembered)
    }

    /// Next remote save creates a new document.
    pub fn forget_remote(&self, purpose: Option<String>) -> anyhow::Result<()> {
        let state = RemoteState {
            purpose,
            ..RemoteState::default()
        };
        state::save_remote_state(&self.data_dir()?, &state)
    }
}
