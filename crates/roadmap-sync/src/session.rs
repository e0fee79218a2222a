//! The editing session: one [`Editor`] behind a lock, a persistence backend
//! and, optionally, the autosave worker.
//!
//! Gateway and generation failures stop here. Callers get a [`SyncError`]
//! and the document is either unchanged or reset to empty, never half loaded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use roadmap_core::types::DEFAULT_ROADMAP_NAME;
use roadmap_core::{Command, Editor, Effect, FormatError, LoadOutcome, ValidationError};

use crate::auth::Identity;
use crate::autosave::{self, AutosaveHandle, AutosaveScheduler, SaveIndicator, SaveOutcome};
use crate::error::SyncError;
use crate::gateway::{DocumentId, DocumentSummary, PersistenceGateway, SaveMode};
use crate::generate::GenerationClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadReport {
    Loaded { name: String, milestones: usize },
    /// Nothing stored; the editor holds an empty roadmap.
    Empty,
}

pub struct Session {
    editor: Arc<RwLock<Editor>>,
    gateway: Arc<dyn PersistenceGateway>,
    autosave: Option<AutosaveHandle>,
}

impl Session {
    pub fn new(editor: Editor, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            editor: Arc::new(RwLock::new(editor)),
            gateway,
            autosave: None,
        }
    }

    /// Session whose every document mutation arms a debounced save.
    pub async fn with_autosave(
        editor: Editor,
        gateway: Arc<dyn PersistenceGateway>,
        delay: Duration,
    ) -> (Self, JoinHandle<()>) {
        let editor = Arc::new(RwLock::new(editor));
        let (handle, task) = AutosaveScheduler::spawn(editor.clone(), gateway.clone(), delay);
        editor.write().await.set_notifier(Arc::new(handle.clone()));
        (
            Self {
                editor,
                gateway,
                autosave: Some(handle),
            },
            task,
        )
    }

    pub fn editor(&self) -> Arc<RwLock<Editor>> {
        self.editor.clone()
    }

    pub fn save_indicator(&self) -> Option<watch::Receiver<SaveIndicator>> {
        self.autosave.as_ref().map(|h| h.indicator())
    }

    pub async fn apply(&self, command: Command) -> Result<Effect, ValidationError> {
        let result = self.editor.write().await.apply(command);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "edit rejected");
        }
        result
    }

    /// Save right away. With autosave running the save goes through the
    /// worker so it cannot overlap a debounced one.
    pub async fn save(&self) -> Result<SaveOutcome, SyncError> {
        match &self.autosave {
            Some(handle) => handle.save_now().await,
            None => autosave::persist(&self.editor, self.gateway.as_ref(), SaveMode::Manual, None).await,
        }
    }

    /// Save only when the document changed since the last save. Routed
    /// through the autosave worker when one is running.
    pub async fn save_if_dirty(&self) -> Result<SaveOutcome, SyncError> {
        match &self.autosave {
            Some(handle) => handle.save_pending().await,
            None => autosave::persist(&self.editor, self.gateway.as_ref(), SaveMode::Auto, None).await,
        }
    }

    pub async fn load(&self, id: Option<&DocumentId>) -> Result<LoadReport, SyncError> {
        let outcome = self.gateway.load(id).await?;
        let mut editor = self.editor.write().await;
        let failure = match outcome {
            LoadOutcome::Loaded(snapshot) => match editor.load(&snapshot) {
                Ok(()) => {
                    return Ok(LoadReport::Loaded {
                        name: editor.roadmap().name.clone(),
                        milestones: editor.roadmap().milestones.len(),
                    })
                }
                Err(e) => e,
            },
            LoadOutcome::NotFound => {
                editor.clear(DEFAULT_ROADMAP_NAME);
                return Ok(LoadReport::Empty);
            }
            LoadOutcome::IncompatibleFormat => FormatError::Incompatible,
            LoadOutcome::Corrupt(detail) => FormatError::Corrupt(detail),
        };
        tracing::warn!(error = %failure, "stored roadmap rejected, starting empty");
        editor.clear(DEFAULT_ROADMAP_NAME);
        Err(failure.into())
    }

    pub async fn list(&self) -> Result<Vec<DocumentSummary>, SyncError> {
        Ok(self.gateway.list().await?)
    }

    /// Start an empty roadmap. The next save creates a new stored document.
    pub async fn new_roadmap(&self, name: &str) {
        self.editor.write().await.clear(name);
        self.gateway.detach();
    }

    /// Replace the document with a generated roadmap. On failure the current
    /// document is left as it was.
    pub async fn generate(
        &self,
        client: &GenerationClient,
        description: &str,
        bearer_token: Option<&str>,
    ) -> Result<LoadReport, SyncError> {
        let generated = client.generate(description, bearer_token).await?;
        self.gateway.detach();
        self.gateway.set_purpose(description);
        let mut editor = self.editor.write().await;
        editor.replace_with_generated(&generated);
        Ok(LoadReport::Loaded {
            name: editor.roadmap().name.clone(),
            milestones: editor.roadmap().milestones.len(),
        })
    }

    /// Clear the document of the previous identity and list what the new one has stored.
    pub async fn on_identity_changed(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<DocumentSummary>, SyncError> {
        self.editor.write().await.on_identity_changed();
        self.gateway.detach();
        match identity {
            Some(_) => self.list().await,
            None => Ok(Vec::new()),
        }
    }

    /// Flush a pending autosave and stop the worker.
    pub async fn close(&self) {
        if let Some(handle) = &self.autosave {
            handle.shutdown().await;
        }
    }
}

/// React to every sign-in and sign-out until the sender goes away.
pub fn follow_identity(
    session: Arc<Session>,
    mut identity: watch::Receiver<Option<Identity>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while identity.changed().await.is_ok() {
            let current = identity.borrow_and_update().clone();
            match session.on_identity_changed(current.as_ref()).await {
                Ok(documents) => {
                    tracing::info!(count = documents.len(), "roadmaps available for identity")
                }
                Err(e) => tracing::warn!(error = %e, "could not list roadmaps after identity change"),
            }
        }
    })
}
