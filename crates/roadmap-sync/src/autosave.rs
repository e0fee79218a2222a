//! Debounced background saving.
//!
//! One worker task owns the timer and runs every save inline, so two saves
//! never overlap. Each trigger pushes the deadline out by the full delay;
//! a manual save runs immediately and disarms the timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use roadmap_core::{ChangeNotifier, Editor};

use crate::error::SyncError;
use crate::gateway::{PersistenceGateway, SaveMode, SaveReceipt};

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// Muted save state for display next to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveIndicator {
    Idle,
    Saving,
    Saved,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SaveReceipt),
    /// Nothing changed since the last save.
    Skipped,
}

enum Message {
    Trigger,
    Save(SaveMode, oneshot::Sender<Result<SaveOutcome, SyncError>>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<Message>,
    indicator: watch::Receiver<SaveIndicator>,
}

impl AutosaveHandle {
    /// (Re)arm the timer. Never blocks.
    pub fn trigger(&self) {
        if self.tx.send(Message::Trigger).is_err() {
            tracing::debug!("autosave worker stopped, trigger dropped");
        }
    }

    /// Save immediately, bypassing the debounce.
    pub async fn save_now(&self) -> Result<SaveOutcome, SyncError> {
        self.request(SaveMode::Manual).await
    }

    /// Save immediately unless the document is unchanged since the last save.
    pub async fn save_pending(&self) -> Result<SaveOutcome, SyncError> {
        self.request(SaveMode::Auto).await
    }

    async fn request(&self, mode: SaveMode) -> Result<SaveOutcome, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Save(mode, reply))
            .map_err(|_| SyncError::SchedulerStopped)?;
        rx.await.map_err(|_| SyncError::SchedulerStopped)?
    }

    /// Run a pending autosave, if one is armed, then stop the worker.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Message::Shutdown(reply)).is_ok() {
            let _ = rx.await;
        }
    }

    pub fn indicator(&self) -> watch::Receiver<SaveIndicator> {
        self.indicator.clone()
    }
}

impl ChangeNotifier for AutosaveHandle {
    fn document_changed(&self) {
        self.trigger();
    }
}

pub struct AutosaveScheduler {
    editor: Arc<RwLock<Editor>>,
    gateway: Arc<dyn PersistenceGateway>,
    delay: Duration,
    indicator: watch::Sender<SaveIndicator>,
}

impl AutosaveScheduler {
    pub fn spawn(
        editor: Arc<RwLock<Editor>>,
        gateway: Arc<dyn PersistenceGateway>,
        delay: Duration,
    ) -> (AutosaveHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (indicator, indicator_rx) = watch::channel(SaveIndicator::Idle);
        let scheduler = Self {
            editor,
            gateway,
            delay,
            indicator,
        };
        let task = tokio::spawn(scheduler.run(rx));
        (
            AutosaveHandle {
                tx,
                indicator: indicator_rx,
            },
            task,
        )
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<Message>) {
        let mut deadline: Option<Instant> = None;

        loop {
            let message = match deadline {
                Some(at) => {
                    tokio::select! {
                        message = rx.recv() => message,
                        _ = tokio::time::sleep_until(at) => {
                            deadline = None;
                            self.autosave().await;
                            continue;
                        }
                    }
                }
                None => rx.recv().await,
            };

            match message {
                Some(Message::Trigger) => {
                    deadline = Some(Instant::now() + self.delay);
                }
                Some(Message::Save(mode, reply)) => {
                    deadline = None;
                    let result = self.persist(mode).await;
                    let _ = reply.send(result);
                }
                Some(Message::Shutdown(reply)) => {
                    if deadline.take().is_some() {
                        self.autosave().await;
                    }
                    let _ = reply.send(());
                    break;
                }
                None => {
                    if deadline.is_some() {
                        self.autosave().await;
                    }
                    break;
                }
            }
        }
        tracing::debug!("autosave worker stopped");
    }

    /// Failures only reach the indicator and the log.
    async fn autosave(&self) {
        if let Err(e) = self.persist(SaveMode::Auto).await {
            tracing::warn!(error = %e, "autosave failed");
        }
    }

    async fn persist(&self, mode: SaveMode) -> Result<SaveOutcome, SyncError> {
        persist(&self.editor, self.gateway.as_ref(), mode, Some(&self.indicator)).await
    }
}

/// One save of the editor's current document. Auto saves skip an unchanged
/// document; manual saves always write.
pub(crate) async fn persist(
    editor: &RwLock<Editor>,
    gateway: &dyn PersistenceGateway,
    mode: SaveMode,
    indicator: Option<&watch::Sender<SaveIndicator>>,
) -> Result<SaveOutcome, SyncError> {
    let pending = {
        let editor = editor.read().await;
        match mode {
            SaveMode::Auto => editor.pending_save(),
            SaveMode::Manual => {
                let snapshot = editor.snapshot();
                let digest = roadmap_core::snapshot_digest(&snapshot);
                Some((snapshot, digest))
            }
        }
    };
    let Some((snapshot, digest)) = pending else {
        tracing::debug!("autosave skipped, document unchanged");
        return Ok(SaveOutcome::Skipped);
    };

    let show = |state: SaveIndicator| {
        if let Some(indicator) = indicator {
            indicator.send_replace(state);
        }
    };

    show(SaveIndicator::Saving);
    match gateway.save(&snapshot, mode).await {
        Ok(receipt) => {
            editor.write().await.mark_saved(digest);
            show(SaveIndicator::Saved);
            Ok(SaveOutcome::Saved(receipt))
        }
        Err(e) => {
            show(SaveIndicator::Failed(e.to_string()));
            Err(e.into())
        }
    }
}
