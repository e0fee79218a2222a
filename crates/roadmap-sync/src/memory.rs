//! In-process backend holding saved snapshots in a vector.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use roadmap_core::{LoadOutcome, Snapshot};

use crate::error::GatewayError;
use crate::gateway::{DocumentId, DocumentSummary, PersistenceGateway, SaveMode, SaveReceipt};

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<(DocumentSummary, Snapshot)>,
    current: Option<DocumentId>,
    saves: Vec<SaveMode>,
    fail_next: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modes of every successful save, oldest first.
    pub fn saves(&self) -> Vec<SaveMode> {
        self.lock().saves.clone()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves.len()
    }

    pub fn stored(&self, id: &DocumentId) -> Option<Snapshot> {
        self.lock()
            .documents
            .iter()
            .find(|(s, _)| &s.id == id)
            .map(|(_, snap)| snap.clone())
    }

    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    /// Make the next save fail with a remote error carrying `message`.
    pub fn fail_next_save(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(&self, snapshot: &Snapshot, mode: SaveMode) -> Result<SaveReceipt, GatewayError> {
        let mut inner = self.lock();
        if let Some(message) = inner.fail_next.take() {
            return Err(GatewayError::Remote {
                status: 503,
                message,
            });
        }

        let id = match inner.current.clone() {
            Some(id) => {
                if let Some(entry) = inner.documents.iter_mut().find(|(s, _)| s.id == id) {
                    entry.0.title = snapshot.roadmap_name.clone();
                    entry.1 = snapshot.clone();
                }
                id
            }
            None => {
                let id = DocumentId::new(format!("doc-{}", inner.documents.len() + 1));
                let summary = DocumentSummary {
                    id: id.clone(),
                    title: snapshot.roadmap_name.clone(),
                    created_at: Utc::now(),
                };
                inner.documents.push((summary, snapshot.clone()));
                inner.current = Some(id.clone());
                id
            }
        };
        inner.saves.push(mode);
        Ok(SaveReceipt { id: Some(id), mode })
    }

    async fn load(&self, id: Option<&DocumentId>) -> Result<LoadOutcome, GatewayError> {
        let mut inner = self.lock();
        let Some(target) = id.cloned().or_else(|| inner.current.clone()) else {
            return Ok(LoadOutcome::NotFound);
        };
        let found = inner
            .documents
            .iter()
            .find(|(s, _)| s.id == target)
            .map(|(_, snap)| snap.clone());
        match found {
            Some(snapshot) => {
                inner.current = Some(target);
                Ok(LoadOutcome::Loaded(snapshot))
            }
            None => Ok(LoadOutcome::NotFound),
        }
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, GatewayError> {
        let mut summaries: Vec<_> = self.lock().documents.iter().map(|(s, _)| s.clone()).collect();
        summaries.reverse();
        Ok(summaries)
    }

    fn detach(&self) {
        self.lock().current = None;
    }
}
