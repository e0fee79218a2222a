use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roadmap_core::{LoadOutcome, Snapshot};

use crate::error::GatewayError;

/// Who asked for a save. Manual saves report to the user, auto saves only to the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Manual,
    Auto,
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveMode::Manual => f.write_str("manual"),
            SaveMode::Auto => f.write_str("auto"),
        }
    }
}

/// Backend identifier of a stored roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// `None` for single-slot storage and for remote writes whose id could not be read back.
    pub id: Option<DocumentId>,
    pub mode: SaveMode,
}

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn save(&self, snapshot: &Snapshot, mode: SaveMode) -> Result<SaveReceipt, GatewayError>;

    /// `None` loads whatever the backend considers the current document.
    async fn load(&self, id: Option<&DocumentId>) -> Result<LoadOutcome, GatewayError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<DocumentSummary>, GatewayError>;

    /// Forget which stored document later saves target.
    fn detach(&self) {}

    /// Free-text description stored next to the document, where the backend keeps one.
    fn set_purpose(&self, _purpose: &str) {}
}
