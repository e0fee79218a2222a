//! What the CLI remembers between runs about the remote copy of the working roadmap.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use roadmap_sync::{DocumentBinding, DocumentId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Title of a write whose id never came back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl RemoteState {
    pub fn binding(&self) -> DocumentBinding {
        match (&self.document_id, &self.unresolved_title) {
            (Some(id), _) => DocumentBinding::Bound(DocumentId::new(id.clone())),
            (None, Some(title)) => DocumentBinding::Unresolved {
                title: title.clone(),
            },
            (None, None) => DocumentBinding::Unbound,
        }
    }

    pub fn record(&mut self, binding: &DocumentBinding, owner: Option<String>) {
        self.owner = owner;
        match binding {
            DocumentBinding::Bound(id) => {
                self.document_id = Some(id.as_str().to_string());
                self.unresolved_title = None;
            }
            DocumentBinding::Unresolved { title } => {
                self.document_id = None;
                self.unresolved_title = Some(title.clone());
            }
            DocumentBinding::Unbound => {
                self.document_id = None;
                self.unresolved_title = None;
            }
        }
    }
}

fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join("remote.toml")
}

pub fn load_remote_state(data_dir: &Path) -> RemoteState {
    std::fs::read_to_string(state_path(data_dir))
        .ok()
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn save_remote_state(data_dir: &Path, state: &RemoteState) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    std::fs::write(state_path(data_dir), toml::to_string_pretty(state)?)?;
    Ok(())
}
