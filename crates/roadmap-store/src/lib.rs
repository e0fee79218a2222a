pub mod config;
pub mod error;
pub mod layout;
pub mod lockfile;
pub mod slot;
pub mod status_store;

pub use error::StoreError;
pub use status_store::FileStatusStore;

use std::path::Path;

use roadmap_core::snapshot::LoadOutcome;
use roadmap_core::Snapshot;

use crate::config::StoreConfig;
use crate::layout::{StoreLayout, LEGACY_DOCUMENT_SLOTS};

/// Single-slot local storage for one roadmap plus the status registry.
#[derive(Debug, Clone)]
pub struct SlotStore {
    layout: StoreLayout,
    config: StoreConfig,
}

impl SlotStore {
    pub fn init(root: &Path) -> Result<Self, StoreError> {
        let layout = StoreLayout::new(root);
        layout.create_dirs()?;
        let config = StoreConfig::default();
        config::write_config(&layout, &config)?;
        Ok(Self { layout, config })
    }

    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let layout = StoreLayout::new(root);
        if !layout.config_file().exists() {
            return Err(StoreError::NotAStore(root.to_path_buf()));
        }
        let config = config::read_config(&layout)?;
        config.check()?;
        Ok(Self { layout, config })
    }

    pub fn open_or_init(root: &Path) -> Result<Self, StoreError> {
        match Self::open(root) {
            Err(StoreError::NotAStore(_)) => Self::init(root),
            other => other,
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Slot key the document is read from and written to, as recorded in `store.toml`.
    pub fn document_slot(&self) -> &str {
        &self.config.document_slot
    }

    pub fn status_store(&self) -> FileStatusStore {
        FileStatusStore::new(self.layout.clone())
    }

    pub fn save_document(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        slot::write_slot(&self.layout, self.document_slot(), &json)?;
        tracing::debug!(name = %snapshot.roadmap_name, bytes = json.len(), "document slot written");
        Ok(())
    }

    pub fn load_document(&self) -> Result<LoadOutcome, StoreError> {
        match slot::read_slot(&self.layout, self.document_slot())? {
            Some(raw) => Ok(LoadOutcome::from_raw(&raw)),
            None if LEGACY_DOCUMENT_SLOTS
                .iter()
                .filter(|key| **key != self.document_slot())
                .any(|key| slot::slot_exists(&self.layout, key)) =>
            {
                Ok(LoadOutcome::IncompatibleFormat)
            }
            None => Ok(LoadOutcome::NotFound),
        }
    }

    pub fn clear_document(&self) -> Result<(), StoreError> {
        slot::delete_slot(&self.layout, self.document_slot())
    }
}
