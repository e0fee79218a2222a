use std::path::{Path, PathBuf};

use crate::StoreError;

/// Slot holding the current document. The suffix is bumped whenever the document schema changes.
pub const DOCUMENT_SLOT: &str = "roadmapGeneratorState_v2";
/// Slots written by retired schema versions. Never parsed, only detected.
pub const LEGACY_DOCUMENT_SLOTS: &[&str] = &["roadmapGeneratorState"];
pub const STATUS_SLOT: &str = "roadmapStatuses_v1";

#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slots_dir(&self) -> PathBuf {
        self.root.join("slots")
    }

    pub fn slot_file(&self, key: &str) -> PathBuf {
        self.slots_dir().join(format!("{key}.json"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("store.toml")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }

    pub fn create_dirs(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.slots_dir())?;
        std::fs::create_dir_all(self.exports_dir())?;
        Ok(())
    }
}
