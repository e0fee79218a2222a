//! `store.toml`: marks a directory as a roadmap store and pins its on-disk format.

use serde::{Deserialize, Serialize};

use crate::layout::{StoreLayout, DOCUMENT_SLOT};
use crate::StoreError;

/// Bumped together with the document slot key.
pub const STORE_FORMAT: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub format: u32,
    /// Slot key the current document lives under.
    pub document_slot: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            format: STORE_FORMAT,
            document_slot: DOCUMENT_SLOT.to_string(),
        }
    }
}

impl StoreConfig {
    /// Stores written by an older format are still opened; their document slot is
    /// detected as incompatible on load. A newer format cannot be read at all.
    pub fn check(&self) -> Result<(), StoreError> {
        if self.format > STORE_FORMAT {
            return Err(StoreError::UnsupportedFormat(self.format));
        }
        Ok(())
    }
}

pub fn write_config(layout: &StoreLayout, config: &StoreConfig) -> Result<(), StoreError> {
    let text = toml::to_string_pretty(config).map_err(|e| StoreError::Config(e.to_string()))?;
    std::fs::write(layout.config_file(), text)?;
    Ok(())
}

pub fn read_config(layout: &StoreLayout) -> Result<StoreConfig, StoreError> {
    let text = std::fs::read_to_string(layout.config_file())?;
    toml::from_str(&text).map_err(|e| StoreError::Config(e.to_string()))
}
