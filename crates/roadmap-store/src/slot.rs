use std::path::PathBuf;

use crate::layout::StoreLayout;
use crate::lockfile::SlotLock;
use crate::StoreError;

pub fn slot_path(layout: &StoreLayout, key: &str) -> PathBuf {
    layout.slot_file(key)
}

pub fn read_slot(layout: &StoreLayout, key: &str) -> Result<Option<String>, StoreError> {
    let path = slot_path(layout, key);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(Some(content))
}

/// Replace a slot's contents. Readers see either the old or the new bytes, never a mix.
pub fn write_slot(layout: &StoreLayout, key: &str, data: &str) -> Result<(), StoreError> {
    let path = slot_path(layout, key);
    let dir = layout.slots_dir();
    std::fs::create_dir_all(&dir)?;

    let _lock = SlotLock::acquire(&path)?;
    // Atomic write: temp file + rename
    let temp = tempfile::NamedTempFile::new_in(&dir)?;
    std::fs::write(temp.path(), data)?;
    temp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

pub fn delete_slot(layout: &StoreLayout, key: &str) -> Result<(), StoreError> {
    let path = slot_path(layout, key);
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

pub fn slot_exists(layout: &StoreLayout, key: &str) -> bool {
    slot_path(layout, key).exists()
}
