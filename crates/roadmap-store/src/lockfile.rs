use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::StoreError;

/// A lock older than this was left behind by a crashed writer.
const STALE_AFTER: Duration = Duration::from_secs(30);

/// Exclusive `<slot>.lock` marker held while a slot is rewritten.
pub struct SlotLock {
    path: PathBuf,
    _handle: std::fs::File,
}

impl SlotLock {
    pub fn acquire(slot: &Path) -> Result<Self, StoreError> {
        let path = slot.with_extension("lock");
        let acquired = match create(&path) {
            Err(StoreError::LockContention(_)) if is_stale(&path) => {
                tracing::warn!(path = %path.display(), "removing stale slot lock");
                std::fs::remove_file(&path)?;
                create(&path)
            }
            other => other,
        };
        acquired.map_err(|e| match e {
            StoreError::LockContention(_) => StoreError::LockContention(slot.to_path_buf()),
            e => e,
        })
    }
}

fn create(path: &Path) -> Result<SlotLock, StoreError> {
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(handle) => Ok(SlotLock {
            path: path.to_path_buf(),
            _handle: handle,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(StoreError::LockContention(path.to_path_buf()))
        }
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn is_stale(path: &Path) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| SystemTime::now().duration_since(t).ok())
        .is_some_and(|age| age > STALE_AFTER)
}

impl Drop for SlotLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
