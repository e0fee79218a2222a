use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not a roadmap store: {0}")]
    NotAStore(PathBuf),
    #[error("lock contention on {0}")]
    LockContention(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] roadmap_core::CoreError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store format {0} is newer than this build understands")]
    UnsupportedFormat(u32),
    #[error("config error: {0}")]
    Config(String),
}
