use thiserror::Error;

/// Rejected edits. The model is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("status name cannot be empty")]
    EmptyStatusName,
    #[error("a status named '{0}' already exists")]
    DuplicateStatusName(String),
    #[error("status icon cannot be empty")]
    EmptyStatusIcon,
    #[error("cannot remove the last remaining status")]
    LastStatus,
    #[error("no status at index {0}")]
    StatusIndexOutOfRange(usize),
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),
    #[error("item not found: {0}")]
    ItemNotFound(String),
}

/// Stored or received data that cannot become a roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("incompatible format: this roadmap was saved by an older version and can no longer be loaded")]
    Incompatible,
    #[error("corrupt roadmap data: {0}")]
    Corrupt(String),
    #[error("incomplete data: {0}")]
    Incomplete(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("status store error: {0}")]
    StatusStore(String),
    #[error("export error: {0}")]
    Export(String),
}
