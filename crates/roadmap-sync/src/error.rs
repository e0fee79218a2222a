use thiserror::Error;

use roadmap_core::{FormatError, ValidationError};

/// Failures of a persistence backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("please sign in to use remote storage")]
    Unauthenticated,
    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),
    #[error("remote store rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store error: {0}")]
    Store(#[from] roadmap_store::StoreError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("please sign in to generate a roadmap")]
    Unauthenticated,
    #[error("generation failed ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("generation returned incomplete data: {0}")]
    IncompleteData(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("authentication failed ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("unexpected auth response: {0}")]
    BadResponse(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("autosave worker has stopped")]
    SchedulerStopped,
}

impl SyncError {
    /// True when the user has to sign in before retrying.
    pub fn needs_sign_in(&self) -> bool {
        matches!(
            self,
            SyncError::Gateway(GatewayError::Unauthenticated)
                | SyncError::Generation(GenerationError::Unauthenticated)
                | SyncError::Auth(AuthError::NotSignedIn)
        )
    }
}
