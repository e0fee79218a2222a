pub mod auth;
pub mod autosave;
pub mod error;
pub mod gateway;
pub mod generate;
pub mod http_client;
pub mod local;
pub mod memory;
pub mod remote;
pub mod session;

pub use auth::{AuthProvider, HttpAuthProvider, Identity, SignUpOutcome};
pub use autosave::{AutosaveHandle, AutosaveScheduler, SaveIndicator, SaveOutcome};
pub use error::{AuthError, GatewayError, GenerationError, SyncError};
pub use gateway::{DocumentId, DocumentSummary, PersistenceGateway, SaveMode, SaveReceipt};
pub use generate::GenerationClient;
pub use http_client::HttpClient;
pub use local::LocalGateway;
pub use memory::MemoryGateway;
pub use remote::{DocumentBinding, RemoteGateway};
pub use session::{follow_identity, LoadReport, Session};
