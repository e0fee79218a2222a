pub mod command;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod generation;
pub mod hash;
pub mod id;
pub mod propagate;
pub mod registry;
pub mod snapshot;
pub mod types;

pub use command::{Command, Effect};
pub use editor::{ChangeNotifier, Editor};
pub use error::{CoreError, FormatError, ValidationError};
pub use hash::{snapshot_digest, SnapshotDigest};
pub use id::{ItemId, MilestoneId};
pub use registry::{StatusRegistry, StatusStore};
pub use snapshot::{LoadOutcome, Snapshot};
