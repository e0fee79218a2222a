mod item;
mod milestone;
mod roadmap;
mod status;

pub use item::ChecklistItem;
pub use milestone::{Milestone, DEFAULT_MILESTONE_PURPOSE, DEFAULT_MILESTONE_TITLE};
pub use roadmap::{Roadmap, DEFAULT_ROADMAP_NAME};
pub use status::StatusDefinition;
