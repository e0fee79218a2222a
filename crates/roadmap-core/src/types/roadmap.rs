use crate::id::IdCounter;
use crate::types::{ChecklistItem, Milestone};

pub const DEFAULT_ROADMAP_NAME: &str = "Untitled Roadmap";

/// Root aggregate: a named, ordered list of milestones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roadmap {
    pub name: String,
    pub milestones: Vec<Milestone>,
    pub(crate) milestone_ids: IdCounter,
    pub(crate) item_ids: IdCounter,
}

impl Roadmap {
    pub fn milestone(&self, id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id().as_str() == id)
    }

    pub fn milestone_mut(&mut self, id: &str) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.id().as_str() == id)
    }

    pub fn milestone_index(&self, id: &str) -> Option<usize> {
        self.milestones.iter().position(|m| m.id().as_str() == id)
    }

    pub fn items(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.milestones.iter().flat_map(|m| m.items.iter())
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut ChecklistItem> {
        self.milestones.iter_mut().flat_map(|m| m.items.iter_mut())
    }

    pub fn item_count(&self) -> usize {
        self.milestones.iter().map(|m| m.items.len()).sum()
    }

    /// Highest milestone counter handed out so far.
    pub fn last_milestone_counter(&self) -> u64 {
        self.milestone_ids.last()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }
}

impl Default for Roadmap {
    fn default() -> Self {
        Self {
            name: DEFAULT_ROADMAP_NAME.to_string(),
            milestones: Vec::new(),
            milestone_ids: IdCounter::new(),
            item_ids: IdCounter::new(),
        }
    }
}
