use chrono::NaiveDate;

use crate::id::MilestoneId;
use crate::types::ChecklistItem;

pub const DEFAULT_MILESTONE_TITLE: &str = "New Milestone";
pub const DEFAULT_MILESTONE_PURPOSE: &str = "Describe the purpose of this milestone.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    id: MilestoneId,
    pub title: String,
    pub purpose: String,
    current_completion_date: Option<NaiveDate>,
    original_completion_date: Option<NaiveDate>,
    pub items: Vec<ChecklistItem>,
}

impl Milestone {
    pub(crate) fn new(id: MilestoneId) -> Self {
        Self {
            id,
            title: DEFAULT_MILESTONE_TITLE.to_string(),
            purpose: DEFAULT_MILESTONE_PURPOSE.to_string(),
            current_completion_date: None,
            original_completion_date: None,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> &MilestoneId {
        &self.id
    }

    pub fn current_completion_date(&self) -> Option<NaiveDate> {
        self.current_completion_date
    }

    /// Set once, the first time a completion date is committed.
    pub fn original_completion_date(&self) -> Option<NaiveDate> {
        self.original_completion_date
    }

    /// True once the target date has moved away from the original one.
    pub fn is_rescheduled(&self) -> bool {
        matches!(
            (self.current_completion_date, self.original_completion_date),
            (Some(current), Some(original)) if current != original
        )
    }

    pub fn item(&self, id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|i| i.id().as_str() == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut ChecklistItem> {
        self.items.iter_mut().find(|i| i.id().as_str() == id)
    }

    pub(crate) fn set_dates(&mut self, current: Option<NaiveDate>, original: Option<NaiveDate>) {
        self.current_completion_date = current;
        self.original_completion_date = original;
    }
}
