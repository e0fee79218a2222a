use serde::{Deserialize, Serialize};

use crate::id::{ItemId, MilestoneId};
use crate::propagate::Propagation;
use crate::snapshot::{ItemSnapshot, MilestoneSnapshot};
use crate::types::StatusDefinition;

/// Every edit a user can make to the document or the status registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    RenameRoadmap {
        name: String,
    },
    AddMilestone {
        #[serde(default)]
        data: Option<MilestoneSnapshot>,
    },
    RemoveMilestone {
        milestone: String,
    },
    MoveMilestone {
        milestone: String,
        to_index: usize,
    },
    SetMilestoneTitle {
        milestone: String,
        title: String,
    },
    SetMilestonePurpose {
        milestone: String,
        purpose: String,
    },
    SetMilestoneDate {
        milestone: String,
        date: String,
    },
    AddItem {
        milestone: String,
        #[serde(default)]
        data: Option<ItemSnapshot>,
    },
    RemoveItem {
        milestone: String,
        item: String,
    },
    MoveItem {
        from_milestone: String,
        item: String,
        to_milestone: String,
        to_index: usize,
    },
    SetItemText {
        milestone: String,
        item: String,
        text: String,
    },
    SetItemStatus {
        milestone: String,
        item: String,
        status: String,
    },
    AddStatus {
        name: String,
        icon: String,
    },
    RenameStatus {
        index: usize,
        name: String,
    },
    RemoveStatus {
        index: usize,
    },
    SetStatusIcon {
        index: usize,
        icon: String,
    },
}

/// What a command changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Unchanged,
    Updated,
    MilestoneCreated(MilestoneId),
    ItemCreated(ItemId),
    StatusCreated(StatusDefinition),
    /// Items whose stored status was rewritten by a registry rename or removal.
    StatusesRewritten(Propagation),
    /// Items whose icon must be redrawn; their data is unchanged.
    IconsRefreshed(Propagation),
}

impl Effect {
    pub fn is_change(&self) -> bool {
        !matches!(self, Effect::Unchanged)
    }
}
