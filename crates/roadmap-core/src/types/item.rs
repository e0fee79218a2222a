use crate::id::ItemId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    id: ItemId,
    pub text: String,
    status: String,
}

impl ChecklistItem {
    pub(crate) fn new(id: ItemId, text: String, status: String) -> Self {
        Self { id, text, status }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Name of the status definition this item points at.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub(crate) fn set_status(&mut self, status: String) {
        self.status = status;
    }
}
