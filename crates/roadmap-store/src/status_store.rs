use roadmap_core::{CoreError, StatusStore};

use crate::layout::{StoreLayout, STATUS_SLOT};
use crate::slot;

/// Status registry persistence in its own slot, separate from the document.
#[derive(Debug, Clone)]
pub struct FileStatusStore {
    layout: StoreLayout,
}

impl FileStatusStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }
}

impl StatusStore for FileStatusStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        slot::read_slot(&self.layout, STATUS_SLOT).map_err(|e| CoreError::StatusStore(e.to_string()))
    }

    fn save_raw(&self, json: &str) -> Result<(), CoreError> {
        slot::write_slot(&self.layout, STATUS_SLOT, json)
            .map_err(|e| CoreError::StatusStore(e.to_string()))
    }
}
