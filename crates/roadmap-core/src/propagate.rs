//! Reconcile checklist items after the status registry changes.
//!
//! Every transition leaves each item pointing at a status that exists in the
//! registry.

use crate::id::ItemId;
use crate::registry::StatusRegistry;
use crate::types::Roadmap;

/// Items whose stored status or displayed icon changed in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    pub items: Vec<ItemId>,
}

impl Propagation {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Point every item at `new_name` that pointed at `old_name`.
pub fn on_rename(roadmap: &mut Roadmap, old_name: &str, new_name: &str) -> Propagation {
    let mut touched = Propagation::default();
    if old_name == new_name {
        return touched;
    }
    for item in roadmap.items_mut().filter(|i| i.status() == old_name) {
        item.set_status(new_name.to_string());
        touched.items.push(item.id().clone());
    }
    tracing::debug!(old_name, new_name, items = touched.len(), "status rename propagated");
    touched
}

/// Reset every item that pointed at `removed_name` to the registry's first entry.
pub fn on_remove(roadmap: &mut Roadmap, removed_name: &str, registry: &StatusRegistry) -> Propagation {
    let fallback = registry.first().name.clone();
    let mut touched = Propagation::default();
    for item in roadmap.items_mut().filter(|i| i.status() == removed_name) {
        item.set_status(fallback.clone());
        touched.items.push(item.id().clone());
    }
    tracing::debug!(removed_name, %fallback, items = touched.len(), "status removal propagated");
    touched
}

/// Items showing the status at `index`; their icon needs redrawing. No data changes.
pub fn on_icon_change(roadmap: &Roadmap, registry: &StatusRegistry, index: usize) -> Propagation {
    let Some(status) = registry.get(index) else {
        return Propagation::default();
    };
    Propagation {
        items: roadmap
            .items()
            .filter(|i| i.status() == status.name)
            .map(|i| i.id().clone())
            .collect(),
    }
}

/// Repair every reference that no longer names a registry entry. Returns the repaired items.
pub fn repair_dangling(roadmap: &mut Roadmap, registry: &StatusRegistry) -> Propagation {
    let fallback = registry.first().name.clone();
    let mut touched = Propagation::default();
    for item in roadmap.items_mut().filter(|i| !registry.contains(i.status())) {
        tracing::warn!(item = %item.id(), status = item.status(), %fallback, "repairing dangling status");
        item.set_status(fallback.clone());
        touched.items.push(item.id().clone());
    }
    touched
}
