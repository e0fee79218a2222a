//! The mutable set of status definitions a checklist item may reference.
//!
//! The registry never becomes empty, names stay unique, and every mutation is
//! written through to the injected [`StatusStore`].

use std::sync::Mutex;

use crate::error::{CoreError, ValidationError};
use crate::types::StatusDefinition;

pub const DEFAULT_NEW_STATUS_NAME: &str = "New Status";
pub const DEFAULT_NEW_STATUS_ICON: &str = "○";

/// Built-in status set, used whenever nothing valid is persisted.
pub fn default_statuses() -> Vec<StatusDefinition> {
    vec![
        StatusDefinition::new("Not Started", "⚪"),
        StatusDefinition::new("In Progress", "🔵"),
        StatusDefinition::new("Done", "✅"),
        StatusDefinition::new("Blocked", "⛔"),
    ]
}

/// Raw persistence slot for the registry. Implementations store the JSON text as-is.
pub trait StatusStore: Send + Sync {
    fn load_raw(&self) -> Result<Option<String>, CoreError>;
    fn save_raw(&self, json: &str) -> Result<(), CoreError>;
}

/// In-memory slot, used by tests and by sessions that never persist statuses.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(json.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl StatusStore for MemoryStatusStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| CoreError::StatusStore(e.to_string()))?;
        Ok(slot.clone())
    }

    fn save_raw(&self, json: &str) -> Result<(), CoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| CoreError::StatusStore(e.to_string()))?;
        *slot = Some(json.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { old_name: String, new_name: String },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: StatusDefinition,
    /// The first remaining status, which items pointing at `removed` fall back to.
    pub fallback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconOutcome {
    Changed { index: usize },
    Unchanged,
}

pub struct StatusRegistry {
    statuses: Vec<StatusDefinition>,
    store: Box<dyn StatusStore>,
}

impl std::fmt::Debug for StatusRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusRegistry")
            .field("statuses", &self.statuses)
            .finish_non_exhaustive()
    }
}

impl StatusRegistry {
    /// Read persisted definitions, falling back to the defaults when they are
    /// missing or structurally invalid.
    pub fn load(store: Box<dyn StatusStore>) -> Self {
        let statuses = match store.load_raw() {
            Ok(Some(raw)) => parse_statuses(&raw).unwrap_or_else(|| {
                tracing::warn!("stored status list is invalid, using defaults");
                default_statuses()
            }),
            Ok(None) => default_statuses(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored status list, using defaults");
                default_statuses()
            }
        };
        Self { statuses, store }
    }

    /// Registry with an explicit starting set. An empty set is replaced by the defaults.
    pub fn with_statuses(statuses: Vec<StatusDefinition>, store: Box<dyn StatusStore>) -> Self {
        let statuses = if statuses.is_empty() {
            default_statuses()
        } else {
            statuses
        };
        Self { statuses, store }
    }

    pub fn in_memory(statuses: Vec<StatusDefinition>) -> Self {
        Self::with_statuses(statuses, Box::new(MemoryStatusStore::new()))
    }

    /// Copy of every definition. Mutating the copy does not touch the registry.
    pub fn all(&self) -> Vec<StatusDefinition> {
        self.statuses.clone()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StatusDefinition> {
        self.statuses.get(index)
    }

    pub fn first(&self) -> &StatusDefinition {
        // Non-empty by construction; every removal path refuses the last entry.
        &self.statuses[0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.statuses.iter().any(|s| s.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.statuses.iter().position(|s| s.name == name)
    }

    pub fn icon_for(&self, name: &str) -> Option<&str> {
        self.statuses
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.icon.as_str())
    }

    /// Append a definition, suffixing the name (`New Status 2`, ...) until it is unique.
    pub fn add(&mut self, definition: StatusDefinition) -> StatusDefinition {
        let base = definition.name.trim();
        let base = if base.is_empty() {
            DEFAULT_NEW_STATUS_NAME
        } else {
            base
        };
        let icon = definition.icon.trim();
        let icon = if icon.is_empty() {
            DEFAULT_NEW_STATUS_ICON
        } else {
            icon
        };

        let mut name = base.to_string();
        let mut n = 2;
        while self.contains(&name) {
            name = format!("{base} {n}");
            n += 1;
        }

        let added = StatusDefinition::new(name, icon);
        self.statuses.push(added.clone());
        tracing::debug!(name = %added.name, "status added");
        self.persist();
        added
    }

    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<RenameOutcome, ValidationError> {
        let current = self
            .statuses
            .get(index)
            .ok_or(ValidationError::StatusIndexOutOfRange(index))?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ValidationError::EmptyStatusName);
        }
        if new_name == current.name {
            return Ok(RenameOutcome::Unchanged);
        }
        if self.contains(new_name) {
            return Err(ValidationError::DuplicateStatusName(new_name.to_string()));
        }

        let old_name = std::mem::replace(&mut self.statuses[index].name, new_name.to_string());
        tracing::debug!(%old_name, %new_name, "status renamed");
        self.persist();
        Ok(RenameOutcome::Renamed {
            old_name,
            new_name: new_name.to_string(),
        })
    }

    pub fn remove(&mut self, index: usize) -> Result<RemoveOutcome, ValidationError> {
        if index >= self.statuses.len() {
            return Err(ValidationError::StatusIndexOutOfRange(index));
        }
        if self.statuses.len() == 1 {
            return Err(ValidationError::LastStatus);
        }

        let removed = self.statuses.remove(index);
        let fallback = self.first().name.clone();
        tracing::debug!(name = %removed.name, %fallback, "status removed");
        self.persist();
        Ok(RemoveOutcome { removed, fallback })
    }

    pub fn set_icon(&mut self, index: usize, icon: &str) -> Result<IconOutcome, ValidationError> {
        let current = self
            .statuses
            .get(index)
            .ok_or(ValidationError::StatusIndexOutOfRange(index))?;
        let icon = icon.trim();
        if icon.is_empty() {
            return Err(ValidationError::EmptyStatusIcon);
        }
        if icon == current.icon {
            return Ok(IconOutcome::Unchanged);
        }

        self.statuses[index].icon = icon.to_string();
        self.persist();
        Ok(IconOutcome::Changed { index })
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.statuses)
            .map_err(CoreError::from)
            .and_then(|json| self.store.save_raw(&json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist status list");
        }
    }
}

/// Accept only a non-empty array whose elements all carry non-empty string `name` and `icon`.
fn parse_statuses(raw: &str) -> Option<Vec<StatusDefinition>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let entries = value.as_array()?;
    if entries.is_empty() {
        return None;
    }
    entries
        .iter()
        .map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let icon = entry.get("icon")?.as_str()?;
            if name.is_empty() || icon.is_empty() {
                return None;
            }
            Some(StatusDefinition::new(name, icon))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct SharedStore(Arc<MemoryStatusStore>);

    impl StatusStore for SharedStore {
        fn load_raw(&self) -> Result<Option<String>, CoreError> {
            self.0.load_raw()
        }
        fn save_raw(&self, json: &str) -> Result<(), CoreError> {
            self.0.save_raw(json)
        }
    }

    fn three() -> StatusRegistry {
        StatusRegistry::in_memory(vec![
            StatusDefinition::new("Not Started", "⚪"),
            StatusDefinition::new("In Progress", "🔵"),
            StatusDefinition::new("Done", "✅"),
        ])
    }

    #[test]
    fn load_falls_back_to_defaults_on_invalid_data() {
        for raw in [
            "not json",
            "[]",
            "{}",
            r#"[{"name":"A"}]"#,
            r#"[{"name":"","icon":"x"}]"#,
            r#"[{"name":"A","icon":3}]"#,
        ] {
            let reg = StatusRegistry::load(Box::new(MemoryStatusStore::with_raw(raw)));
            assert_eq!(reg.all(), default_statuses(), "input: {raw}");
        }
    }

    #[test]
    fn load_accepts_valid_data() {
        let raw = r#"[{"name":"Todo","icon":"📝"},{"name":"Shipped","icon":"🚀"}]"#;
        let reg = StatusRegistry::load(Box::new(MemoryStatusStore::with_raw(raw)));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.first().name, "Todo");
    }

    #[test]
    fn all_returns_a_copy() {
        let reg = three();
        let mut copy = reg.all();
        copy[0].name = "Hacked".into();
        copy.clear();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.first().name, "Not Started");
    }

    #[test]
    fn add_suffixes_colliding_names() {
        let mut reg = three();
        assert_eq!(reg.add(StatusDefinition::new("", "")).name, "New Status");
        assert_eq!(reg.add(StatusDefinition::new("New Status", "x")).name, "New Status 2");
        assert_eq!(reg.add(StatusDefinition::new("New Status", "x")).name, "New Status 3");
        assert_eq!(reg.add(StatusDefinition::new("Done", "x")).name, "Done 2");
    }

    #[test]
    fn rename_rejects_empty_and_ignores_same_name() {
        let mut reg = three();
        assert_eq!(reg.rename(1, "   "), Err(ValidationError::EmptyStatusName));
        assert_eq!(reg.rename(1, " In Progress "), Ok(RenameOutcome::Unchanged));
        assert_eq!(
            reg.rename(1, "Active"),
            Ok(RenameOutcome::Renamed {
                old_name: "In Progress".into(),
                new_name: "Active".into()
            })
        );
        assert_eq!(reg.get(1).map(|s| s.name.as_str()), Some("Active"));
    }

    #[test]
    fn rename_rejects_duplicate() {
        let mut reg = three();
        assert_eq!(
            reg.rename(0, "Done"),
            Err(ValidationError::DuplicateStatusName("Done".into()))
        );
    }

    #[test]
    fn remove_last_status_is_rejected() {
        let mut reg = StatusRegistry::in_memory(vec![StatusDefinition::new("Only", "x")]);
        assert_eq!(reg.remove(0), Err(ValidationError::LastStatus));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_reports_new_first_entry() {
        let mut reg = three();
        let out = reg.remove(0).unwrap();
        assert_eq!(out.removed.name, "Not Started");
        assert_eq!(out.fallback, "In Progress");
    }

    #[test]
    fn set_icon_detects_no_change() {
        let mut reg = three();
        assert_eq!(reg.set_icon(2, "✅"), Ok(IconOutcome::Unchanged));
        assert_eq!(reg.set_icon(2, "🎉"), Ok(IconOutcome::Changed { index: 2 }));
        assert_eq!(reg.icon_for("Done"), Some("🎉"));
    }

    #[test]
    fn mutations_are_persisted() {
        let shared = Arc::new(MemoryStatusStore::new());
        let mut reg = StatusRegistry::load(Box::new(SharedStore(shared.clone())));
        assert!(shared.raw().is_none());

        reg.add(StatusDefinition::new("Review", "👀"));
        let reloaded = StatusRegistry::load(Box::new(SharedStore(shared.clone())));
        assert_eq!(reloaded.all(), reg.all());
    }
}
