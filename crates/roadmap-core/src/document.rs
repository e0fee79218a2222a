//! Mutation and snapshot translation for the roadmap document.
//!
//! All edits go through these methods; the rendered view is never read back
//! to reconstruct state.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{FormatError, ValidationError};
use crate::id::{IdCounter, ItemId, MilestoneId};
use crate::registry::StatusRegistry;
use crate::snapshot::{ItemSnapshot, MilestoneSnapshot, Snapshot};
use crate::types::{
    ChecklistItem, Milestone, Roadmap, DEFAULT_MILESTONE_PURPOSE, DEFAULT_MILESTONE_TITLE,
    DEFAULT_ROADMAP_NAME,
};

pub const DEFAULT_ITEM_TEXT: &str = "New item";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Resolve a requested status against the registry, falling back to its first entry.
fn repair_status(requested: &str, registry: &StatusRegistry, item: &str) -> String {
    if registry.contains(requested) {
        return requested.to_string();
    }
    let fallback = registry.first().name.clone();
    if requested.is_empty() {
        return fallback;
    }
    tracing::warn!(
        item,
        status = requested,
        %fallback,
        "item references an unknown status, falling back"
    );
    fallback
}

impl Roadmap {
    pub fn new(name: &str) -> Self {
        Self {
            name: or_default(name, DEFAULT_ROADMAP_NAME),
            ..Self::default()
        }
    }

    /// Drop every milestone and restart id generation.
    pub fn clear(&mut self, name: &str) {
        *self = Self::new(name);
    }

    pub fn rename(&mut self, name: &str) {
        self.name = or_default(name, DEFAULT_ROADMAP_NAME);
    }

    /// Append a milestone with a fresh id, optionally populated from `data`.
    ///
    /// Ids in `data` are ignored. Items whose status is unknown to `registry`
    /// fall back to the registry's first entry.
    pub fn add_milestone(
        &mut self,
        data: Option<&MilestoneSnapshot>,
        registry: &StatusRegistry,
    ) -> &Milestone {
        let id = MilestoneId::from_counter(self.milestone_ids.next());
        let mut milestone = Milestone::new(id);

        if let Some(data) = data {
            milestone.title = or_default(&data.title, DEFAULT_MILESTONE_TITLE);
            milestone.purpose = or_default(&data.purpose, DEFAULT_MILESTONE_PURPOSE);
            let current = parse_date(&data.current_completion_date).ok();
            let original = parse_date(&data.original_completion_date).ok().or(current);
            milestone.set_dates(current, original);
            for item in &data.items {
                let id = ItemId::new(milestone.id(), self.item_ids.next());
                let status = repair_status(&item.status, registry, id.as_str());
                let text = or_default(&item.text, DEFAULT_ITEM_TEXT);
                milestone.items.push(ChecklistItem::new(id, text, status));
            }
        }

        tracing::debug!(id = %milestone.id(), "milestone added");
        self.milestones.push(milestone);
        let last = self.milestones.len() - 1;
        &self.milestones[last]
    }

    pub fn remove_milestone(&mut self, id: &str) -> Result<Milestone, ValidationError> {
        let index = self
            .milestone_index(id)
            .ok_or_else(|| ValidationError::MilestoneNotFound(id.to_string()))?;
        Ok(self.milestones.remove(index))
    }

    /// Move a milestone to `new_index`, clamped to the end of the list.
    pub fn move_milestone(&mut self, id: &str, new_index: usize) -> Result<(), ValidationError> {
        let index = self
            .milestone_index(id)
            .ok_or_else(|| ValidationError::MilestoneNotFound(id.to_string()))?;
        let milestone = self.milestones.remove(index);
        let target = new_index.min(self.milestones.len());
        self.milestones.insert(target, milestone);
        Ok(())
    }

    pub fn set_milestone_title(&mut self, id: &str, title: &str) -> Result<(), ValidationError> {
        let milestone = self.require_milestone(id)?;
        milestone.title = or_default(title, DEFAULT_MILESTONE_TITLE);
        Ok(())
    }

    pub fn set_milestone_purpose(&mut self, id: &str, purpose: &str) -> Result<(), ValidationError> {
        let milestone = self.require_milestone(id)?;
        milestone.purpose = or_default(purpose, DEFAULT_MILESTONE_PURPOSE);
        Ok(())
    }

    /// Commit a target date. The first non-empty date also becomes the original date.
    ///
    /// An empty string clears the target date; the original date is kept.
    pub fn set_milestone_date(&mut self, id: &str, new_date: &str) -> Result<(), ValidationError> {
        let date = if new_date.trim().is_empty() {
            None
        } else {
            Some(parse_date(new_date)?)
        };
        let milestone = self.require_milestone(id)?;
        let original = milestone.original_completion_date().or(date);
        milestone.set_dates(date, original);
        Ok(())
    }

    pub fn add_item(
        &mut self,
        milestone_id: &str,
        data: Option<&ItemSnapshot>,
        registry: &StatusRegistry,
    ) -> Result<&ChecklistItem, ValidationError> {
        let index = self
            .milestone_index(milestone_id)
            .ok_or_else(|| ValidationError::MilestoneNotFound(milestone_id.to_string()))?;
        let id = ItemId::new(self.milestones[index].id(), self.item_ids.next());

        let (text, status) = match data {
            Some(item) => (
                or_default(&item.text, DEFAULT_ITEM_TEXT),
                repair_status(&item.status, registry, id.as_str()),
            ),
            None => (DEFAULT_ITEM_TEXT.to_string(), registry.first().name.clone()),
        };

        let items = &mut self.milestones[index].items;
        items.push(ChecklistItem::new(id, text, status));
        let last = items.len() - 1;
        Ok(&items[last])
    }

    pub fn remove_item(
        &mut self,
        milestone_id: &str,
        item_id: &str,
    ) -> Result<ChecklistItem, ValidationError> {
        let milestone = self.require_milestone(milestone_id)?;
        let index = milestone
            .items
            .iter()
            .position(|i| i.id().as_str() == item_id)
            .ok_or_else(|| ValidationError::ItemNotFound(item_id.to_string()))?;
        Ok(milestone.items.remove(index))
    }

    /// Move an item within a milestone or across milestones. The item keeps its id.
    pub fn move_item(
        &mut self,
        from_milestone: &str,
        item_id: &str,
        to_milestone: &str,
        new_index: usize,
    ) -> Result<(), ValidationError> {
        let from = self
            .milestone_index(from_milestone)
            .ok_or_else(|| ValidationError::MilestoneNotFound(from_milestone.to_string()))?;
        let to = self
            .milestone_index(to_milestone)
            .ok_or_else(|| ValidationError::MilestoneNotFound(to_milestone.to_string()))?;
        let position = self.milestones[from]
            .items
            .iter()
            .position(|i| i.id().as_str() == item_id)
            .ok_or_else(|| ValidationError::ItemNotFound(item_id.to_string()))?;

        let item = self.milestones[from].items.remove(position);
        let target = &mut self.milestones[to].items;
        let index = new_index.min(target.len());
        target.insert(index, item);
        Ok(())
    }

    pub fn set_item_text(
        &mut self,
        milestone_id: &str,
        item_id: &str,
        text: &str,
    ) -> Result<(), ValidationError> {
        let item = self.require_item(milestone_id, item_id)?;
        item.text = or_default(text, DEFAULT_ITEM_TEXT);
        Ok(())
    }

    pub fn set_item_status(
        &mut self,
        milestone_id: &str,
        item_id: &str,
        status: &str,
        registry: &StatusRegistry,
    ) -> Result<(), ValidationError> {
        if !registry.contains(status) {
            return Err(ValidationError::UnknownStatus(status.to_string()));
        }
        let item = self.require_item(milestone_id, item_id)?;
        item.set_status(status.to_string());
        Ok(())
    }

    /// Plain snapshot of the current document. Does not touch the roadmap.
    pub fn serialize(&self) -> Snapshot {
        Snapshot {
            roadmap_name: self.name.clone(),
            milestones: self
                .milestones
                .iter()
                .map(|m| MilestoneSnapshot {
                    id: Some(m.id().to_string()),
                    title: m.title.clone(),
                    purpose: m.purpose.clone(),
                    current_completion_date: format_date(m.current_completion_date()),
                    original_completion_date: format_date(m.original_completion_date()),
                    items: m
                        .items
                        .iter()
                        .map(|i| ItemSnapshot {
                            id: Some(i.id().to_string()),
                            text: i.text.clone(),
                            status: i.status().to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a roadmap from a snapshot.
    ///
    /// Stored ids are kept when unique; both id counters are advanced past every
    /// numeric suffix seen so fresh ids never collide. Dangling status references
    /// fall back to the registry's first entry. Unparseable dates are dropped.
    pub fn deserialize(snapshot: &Snapshot, registry: &StatusRegistry) -> Result<Self, FormatError> {
        let mut roadmap = Roadmap::new(&snapshot.roadmap_name);

        // Observe every stored id first so that freshly assigned ones land above them.
        for m in &snapshot.milestones {
            if let Some(n) = m.id.as_deref().and_then(|id| MilestoneId::from_string(id).counter()) {
                roadmap.milestone_ids.observe(n);
            }
            for i in &m.items {
                if let Some(n) = i.id.as_deref().and_then(|id| ItemId::from_string(id).counter()) {
                    roadmap.item_ids.observe(n);
                }
            }
        }

        let mut seen_milestones = HashSet::new();
        let mut seen_items = HashSet::new();
        for data in &snapshot.milestones {
            let id = claim_id(
                data.id.as_deref(),
                &mut seen_milestones,
                &mut roadmap.milestone_ids,
                MilestoneId::from_string,
                MilestoneId::from_counter,
            );
            let mut milestone = Milestone::new(id);
            milestone.title = or_default(&data.title, DEFAULT_MILESTONE_TITLE);
            milestone.purpose = or_default(&data.purpose, DEFAULT_MILESTONE_PURPOSE);
            let current = stored_date(&data.current_completion_date, milestone.id());
            let original = stored_date(&data.original_completion_date, milestone.id());
            milestone.set_dates(current, original);

            for item in &data.items {
                let milestone_id = milestone.id().clone();
                let id = claim_id(
                    item.id.as_deref(),
                    &mut seen_items,
                    &mut roadmap.item_ids,
                    ItemId::from_string,
                    |n| ItemId::new(&milestone_id, n),
                );
                let status = repair_status(&item.status, registry, id.as_str());
                milestone
                    .items
                    .push(ChecklistItem::new(id, item.text.clone(), status));
            }
            roadmap.milestones.push(milestone);
        }

        tracing::debug!(
            milestones = roadmap.milestones.len(),
            items = roadmap.item_count(),
            "roadmap deserialized"
        );
        Ok(roadmap)
    }

    fn require_milestone(&mut self, id: &str) -> Result<&mut Milestone, ValidationError> {
        self.milestone_mut(id)
            .ok_or_else(|| ValidationError::MilestoneNotFound(id.to_string()))
    }

    fn require_item(
        &mut self,
        milestone_id: &str,
        item_id: &str,
    ) -> Result<&mut ChecklistItem, ValidationError> {
        self.require_milestone(milestone_id)?
            .item_mut(item_id)
            .ok_or_else(|| ValidationError::ItemNotFound(item_id.to_string()))
    }
}

/// Keep a stored id if it is non-empty and unused, otherwise mint a fresh one.
fn claim_id<T, F, G>(
    stored: Option<&str>,
    seen: &mut HashSet<String>,
    counter: &mut IdCounter,
    keep: F,
    mint: G,
) -> T
where
    T: std::fmt::Display,
    F: Fn(String) -> T,
    G: Fn(u64) -> T,
{
    let id = match stored {
        Some(s) if !s.trim().is_empty() && !seen.contains(s) => keep(s.to_string()),
        _ => loop {
            let candidate = mint(counter.next());
            if !seen.contains(&candidate.to_string()) {
                break candidate;
            }
        },
    };
    seen.insert(id.to_string());
    id
}

fn stored_date(raw: &str, milestone: &MilestoneId) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!(%milestone, date = raw, "dropping unparseable stored date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusDefinition;

    fn registry() -> StatusRegistry {
        StatusRegistry::in_memory(vec![
            StatusDefinition::new("Not Started", "⚪"),
            StatusDefinition::new("In Progress", "🔵"),
            StatusDefinition::new("Done", "✅"),
        ])
    }

    fn item(text: &str, status: &str) -> ItemSnapshot {
        ItemSnapshot {
            id: None,
            text: text.into(),
            status: status.into(),
        }
    }

    #[test]
    fn new_milestones_get_increasing_ids() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let a = roadmap.add_milestone(None, &reg).id().clone();
        let b = roadmap.add_milestone(None, &reg).id().clone();
        assert_eq!(a.as_str(), "milestone-1");
        assert_eq!(b.as_str(), "milestone-2");

        roadmap.remove_milestone("milestone-2").unwrap();
        let c = roadmap.add_milestone(None, &reg).id().clone();
        assert_eq!(c.as_str(), "milestone-3");
    }

    #[test]
    fn clear_resets_counters() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        roadmap.add_milestone(None, &reg);
        roadmap.clear("Other");
        assert_eq!(roadmap.name, "Other");
        assert_eq!(roadmap.add_milestone(None, &reg).id().as_str(), "milestone-1");
    }

    #[test]
    fn empty_fields_get_placeholders() {
        let reg = registry();
        let mut roadmap = Roadmap::new("  ");
        assert_eq!(roadmap.name, DEFAULT_ROADMAP_NAME);
        let id = roadmap.add_milestone(None, &reg).id().to_string();
        roadmap.set_milestone_title(&id, "").unwrap();
        let m = roadmap.milestone(&id).unwrap();
        assert_eq!(m.title, DEFAULT_MILESTONE_TITLE);
        assert_eq!(m.purpose, DEFAULT_MILESTONE_PURPOSE);
    }

    #[test]
    fn add_milestone_repairs_unknown_statuses() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let data = MilestoneSnapshot {
            title: "Beta".into(),
            items: vec![item("a", "Done"), item("b", "Shipped")],
            ..Default::default()
        };
        let m = roadmap.add_milestone(Some(&data), &reg);
        assert_eq!(m.items[0].status(), "Done");
        assert_eq!(m.items[1].status(), "Not Started");
    }

    #[test]
    fn original_date_is_written_once() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let id = roadmap.add_milestone(None, &reg).id().to_string();

        roadmap.set_milestone_date(&id, "2025-06-01").unwrap();
        roadmap.set_milestone_date(&id, "2025-07-01").unwrap();
        let m = roadmap.milestone(&id).unwrap();
        assert_eq!(format_date(m.current_completion_date()), "2025-07-01");
        assert_eq!(format_date(m.original_completion_date()), "2025-06-01");
        assert!(m.is_rescheduled());

        roadmap.set_milestone_date(&id, "").unwrap();
        let m = roadmap.milestone(&id).unwrap();
        assert_eq!(m.current_completion_date(), None);
        assert_eq!(format_date(m.original_completion_date()), "2025-06-01");
    }

    #[test]
    fn invalid_date_leaves_both_fields_untouched() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let id = roadmap.add_milestone(None, &reg).id().to_string();
        roadmap.set_milestone_date(&id, "2025-06-01").unwrap();

        for bad in ["2025-13-01", "June 1st", "2025-02-30"] {
            assert_eq!(
                roadmap.set_milestone_date(&id, bad),
                Err(ValidationError::InvalidDate(bad.into()))
            );
        }
        let m = roadmap.milestone(&id).unwrap();
        assert_eq!(format_date(m.current_completion_date()), "2025-06-01");
        assert_eq!(format_date(m.original_completion_date()), "2025-06-01");
    }

    #[test]
    fn item_ids_are_unique_across_deletes() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let m = roadmap.add_milestone(None, &reg).id().to_string();
        let a = roadmap.add_item(&m, None, &reg).unwrap().id().clone();
        roadmap.remove_item(&m, a.as_str()).unwrap();
        let b = roadmap.add_item(&m, None, &reg).unwrap().id().clone();
        assert_ne!(a, b);
    }

    #[test]
    fn set_item_status_rejects_unknown_names() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let m = roadmap.add_milestone(None, &reg).id().to_string();
        let i = roadmap.add_item(&m, None, &reg).unwrap().id().to_string();

        assert_eq!(
            roadmap.set_item_status(&m, &i, "Shipped", &reg),
            Err(ValidationError::UnknownStatus("Shipped".into()))
        );
        roadmap.set_item_status(&m, &i, "Done", &reg).unwrap();
        assert_eq!(roadmap.milestone(&m).unwrap().items[0].status(), "Done");
    }

    #[test]
    fn move_item_across_milestones() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let m1 = roadmap.add_milestone(None, &reg).id().to_string();
        let m2 = roadmap.add_milestone(None, &reg).id().to_string();
        let a = roadmap.add_item(&m1, None, &reg).unwrap().id().to_string();
        roadmap.add_item(&m2, None, &reg).unwrap();

        roadmap.move_item(&m1, &a, &m2, 0).unwrap();
        assert!(roadmap.milestone(&m1).unwrap().items.is_empty());
        assert_eq!(roadmap.milestone(&m2).unwrap().items[0].id().as_str(), a);

        assert_eq!(
            roadmap.move_item(&m1, &a, &m2, 0),
            Err(ValidationError::ItemNotFound(a.clone()))
        );
        assert_eq!(
            roadmap.move_item(&m2, &a, "milestone-99", 0),
            Err(ValidationError::MilestoneNotFound("milestone-99".into()))
        );
        assert_eq!(roadmap.milestone(&m2).unwrap().items.len(), 2);
    }

    #[test]
    fn move_milestone_clamps_index() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Plan");
        let a = roadmap.add_milestone(None, &reg).id().to_string();
        roadmap.add_milestone(None, &reg);
        roadmap.move_milestone(&a, 10).unwrap();
        assert_eq!(roadmap.milestones[1].id().as_str(), a);
    }

    #[test]
    fn deserialize_advances_counters_past_stored_ids() {
        let reg = registry();
        let snapshot = Snapshot {
            roadmap_name: "Loaded".into(),
            milestones: vec![
                MilestoneSnapshot {
                    id: Some("milestone-7".into()),
                    items: vec![ItemSnapshot {
                        id: Some("item-milestone-7-12".into()),
                        text: "x".into(),
                        status: "Gone".into(),
                    }],
                    ..Default::default()
                },
                MilestoneSnapshot {
                    id: Some("milestone-3".into()),
                    ..Default::default()
                },
            ],
        };
        let mut roadmap = Roadmap::deserialize(&snapshot, &reg).unwrap();
        assert_eq!(roadmap.milestones[0].items[0].status(), "Not Started");

        let next = roadmap.add_milestone(None, &reg).id().clone();
        assert_eq!(next.as_str(), "milestone-8");
        let item = roadmap.add_item("milestone-3", None, &reg).unwrap().id().clone();
        assert_eq!(item.counter(), Some(13));
    }

    #[test]
    fn deserialize_replaces_duplicate_and_missing_ids() {
        let reg = registry();
        let snapshot = Snapshot {
            roadmap_name: "Dupes".into(),
            milestones: vec![
                MilestoneSnapshot {
                    id: Some("milestone-2".into()),
                    ..Default::default()
                },
                MilestoneSnapshot {
                    id: Some("milestone-2".into()),
                    ..Default::default()
                },
                MilestoneSnapshot::default(),
            ],
        };
        let roadmap = Roadmap::deserialize(&snapshot, &reg).unwrap();
        let ids: Vec<_> = roadmap.milestones.iter().map(|m| m.id().to_string()).collect();
        assert_eq!(ids, ["milestone-2", "milestone-3", "milestone-4"]);
    }

    #[test]
    fn oversized_stored_ids_stay_opaque() {
        let reg = registry();
        let snapshot = crate::snapshot::decode(
            r#"{"roadmapName":"R","milestones":[
                {"id":"milestone-18446744073709551615","items":[
                    {"id":"item-milestone-1-18446744073709551615","text":"big"},
                    {"text":"fresh"}]},
                {"title":"no id"}]}"#,
        )
        .unwrap();

        let mut roadmap = Roadmap::deserialize(&snapshot, &reg).unwrap();
        let ids: Vec<_> = roadmap.milestones.iter().map(|m| m.id().to_string()).collect();
        assert_eq!(ids, ["milestone-18446744073709551615", "milestone-1"]);
        assert_eq!(roadmap.milestones[0].items[1].id().counter(), Some(1));

        let next = roadmap.add_milestone(None, &reg).id().clone();
        assert_eq!(next.as_str(), "milestone-2");
    }

    #[test]
    fn serialize_round_trip_preserves_content() {
        let reg = registry();
        let mut roadmap = Roadmap::new("Launch");
        let m = roadmap.add_milestone(None, &reg).id().to_string();
        roadmap.set_milestone_title(&m, "Alpha").unwrap();
        roadmap.set_milestone_date(&m, "2025-06-01").unwrap();
        roadmap.set_milestone_date(&m, "2025-08-15").unwrap();
        let i = roadmap.add_item(&m, None, &reg).unwrap().id().to_string();
        roadmap.set_item_text(&m, &i, "Write docs").unwrap();
        roadmap.set_item_status(&m, &i, "In Progress", &reg).unwrap();

        let snapshot = roadmap.serialize();
        let restored = Roadmap::deserialize(&snapshot, &reg).unwrap();
        assert_eq!(restored.serialize(), snapshot);
        assert_eq!(restored.last_milestone_counter(), 1);
    }
}
