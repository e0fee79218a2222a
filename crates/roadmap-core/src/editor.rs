//! Owner of the live document and status registry.
//!
//! The editor is the single writer: every mutation arrives as a [`Command`],
//! and every mutation that changes visible state notifies the autosave hook.

use std::sync::Arc;

use crate::command::{Command, Effect};
use crate::error::{FormatError, ValidationError};
use crate::export::ExportDocument;
use crate::hash::{snapshot_digest, SnapshotDigest};
use crate::propagate;
use crate::registry::{IconOutcome, RenameOutcome, StatusRegistry};
use crate::snapshot::Snapshot;
use crate::types::{Roadmap, StatusDefinition, DEFAULT_ROADMAP_NAME};

/// Receives a signal after every document-visible mutation.
pub trait ChangeNotifier: Send + Sync {
    fn document_changed(&self);
}

pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn document_changed(&self) {}
}

pub struct Editor {
    roadmap: Roadmap,
    registry: StatusRegistry,
    notifier: Arc<dyn ChangeNotifier>,
    last_saved: Option<SnapshotDigest>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("roadmap", &self.roadmap)
            .field("registry", &self.registry)
            .field("last_saved", &self.last_saved)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(roadmap: Roadmap, registry: StatusRegistry) -> Self {
        Self {
            roadmap,
            registry,
            notifier: Arc::new(NoopNotifier),
            last_saved: None,
        }
    }

    pub fn set_notifier(&mut self, notifier: Arc<dyn ChangeNotifier>) {
        self.notifier = notifier;
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    pub fn apply(&mut self, command: Command) -> Result<Effect, ValidationError> {
        let effect = match command {
            Command::RenameRoadmap { name } => {
                self.roadmap.rename(&name);
                Effect::Updated
            }
            Command::AddMilestone { data } => {
                let id = self
                    .roadmap
                    .add_milestone(data.as_ref(), &self.registry)
                    .id()
                    .clone();
                Effect::MilestoneCreated(id)
            }
            Command::RemoveMilestone { milestone } => {
                self.roadmap.remove_milestone(&milestone)?;
                Effect::Updated
            }
            Command::MoveMilestone { milestone, to_index } => {
                self.roadmap.move_milestone(&milestone, to_index)?;
                Effect::Updated
            }
            Command::SetMilestoneTitle { milestone, title } => {
                self.roadmap.set_milestone_title(&milestone, &title)?;
                Effect::Updated
            }
            Command::SetMilestonePurpose { milestone, purpose } => {
                self.roadmap.set_milestone_purpose(&milestone, &purpose)?;
                Effect::Updated
            }
            Command::SetMilestoneDate { milestone, date } => {
                self.roadmap.set_milestone_date(&milestone, &date)?;
                Effect::Updated
            }
            Command::AddItem { milestone, data } => {
                let id = self
                    .roadmap
                    .add_item(&milestone, data.as_ref(), &self.registry)?
                    .id()
                    .clone();
                Effect::ItemCreated(id)
            }
            Command::RemoveItem { milestone, item } => {
                self.roadmap.remove_item(&milestone, &item)?;
                Effect::Updated
            }
            Command::MoveItem {
                from_milestone,
                item,
                to_milestone,
                to_index,
            } => {
                self.roadmap
                    .move_item(&from_milestone, &item, &to_milestone, to_index)?;
                Effect::Updated
            }
            Command::SetItemText {
                milestone,
                item,
                text,
            } => {
                self.roadmap.set_item_text(&milestone, &item, &text)?;
                Effect::Updated
            }
            Command::SetItemStatus {
                milestone,
                item,
                status,
            } => {
                self.roadmap
                    .set_item_status(&milestone, &item, &status, &self.registry)?;
                Effect::Updated
            }
            Command::AddStatus { name, icon } => {
                let added = self.registry.add(StatusDefinition::new(name, icon));
                Effect::StatusCreated(added)
            }
            Command::RenameStatus { index, name } => match self.registry.rename(index, &name)? {
                RenameOutcome::Renamed { old_name, new_name } => Effect::StatusesRewritten(
                    propagate::on_rename(&mut self.roadmap, &old_name, &new_name),
                ),
                RenameOutcome::Unchanged => Effect::Unchanged,
            },
            Command::RemoveStatus { index } => {
                let outcome = self.registry.remove(index)?;
                Effect::StatusesRewritten(propagate::on_remove(
                    &mut self.roadmap,
                    &outcome.removed.name,
                    &self.registry,
                ))
            }
            Command::SetStatusIcon { index, icon } => match self.registry.set_icon(index, &icon)? {
                IconOutcome::Changed { index } => Effect::IconsRefreshed(
                    propagate::on_icon_change(&self.roadmap, &self.registry, index),
                ),
                IconOutcome::Unchanged => Effect::Unchanged,
            },
        };

        if effect.is_change() {
            self.notifier.document_changed();
        }
        Ok(effect)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.roadmap.serialize()
    }

    pub fn export(&self) -> ExportDocument {
        ExportDocument::build(&self.roadmap, &self.registry)
    }

    /// Start over with an empty roadmap.
    pub fn clear(&mut self, name: &str) {
        self.roadmap.clear(name);
        self.last_saved = None;
    }

    /// Drop the document of the previous identity. The empty document counts as
    /// saved so it is never written into the new identity's storage on its own.
    pub fn on_identity_changed(&mut self) {
        self.roadmap.clear(DEFAULT_ROADMAP_NAME);
        self.last_saved = Some(snapshot_digest(&self.roadmap.serialize()));
    }

    /// Replace the document with a loaded snapshot. The snapshot counts as saved.
    pub fn load(&mut self, snapshot: &Snapshot) -> Result<(), FormatError> {
        let roadmap = Roadmap::deserialize(snapshot, &self.registry)?;
        self.roadmap = roadmap;
        self.last_saved = Some(snapshot_digest(&self.roadmap.serialize()));
        tracing::info!(
            name = %self.roadmap.name,
            milestones = self.roadmap.milestones.len(),
            "roadmap loaded"
        );
        Ok(())
    }

    /// Replace the document with generated content. Ids are minted fresh and
    /// unknown statuses fall back to the registry's first entry.
    pub fn replace_with_generated(&mut self, generated: &Snapshot) {
        self.roadmap.clear(&generated.roadmap_name);
        for milestone in &generated.milestones {
            self.roadmap.add_milestone(Some(milestone), &self.registry);
        }
        self.last_saved = None;
        self.notifier.document_changed();
    }

    /// Snapshot and digest to persist, or `None` when nothing changed since the last save.
    pub fn pending_save(&self) -> Option<(Snapshot, SnapshotDigest)> {
        let snapshot = self.snapshot();
        let digest = snapshot_digest(&snapshot);
        if self.last_saved == Some(digest) {
            return None;
        }
        Some((snapshot, digest))
    }

    pub fn mark_saved(&mut self, digest: SnapshotDigest) {
        self.last_saved = Some(digest);
    }

    pub fn is_dirty(&self) -> bool {
        self.pending_save().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ChangeNotifier for Counter {
        fn document_changed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn editor() -> (Editor, Arc<Counter>) {
        let registry = StatusRegistry::in_memory(vec![
            StatusDefinition::new("Not Started", "⚪"),
            StatusDefinition::new("In Progress", "🔵"),
            StatusDefinition::new("Done", "✅"),
        ]);
        let mut editor = Editor::new(Roadmap::new("Plan"), registry);
        let counter = Arc::new(Counter::default());
        editor.set_notifier(counter.clone());
        (editor, counter)
    }

    fn add_milestone(editor: &mut Editor) -> String {
        match editor.apply(Command::AddMilestone { data: None }).unwrap() {
            Effect::MilestoneCreated(id) => id.to_string(),
            other => panic!("unexpected effect {other:?}"),
        }
    }

    fn add_item(editor: &mut Editor, milestone: &str, status: &str) -> String {
        let item = match editor
            .apply(Command::AddItem {
                milestone: milestone.into(),
                data: None,
            })
            .unwrap()
        {
            Effect::ItemCreated(id) => id.to_string(),
            other => panic!("unexpected effect {other:?}"),
        };
        editor
            .apply(Command::SetItemStatus {
                milestone: milestone.into(),
                item: item.clone(),
                status: status.into(),
            })
            .unwrap();
        item
    }

    #[test]
    fn mutations_notify_and_rejections_do_not() {
        let (mut editor, counter) = editor();
        let m = add_milestone(&mut editor);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        let err = editor.apply(Command::SetMilestoneDate {
            milestone: m,
            date: "soon".into(),
        });
        assert!(err.is_err());
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        assert_eq!(
            editor.apply(Command::RenameStatus {
                index: 0,
                name: "Not Started".into()
            }),
            Ok(Effect::Unchanged)
        );
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn status_rename_rewrites_items_and_notifies() {
        let (mut editor, counter) = editor();
        let m = add_milestone(&mut editor);
        add_item(&mut editor, &m, "In Progress");
        add_item(&mut editor, &m, "In Progress");
        add_item(&mut editor, &m, "Done");
        let before = counter.0.load(Ordering::SeqCst);

        let effect = editor
            .apply(Command::RenameStatus {
                index: 1,
                name: "Active".into(),
            })
            .unwrap();
        assert!(matches!(effect, Effect::StatusesRewritten(p) if p.len() == 2));
        let statuses: Vec<_> = editor.roadmap().items().map(|i| i.status()).collect();
        assert_eq!(statuses, ["Active", "Active", "Done"]);
        assert_eq!(counter.0.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn icon_change_requests_refresh_and_notifies() {
        let (mut editor, counter) = editor();
        let m = add_milestone(&mut editor);
        add_item(&mut editor, &m, "Done");
        let before = counter.0.load(Ordering::SeqCst);

        let effect = editor
            .apply(Command::SetStatusIcon {
                index: 2,
                icon: "🎉".into(),
            })
            .unwrap();
        assert!(matches!(effect, Effect::IconsRefreshed(p) if p.len() == 1));
        assert_eq!(counter.0.load(Ordering::SeqCst), before + 1);
        assert_eq!(editor.export().milestones[0].items[0].status_icon, "🎉");
    }

    #[test]
    fn pending_save_tracks_last_persisted_state() {
        let (mut editor, _) = editor();
        let (_, digest) = editor.pending_save().unwrap();
        editor.mark_saved(digest);
        assert!(!editor.is_dirty());

        add_milestone(&mut editor);
        assert!(editor.is_dirty());
    }

    #[test]
    fn load_counts_as_saved() {
        let (mut editor, _) = editor();
        let m = add_milestone(&mut editor);
        add_item(&mut editor, &m, "Done");
        let snapshot = editor.snapshot();

        let (mut other, _) = self::editor();
        other.load(&snapshot).unwrap();
        assert!(!other.is_dirty());
        assert_eq!(other.snapshot(), snapshot);
    }

    #[test]
    fn generated_content_gets_fresh_ids_and_valid_statuses() {
        let (mut editor, counter) = editor();
        add_milestone(&mut editor);
        let generated: Snapshot = serde_json::from_value(serde_json::json!({
            "roadmapName": "Generated",
            "milestones": [
                {"title": "One", "items": [{"text": "a", "status": "Shipping"}]},
                {"title": "Two"}
            ]
        }))
        .unwrap();

        editor.replace_with_generated(&generated);
        let roadmap = editor.roadmap();
        assert_eq!(roadmap.name, "Generated");
        assert_eq!(roadmap.milestones[0].id().as_str(), "milestone-1");
        assert_eq!(roadmap.milestones[0].items[0].status(), "Not Started");
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn identity_change_empties_without_dirtying() {
        let (mut editor, counter) = editor();
        add_milestone(&mut editor);
        let before = counter.0.load(Ordering::SeqCst);

        editor.on_identity_changed();
        assert!(editor.roadmap().is_empty());
        assert_eq!(editor.roadmap().name, DEFAULT_ROADMAP_NAME);
        assert!(!editor.is_dirty());
        assert_eq!(counter.0.load(Ordering::SeqCst), before);
    }
}
