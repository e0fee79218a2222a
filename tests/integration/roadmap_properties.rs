use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use roadmap_core::registry::default_statuses;
use roadmap_core::snapshot::MilestoneSnapshot;
use roadmap_core::types::{Roadmap, StatusDefinition};
use roadmap_core::{Command, Editor, Effect, LoadOutcome, MilestoneId, Snapshot, StatusRegistry};
use roadmap_store::SlotStore;
use roadmap_sync::{MemoryGateway, SaveMode, Session};

fn registry(names: &[&str]) -> StatusRegistry {
    StatusRegistry::in_memory(names.iter().map(|n| StatusDefinition::new(*n, "•")).collect())
}

fn add_item(editor: &mut Editor, milestone: &str, status: &str) -> String {
    let Effect::ItemCreated(id) = editor
        .apply(Command::AddItem {
            milestone: milestone.into(),
            data: None,
        })
        .unwrap()
    else {
        panic!("expected a new item");
    };
    editor
        .apply(Command::SetItemStatus {
            milestone: milestone.into(),
            item: id.to_string(),
            status: status.into(),
        })
        .unwrap();
    id.to_string()
}

fn add_milestone(editor: &mut Editor) -> String {
    let Effect::MilestoneCreated(id) = editor.apply(Command::AddMilestone { data: None }).unwrap()
    else {
        panic!("expected a new milestone");
    };
    id.to_string()
}

// === Milestone ids only grow ===

#[derive(Debug, Clone)]
enum IdOp {
    Add,
    /// Reload with extra stored milestones carrying these counters.
    Load(Vec<u64>),
}

fn id_op() -> impl Strategy<Value = IdOp> {
    prop_oneof![
        Just(IdOp::Add),
        proptest::collection::vec(0u64..500, 0..4).prop_map(IdOp::Load),
    ]
}

proptest! {
    #[test]
    fn new_milestone_ids_exceed_everything_seen(ops in proptest::collection::vec(id_op(), 1..30)) {
        let registry = registry(&["Todo"]);
        let mut roadmap = Roadmap::new("Ids");
        let mut max_seen = 0u64;

        for op in ops {
            match op {
                IdOp::Add => {
                    let n = roadmap.add_milestone(None, &registry).id().counter().unwrap();
                    prop_assert!(n > max_seen, "{} not above {}", n, max_seen);
                    max_seen = n;
                }
                IdOp::Load(counters) => {
                    let mut snapshot = roadmap.serialize();
                    for k in &counters {
                        snapshot.milestones.push(MilestoneSnapshot {
                            id: Some(MilestoneId::from_counter(*k).to_string()),
                            ..MilestoneSnapshot::default()
                        });
                        max_seen = max_seen.max(*k);
                    }
                    roadmap = Roadmap::deserialize(&snapshot, &registry).unwrap();
                    // Duplicates were re-minted above everything observed.
                    for m in &roadmap.milestones {
                        max_seen = max_seen.max(m.id().counter().unwrap_or(0));
                    }
                }
            }
        }
    }
}

// === Original completion date is written once ===

#[test]
fn original_date_is_write_once() {
    let mut editor = Editor::new(Roadmap::new("Dates"), registry(&["Todo"]));
    let m = add_milestone(&mut editor);

    editor
        .apply(Command::SetMilestoneDate {
            milestone: m.clone(),
            date: "2025-06-01".into(),
        })
        .unwrap();
    editor
        .apply(Command::SetMilestoneDate {
            milestone: m,
            date: "2025-07-01".into(),
        })
        .unwrap();

    let snap = editor.snapshot();
    assert_eq!(snap.milestones[0].current_completion_date, "2025-07-01");
    assert_eq!(snap.milestones[0].original_completion_date, "2025-06-01");
}

// === Registry changes reach the document ===

#[test]
fn status_rename_propagates_to_matching_items_only() {
    let mut editor = Editor::new(
        Roadmap::new("Rename"),
        registry(&["Not Started", "In Progress", "Done"]),
    );
    let m = add_milestone(&mut editor);
    add_item(&mut editor, &m, "In Progress");
    add_item(&mut editor, &m, "In Progress");
    add_item(&mut editor, &m, "Done");

    editor
        .apply(Command::RenameStatus {
            index: 1,
            name: "Active".into(),
        })
        .unwrap();

    let statuses: Vec<_> = editor.roadmap().items().map(|i| i.status().to_string()).collect();
    assert_eq!(statuses, ["Active", "Active", "Done"]);
}

#[test]
fn removed_status_falls_back_to_first() {
    let mut editor = Editor::new(
        Roadmap::new("Remove"),
        registry(&["Not Started", "In Progress", "Done"]),
    );
    let m = add_milestone(&mut editor);
    add_item(&mut editor, &m, "Done");

    editor.apply(Command::RemoveStatus { index: 2 }).unwrap();

    assert_eq!(editor.registry().len(), 2);
    assert_eq!(editor.roadmap().items().next().unwrap().status(), "Not Started");
}

#[test]
fn last_status_cannot_be_removed() {
    let mut editor = Editor::new(Roadmap::new("Guard"), registry(&["Only"]));
    assert!(editor.apply(Command::RemoveStatus { index: 0 }).is_err());
    assert_eq!(editor.registry().len(), 1);
}

// === Autosave coalesces bursts ===

#[tokio::test(start_paused = true)]
async fn five_rapid_edits_produce_one_save() {
    let gateway = Arc::new(MemoryGateway::new());
    let editor = Editor::new(
        Roadmap::new("Burst"),
        StatusRegistry::in_memory(default_statuses()),
    );
    let delay = Duration::from_secs(2);
    let (session, _worker) = Session::with_autosave(editor, gateway.clone(), delay).await;

    for i in 0..5 {
        session
            .apply(Command::RenameRoadmap {
                name: format!("Burst {i}"),
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    // Last edit was 300ms ago.
    tokio::time::sleep(delay - Duration::from_millis(400)).await;
    assert_eq!(gateway.save_count(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(gateway.saves(), vec![SaveMode::Auto]);

    let id = roadmap_sync::DocumentId::new("doc-1");
    assert_eq!(gateway.stored(&id).unwrap().roadmap_name, "Burst 4");
}

// === Retired format is reported as such ===

#[test]
fn legacy_document_is_incompatible_not_corrupt() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SlotStore::init(tmp.path()).unwrap();
    roadmap_store::slot::write_slot(
        store.layout(),
        roadmap_store::layout::DOCUMENT_SLOT,
        r#"{"periods":[{"title":"Q1","items":[]}]}"#,
    )
    .unwrap();

    assert_eq!(store.load_document().unwrap(), LoadOutcome::IncompatibleFormat);
}

#[test]
fn minimal_snapshot_loads_with_no_milestones() {
    assert_eq!(
        LoadOutcome::from_raw(r#"{"roadmapName":"Bare"}"#),
        LoadOutcome::Loaded(Snapshot::empty("Bare"))
    );
}

// === Serialize then deserialize keeps everything visible ===

#[derive(Debug, Clone)]
enum EditOp {
    AddMilestone,
    AddItem(usize, usize),
    Date(usize, u32),
    Title(usize, String),
    Text(usize, String),
    RemoveStatus,
}

fn edit_op() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        Just(EditOp::AddMilestone),
        (0usize..8, 0usize..4).prop_map(|(m, s)| EditOp::AddItem(m, s)),
        (0usize..8, 1u32..28).prop_map(|(m, d)| EditOp::Date(m, d)),
        (0usize..8, "[a-z ]{0,12}").prop_map(|(m, t)| EditOp::Title(m, t)),
        (0usize..8, "[a-z ]{0,12}").prop_map(|(m, t)| EditOp::Text(m, t)),
        Just(EditOp::RemoveStatus),
    ]
}

proptest! {
    #[test]
    fn round_trip_preserves_visible_fields(ops in proptest::collection::vec(edit_op(), 0..40)) {
        let mut editor = Editor::new(
            Roadmap::new("Round trip"),
            StatusRegistry::in_memory(default_statuses()),
        );

        for op in ops {
            let milestones: Vec<String> =
                editor.roadmap().milestones.iter().map(|m| m.id().to_string()).collect();
            let pick = |i: usize| milestones.get(i % milestones.len().max(1)).cloned();
            let command = match op {
                EditOp::AddMilestone => Some(Command::AddMilestone { data: None }),
                EditOp::AddItem(m, s) => pick(m).map(|milestone| {
                    let statuses = editor.registry().all();
                    Command::AddItem {
                        milestone,
                        data: Some(roadmap_core::snapshot::ItemSnapshot {
                            id: None,
                            text: format!("item {s}"),
                            status: statuses[s % statuses.len()].name.clone(),
                        }),
                    }
                }),
                EditOp::Date(m, d) => pick(m).map(|milestone| Command::SetMilestoneDate {
                    milestone,
                    date: format!("2025-03-{d:02}"),
                }),
                EditOp::Title(m, title) => {
                    pick(m).map(|milestone| Command::SetMilestoneTitle { milestone, title })
                }
                EditOp::Text(m, text) => pick(m).and_then(|milestone| {
                    let item = editor.roadmap().milestone(&milestone)?.items.first()?.id().to_string();
                    Some(Command::SetItemText { milestone, item, text })
                }),
                EditOp::RemoveStatus => (editor.registry().len() > 1)
                    .then_some(Command::RemoveStatus { index: editor.registry().len() - 1 }),
            };
            if let Some(command) = command {
                editor.apply(command).unwrap();
            }
        }

        let original = editor.roadmap();
        let restored = Roadmap::deserialize(&original.serialize(), editor.registry()).unwrap();

        prop_assert_eq!(&restored.name, &original.name);
        prop_assert_eq!(restored.milestones.len(), original.milestones.len());
        for (a, b) in original.milestones.iter().zip(&restored.milestones) {
            prop_assert_eq!(a.id(), b.id());
            prop_assert_eq!(&a.title, &b.title);
            prop_assert_eq!(&a.purpose, &b.purpose);
            prop_assert_eq!(a.current_completion_date(), b.current_completion_date());
            prop_assert_eq!(a.original_completion_date(), b.original_completion_date());
            prop_assert_eq!(a.items.len(), b.items.len());
            for (x, y) in a.items.iter().zip(&b.items) {
                prop_assert_eq!(x.id(), y.id());
                prop_assert_eq!(&x.text, &y.text);
                prop_assert_eq!(x.status(), y.status());
            }
        }
    }
}
