use sprintcanvas_core::db::migrations::latest_version;
use sprintcanvas_core::db::{open_db, open_db_in_memory};
use sprintcanvas_core::{
    apply, capture, CanvasDocument, CanvasStore, HeaderBlock, IntroBlock, MissionCard,
    SnapshotError, SqliteSettingRepository,
};

fn sample_document() -> CanvasDocument {
    let mut doc = CanvasDocument::new(["strengths", "goals", "resources"]).unwrap();
    doc.header = HeaderBlock {
        title: "Sprint Canvas".to_string(),
        subtitle: "Week 12".to_string(),
    };
    doc.intro = IntroBlock {
        title: "Why".to_string(),
        description: "One page plan".to_string(),
        footer: "Updated weekly".to_string(),
    };
    doc.set_mission_card(
        0,
        MissionCard {
            title: "Focus".to_string(),
            description: "Ship it".to_string(),
        },
    )
    .unwrap();
    doc.add_item("strengths", "Deep work", "- mornings\n- quiet room")
        .unwrap();
    doc.add_item("strengths", "Network", "people who answer email")
        .unwrap();
    doc.add_item("goals", "Launch", "- beta\nthen listen\n• iterate")
        .unwrap();
    doc
}

#[test]
fn apply_capture_is_a_fixpoint() {
    let mut doc = sample_document();
    let before = doc.clone();

    let snapshot = capture(&doc);
    let report = apply(&mut doc, &snapshot).unwrap();

    assert_eq!(doc, before);
    assert_eq!(report.sections_applied, 3);
    assert!(report.skipped_sections.is_empty());
    assert_eq!(report.mission_cards_applied, 4);
}

#[test]
fn capture_preserves_reordered_item_sequence() {
    let mut doc = sample_document();
    doc.add_item("goals", "Second", "x").unwrap();
    doc.add_item("goals", "Third", "y").unwrap();
    doc.move_item("goals", 2, 0).unwrap();

    let snapshot = capture(&doc);
    let titles: Vec<&str> = snapshot.sections["goals"]
        .iter()
        .map(|item| item.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Third", "Launch", "Second"]);
}

#[test]
fn unknown_snapshot_section_is_skipped_and_reported() {
    let mut doc = sample_document();
    let mut snapshot = capture(&doc);
    snapshot.sections.insert("retired_section".to_string(), vec![]);

    let before = doc.clone();
    let report = apply(&mut doc, &snapshot).unwrap();

    assert_eq!(doc, before);
    assert_eq!(report.skipped_sections, vec!["retired_section".to_string()]);
}

#[test]
fn live_section_absent_from_snapshot_is_left_untouched() {
    let mut doc = sample_document();
    let mut snapshot = capture(&doc);
    snapshot.sections.remove("strengths");

    let report = apply(&mut doc, &snapshot).unwrap();

    assert_eq!(report.sections_applied, 2);
    assert_eq!(doc.section("strengths").unwrap().len(), 2);
}

#[test]
fn short_mission_card_list_applies_given_indices_only() {
    let mut doc = sample_document();
    let untouched = doc.mission_cards[2].clone();
    let mut snapshot = capture(&doc);
    snapshot.mission_cards = Some(vec![
        MissionCard {
            title: "New 0".to_string(),
            description: String::new(),
        },
        MissionCard {
            title: "New 1".to_string(),
            description: String::new(),
        },
    ]);

    let report = apply(&mut doc, &snapshot).unwrap();

    assert_eq!(report.mission_cards_applied, 2);
    assert_eq!(doc.mission_cards[0].title, "New 0");
    assert_eq!(doc.mission_cards[2], untouched);
}

#[test]
fn oversized_mission_card_list_rejects_whole_snapshot() {
    let mut doc = sample_document();
    let mut snapshot = capture(&doc);
    snapshot.mission_cards = Some(vec![MissionCard::default(); 5]);
    snapshot.header = Some(HeaderBlock {
        title: "Should never land".to_string(),
        subtitle: String::new(),
    });

    let before = doc.clone();
    let err = apply(&mut doc, &snapshot).unwrap_err();

    assert_eq!(err, SnapshotError::TooManyMissionCards { count: 5 });
    assert_eq!(doc, before, "rejected snapshot must not partially apply");
}

#[test]
fn save_then_load_restores_state_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("settings.db");

    {
        let conn = open_db(&db_path).unwrap();
        let store = CanvasStore::new(SqliteSettingRepository::new(&conn));
        store.save(&sample_document()).unwrap();
    }

    let conn = open_db(&db_path).unwrap();
    let store = CanvasStore::new(SqliteSettingRepository::new(&conn));
    let mut fresh = CanvasDocument::new(["strengths", "goals", "resources"]).unwrap();
    let report = store.load(&mut fresh).unwrap().unwrap();

    assert_eq!(report.sections_applied, 3);
    assert_eq!(fresh, sample_document());
}

#[test]
fn load_without_saved_snapshot_leaves_default_structure() {
    let conn = open_db_in_memory().unwrap();
    let store = CanvasStore::new(SqliteSettingRepository::new(&conn));

    let mut doc = sample_document();
    let before = doc.clone();
    assert!(store.load(&mut doc).unwrap().is_none());
    assert_eq!(doc, before);
}

#[test]
fn clear_saved_removes_the_persisted_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let store = CanvasStore::new(SqliteSettingRepository::new(&conn));

    store.save(&sample_document()).unwrap();
    store.clear_saved().unwrap();

    let mut doc = CanvasDocument::new(["strengths", "goals", "resources"]).unwrap();
    assert!(store.load(&mut doc).unwrap().is_none());
}

#[test]
fn settings_schema_is_at_latest_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert!(version >= 1);
}
