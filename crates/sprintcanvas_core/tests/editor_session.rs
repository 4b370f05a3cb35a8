use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use sprintcanvas_core::db::open_db_in_memory;
use sprintcanvas_core::repo::setting_repo::SNAPSHOT_KEY;
use sprintcanvas_core::{
    capture, CanvasDocument, CanvasStore, EditorError, EditorService, HeaderBlock, MissionCard,
    PassphraseGate, PublishChannel, PublishOutcome, PutDocumentRequest, PutDocumentResponse,
    RemoteError, RemoteStore, SettingRepository, SqliteSettingRepository,
};

const PASSPHRASE: &str = "open sesame";

fn service(conn: &Connection) -> EditorService<SqliteSettingRepository<'_>> {
    let document = CanvasDocument::new(["strengths", "goals"]).unwrap();
    let store = CanvasStore::new(SqliteSettingRepository::new(conn));
    EditorService::new(document, store, PassphraseGate::from_passphrase(PASSPHRASE))
}

#[test]
fn locked_session_rejects_every_mutation() {
    let conn = open_db_in_memory().unwrap();
    let mut editor = service(&conn);

    assert!(matches!(
        editor.add_item("strengths", "t", "d"),
        Err(EditorError::Locked)
    ));
    assert!(matches!(
        editor.edit_item("strengths", 0, "t", "d"),
        Err(EditorError::Locked)
    ));
    assert!(matches!(
        editor.delete_item("strengths", 0),
        Err(EditorError::Locked)
    ));
    assert!(matches!(
        editor.move_item("strengths", 0, 1),
        Err(EditorError::Locked)
    ));
    assert!(matches!(
        editor.set_header(HeaderBlock::default()),
        Err(EditorError::Locked)
    ));
    assert!(matches!(
        editor.set_mission_card(0, MissionCard::default()),
        Err(EditorError::Locked)
    ));
    assert!(matches!(editor.clear_saved(), Err(EditorError::Locked)));
    assert!(matches!(
        editor.import_backup(b"{}"),
        Err(EditorError::Locked)
    ));
    assert_eq!(editor.document().item_count(), 0);
}

#[test]
fn unlock_requires_the_exact_passphrase() {
    let conn = open_db_in_memory().unwrap();
    let mut editor = service(&conn);

    assert!(!editor.unlock("wrong"));
    assert!(!editor.is_unlocked());

    assert!(editor.unlock(PASSPHRASE));
    assert!(editor.is_unlocked());

    editor.lock();
    assert!(!editor.is_unlocked());
    assert!(matches!(
        editor.add_item("strengths", "t", "d"),
        Err(EditorError::Locked)
    ));
}

#[test]
fn successful_mutation_persists_without_explicit_save() {
    let conn = open_db_in_memory().unwrap();
    {
        let mut editor = service(&conn);
        editor.unlock(PASSPHRASE);
        editor
            .add_item("goals", "Launch", "- beta\n- listen")
            .unwrap();
    }

    let mut restarted = service(&conn);
    let report = restarted.start().unwrap().unwrap();
    assert_eq!(report.sections_applied, 2);
    assert_eq!(restarted.document().section("goals").unwrap().len(), 1);
}

#[test]
fn export_then_import_restores_the_document() {
    let conn = open_db_in_memory().unwrap();
    let mut editor = service(&conn);
    editor.unlock(PASSPHRASE);
    editor.add_item("strengths", "Deep work", "mornings").unwrap();
    editor
        .set_header(HeaderBlock {
            title: "Sprint".to_string(),
            subtitle: "W12".to_string(),
        })
        .unwrap();

    let backup = editor.export_backup(Utc::now()).unwrap();
    assert!(backup.file_name.starts_with("sprint-canvas-backup-"));
    assert!(backup.file_name.ends_with(".json"));

    let conn2 = open_db_in_memory().unwrap();
    let mut other = service(&conn2);
    other.unlock(PASSPHRASE);
    other.import_backup(backup.contents.as_bytes()).unwrap();

    assert_eq!(other.document(), editor.document());
}

#[test]
fn failed_import_changes_nothing_live_or_persisted() {
    let conn = open_db_in_memory().unwrap();
    let mut editor = service(&conn);
    editor.unlock(PASSPHRASE);
    editor.add_item("strengths", "Keep me", "intact").unwrap();

    let repo = SqliteSettingRepository::new(&conn);
    let persisted_before = repo.get_setting(SNAPSHOT_KEY).unwrap().unwrap();
    let live_before = capture(editor.document());

    assert!(editor.import_backup(b"{broken").is_err());

    assert_eq!(capture(editor.document()), live_before);
    assert_eq!(
        repo.get_setting(SNAPSHOT_KEY).unwrap().unwrap(),
        persisted_before
    );
}

#[test]
fn search_is_case_insensitive_over_title_and_description() {
    let conn = open_db_in_memory().unwrap();
    let mut editor = service(&conn);
    editor.unlock(PASSPHRASE);
    editor
        .add_item("strengths", "Deep Work", "Quiet mornings")
        .unwrap();
    editor.add_item("goals", "Launch", "ship the beta").unwrap();

    let hits = editor.search("MORNINGS");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].section, "strengths");
    assert_eq!(hits[0].title, "Deep Work");

    assert_eq!(editor.search("").len(), 2);
    assert!(editor.search("nothing here").is_empty());
}

#[test]
fn stats_reflect_item_and_section_counts() {
    let conn = open_db_in_memory().unwrap();
    let mut editor = service(&conn);
    editor.unlock(PASSPHRASE);

    let empty = editor.stats();
    assert_eq!(empty.total_items, 0);
    assert_eq!(empty.sections, 2);

    editor.add_item("strengths", "a", "").unwrap();
    editor.add_item("goals", "b", "").unwrap();
    editor.add_item("goals", "c", "").unwrap();

    let stats = editor.stats();
    assert_eq!(stats.total_items, 3);
    assert_eq!(stats.sections, 2);
}

struct StaticRemote;

#[async_trait]
impl RemoteStore for StaticRemote {
    async fn fetch_revision(&self) -> Result<String, RemoteError> {
        Ok("rev-before".to_string())
    }

    async fn put_document(
        &self,
        _request: &PutDocumentRequest,
    ) -> Result<PutDocumentResponse, RemoteError> {
        Ok(PutDocumentResponse {
            revision: "rev-after".to_string(),
        })
    }
}

#[tokio::test]
async fn publish_records_the_last_published_marker() {
    let conn = open_db_in_memory().unwrap();
    let editor = service(&conn);
    assert!(editor.last_published().unwrap().is_none());

    let channel = PublishChannel::new(StaticRemote);
    let outcome = editor.publish(&channel, "<html></html>").await.unwrap();
    assert!(matches!(outcome, PublishOutcome::Published { .. }));

    let marker = editor.last_published().unwrap().unwrap();
    assert!(marker.ends_with('Z'), "marker should be rfc3339 utc: {marker}");
}
