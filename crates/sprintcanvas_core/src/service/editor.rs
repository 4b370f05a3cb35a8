//! Editor use-case service.
//!
//! # Responsibility
//! - Own the application state: live document, persistence store,
//!   passphrase gate and the session authentication flag.
//! - Gate every mutating operation and persist immediately on success.
//!
//! # Invariants
//! - No mutation reaches the document while the session is locked.
//! - Every successful mutation is followed by a save; there is no
//!   batching or debounce.
//! - A failed backup import leaves document and persisted state untouched.

use crate::auth::PassphraseGate;
use crate::backup::{export_snapshot, import_snapshot, BackupError, BackupFile};
use crate::model::canvas::{
    CanvasDocument, CanvasTitleBlock, DocumentError, HeaderBlock, IntroBlock, MissionCard,
};
use crate::publish::channel::{PublishChannel, PublishError, PublishOutcome};
use crate::publish::remote::RemoteStore;
use crate::repo::setting_repo::{RepoError, SettingRepository, LAST_PUBLISHED_KEY};
use crate::store::{apply, capture, ApplyReport, CanvasStore, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Editor-level error taxonomy.
#[derive(Debug)]
pub enum EditorError {
    /// Session is locked; unlock with the passphrase first.
    Locked,
    Document(DocumentError),
    Store(StoreError),
    Backup(BackupError),
    Repo(RepoError),
    Publish(PublishError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "edit mode is locked"),
            Self::Document(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Backup(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Publish(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Locked => None,
            Self::Document(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Backup(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Publish(err) => Some(err),
        }
    }
}

impl From<DocumentError> for EditorError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<StoreError> for EditorError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BackupError> for EditorError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<PublishError> for EditorError {
    fn from(value: PublishError) -> Self {
        Self::Publish(value)
    }
}

/// Canvas summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasStats {
    pub total_items: usize,
    pub sections: usize,
}

/// One search match: the item's position plus its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub section: String,
    pub index: usize,
    pub title: String,
}

/// Application-state record and mutation gateway for one editing session.
pub struct EditorService<R: SettingRepository> {
    document: CanvasDocument,
    store: CanvasStore<R>,
    gate: PassphraseGate,
    authenticated: bool,
}

impl<R: SettingRepository> EditorService<R> {
    /// Creates a locked session over the given document and store.
    pub fn new(document: CanvasDocument, store: CanvasStore<R>, gate: PassphraseGate) -> Self {
        Self {
            document,
            store,
            gate,
            authenticated: false,
        }
    }

    /// Startup load: applies the persisted snapshot when one exists.
    pub fn start(&mut self) -> Result<Option<ApplyReport>, EditorError> {
        Ok(self.store.load(&mut self.document)?)
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// Verifies the passphrase and unlocks the session on success.
    pub fn unlock(&mut self, passphrase: &str) -> bool {
        if self.gate.verify(passphrase) {
            self.authenticated = true;
            info!("event=session_unlock module=editor status=ok");
        } else {
            warn!("event=session_unlock module=editor status=denied");
        }
        self.authenticated
    }

    /// Locks the session; the canvas becomes read-only.
    pub fn lock(&mut self) {
        self.authenticated = false;
        info!("event=session_lock module=editor status=ok");
    }

    pub fn is_unlocked(&self) -> bool {
        self.authenticated
    }

    /// Appends one item and persists.
    pub fn add_item(
        &mut self,
        section: &str,
        title: &str,
        description: &str,
    ) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.add_item(section, title, description)?;
        self.persist()
    }

    /// Replaces one item's title and description and persists.
    pub fn edit_item(
        &mut self,
        section: &str,
        index: usize,
        title: &str,
        description: &str,
    ) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.edit_item(section, index, title, description)?;
        self.persist()
    }

    /// Deletes one item and persists.
    pub fn delete_item(&mut self, section: &str, index: usize) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.delete_item(section, index)?;
        self.persist()
    }

    /// Reorders one item within its section (drag-end) and persists.
    pub fn move_item(
        &mut self,
        section: &str,
        from: usize,
        to: usize,
    ) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.move_item(section, from, to)?;
        self.persist()
    }

    pub fn set_header(&mut self, header: HeaderBlock) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.header = header;
        self.persist()
    }

    pub fn set_intro(&mut self, intro: IntroBlock) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.intro = intro;
        self.persist()
    }

    pub fn set_canvas_title(&mut self, title: CanvasTitleBlock) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.canvas_title = title;
        self.persist()
    }

    pub fn set_mission_card(&mut self, index: usize, card: MissionCard) -> Result<(), EditorError> {
        self.require_unlocked()?;
        self.document.set_mission_card(index, card)?;
        self.persist()
    }

    /// Explicit save (keyboard-shortcut path); never gated.
    pub fn save(&self) -> Result<(), EditorError> {
        Ok(self.store.save(&self.document)?)
    }

    /// Removes the persisted snapshot (reset-to-default path).
    pub fn clear_saved(&mut self) -> Result<(), EditorError> {
        self.require_unlocked()?;
        Ok(self.store.clear_saved()?)
    }

    /// Exports the current state as a timestamped backup file.
    pub fn export_backup(&self, now: DateTime<Utc>) -> Result<BackupFile, EditorError> {
        let snapshot = capture(&self.document);
        Ok(export_snapshot(&snapshot, now)?)
    }

    /// Imports a backup: parse, apply, and persist so device storage
    /// reflects the imported state. Parse failure changes nothing.
    pub fn import_backup(&mut self, bytes: &[u8]) -> Result<ApplyReport, EditorError> {
        self.require_unlocked()?;
        let snapshot = import_snapshot(bytes)?;
        let report = apply(&mut self.document, &snapshot).map_err(BackupError::Invalid)?;
        self.persist()?;
        info!(
            "event=backup_import module=editor status=ok sections_applied={}",
            report.sections_applied
        );
        Ok(report)
    }

    /// Publishes the rendered document text and records the
    /// last-published marker on success.
    pub async fn publish<S: RemoteStore>(
        &self,
        channel: &PublishChannel<S>,
        document_text: &str,
    ) -> Result<PublishOutcome, EditorError> {
        let outcome = channel.publish(document_text).await?;
        if let PublishOutcome::Published { published_at, .. } = &outcome {
            self.store.repo().put_setting(
                LAST_PUBLISHED_KEY,
                &published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            )?;
        }
        Ok(outcome)
    }

    /// Last successful publish timestamp, when one is recorded.
    pub fn last_published(&self) -> Result<Option<String>, EditorError> {
        Ok(self.store.repo().get_setting(LAST_PUBLISHED_KEY)?)
    }

    /// Case-insensitive substring search over item titles and
    /// descriptions. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        for section in self.document.sections() {
            for (index, item) in section.items().iter().enumerate() {
                let haystack = format!(
                    "{}\n{}",
                    item.title().to_lowercase(),
                    item.description_text().to_lowercase()
                );
                if needle.is_empty() || haystack.contains(&needle) {
                    hits.push(SearchHit {
                        section: section.name().to_string(),
                        index,
                        title: item.title().to_string(),
                    });
                }
            }
        }
        hits
    }

    /// Item and section counts for the stats panel.
    pub fn stats(&self) -> CanvasStats {
        CanvasStats {
            total_items: self.document.item_count(),
            sections: self.document.sections().len(),
        }
    }

    fn require_unlocked(&self) -> Result<(), EditorError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(EditorError::Locked)
        }
    }

    fn persist(&self) -> Result<(), EditorError> {
        Ok(self.store.save(&self.document)?)
    }
}
