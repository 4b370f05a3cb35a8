//! Canvas store: snapshot capture/apply and device-local persistence.
//!
//! # Responsibility
//! - Extract the full document state into a [`CanvasSnapshot`] and apply a
//!   snapshot back onto the live document.
//! - Persist the snapshot to the settings store after every mutating
//!   action; reload it at startup.
//!
//! # Invariants
//! - `capture` is a pure read; it never mutates the document.
//! - `apply` validates the whole snapshot before touching the document, so
//!   a rejected snapshot is never partially applied.
//! - A snapshot section with no live counterpart is skipped, a live
//!   section absent from the snapshot is left untouched; both directions
//!   keep older and newer snapshots loadable.

use crate::model::canvas::{CanvasDocument, SectionItem, MISSION_CARD_COUNT};
use crate::model::snapshot::{CanvasItem, CanvasSnapshot, SnapshotError};
use crate::repo::setting_repo::{RepoError, SettingRepository, SNAPSHOT_KEY};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error taxonomy: snapshot shape, serialization, persistence.
#[derive(Debug)]
pub enum StoreError {
    Snapshot(SnapshotError),
    Serialization(serde_json::Error),
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SnapshotError> for StoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of one `apply`, making the skip policy observable instead of
/// silent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Sections whose item sequence was replaced.
    pub sections_applied: usize,
    /// Snapshot section keys with no live counterpart.
    pub skipped_sections: Vec<String>,
    /// Mission-card slots overwritten (0..=4).
    pub mission_cards_applied: usize,
}

/// Walks the document in display order and assembles one snapshot.
pub fn capture(document: &CanvasDocument) -> CanvasSnapshot {
    let mut snapshot = CanvasSnapshot {
        header: Some(document.header.clone()),
        intro: Some(document.intro.clone()),
        canvas_title: Some(document.canvas_title.clone()),
        mission_cards: Some(document.mission_cards.to_vec()),
        ..CanvasSnapshot::default()
    };

    for section in document.sections() {
        let items = section
            .items()
            .iter()
            .map(|item| CanvasItem {
                title: item.title().to_string(),
                description: item.description_text(),
            })
            .collect();
        snapshot.sections.insert(section.name().to_string(), items);
    }

    snapshot
}

/// Applies a snapshot onto the live document.
///
/// Singleton blocks and mission cards are overwritten by key/index; each
/// snapshot section replaces the matching live section's items wholesale
/// in snapshot order. Skips are reported and logged, never silent.
pub fn apply(
    document: &mut CanvasDocument,
    snapshot: &CanvasSnapshot,
) -> Result<ApplyReport, SnapshotError> {
    snapshot.validate()?;

    let mut report = ApplyReport::default();

    if let Some(header) = &snapshot.header {
        document.header = header.clone();
    }
    if let Some(intro) = &snapshot.intro {
        document.intro = intro.clone();
    }
    if let Some(canvas_title) = &snapshot.canvas_title {
        document.canvas_title = canvas_title.clone();
    }
    if let Some(cards) = &snapshot.mission_cards {
        for (index, card) in cards.iter().enumerate() {
            // validate() bounded the card count, so the index always fits.
            if document.set_mission_card(index, card.clone()).is_ok() {
                report.mission_cards_applied += 1;
            }
        }
        if cards.len() < MISSION_CARD_COUNT {
            warn!(
                "event=canvas_apply module=store status=partial mission_cards={} expected={}",
                cards.len(),
                MISSION_CARD_COUNT
            );
        }
    }

    for (name, items) in &snapshot.sections {
        let rebuilt: Vec<SectionItem> = items
            .iter()
            .map(|item| SectionItem::new(item.title.clone(), &item.description))
            .collect();
        match document.replace_section_items(name, rebuilt) {
            Ok(()) => report.sections_applied += 1,
            Err(_) => {
                warn!("event=canvas_apply module=store status=skip section={name}");
                report.skipped_sections.push(name.clone());
            }
        }
    }

    Ok(report)
}

/// Device-local persistence for the canvas snapshot, keyed by a fixed
/// setting name.
pub struct CanvasStore<R: SettingRepository> {
    repo: R,
}

impl<R: SettingRepository> CanvasStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Captures the document and persists the snapshot immediately.
    pub fn save(&self, document: &CanvasDocument) -> StoreResult<()> {
        let snapshot = capture(document);
        let serialized = serde_json::to_string(&snapshot)?;
        self.repo.put_setting(SNAPSHOT_KEY, &serialized)?;
        info!(
            "event=canvas_save module=store status=ok bytes={}",
            serialized.len()
        );
        Ok(())
    }

    /// Loads the persisted snapshot, if any, and applies it.
    ///
    /// Returns `None` when nothing is stored; the default live structure
    /// stands unchanged. Malformed persisted state fails closed without
    /// touching the document.
    pub fn load(&self, document: &mut CanvasDocument) -> StoreResult<Option<ApplyReport>> {
        let Some(serialized) = self.repo.get_setting(SNAPSHOT_KEY)? else {
            info!("event=canvas_load module=store status=empty");
            return Ok(None);
        };

        let snapshot: CanvasSnapshot = serde_json::from_str(&serialized)?;
        let report = apply(document, &snapshot)?;
        info!(
            "event=canvas_load module=store status=ok sections_applied={} skipped={}",
            report.sections_applied,
            report.skipped_sections.len()
        );
        Ok(Some(report))
    }

    /// Removes the persisted snapshot (reset-to-default path).
    pub fn clear_saved(&self) -> StoreResult<()> {
        self.repo.delete_setting(SNAPSHOT_KEY)?;
        info!("event=canvas_clear module=store status=ok");
        Ok(())
    }
}
