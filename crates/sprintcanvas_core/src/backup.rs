//! Backup channel: snapshot export/import as JSON files.
//!
//! # Responsibility
//! - Export a snapshot as pretty-printed JSON with a timestamped name.
//! - Parse and validate a user-supplied backup before acceptance.
//!
//! # Invariants
//! - A failed import reports an error and leaves current state untouched;
//!   it never partially applies.
//! - File names are filesystem-safe: `:` and `.` in the timestamp are
//!   replaced with `-`.

use crate::model::snapshot::{CanvasSnapshot, SnapshotError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BACKUP_FILE_PREFIX: &str = "sprint-canvas-backup";

pub type BackupResult<T> = Result<T, BackupError>;

/// Import/export failures for backup files.
#[derive(Debug)]
pub enum BackupError {
    /// File bytes are not valid UTF-8.
    Encoding(std::str::Utf8Error),
    /// File content is not valid JSON for the snapshot shape.
    Parse(serde_json::Error),
    /// JSON parsed but violates snapshot constraints.
    Invalid(SnapshotError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(err) => write!(f, "backup file is not valid UTF-8: {err}"),
            Self::Parse(err) => write!(f, "invalid backup file: {err}"),
            Self::Invalid(err) => write!(f, "invalid backup content: {err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encoding(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<SnapshotError> for BackupError {
    fn from(value: SnapshotError) -> Self {
        Self::Invalid(value)
    }
}

/// One exported backup, ready to be written wherever the caller wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub file_name: String,
    pub contents: String,
}

/// Serializes a snapshot to a pretty-printed, timestamp-named backup.
pub fn export_snapshot(
    snapshot: &CanvasSnapshot,
    now: DateTime<Utc>,
) -> BackupResult<BackupFile> {
    let contents = serde_json::to_string_pretty(snapshot).map_err(BackupError::Parse)?;
    Ok(BackupFile {
        file_name: backup_file_name(now),
        contents,
    })
}

/// Builds the timestamped backup file name.
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{BACKUP_FILE_PREFIX}-{stamp}.json")
}

/// Parses and validates backup file bytes into a snapshot.
///
/// Callers must `apply` the result and immediately re-capture + persist so
/// device storage reflects the imported backup.
pub fn import_snapshot(bytes: &[u8]) -> BackupResult<CanvasSnapshot> {
    let text = std::str::from_utf8(bytes).map_err(BackupError::Encoding)?;
    let snapshot: CanvasSnapshot = serde_json::from_str(text).map_err(BackupError::Parse)?;
    snapshot.validate()?;
    Ok(snapshot)
}
