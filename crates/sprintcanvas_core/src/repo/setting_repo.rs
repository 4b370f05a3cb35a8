//! Device-local settings repository.
//!
//! # Responsibility
//! - Provide the single-writer key/value store that stands in for
//!   browser-local storage: canvas snapshot, remote credentials and the
//!   last-published marker.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Writes are upserts; a key holds at most one value.
//! - Keys are fixed constants owned by the callers, never user input.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Setting key holding the serialized canvas snapshot.
pub const SNAPSHOT_KEY: &str = "canvas_snapshot";
/// Setting key holding the remote account identifier.
pub const REMOTE_ACCOUNT_KEY: &str = "remote_account";
/// Setting key holding the remote repository identifier.
pub const REMOTE_REPOSITORY_KEY: &str = "remote_repository";
/// Setting key holding the remote access token.
pub const REMOTE_TOKEN_KEY: &str = "remote_token";
/// Setting key holding the last successful publish timestamp.
pub const LAST_PUBLISHED_KEY: &str = "last_published";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for settings persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value settings contract.
pub trait SettingRepository {
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>>;
    fn put_setting(&self, key: &str, value: &str) -> RepoResult<()>;
    fn delete_setting(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingRepository for SqliteSettingRepository<'_> {
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1;", [key])?;
        Ok(())
    }
}
