//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for the settings store.
//! - Configure connection pragmas and trigger schema migrations before
//!   returning a usable connection.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the settings database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");
    let result = Connection::open(path)
        .map_err(Into::into)
        .and_then(|mut conn| {
            bootstrap_connection(&mut conn)?;
            Ok(conn)
        });
    log_open_result(&result, started_at, "file");
    result
}

/// Opens an in-memory settings database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");
    let result = Connection::open_in_memory()
        .map_err(Into::into)
        .and_then(|mut conn| {
            bootstrap_connection(&mut conn)?;
            Ok(conn)
        });
    log_open_result(&result, started_at, "memory");
    result
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}

fn log_open_result(result: &DbResult<Connection>, started_at: Instant, mode: &str) {
    match result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
}
