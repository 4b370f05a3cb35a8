//! Canvas domain model.
//!
//! # Responsibility
//! - Define the in-memory document tree that is the single source of truth.
//! - Define the serializable snapshot aggregate exchanged with storage,
//!   backups and imports.
//!
//! # Invariants
//! - Section names are unique within one document.
//! - The mission-card array has a fixed length of four; indices are stable
//!   identifiers, not reorderable.

pub mod canvas;
pub mod snapshot;
