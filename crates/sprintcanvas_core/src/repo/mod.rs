//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the device-local key/value settings contract.
//! - Isolate SQLite query details from store/service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors in addition to DB transport
//!   errors.

pub mod setting_repo;
