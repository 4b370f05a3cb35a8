//! Publish channel: push the rendered document to a remote content store.
//!
//! # Responsibility
//! - Define the remote-store seam and its GitHub-contents implementation.
//! - Run the read-then-conditional-write protocol with single-flight and
//!   timeout protection.
//!
//! # Invariants
//! - The revision lookup must succeed before any write is issued.
//! - At most one publish is in flight; concurrent callers are deflected,
//!   not queued.

pub mod channel;
pub mod remote;
