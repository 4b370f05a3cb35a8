//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate document, store, gate and channels into use-case APIs.
//! - Keep UI layers decoupled from storage and protocol details.

pub mod editor;
