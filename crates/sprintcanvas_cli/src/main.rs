//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `sprintcanvas_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("sprintcanvas_core version={}", sprintcanvas_core::core_version());
}
