//! Core domain logic for the Sprint Canvas editor.
//! This crate is the single source of truth for canvas state, persistence
//! and the backup/publish channels.

pub mod auth;
pub mod backup;
pub mod db;
pub mod format;
pub mod logging;
pub mod model;
pub mod publish;
pub mod repo;
pub mod service;
pub mod store;

pub use auth::{digest_hex, AuthError, PassphraseGate};
pub use backup::{export_snapshot, import_snapshot, BackupError, BackupFile};
pub use format::{parse_description, render_description, DescLine, Description, LineKind};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::canvas::{
    CanvasDocument, CanvasTitleBlock, DocumentError, HeaderBlock, IntroBlock, MissionCard,
    Section, SectionItem, MISSION_CARD_COUNT,
};
pub use model::snapshot::{CanvasItem, CanvasSnapshot, SnapshotError};
pub use publish::channel::{PublishChannel, PublishError, PublishOutcome, PUBLISH_TIMEOUT};
pub use publish::remote::{
    GithubRemoteStore, PutDocumentRequest, PutDocumentResponse, RemoteConfig, RemoteError,
    RemoteStore,
};
pub use repo::setting_repo::{RepoError, SettingRepository, SqliteSettingRepository};
pub use service::editor::{CanvasStats, EditorError, EditorService, SearchHit};
pub use store::{apply, capture, ApplyReport, CanvasStore, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
