//! Single-flight publish orchestration with timeout protection.
//!
//! # Responsibility
//! - Run the strictly sequential lookup-then-write protocol.
//! - Deflect concurrent publish attempts and recover stuck state.
//!
//! # Invariants
//! - The in-flight flag returns to idle on every exit path; cleanup is a
//!   drop guard, not a code path that can be skipped.
//! - Hitting the timeout drops the protocol future, which cancels the
//!   underlying request.

use crate::publish::remote::{PutDocumentRequest, RemoteError, RemoteStore};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Default window in which lookup and write must both resolve.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Publish failure taxonomy; each variant keeps the stage that failed.
#[derive(Debug)]
pub enum PublishError {
    /// Revision-marker lookup did not succeed; no write was attempted.
    RevisionLookup(RemoteError),
    /// Conditional write was rejected or failed in transit.
    Write(RemoteError),
    /// Neither success nor failure resolved within the window.
    Timeout { seconds: u64 },
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RevisionLookup(err) => write!(f, "revision lookup failed: {err}"),
            Self::Write(err) => write!(f, "publish write failed: {err}"),
            Self::Timeout { seconds } => {
                write!(f, "publishing timed out after {seconds} seconds")
            }
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RevisionLookup(err) | Self::Write(err) => Some(err),
            Self::Timeout { .. } => None,
        }
    }
}

/// Outcome of one publish invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Document accepted by the remote store.
    Published {
        revision: String,
        published_at: DateTime<Utc>,
    },
    /// A publish was already pending; the stuck in-flight state was
    /// cleared instead of issuing a second request.
    ResetStuck,
}

/// Publish channel over one remote store.
pub struct PublishChannel<R: RemoteStore> {
    remote: R,
    in_flight: AtomicBool,
    timeout: Duration,
}

impl<R: RemoteStore> PublishChannel<R> {
    pub fn new(remote: R) -> Self {
        Self::with_timeout(remote, PUBLISH_TIMEOUT)
    }

    pub fn with_timeout(remote: R, timeout: Duration) -> Self {
        Self {
            remote,
            in_flight: AtomicBool::new(false),
            timeout,
        }
    }

    /// Whether a publish is currently pending.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Pushes the full document text through lookup-then-write.
    ///
    /// A second call while one is pending clears the in-flight flag and
    /// returns [`PublishOutcome::ResetStuck`] without touching the network.
    pub async fn publish(&self, document_text: &str) -> Result<PublishOutcome, PublishError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.in_flight.store(false, Ordering::SeqCst);
            warn!("event=publish module=publish status=reset reason=already_in_flight");
            return Ok(PublishOutcome::ResetStuck);
        }

        let _guard = InFlightGuard {
            flag: &self.in_flight,
        };

        match tokio::time::timeout(self.timeout, self.run(document_text)).await {
            Ok(result) => result,
            Err(_) => {
                let seconds = self.timeout.as_secs();
                error!("event=publish module=publish status=timeout seconds={seconds}");
                Err(PublishError::Timeout { seconds })
            }
        }
    }

    async fn run(&self, document_text: &str) -> Result<PublishOutcome, PublishError> {
        info!("event=publish module=publish status=start");
        let revision = self
            .remote
            .fetch_revision()
            .await
            .map_err(PublishError::RevisionLookup)?;

        let published_at = Utc::now();
        let request = PutDocumentRequest {
            message: format!(
                "Update sprint canvas - {}",
                published_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            content: document_text.to_string(),
            revision,
        };

        let response = self
            .remote
            .put_document(&request)
            .await
            .map_err(PublishError::Write)?;

        info!(
            "event=publish module=publish status=ok revision={}",
            response.revision
        );
        Ok(PublishOutcome::Published {
            revision: response.revision,
            published_at,
        })
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
