//! Remote document store seam and GitHub-contents implementation.
//!
//! # Responsibility
//! - Fetch the current revision marker for the published file.
//! - Submit the conditional write carrying content and revision marker.
//!
//! # Invariants
//! - There is no create-if-missing path: a failed revision lookup fails
//!   the whole publish.
//! - Remote API error messages are surfaced verbatim when available,
//!   generic text otherwise.

use crate::repo::setting_repo::{
    RepoResult, SettingRepository, REMOTE_ACCOUNT_KEY, REMOTE_REPOSITORY_KEY, REMOTE_TOKEN_KEY,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const API_BASE_URL: &str = "https://api.github.com";
const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const USER_AGENT_VALUE: &str = concat!("sprintcanvas/", env!("CARGO_PKG_VERSION"));

/// Remote store coordinates and credentials, persisted device-locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteConfig {
    pub account: String,
    pub repository: String,
    pub token: String,
    /// Path of the published file inside the repository.
    pub file_path: String,
}

impl RemoteConfig {
    /// All three credentials must be present before publishing.
    pub fn is_configured(&self) -> bool {
        !self.account.is_empty() && !self.repository.is_empty() && !self.token.is_empty()
    }

    /// Reads credentials from the settings store.
    pub fn load<R: SettingRepository>(
        repo: &R,
        file_path: impl Into<String>,
    ) -> RepoResult<Self> {
        Ok(Self {
            account: repo.get_setting(REMOTE_ACCOUNT_KEY)?.unwrap_or_default(),
            repository: repo.get_setting(REMOTE_REPOSITORY_KEY)?.unwrap_or_default(),
            token: repo.get_setting(REMOTE_TOKEN_KEY)?.unwrap_or_default(),
            file_path: file_path.into(),
        })
    }

    /// Writes credentials to the settings store.
    pub fn store<R: SettingRepository>(&self, repo: &R) -> RepoResult<()> {
        repo.put_setting(REMOTE_ACCOUNT_KEY, &self.account)?;
        repo.put_setting(REMOTE_REPOSITORY_KEY, &self.repository)?;
        repo.put_setting(REMOTE_TOKEN_KEY, &self.token)?;
        Ok(())
    }
}

/// Remote call failure with the API status when one was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub message: String,
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {status})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(value: reqwest::Error) -> Self {
        Self {
            message: value.to_string(),
            status: value.status().map(|status| status.as_u16()),
        }
    }
}

/// Conditional write request: full document text plus the revision marker
/// obtained from the preceding lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutDocumentRequest {
    /// Human-readable change message.
    pub message: String,
    /// Full document text; implementations handle transfer encoding.
    pub content: String,
    /// Revision marker the write is conditional on.
    pub revision: String,
}

/// Result of an accepted conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutDocumentResponse {
    /// Revision marker of the newly written content.
    pub revision: String,
}

/// Remote document store contract used by the publish channel.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_revision(&self) -> Result<String, RemoteError>;
    async fn put_document(
        &self,
        request: &PutDocumentRequest,
    ) -> Result<PutDocumentResponse, RemoteError>;
}

#[derive(Debug, Deserialize)]
struct ContentMeta {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PutResponseBody {
    content: Option<ContentMeta>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequestBody<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
}

/// GitHub contents-API implementation of [`RemoteStore`].
#[derive(Debug)]
pub struct GithubRemoteStore {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl GithubRemoteStore {
    /// Builds a store from loaded configuration; rejects missing
    /// credentials up front.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        if !config.is_configured() {
            return Err(RemoteError::new(
                "remote store not configured: set account, repository and token first",
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    fn contents_url(&self) -> String {
        format!(
            "{API_BASE_URL}/repos/{}/{}/contents/{}",
            self.config.account, self.config.repository, self.config.file_path
        )
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.config.token)
    }

    async fn api_error(response: reqwest::Response, fallback: &str) -> RemoteError {
        let status = response.status();
        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| fallback.to_string());
        RemoteError::with_status(message, status)
    }
}

#[async_trait]
impl RemoteStore for GithubRemoteStore {
    async fn fetch_revision(&self) -> Result<String, RemoteError> {
        let response = self
            .client
            .get(self.contents_url())
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, ACCEPT_MEDIA_TYPE)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "revision lookup failed").await);
        }

        let meta: ContentMeta = response.json().await?;
        Ok(meta.sha)
    }

    async fn put_document(
        &self,
        request: &PutDocumentRequest,
    ) -> Result<PutDocumentResponse, RemoteError> {
        let body = PutRequestBody {
            message: &request.message,
            content: BASE64.encode(request.content.as_bytes()),
            sha: &request.revision,
        };

        let response = self
            .client
            .put(self.contents_url())
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, ACCEPT_MEDIA_TYPE)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "document write rejected").await);
        }

        let body: PutResponseBody = response.json().await?;
        let revision = body
            .content
            .map(|content| content.sha)
            .ok_or_else(|| RemoteError::new("write accepted but response carried no revision"))?;
        Ok(PutDocumentResponse { revision })
    }
}
