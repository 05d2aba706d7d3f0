//! kdbxsync Cloud - storage backend adapters
//!
//! Implements the [`CloudProvider`](kdbxsync_core::ports::CloudProvider) port
//! for two backends:
//!
//! - [`yandex`] - Yandex Disk, OAuth2 authorization code pasted by the operator
//! - [`google`] - Google Drive, OAuth2 device authorization grant
//!
//! ## Modules
//!
//! - [`tokens`] - Token grants and expiry bookkeeping shared by both backends
//! - [`yandex`] - Yandex Disk provider (auth, upload, record, provider)
//! - [`google`] - Google Drive provider (auth, upload, record, provider)

pub mod google;
pub mod tokens;
pub mod yandex;

pub use google::GoogleDriveProvider;
pub use yandex::YandexDiskProvider;

use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Errors returned by a storage backend's HTTP API
#[derive(Debug, Error)]
pub enum CloudError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The resource is in a state that prevents the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the backend
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CloudError {
    /// Maps a non-success status and its body to an error
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => CloudError::Unauthorized(body),
            StatusCode::FORBIDDEN => CloudError::Forbidden(body),
            StatusCode::NOT_FOUND => CloudError::NotFound(body),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => CloudError::Conflict(body),
            s if s.is_server_error() => CloudError::ServerError(body),
            s => CloudError::UnexpectedStatus {
                status: s.as_u16(),
                body,
            },
        }
    }

    /// Whether the backend reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }
}

/// HTTP client shared by a provider's OAuth exchanges and uploads
///
/// Redirects are not followed, so a token endpoint cannot bounce a request
/// carrying client credentials to another host.
pub fn http_client() -> Result<reqwest::Client, CloudError> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

/// Passes successful responses through and turns the rest into a [`CloudError`]
///
/// The error keeps the backend's response body so it can be shown to the
/// operator.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, CloudError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());
    Err(CloudError::from_status(status, body))
}
