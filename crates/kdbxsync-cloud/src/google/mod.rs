//! Google Drive backend
//!
//! Authorization uses the OAuth2 device authorization grant: the operator
//! enters a short user code on a Google page while the provider polls the
//! token endpoint. Uploads use resumable sessions and remember the remote
//! file id per source path, so later runs update the same Drive file.

pub mod auth;
pub mod provider;
pub mod record;
pub mod upload;

pub use provider::GoogleDriveProvider;
pub use record::GoogleRecord;

/// Default Google device authorization endpoint
const DEVICE_CODE_URL: &str = "https://oauth2.googleapis.com/device/code";

/// Default Google OAuth2 token endpoint
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Default Drive v3 upload API base
const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Scope limited to files created or opened by this application
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Endpoints the provider talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub device_code_url: String,
    pub token_url: String,
    pub upload_base: String,
}

impl GoogleEndpoints {
    /// All endpoints under one base URL (useful for testing)
    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self {
            device_code_url: format!("{base}/device/code"),
            token_url: format!("{base}/token"),
            upload_base: format!("{base}/upload/drive/v3"),
        }
    }
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            device_code_url: DEVICE_CODE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            upload_base: UPLOAD_BASE_URL.to_string(),
        }
    }
}
