//! Yandex Disk backend
//!
//! Authorization uses the OAuth2 authorization code grant without a redirect:
//! the operator opens the authorize URL, approves access and pastes back the
//! confirmation code Yandex displays. Uploads go to a name derived from the
//! source path and always overwrite, so no remote ids are tracked.

pub mod auth;
pub mod provider;
pub mod record;
pub mod upload;

pub use provider::YandexDiskProvider;
pub use record::YandexRecord;

/// Default Yandex OAuth2 authorization endpoint
const AUTHORIZE_URL: &str = "https://oauth.yandex.ru/authorize";

/// Default Yandex OAuth2 token endpoint
const TOKEN_URL: &str = "https://oauth.yandex.ru/token";

/// Default Yandex Disk REST API base
const API_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk";

/// Endpoints the provider talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YandexEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_base: String,
}

impl YandexEndpoints {
    /// All endpoints under one base URL (useful for testing)
    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self {
            authorize_url: format!("{base}/authorize"),
            token_url: format!("{base}/token"),
            api_base: format!("{base}/v1/disk"),
        }
    }
}

impl Default for YandexEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            api_base: API_BASE_URL.to_string(),
        }
    }
}
