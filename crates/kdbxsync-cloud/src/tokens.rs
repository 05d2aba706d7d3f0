//! Token grants and expiry bookkeeping
//!
//! Both backends persist the access token expiry as Unix seconds, capped at
//! a backend-specific maximum lifetime whatever the server reports.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use oauth2::TokenResponse;

/// Tokens returned by a successful code, device or refresh exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Absent when the backend does not rotate refresh tokens
    pub refresh_token: Option<String>,
    pub expires_in: Option<StdDuration>,
}

impl TokenGrant {
    /// Extracts the grant from an `oauth2` token response
    pub fn from_response<T: TokenResponse>(response: &T) -> Self {
        Self {
            access_token: response.access_token().secret().to_string(),
            refresh_token: response.refresh_token().map(|t| t.secret().to_string()),
            expires_in: response.expires_in(),
        }
    }

    /// The refresh token to keep: the new one if issued, else `previous`
    pub fn refresh_token_or(&self, previous: &str) -> String {
        self.refresh_token
            .clone()
            .unwrap_or_else(|| previous.to_string())
    }
}

/// Unix timestamp at which a token granted at `now` should be treated as expired
///
/// The lifetime is `min(expires_in, cap)`; a missing `expires_in` means `cap`.
pub fn capped_expiry(now: DateTime<Utc>, expires_in: Option<StdDuration>, cap: Duration) -> i64 {
    let granted = expires_in
        .and_then(|d| Duration::from_std(d).ok())
        .unwrap_or(cap);
    (now + granted.min(cap)).timestamp()
}

/// Whether a token expiring at `expiry` (Unix seconds) can still be used at `now`
pub fn token_still_valid(expiry: i64, now: DateTime<Utc>) -> bool {
    expiry > now.timestamp()
}
