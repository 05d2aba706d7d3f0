//! OAuth2 device authorization grant for Google
//!
//! Google wants the client secret in the request body for both the device
//! token exchange and the refresh exchange, and does not rotate refresh
//! tokens on refresh.

use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, AuthType, ClientId, ClientSecret, DeviceAuthorizationUrl,
    EndpointNotSet, EndpointSet, RefreshToken, Scope, StandardDeviceAuthorizationResponse,
    TokenUrl,
};
use tracing::info;

use super::{GoogleEndpoints, DRIVE_FILE_SCOPE};
use crate::tokens::TokenGrant;

type GoogleClient =
    BasicClient<EndpointNotSet, EndpointSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// What the operator needs to approve a device authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceChallenge {
    pub verification_url: String,
    pub user_code: String,
}

/// Device authorization and token refresh against the Google OAuth server
pub struct GoogleAuth {
    client: GoogleClient,
    http: reqwest::Client,
}

impl GoogleAuth {
    /// Creates the flow for one registered application
    pub fn new(
        endpoints: &GoogleEndpoints,
        client_id: &str,
        client_secret: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_type(AuthType::RequestBody)
            .set_device_authorization_url(
                DeviceAuthorizationUrl::new(endpoints.device_code_url.clone())
                    .context("Invalid device authorization URL")?,
            )
            .set_token_uri(TokenUrl::new(endpoints.token_url.clone()).context("Invalid token URL")?);

        Ok(Self { client, http })
    }

    /// Requests a device code and the user code to show the operator
    pub async fn request_device_code(&self) -> Result<StandardDeviceAuthorizationResponse> {
        info!("Requesting device code");

        self.client
            .exchange_device_code()
            .add_scope(Scope::new(DRIVE_FILE_SCOPE.to_string()))
            .request_async(&self.http)
            .await
            .context("Failed to request device code")
    }

    /// Polls the token endpoint until the operator approves or the code expires
    ///
    /// Honours the server's polling interval and `slow_down` responses;
    /// `access_denied` and `expired_token` end the wait with an error.
    pub async fn poll_device_token(
        &self,
        details: &StandardDeviceAuthorizationResponse,
    ) -> Result<TokenGrant> {
        info!("Waiting for device authorization");

        let response = self
            .client
            .exchange_device_access_token(details)
            .request_async(&self.http, tokio::time::sleep, None)
            .await
            .context("Device authorization was not completed")?;

        Ok(TokenGrant::from_response(&response))
    }

    /// Obtains a fresh access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        info!("Refreshing access token");

        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http)
            .await
            .context("Failed to refresh token")?;

        Ok(TokenGrant::from_response(&response))
    }
}

/// The parts of a device authorization response shown to the operator
pub fn challenge_of(details: &StandardDeviceAuthorizationResponse) -> DeviceChallenge {
    DeviceChallenge {
        verification_url: details.verification_uri().url().to_string(),
        user_code: details.user_code().secret().to_string(),
    }
}
