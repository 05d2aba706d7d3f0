//! OAuth2 authorization code flow for Yandex
//!
//! Yandex shows the confirmation code to the operator when no redirect URI
//! is registered, so there is no local callback server: the code is pasted
//! back through the console.

use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RefreshToken, TokenUrl,
};
use tracing::{debug, info};

use super::YandexEndpoints;
use crate::tokens::TokenGrant;

type YandexClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Code exchange and token refresh against the Yandex OAuth server
pub struct YandexAuth {
    client: YandexClient,
    http: reqwest::Client,
}

impl YandexAuth {
    /// Creates the flow for one registered application
    pub fn new(
        endpoints: &YandexEndpoints,
        client_id: &str,
        client_secret: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_uri(
                AuthUrl::new(endpoints.authorize_url.clone())
                    .context("Invalid authorization URL")?,
            )
            .set_token_uri(TokenUrl::new(endpoints.token_url.clone()).context("Invalid token URL")?);

        Ok(Self { client, http })
    }

    /// URL the operator opens to approve access
    pub fn authorize_url(&self) -> String {
        let (url, _csrf) = self.client.authorize_url(CsrfToken::new_random).url();
        debug!("Generated authorization URL");
        url.to_string()
    }

    /// Exchanges the pasted confirmation code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        info!("Exchanging authorization code for tokens");

        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .context("Failed to exchange authorization code")?;

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
