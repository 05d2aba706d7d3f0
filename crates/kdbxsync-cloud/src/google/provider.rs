//! Google Drive implementation of the [`CloudProvider`] port

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use kdbxsync_core::{
    domain::SourceFile,
    ports::{prompt_required, CloudProvider, Console, LogLevel},
    store::StoreHandle,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{
    auth::{challenge_of, GoogleAuth},
    record::GoogleRecord,
    upload::upload_file,
    GoogleEndpoints,
};
use crate::{
    http_client,
    tokens::{capped_expiry, token_still_valid, TokenGrant},
    CloudError,
};

/// Google Drive provider
pub struct GoogleDriveProvider {
    store: StoreHandle,
    console: Arc<dyn Console>,
    endpoints: GoogleEndpoints,
    http: reqwest::Client,
    profile: GoogleRecord,
}

impl GoogleDriveProvider {
    /// Store key of the Google record
    pub const KEY: &'static str = "google";

    /// Longest access token lifetime ever recorded
    pub fn token_cap() -> Duration {
        Duration::hours(1)
    }

    /// Creates a provider talking to the production endpoints
    pub fn new(store: StoreHandle, console: Arc<dyn Console>) -> Result<Self, CloudError> {
        Self::with_endpoints(store, console, GoogleEndpoints::default())
    }

    /// Creates a provider with custom endpoints (useful for testing)
    pub fn with_endpoints(
        store: StoreHandle,
        console: Arc<dyn Console>,
        endpoints: GoogleEndpoints,
    ) -> Result<Self, CloudError> {
        Ok(Self {
            store,
            console,
            endpoints,
            http: http_client()?,
            profile: GoogleRecord::default(),
        })
    }

    /// The working copy of the record
    pub fn profile(&self) -> &GoogleRecord {
        &self.profile
    }

    fn auth(&self, client_id: &str, client_secret: &str) -> Result<GoogleAuth> {
        GoogleAuth::new(&self.endpoints, client_id, client_secret, self.http.clone())
    }

    fn apply_grant(&mut self, grant: &TokenGrant) {
        self.profile.access_token = grant.access_token.clone();
        self.profile.refresh_token = grant.refresh_token_or(&self.profile.refresh_token);
        self.profile.token_expiry = capped_expiry(Utc::now(), grant.expires_in, Self::token_cap());
    }

    /// Saves the working copy; a failure is reported and otherwise ignored
    async fn persist(&self) {
        if let Err(e) = self.store.put_serialized(Self::KEY, &self.profile).await {
            warn!(provider = Self::KEY, error = %e, "Failed to save record");
            self.console.log(
                LogLevel::Error,
                &format!("Could not save Google Drive settings: {e}"),
            );
        }
    }

    async fn authorize(&self, client_id: &str, client_secret: &str) -> Result<TokenGrant> {
        let auth = self.auth(client_id, client_secret)?;
        let details = auth.request_device_code().await?;
        let challenge = challenge_of(&details);

        self.console.log(
            LogLevel::Tip,
            &format!(
                "Open {} and enter the code {} to allow access.",
                challenge.verification_url, challenge.user_code
            ),
        );
        auth.poll_device_token(&details).await
    }

    async fn try_upload(&self, source: &SourceFile) -> Result<String> {
        let body = tokio::fs::read(source.as_path())
            .await
            .with_context(|| format!("Failed to read {source}"))?;
        let known_id = self.profile.known_remote_files.get(&source.key());

        upload_file(
            &self.http,
            &self.endpoints.upload_base,
            &self.profile.access_token,
            known_id.map(String::as_str),
            &source.file_name(),
            &self.profile.target_location,
            body,
        )
        .await
    }
}

#[async_trait::async_trait]
impl CloudProvider for GoogleDriveProvider {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Google Drive"
    }

    fn store(&self) -> &StoreHandle {
        &self.store
    }

    fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    fn is_record_valid(&self, record: &Value) -> bool {
        GoogleRecord::SCHEMA.is_valid(record)
    }

    fn is_record_complete(&self, record: &Value) -> bool {
        GoogleRecord::SCHEMA.is_complete(record)
    }

    fn disabled_record(&self) -> Value {
        serde_json::to_value(GoogleRecord::default()).unwrap_or_default()
    }

    fn load_profile(&mut self, record: &Value) -> Result<()> {
        self.profile = serde_json::from_value(record.clone())
            .context("Stored Google Drive record does not match the expected layout")?;
        Ok(())
    }

    async fn install(&mut self, source: &SourceFile) {
        let console = self.console.clone();
        let client_id = prompt_required(console.as_ref(), "Google client ID: ");
        let client_secret = prompt_required(console.as_ref(), "Google client secret: ");
        let target_location = prompt_required(
            console.as_ref(),
            "Google Drive folder ID to upload to: ",
        );

        let grant = match self.authorize(&client_id, &client_secret).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(provider = Self::KEY, error = %e, "Authorization failed");
                console.log(
                    LogLevel::Error,
                    &format!("Google Drive authorization failed: {e:#}"),
                );
                return;
            }
        };

        // A new folder invalidates every remembered file id.
        self.profile = GoogleRecord {
            client_id,
            client_secret,
            target_location,
            enabled: true,
            ..GoogleRecord::default()
        };
        self.apply_grant(&grant);
        if self.profile.refresh_token.is_empty() {
            console.log(
                LogLevel::Warning,
                "Google did not issue a refresh token; setup will be asked for again on the next run.",
            );
        }
        self.persist().await;

        info!(provider = Self::KEY, "Authorized");
        console.log(LogLevel::Success, "Google Drive is connected.");
        self.upload(source).await;
    }

    async fn refresh_auth(&mut self) -> bool {
        if token_still_valid(self.profile.token_expiry, Utc::now()) {
            debug!(provider = Self::KEY, "Access token still valid");
            return true;
        }

        let refreshed = match self.auth(&self.profile.client_id, &self.profile.client_secret) {
            Ok(auth) => auth.refresh(&self.profile.refresh_token).await,
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(grant) => {
                self.apply_grant(&grant);
                self.persist().await;
                true
            }
            Err(e) => {
                warn!(provider = Self::KEY, error = %e, "Token refresh failed");
                self.console.log(
                    LogLevel::Error,
                    &format!("Could not refresh the Google Drive token: {e:#}"),
                );
                false
            }
        }
    }

    async fn upload(&mut self, source: &SourceFile) {
        let file_id = match self.try_upload(source).await {
            Ok(file_id) => file_id,
            Err(e) => {
                warn!(provider = Self::KEY, error = %e, "Upload failed");
                self.console.log(
                    LogLevel::Error,
                    &format!("Google Drive upload failed: {e:#}"),
                );
                return;
            }
        };

        info!(provider = Self::KEY, file_id = %file_id, "Uploaded");
        let key = source.key();
        if self.profile.known_remote_files.get(&key) != Some(&file_id) {
            debug!(provider = Self::KEY, file_id = %file_id, "Remembering remote file id");
            self.profile.known_remote_files.insert(key, file_id);
            self.persist().await;
        }

        self.console.log(
            LogLevel::Success,
            &format!("Uploaded {} to Google Drive.", source.file_name()),
        );
    }
}
