//! Yandex Disk implementation of the [`CloudProvider`] port

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
    auth::YandexAuth,
    record::YandexRecord,
    upload::{remote_file_name, remote_path, upload_file},
    YandexEndpoints,
};
use crate::{
    http_client,
    tokens::{capped_expiry, token_still_valid, TokenGrant},
    CloudError,
};

/// Yandex Disk provider
pub struct YandexDiskProvider {
    store: StoreHandle,
    console: Arc<dyn Console>,
    endpoints: YandexEndpoints,
    http: reqwest::Client,
    profile: YandexRecord,
}

impl YandexDiskProvider {
    /// Store key of the Yandex record
    pub const KEY: &'static str = "yandex";

    /// Longest access token lifetime ever recorded
    pub fn token_cap() -> Duration {
        Duration::hours(24)
    }

    /// Creates a provider talking to the production endpoints
    pub fn new(store: StoreHandle, console: Arc<dyn Console>) -> Result<Self, CloudError> {
        Self::with_endpoints(store, console, YandexEndpoints::default())
    }

    /// Creates a provider with custom endpoints (useful for testing)
    pub fn with_endpoints(
        store: StoreHandle,
        console: Arc<dyn Console>,
        endpoints: YandexEndpoints,
    ) -> Result<Self, CloudError> {
        Ok(Self {
            store,
            console,
            endpoints,
            http: http_client()?,
            profile: YandexRecord::default(),
        })
    }

    /// The working copy of the record
    pub fn profile(&self) -> &YandexRecord {
        &self.profile
    }

    fn auth(&self, client_id: &str, client_secret: &str) -> Result<YandexAuth> {
        YandexAuth::new(&self.endpoints, client_id, client_secret, self.http.clone())
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
                &format!("Could not save Yandex Disk settings: {e}"),
            );
        }
    }

    async fn authorize(&self, client_id: &str, client_secret: &str) -> Result<TokenGrant> {
        let auth = self.auth(client_id, client_secret)?;
        self.console.log(
            LogLevel::Tip,
            &format!(
                "Open {} in a browser, allow access and copy the confirmation code.",
                auth.authorize_url()
            ),
        );
        let code = prompt_required(self.console.as_ref(), "Confirmation code: ");
        auth.exchange_code(&code).await
    }

    async fn try_upload(&self, source: &SourceFile) -> Result<String> {
        let body = tokio::fs::read(source.as_path())
            .await
            .with_context(|| format!("Failed to read {source}"))?;
        let path = remote_path(&self.profile.target_location, &remote_file_name(source));

        upload_file(
            &self.http,
            &self.endpoints.api_base,
            &self.profile.access_token,
            &path,
            body,
        )
        .await?;
        Ok(path)
    }
}

#[async_trait::async_trait]
impl CloudProvider for YandexDiskProvider {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Yandex Disk"
    }

    fn store(&self) -> &StoreHandle {
        &self.store
    }

    fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    fn is_record_valid(&self, record: &Value) -> bool {
        YandexRecord::SCHEMA.is_valid(record)
    }

    fn is_record_complete(&self, record: &Value) -> bool {
        YandexRecord::SCHEMA.is_complete(record)
    }

    fn disabled_record(&self) -> Value {
        serde_json::to_value(YandexRecord::default()).unwrap_or_default()
    }

    fn load_profile(&mut self, record: &Value) -> Result<()> {
        self.profile = serde_json::from_value(record.clone())
            .context("Stored Yandex Disk record does not match the expected layout")?;
        Ok(())
    }

    async fn install(&mut self, source: &SourceFile) {
        let console = self.console.clone();
        let client_id = prompt_required(console.as_ref(), "Yandex client ID: ");
        let client_secret = prompt_required(console.as_ref(), "Yandex client secret: ");
        let target_location = prompt_required(
            console.as_ref(),
            "Yandex Disk folder to upload to (e.g. disk:/KeePass): ",
        );

        let grant = match self.authorize(&client_id, &client_secret).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(provider = Self::KEY, error = %e, "Authorization failed");
                console.log(
                    LogLevel::Error,
                    &format!("Yandex Disk authorization failed: {e:#}"),
                );
                return;
            }
        };

        self.profile = YandexRecord {
            client_id,
            client_secret,
            target_location,
            enabled: true,
            ..YandexRecord::default()
        };
        self.apply_grant(&grant);
        if self.profile.refresh_token.is_empty() {
            console.log(
                LogLevel::Warning,
                "Yandex did not issue a refresh token; setup will be asked for again on the next run.",
            );
        }
        self.persist().await;

        info!(provider = Self::KEY, "Authorized");
        console.log(LogLevel::Success, "Yandex Disk is connected.");
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
                    &format!("Could not refresh the Yandex Disk token: {e:#}"),
                );
                false
            }
        }
    }

    async fn upload(&mut self, source: &SourceFile) {
        match self.try_upload(source).await {
            Ok(path) => {
                info!(provider = Self::KEY, path = %path, "Uploaded");
                self.console.log(
                    LogLevel::Success,
                    &format!("Uploaded {} to Yandex Disk as {}.", source.file_name(), path),
                );
            }
            Err(e) => {
                warn!(provider = Self::KEY, error = %e, "Upload failed");
                self.console.log(
                    LogLevel::Error,
                    &format!("Yandex Disk upload failed: {e:#}"),
                );
            }
        }
    }
}
