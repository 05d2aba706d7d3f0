//! Cloud provider port (driven/secondary port)
//!
//! Every storage backend implements [`CloudProvider`]. The trait carries the
//! backend-specific steps (`install`, `refresh_auth`, `upload` and the record
//! checks) as required methods, and the shared lifecycle (`bootstrap` and
//! `run`) as provided methods, so all backends follow one state machine:
//!
//! ```text
//! no record                  -> bootstrap
//! record invalid             -> bootstrap
//! record.enabled == false    -> skipped
//! record incomplete          -> bootstrap
//! record complete            -> load profile -> refresh_auth
//!     refresh succeeded      -> upload
//!     refresh failed         -> bootstrap
//! ```
//!
//! ## Design Notes
//!
//! - No method returns an error. A backend reports failures to the operator
//!   through its [`Console`] and returns, so one provider can never abort
//!   another's run.
//! - Each provider reads and writes only the store record under its own
//!   [`key`](CloudProvider::key).

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    domain::SourceFile,
    ports::console::{prompt_yes_no, Console, LogLevel},
    store::StoreHandle,
};

/// Name of the flag every provider record carries
pub const ENABLED_FIELD: &str = "enabled";

/// Whether a record has its `enabled` flag set
pub fn record_enabled(record: &Value) -> bool {
    record
        .get(ENABLED_FIELD)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Port trait for one storage backend's lifecycle
#[async_trait::async_trait]
pub trait CloudProvider: Send + Sync {
    /// Top-level store key owned by this provider
    fn key(&self) -> &'static str;

    /// Human-readable backend name
    fn name(&self) -> &'static str;

    /// The shared state store
    fn store(&self) -> &StoreHandle;

    /// The operator console
    fn console(&self) -> &dyn Console;

    /// Every expected field is present with the expected primitive shape
    fn is_record_valid(&self, record: &Value) -> bool;

    /// Every required field is non-empty
    fn is_record_complete(&self, record: &Value) -> bool;

    /// The well-typed placeholder written when the operator declines
    ///
    /// All scalar fields are empty and `enabled` is `false`.
    fn disabled_record(&self) -> Value;

    /// Loads the fields this provider recognises into its working copy
    ///
    /// Surplus fields are ignored.
    fn load_profile(&mut self, record: &Value) -> anyhow::Result<()>;

    /// Interactive first-time setup, ending with an initial upload
    ///
    /// Nothing is persisted unless authorization succeeds.
    async fn install(&mut self, source: &SourceFile);

    /// Makes sure the access token is usable
    ///
    /// A token that has not expired is left alone. Returns `false` when a
    /// required refresh failed.
    async fn refresh_auth(&mut self) -> bool;

    /// Transfers the source file using the current tokens
    async fn upload(&mut self, source: &SourceFile);

    /// Asks whether to use this backend; declining stores a disabled record
    async fn bootstrap(&mut self, source: &SourceFile) {
        let question = format!("Do you want to sync with {}? (y/n): ", self.name());
        if prompt_yes_no(self.console(), &question) {
            self.install(source).await;
            return;
        }

        let placeholder = self.disabled_record();
        let saved = self.store().put_record(self.key(), placeholder).await;
        match saved {
            Ok(()) => self.console().log(
                LogLevel::Info,
                &format!("{} is turned off and will be skipped.", self.name()),
            ),
            Err(e) => {
                warn!(provider = self.key(), error = %e, "Failed to save disabled record");
                self.console().log(
                    LogLevel::Error,
                    &format!("Could not save {} settings: {}", self.name(), e),
                );
            }
        }
    }

    /// Steady-state entry point: validate, refresh, upload
    ///
    /// Falls back to [`bootstrap`](Self::bootstrap) whenever the stored
    /// state cannot be used as-is.
    async fn run(&mut self, source: &SourceFile) {
        let Some(record) = self.store().record(self.key()).await else {
            debug!(provider = self.key(), "No stored record");
            self.bootstrap(source).await;
            return;
        };

        if !self.is_record_valid(&record) {
            debug!(provider = self.key(), "Stored record failed schema check");
            self.console().log(
                LogLevel::Warning,
                &format!("{} settings are outdated or damaged.", self.name()),
            );
            self.bootstrap(source).await;
            return;
        }

        if !record_enabled(&record) {
            self.console()
                .log(LogLevel::Info, &format!("{} is disabled, skipped.", self.name()));
            return;
        }

        if !self.is_record_complete(&record) {
            debug!(provider = self.key(), "Stored record is incomplete");
            self.console().log(
                LogLevel::Warning,
                &format!("{} setup was not finished.", self.name()),
            );
            self.bootstrap(source).await;
            return;
        }

        if let Err(e) = self.load_profile(&record) {
            warn!(provider = self.key(), error = %e, "Failed to load stored record");
            self.bootstrap(source).await;
            return;
        }

        if self.refresh_auth().await {
            self.upload(source).await;
        } else {
            self.console().log(
                LogLevel::Warning,
                &format!("{} needs to be authorized again.", self.name()),
            );
            self.bootstrap(source).await;
        }
    }
}
