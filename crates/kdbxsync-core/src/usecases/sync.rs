//! Sync use case
//!
//! Orchestrates one invocation of the tool: validate the source path, load
//! the persisted store, then hand each registered provider the validated
//! [`SourceFile`], strictly one after another and in registration order.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    domain::{DomainError, SourceFile},
    ports::CloudProvider,
    store::StoreHandle,
};

/// The only error that ends a run early
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source path is unusable; nothing was attempted
    #[error("Invalid source file: {0}")]
    InvalidSource(#[from] DomainError),
}

/// How a completed run went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No usable store existed, every provider was bootstrapped
    FirstRun,
    /// Every provider went through its steady-state lifecycle
    Synced,
}

/// Use case driving all registered providers
pub struct Syncer {
    source_path: PathBuf,
    store: StoreHandle,
    providers: Vec<Box<dyn CloudProvider>>,
}

impl Syncer {
    /// Creates a syncer for `source_path` with no providers registered
    pub fn new(source_path: impl Into<PathBuf>, store: StoreHandle) -> Self {
        Self {
            source_path: source_path.into(),
            store,
            providers: Vec::new(),
        }
    }

    /// Adds a provider; providers run in the order they were registered
    pub fn register(&mut self, provider: Box<dyn CloudProvider>) {
        debug!(provider = provider.key(), "Registered provider");
        self.providers.push(provider);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_provider(mut self, provider: Box<dyn CloudProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Keys of the registered providers, in run order
    pub fn provider_keys(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.key()).collect()
    }

    /// Checks that `path` is an existing, absolute `.kdbx` file
    ///
    /// # Errors
    /// Returns the [`DomainError`] describing the first failed check
    pub fn validate_source_path(path: impl Into<PathBuf>) -> Result<SourceFile, DomainError> {
        SourceFile::new(path)
    }

    /// Runs every provider once
    ///
    /// A missing or unreadable store means first run: every provider is
    /// bootstrapped and nothing else happens. Otherwise every provider goes
    /// through [`CloudProvider::run`].
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidSource`] before touching the store or any
    /// provider when the source path is unusable.
    pub async fn start(&mut self) -> Result<RunOutcome, SyncError> {
        let source = Self::validate_source_path(self.source_path.clone())?;
        info!(source = %source, "Starting sync");

        let first_run = {
            let mut store = self.store.lock().await;
            if !store.exists() {
                debug!(path = %store.path().display(), "No state document yet");
                true
            } else if let Err(e) = store.load() {
                warn!(error = %e, "Failed to load state document, treating as first run");
                true
            } else {
                false
            }
        };

        if first_run {
            for provider in &mut self.providers {
                provider.bootstrap(&source).await;
            }
            return Ok(RunOutcome::FirstRun);
        }

        for provider in &mut self.providers {
            provider.run(&source).await;
        }
        Ok(RunOutcome::Synced)
    }
}
