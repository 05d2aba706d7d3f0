//! Persistent key/value state
//!
//! [`PersistentStore`] owns the on-disk state document: a single JSON object
//! with a top-level `lastUpdated` timestamp and one sub-object per provider
//! key. Provider records are kept as raw JSON so that each provider alone
//! decides what its record means.
//!
//! - **Whole-document writes**: every save serializes the full map and
//!   replaces the file via write-to-temp + rename.
//! - **Deterministic output**: keys are sorted and indentation is fixed, so
//!   two saves of the same map produce the same bytes (apart from the
//!   timestamp).
//! - **Load is all-or-nothing**: a failed load leaves the in-memory state
//!   untouched.
//!
//! [`StoreHandle`] is the shared, cloneable handle given to the orchestrator
//! and to every provider at construction.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Errors raised while reading or writing the state document
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid state document
    #[error("Invalid state document {path}: {source}")]
    Parse {
        /// The file involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be turned into JSON
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk layout of the state document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    last_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    records: BTreeMap<String, Value>,
}

/// Durable container for provider records
#[derive(Debug, Clone)]
pub struct PersistentStore {
    path: PathBuf,
    document: StoreDocument,
}

impl PersistentStore {
    /// Creates an empty store backed by the file at `path`
    ///
    /// Nothing is read until [`load`](Self::load) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: StoreDocument::default(),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a previous save left a file behind
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replaces the in-memory map with the file's contents
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] or [`StoreError::Parse`]; in both cases
    /// the in-memory state is unchanged.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document: StoreDocument =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            records = document.records.len(),
            "Loaded state document"
        );
        self.document = document;
        Ok(())
    }

    /// Stamps `lastUpdated` and rewrites the whole document
    ///
    /// # Errors
    /// Returns an error if serialization or any filesystem step fails. The
    /// previous file, if any, is left in place when the write fails.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.document.last_updated = Some(Utc::now());
        let mut json = serde_json::to_string_pretty(&self.document)?;
        json.push('\n');

        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Write next to the target so the rename stays on one filesystem.
        let tmp_path = {
            let mut p = self.path.as_os_str().to_owned();
            p.push(".tmp");
            PathBuf::from(p)
        };
        std::fs::write(&tmp_path, json.as_bytes()).map_err(io_err)?;

        // The document holds client secrets and tokens.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let owner_only = std::fs::Permissions::from_mode(0o600);
            if let Err(source) = std::fs::set_permissions(&tmp_path, owner_only) {
                let _ = std::fs::remove_file(&tmp_path);
                return Err(io_err(source));
            }
        }

        if let Err(source) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(io_err(source));
        }

        debug!(path = %self.path.display(), "Saved state document");
        Ok(())
    }

    /// The raw record stored under `key`
    pub fn record(&self, key: &str) -> Option<&Value> {
        self.document.records.get(key)
    }

    /// Replaces the record under `key` in memory
    pub fn set_record(&mut self, key: impl Into<String>, record: Value) {
        self.document.records.insert(key.into(), record);
    }

    /// All records, ordered by key
    pub fn records(&self) -> &BTreeMap<String, Value> {
        &self.document.records
    }

    /// Time of the last successful [`save`](Self::save) or of the loaded file
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.document.last_updated
    }
}

/// Shared handle to the process's [`PersistentStore`]
///
/// Providers run one at a time, so the lock is never contended; it exists
/// so that the orchestrator and every provider can hold the same store.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<PersistentStore>>,
}

impl StoreHandle {
    /// Wraps a store for sharing
    pub fn new(store: PersistentStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Exclusive access to the store
    pub async fn lock(&self) -> MutexGuard<'_, PersistentStore> {
        self.inner.lock().await
    }

    /// A copy of the record stored under `key`
    pub async fn record(&self, key: &str) -> Option<Value> {
        self.lock().await.record(key).cloned()
    }

    /// Replaces the record under `key` and saves the whole document
    ///
    /// The in-memory record is replaced even when the save fails, so the
    /// rest of the run sees the new state.
    pub async fn put_record(&self, key: &str, record: Value) -> Result<(), StoreError> {
        let mut store = self.lock().await;
        store.set_record(key, record);
        store.save()
    }

    /// Serializes `record` and stores it under `key`; see [`put_record`](Self::put_record)
    pub async fn put_serialized<T: Serialize + Sync>(
        &self,
        key: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.put_record(key, value).await
    }
}
