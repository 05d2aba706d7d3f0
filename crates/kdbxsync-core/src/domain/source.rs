//! The file being synced
//!
//! A [`SourceFile`] is validated once by the orchestrator and then handed
//! read-only to every provider.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::domain::errors::DomainError;

/// An absolute path to an existing KeePass database file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile(PathBuf);

impl SourceFile {
    /// Extension every source file must carry (compared case-insensitively)
    pub const EXPECTED_EXTENSION: &'static str = "kdbx";

    /// Validate `path` and wrap it
    ///
    /// # Errors
    /// Returns a [`DomainError`] if the path is relative, missing, not a
    /// regular file, or lacks the `.kdbx` extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let shown = path.display().to_string();

        if !path.is_absolute() {
            return Err(DomainError::NotAbsolute(shown));
        }
        if !path.exists() {
            return Err(DomainError::NotFound(shown));
        }
        if !path.is_file() {
            return Err(DomainError::NotAFile(shown));
        }

        let extension_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(Self::EXPECTED_EXTENSION));
        if !extension_matches {
            return Err(DomainError::WrongExtension {
                path: shown,
                expected: Self::EXPECTED_EXTENSION,
            });
        }

        Ok(Self(path))
    }

    /// Get the inner path
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The file's base name, e.g. `passwords.kdbx`
    #[must_use]
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Stable string key for this path, used to index per-path caches
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
