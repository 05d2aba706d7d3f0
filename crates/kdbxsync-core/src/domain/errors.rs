//! Domain error types
//!
//! Errors raised while validating the file the operator asked to sync.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The path is relative
    #[error("Path must be absolute: {0}")]
    NotAbsolute(String),

    /// Nothing exists at the path
    #[error("File does not exist: {0}")]
    NotFound(String),

    /// The path exists but is a directory or special file
    #[error("Not a regular file: {0}")]
    NotAFile(String),

    /// The file does not carry the expected extension
    #[error("Expected a .{expected} file: {path}")]
    WrongExtension {
        /// The offending path
        path: String,
        /// The extension that was required
        expected: &'static str,
    },
}
