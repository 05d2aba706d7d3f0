//! Configuration module for kdbxsync.
//!
//! The tool has no configuration file of its own: everything it remembers
//! lives in the persisted state document. This module resolves where that
//! document lives and holds the few process-wide constants.

use std::path::{Path, PathBuf};

/// Application name, used for the state directory and the welcome banner.
pub const APP_NAME: &str = "kdbxsync";

/// File name of the persisted state document.
pub const STATE_FILE_NAME: &str = "state.json";

/// Default tracing filter when `RUST_LOG` is not set.
///
/// Operator-facing output goes through the console port, so diagnostics stay
/// quiet unless asked for.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Filesystem locations used by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Location of the persisted state document.
    pub state_file: PathBuf,
}

impl AppPaths {
    /// Use an explicit state file location.
    pub fn new(state_file: impl Into<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
        }
    }

    /// Platform-appropriate default path for the state document.
    ///
    /// Typically `$XDG_CONFIG_HOME/kdbxsync/state.json` on Linux.
    pub fn default_state_path() -> PathBuf {
        Self::state_path_in(
            &dirs::config_dir().unwrap_or_else(|| PathBuf::from("~/.config")),
        )
    }

    /// State document path under an arbitrary configuration root.
    pub fn state_path_in(config_root: &Path) -> PathBuf {
        config_root.join(APP_NAME).join(STATE_FILE_NAME)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new(Self::default_state_path())
    }
}
