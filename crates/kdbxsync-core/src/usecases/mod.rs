//! Use cases (interactors) for kdbxsync
//!
//! - [`Syncer`] - Validates the source file, loads the store and drives
//!   every registered provider through its lifecycle

pub mod sync;

pub use sync::{RunOutcome, SyncError, Syncer};
