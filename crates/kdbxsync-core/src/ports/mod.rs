//! Port definitions (hexagonal architecture interfaces)
//!
//! These traits form the boundaries of the core. Their implementations live
//! in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`CloudProvider`] - The lifecycle every storage backend implements
//! - [`Console`] - Operator prompts and the structured log sink

pub mod console;
pub mod provider;

pub use console::{prompt_required, prompt_yes_no, Console, LogLevel};
pub use provider::CloudProvider;
