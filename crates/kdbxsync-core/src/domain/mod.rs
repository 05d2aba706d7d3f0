//! Domain types and business rules
//!
//! - The validated source file reference
//! - Record schemas used to check persisted provider records
//! - Domain-specific error types

pub mod errors;
pub mod record;
pub mod source;

pub use errors::DomainError;
pub use record::{FieldShape, RecordSchema};
pub use source::SourceFile;
