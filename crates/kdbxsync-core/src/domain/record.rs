//! Provider record schemas
//!
//! Each provider owns one record in the persisted store. Records are stored
//! as loosely-typed JSON so that a schema change between versions cannot
//! crash the loader; before a record is trusted it is checked against the
//! provider's [`RecordSchema`].
//!
//! Validity and completeness are separate questions:
//!
//! - **valid**: every expected field is present with the expected shape.
//!   Surplus fields are tolerated.
//! - **complete**: valid, and every required scalar field is non-empty.
//!   The `enabled` flag and map-valued caches are never required.

use serde_json::Value;

/// The primitive shape a record field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// A string; empty means unset
    Text,
    /// An integer (e.g. a Unix timestamp); zero means unset
    Integer,
    /// A boolean flag; never counts towards completeness
    Flag,
    /// An object of string values; never counts towards completeness
    Map,
}

impl FieldShape {
    /// Whether `value` has this shape
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldShape::Text => value.is_string(),
            FieldShape::Integer => value.is_i64() || value.is_u64(),
            FieldShape::Flag => value.is_boolean(),
            FieldShape::Map => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
        }
    }

    /// Whether a value of this shape counts as filled in
    ///
    /// Flags and maps always report `true`: they are excluded from the
    /// completeness check.
    pub fn is_filled(self, value: &Value) -> bool {
        match self {
            FieldShape::Text => value.as_str().is_some_and(|s| !s.is_empty()),
            FieldShape::Integer => value.as_i64().map_or_else(
                || value.as_u64().is_some_and(|n| n != 0),
                |n| n != 0,
            ),
            FieldShape::Flag | FieldShape::Map => true,
        }
    }
}

/// The expected fields of one provider's record
#[derive(Debug, Clone, Copy)]
pub struct RecordSchema {
    fields: &'static [(&'static str, FieldShape)],
}

impl RecordSchema {
    /// Build a schema from `(field name, shape)` pairs
    pub const fn new(fields: &'static [(&'static str, FieldShape)]) -> Self {
        Self { fields }
    }

    /// Field names and shapes, in declaration order
    pub fn fields(&self) -> &'static [(&'static str, FieldShape)] {
        self.fields
    }

    /// Structural check: `record` is an object carrying every field with
    /// the right shape
    pub fn is_valid(&self, record: &Value) -> bool {
        let Some(object) = record.as_object() else {
            return false;
        };
        self.fields.iter().all(|(name, shape)| {
            object
                .get(*name)
                .is_some_and(|value| shape.matches(value))
        })
    }

    /// `record` is valid and every required scalar field is non-empty
    pub fn is_complete(&self, record: &Value) -> bool {
        if !self.is_valid(record) {
            return false;
        }
        self.fields.iter().all(|(name, shape)| {
            record
                .get(*name)
                .is_some_and(|value| shape.is_filled(value))
        })
    }
}
