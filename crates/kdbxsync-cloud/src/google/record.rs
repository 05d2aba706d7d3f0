//! Persisted Google Drive settings

use std::collections::BTreeMap;

use kdbxsync_core::domain::{FieldShape, RecordSchema};
use serde::{Deserialize, Serialize};

/// The `google` record in the state document
///
/// `Default` is the placeholder written when the operator turns the
/// backend off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRecord {
    pub client_id: String,
    pub client_secret: String,
    /// Id of the Drive folder new files are created in
    pub target_location: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds; `0` when no token was ever issued
    pub token_expiry: i64,
    pub enabled: bool,
    /// Local source path to Drive file id
    pub known_remote_files: BTreeMap<String, String>,
}

impl GoogleRecord {
    pub const SCHEMA: RecordSchema = RecordSchema::new(&[
        ("clientId", FieldShape::Text),
        ("clientSecret", FieldShape::Text),
        ("targetLocation", FieldShape::Text),
        ("accessToken", FieldShape::Text),
        ("refreshToken", FieldShape::Text),
        ("tokenExpiry", FieldShape::Integer),
        ("enabled", FieldShape::Flag),
        ("knownRemoteFiles", FieldShape::Map),
    ]);
}
