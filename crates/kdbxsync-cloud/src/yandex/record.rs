//! Persisted Yandex Disk settings

use kdbxsync_core::domain::{FieldShape, RecordSchema};
use serde::{Deserialize, Serialize};

/// The `yandex` record in the state document
///
/// `Default` is the placeholder written when the operator turns the
/// backend off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexRecord {
    pub client_id: String,
    pub client_secret: String,
    /// Folder on the disk, e.g. `disk:/KeePass` or `app:/`
    pub target_location: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds; `0` when no token was ever issued
    pub token_expiry: i64,
    pub enabled: bool,
}

impl YandexRecord {
    pub const SCHEMA: RecordSchema = RecordSchema::new(&[
        ("clientId", FieldShape::Text),
        ("clientSecret", FieldShape::Text),
        ("targetLocation", FieldShape::Text),
        ("accessToken", FieldShape::Text),
        ("refreshToken", FieldShape::Text),
        ("tokenExpiry", FieldShape::Integer),
        ("enabled", FieldShape::Flag),
    ]);
}
