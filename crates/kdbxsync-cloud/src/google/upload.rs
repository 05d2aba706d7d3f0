//! Google Drive resumable upload
//!
//! Three steps: open a resumable session (create a new file, or update a
//! known one), send the body to the session location, and read back the id
//! of the Drive file that now holds the content.

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ensure_success, CloudError};

/// Content type announced for the uploaded database
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata for a newly created file
#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

/// The part of a Drive `File` resource we need
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// Where the upload should land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget<'a> {
    /// Replace the content of an existing file
    Update { file_id: &'a str },
    /// Create `name` inside `folder_id`
    Create { name: &'a str, folder_id: &'a str },
}

/// Opens a resumable session and returns its location
pub async fn open_session(
    http: &reqwest::Client,
    upload_base: &str,
    access_token: &str,
    target: UploadTarget<'_>,
) -> Result<String, CloudError> {
    let request = match target {
        UploadTarget::Update { file_id } => {
            debug!("Opening update session for file: {}", file_id);
            http.patch(format!("{upload_base}/files/{file_id}"))
                .json(&serde_json::json!({}))
        }
        UploadTarget::Create { name, folder_id } => {
            debug!("Opening create session for: {}", name);
            http.post(format!("{upload_base}/files")).json(&FileMetadata {
                name,
                parents: [folder_id],
            })
        }
    };

    let response = request
        .query(&[("uploadType", "resumable")])
        .bearer_auth(access_token)
        .header("X-Upload-Content-Type", UPLOAD_CONTENT_TYPE)
        .send()
        .await?;
    let response = ensure_success(response).await?;

    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| CloudError::InvalidResponse("session has no Location header".to_string()))
}

/// Sends the whole body to a session location and returns the Drive file id
pub async fn send_body(
    http: &reqwest::Client,
    location: &str,
    access_token: &str,
    body: Vec<u8>,
) -> Result<String> {
    debug!("Uploading {} bytes to session", body.len());

    let response = http
        .put(location)
        .bearer_auth(access_token)
        .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
        .body(body)
        .send()
        .await
        .context("Failed to send file body")?;
    let file: DriveFile = ensure_success(response)
        .await
        .context("File upload returned error status")?
        .json()
        .await
        .context("Failed to parse upload response")?;

    Ok(file.id)
}

/// Uploads `body`, updating `known_id` when given, and returns the file id
///
/// A known id the backend no longer has (404) is dropped and a new file is
/// created in `folder_id` instead.
pub async fn upload_file(
    http: &reqwest::Client,
    upload_base: &str,
    access_token: &str,
    known_id: Option<&str>,
    name: &str,
    folder_id: &str,
    body: Vec<u8>,
) -> Result<String> {
    let create = UploadTarget::Create { name, folder_id };

    let location = match known_id {
        Some(file_id) => {
            let update = UploadTarget::Update { file_id };
            match open_session(http, upload_base, access_token, update).await {
                Ok(location) => location,
                Err(e) if e.is_not_found() => {
                    warn!("Remote file {} is gone, creating a new one", file_id);
                    open_session(http, upload_base, access_token, create)
                        .await
                        .context("Failed to open create session")?
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e).context("Failed to open update session"))
                }
            }
        }
        None => open_session(http, upload_base, access_token, create)
            .await
            .context("Failed to open create session")?,
    };

    send_body(http, &location, access_token, body).await
}
