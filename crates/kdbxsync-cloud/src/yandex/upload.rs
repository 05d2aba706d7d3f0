//! Yandex Disk upload
//!
//! Two steps: ask the API for an upload link for the target path, then send
//! the file body to that link with the method the API names.

use anyhow::{Context, Result};
use kdbxsync_core::domain::SourceFile;
use reqwest::{header::AUTHORIZATION, Method};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::ensure_success;

/// Hex digits of the path hash kept in the remote name
const PATH_HASH_LEN: usize = 8;

/// Response of `GET /resources/upload`
#[derive(Debug, Deserialize)]
struct UploadLink {
    href: String,
    #[serde(default = "default_method")]
    method: String,
}

fn default_method() -> String {
    "PUT".to_string()
}

/// Remote file name for `source`: `<stem>-<path hash>.kdbx`
///
/// Depends only on the source path, so same-named databases from different
/// directories never collide and every run targets the same name.
pub fn remote_file_name(source: &SourceFile) -> String {
    let stem = source
        .as_path()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(source.key().as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    format!(
        "{}-{}.{}",
        stem,
        &digest[..PATH_HASH_LEN],
        SourceFile::EXPECTED_EXTENSION
    )
}

/// Full disk path of `name` inside `folder`
pub fn remote_path(folder: &str, name: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), name)
}

/// Uploads `body` to `path`, replacing any existing file
pub async fn upload_file(
    http: &reqwest::Client,
    api_base: &str,
    access_token: &str,
    path: &str,
    body: Vec<u8>,
) -> Result<()> {
    debug!("Requesting upload link for: {}", path);

    let response = http
        .get(format!("{api_base}/resources/upload"))
        .header(AUTHORIZATION, format!("OAuth {access_token}"))
        .query(&[("path", path), ("overwrite", "true")])
        .send()
        .await
        .context("Failed to request upload link")?;
    let link: UploadLink = ensure_success(response)
        .await
        .context("Upload link request returned error status")?
        .json()
        .await
        .context("Failed to parse upload link response")?;

    let method = Method::from_bytes(link.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Unsupported upload method: {}", link.method))?;
    debug!("Uploading {} bytes with {}", body.len(), method);

    let response = http
        .request(method, &link.href)
        .body(body)
        .send()
        .await
        .context("Failed to send file body")?;
    ensure_success(response)
        .await
        .context("File upload returned error status")?;

    Ok(())
}
