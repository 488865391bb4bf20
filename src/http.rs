//! HTTP helpers shared by the curator download and the Homebrew publisher.

use crate::error::{ReleaseError, Result};

/// Downloads a file from a URL.
///
/// Returns the file contents as a byte vector. Non-success statuses are errors.
pub async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    Ok(bytes.to_vec())
}

/// Hex-encoded SHA-256 of `data`.
///
/// Uses spawn_blocking to keep hashing off the async runtime.
pub async fn sha256_hex(data: Vec<u8>) -> Result<String> {
    use sha2::Digest as _;

    tokio::task::spawn_blocking(move || {
        let mut hasher = sha2::Sha256::new();
        hasher.update(&data);
        hex::encode(hasher.finalize())
    })
    .await
    .map_err(|e| ReleaseError::Anyhow(anyhow::anyhow!("Hash task failed: {}", e)))
}
