//! Download center metadata publication.

mod descriptor;

pub use descriptor::{
    DownloadCenterConfig, PlatformEntry, VersionEntry, build_version_entry, initial_config,
    merge_version,
};

use crate::config::ReleaseConfig;
use crate::error::{PublishError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Public download host the descriptor links to
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://downloads.mongodb.com/compass";

/// Release page prefix the descriptor's release notes link points under
pub const DEFAULT_RELEASE_PAGE_BASE: &str = "https://github.com/mongodb-js/mongosh/releases/tag";

/// File the merged descriptor is written to inside the output directory
pub const DESCRIPTOR_FILE_NAME: &str = "download-center.json";

/// Publishes the download center descriptor
#[async_trait]
pub trait DownloadCenterPublisher: Send + Sync {
    /// Advertise `config.version`
    async fn publish(&self, config: &ReleaseConfig) -> Result<()>;
}

/// Descriptor kept at an HTTP endpoint that accepts `PUT`
#[derive(Debug, Clone)]
pub struct HttpDownloadCenter {
    endpoint: String,
    download_base: String,
    release_page_base: String,
    client: reqwest::Client,
}

impl HttpDownloadCenter {
    /// Create a publisher for the descriptor at `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            release_page_base: DEFAULT_RELEASE_PAGE_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Link downloads under a different host
    pub fn with_download_base(mut self, download_base: impl Into<String>) -> Self {
        self.download_base = download_base.into();
        self
    }

    /// Point release notes under `release_page_base`, `v{version}` is appended
    pub fn with_release_page_base(mut self, release_page_base: impl Into<String>) -> Self {
        self.release_page_base = release_page_base.into();
        self
    }

    fn release_notes_link(&self, version: &str) -> String {
        format!("{}/v{}", self.release_page_base.trim_end_matches('/'), version)
    }

    async fn fetch_existing(&self) -> Result<DownloadCenterConfig> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            log::warn!("No download center config at {}, starting a new one", self.endpoint);
            return Ok(initial_config());
        }
        if !status.is_success() {
            return Err(PublishError::DownloadCenter {
                reason: format!("GET {} returned {}", self.endpoint, status),
            }
            .into());
        }
        Ok(response.json().await?)
    }

    async fn write_local(&self, config: &ReleaseConfig, descriptor: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&config.output_dir).await?;
        let path = config.output_dir.join(DESCRIPTOR_FILE_NAME);
        tokio::fs::write(&path, descriptor).await?;
        Ok(path)
    }
}

#[async_trait]
impl DownloadCenterPublisher for HttpDownloadCenter {
    async fn publish(&self, config: &ReleaseConfig) -> Result<()> {
        let entry = build_version_entry(&self.download_base, config);
        let merged = merge_version(
            self.fetch_existing().await?,
            entry,
            self.release_notes_link(&config.version),
        );
        let descriptor = serde_json::to_string_pretty(&merged)?;

        let path = self.write_local(config, &descriptor).await?;
        log::info!("Wrote download center config to {}", path.display());

        if config.dry_run {
            log::warn!("Dry run, not uploading download center config");
            return Ok(());
        }

        let credentials = &config.download_center;
        let response = self
            .client
            .put(&self.endpoint)
            .basic_auth(
                &credentials.access_key_id,
                Some(&credentials.secret_access_key),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(descriptor)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PublishError::DownloadCenter {
                reason: format!("PUT {} returned {}", self.endpoint, response.status()),
            }
            .into());
        }

        log::info!("Published download center config for {}", config.version);
        Ok(())
    }
}
