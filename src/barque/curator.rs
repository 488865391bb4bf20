//! Curator-backed submitter.
//!
//! Curator is the command line client for barque. Each submission runs
//! `curator repo submit` once per release branch, since the notary key and
//! token differ per branch.

use super::submit::{BranchSubmission, SubmissionRequest, Submitter};
use crate::env_config::EnvConfig;
use crate::error::ConfigError;
use crate::settings::DistributionSettings;
use anyhow::{Context, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::sync::OnceCell;

/// Submits packages by running curator
pub struct CuratorSubmitter {
    settings: DistributionSettings,
    env: EnvConfig,
    dry_run: bool,
    http: reqwest::Client,
    /// Fetched on the first submission and reused until the submitter drops
    binary: OnceCell<CuratorBinary>,
}

/// A curator binary, possibly living in a temporary directory
struct CuratorBinary {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Drop for CuratorBinary {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let location = dir.path().display().to_string();
            if let Err(e) = dir.close() {
                log::warn!("Failed to clean up curator directory {}: {}", location, e);
            }
        }
    }
}

impl CuratorSubmitter {
    /// Create a submitter
    pub fn new(settings: DistributionSettings, env: EnvConfig, dry_run: bool) -> Self {
        Self {
            settings,
            env,
            dry_run,
            http: reqwest::Client::new(),
            binary: OnceCell::new(),
        }
    }

    async fn curator(&self) -> anyhow::Result<&CuratorBinary> {
        self.binary.get_or_try_init(|| self.fetch_curator()).await
    }

    async fn fetch_curator(&self) -> anyhow::Result<CuratorBinary> {
        if let Some(path) = &self.settings.curator_path {
            return Ok(CuratorBinary {
                path: path.clone(),
                dir: None,
            });
        }

        let dir = tempfile::Builder::new()
            .prefix("curator-")
            .tempdir()
            .context("Failed to create curator directory")?;
        log::info!("Downloading curator from {}", self.settings.curator_url);
        let archive = crate::http::download(&self.http, &self.settings.curator_url)
            .await
            .context("Failed to download curator")?;

        let dest = dir.path().to_path_buf();
        tokio::task::spawn_blocking(move || extract_tar_gz(&archive, &dest))
            .await
            .context("Curator extraction task failed")??;

        Ok(CuratorBinary {
            path: dir.path().join("curator"),
            dir: Some(dir),
        })
    }

    async fn run_branch(
        &self,
        curator: &Path,
        request: &SubmissionRequest,
        branch: &BranchSubmission,
    ) -> anyhow::Result<()> {
        let args = curator_args(&self.settings.service_url, request, branch);
        log::debug!("Running {} {}", curator.display(), args.join(" "));

        let output = tokio::process::Command::new(curator)
            .args(&args)
            .env("NOTARY_KEY_NAME", &branch.notary_key_name)
            .env("NOTARY_TOKEN", &branch.notary_token)
            .env("BARQUE_API_KEY", self.env.get_or_empty("BARQUE_API_KEY"))
            .env("BARQUE_USERNAME", self.env.get_or_empty("BARQUE_USERNAME"))
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", curator.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "curator exited with {} for branch {}: {}",
                output.status,
                branch.version,
                stderr.trim()
            );
        }

        log::debug!(
            "curator output: {}",
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }
}

#[async_trait]
impl Submitter for CuratorSubmitter {
    async fn submit(&self, request: &SubmissionRequest) -> anyhow::Result<()> {
        if self.dry_run {
            for branch in &request.branches {
                log::info!(
                    "Dry run, not submitting: curator {}",
                    curator_args(&self.settings.service_url, request, branch).join(" ")
                );
            }
            return Ok(());
        }

        if !tokio::fs::try_exists(&request.config_path).await.unwrap_or(false) {
            return Err(ConfigError::MissingSubmissionConfig {
                path: request.config_path.clone(),
            }
            .into());
        }

        let curator = self.curator().await?;
        for branch in &request.branches {
            self.run_branch(&curator.path, request, branch).await?;
        }
        Ok(())
    }
}

/// Arguments for one `curator repo submit` invocation
pub fn curator_args(
    service_url: &str,
    request: &SubmissionRequest,
    branch: &BranchSubmission,
) -> Vec<String> {
    vec![
        "--level".to_string(),
        "debug".to_string(),
        "repo".to_string(),
        "submit".to_string(),
        "--service".to_string(),
        service_url.to_string(),
        "--config".to_string(),
        request.config_path.display().to_string(),
        "--distro".to_string(),
        request.repository.id().to_string(),
        "--arch".to_string(),
        request.arch.clone(),
        "--edition".to_string(),
        request.edition.clone(),
        "--version".to_string(),
        branch.version.clone(),
        "--packages".to_string(),
        request.artifact_url.clone(),
    ]
}

fn extract_tar_gz(archive: &[u8], dest: &Path) -> anyhow::Result<()> {
    let decoder = flate2::read::GzDecoder::new(archive);
    tar::Archive::new(decoder)
        .unpack(dest)
        .with_context(|| format!("Failed to extract curator into {}", dest.display()))
}
