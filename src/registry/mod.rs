//! Language package registry publication.

use crate::error::{PublishError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Publishes the package to its registry
#[async_trait]
pub trait RegistryPublisher: Send + Sync {
    /// Publish using process-level registry auth
    async fn publish(&self) -> Result<()>;
}

/// Runs `npm publish` in the package directory
#[derive(Debug, Clone)]
pub struct NpmPublisher {
    package_dir: PathBuf,
    dry_run: bool,
}

impl NpmPublisher {
    /// Create a publisher for the package in `package_dir`
    pub fn new(package_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            package_dir: package_dir.into(),
            dry_run,
        }
    }

    /// Arguments passed to npm
    pub fn args(&self) -> Vec<&'static str> {
        let mut args = vec!["publish"];
        if self.dry_run {
            args.push("--dry-run");
        }
        args
    }
}

#[async_trait]
impl RegistryPublisher for NpmPublisher {
    async fn publish(&self) -> Result<()> {
        let npm = which::which("npm").map_err(|e| PublishError::Registry {
            reason: format!("npm not found in PATH: {}", e),
        })?;

        let args = self.args();
        log::info!(
            "Running npm {} in {}",
            args.join(" "),
            self.package_dir.display()
        );

        let output = tokio::process::Command::new(&npm)
            .args(&args)
            .current_dir(&self.package_dir)
            .output()
            .await?;

        if !output.status.success() {
            return Err(PublishError::Registry {
                reason: format!(
                    "npm publish exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }
            .into());
        }

        Ok(())
    }
}
