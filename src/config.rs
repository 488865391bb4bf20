//! Input of one release pipeline run.

use crate::error::{ConfigError, Result};
use crate::variant::{PackageFamily, PackageVariant};
use serde::Serialize;
use std::path::PathBuf;

/// Credentials for the download center metadata endpoint
#[derive(Debug, Clone, Default)]
pub struct DownloadCenterCredentials {
    /// Access key, sent as the basic auth user
    pub access_key_id: String,
    /// Secret, sent as the basic auth password
    pub secret_access_key: String,
}

/// Immutable configuration of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct ReleaseConfig {
    /// Product version being released, e.g. `1.0.0`
    pub version: String,
    /// Tag that triggered this run, if any
    pub triggering_git_tag: Option<String>,
    /// Commit this run was built from
    pub revision: String,
    /// Branch this run was built from
    pub branch: String,
    /// CI patch build (never publicly released)
    pub is_patch: bool,
    /// Artifact store project
    pub project: String,
    /// Base name of tarball, zip and msi artifacts (`mongosh`)
    pub package_name: String,
    /// Base name of `.deb` and `.rpm` artifacts (`mongodb-mongosh`)
    pub system_package_name: String,
    /// Where generated files such as `download-center.json` are written
    pub output_dir: PathBuf,
    /// Download center credentials
    pub download_center: DownloadCenterCredentials,
    /// Log side effects instead of performing them
    pub dry_run: bool,
}

impl ReleaseConfig {
    /// Reject configs missing required fields, before any network call
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("version", &self.version),
            ("revision", &self.revision),
            ("project", &self.project),
            ("package_name", &self.package_name),
            ("system_package_name", &self.system_package_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                }
                .into());
            }
        }

        semver::Version::parse(&self.version).map_err(|e| ConfigError::InvalidVersion {
            version: self.version.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Artifact file name of `variant` for `version`
    pub fn artifact_file_name(&self, variant: PackageVariant, version: &str) -> String {
        let name = match variant.family() {
            PackageFamily::Debian | PackageFamily::Rhel => &self.system_package_name,
            _ => &self.package_name,
        };
        variant.package_file_name(name, version)
    }

    /// Short description for logs and reports
    pub fn summary(&self) -> ReleaseSummary {
        ReleaseSummary {
            version: self.version.clone(),
            tag: self.triggering_git_tag.clone(),
            revision: self.revision.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Serializable subset of [`ReleaseConfig`] without credentials
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseSummary {
    /// Product version
    pub version: String,
    /// Triggering tag
    pub tag: Option<String>,
    /// Commit
    pub revision: String,
    /// Dry run flag
    pub dry_run: bool,
}
