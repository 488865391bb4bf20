//! Distribution of one packaged variant to its Linux repositories.

use super::repository::resolve;
use super::submit::{BranchSubmission, SubmissionRequest, Submitter};
use super::url::{compute_url, release_branch};
use crate::env_config::EnvConfig;
use crate::error::{ConfigError, DistributionError, Result};
use crate::settings::DistributionSettings;
use crate::variant::PackageVariant;
use std::sync::Arc;

/// Submits variants to barque and derives where they will be published.
///
/// The client performs no polling; the returned URLs are not yet reachable.
#[derive(Clone)]
pub struct DistributionClient {
    submitter: Arc<dyn Submitter>,
    settings: DistributionSettings,
    env: EnvConfig,
}

impl DistributionClient {
    /// Create a client around a submitter
    pub fn new(submitter: Arc<dyn Submitter>, settings: DistributionSettings, env: EnvConfig) -> Self {
        Self {
            submitter,
            settings,
            env,
        }
    }

    /// Settings in use
    pub fn settings(&self) -> &DistributionSettings {
        &self.settings
    }

    /// URLs `variant` will be published at, without submitting anything
    pub fn expected_urls(&self, variant: PackageVariant, artifact_url: &str) -> Result<Vec<String>> {
        let targets = resolve(variant);
        if targets.repositories.is_empty() {
            return Ok(Vec::new());
        }

        let filename = artifact_file_name(artifact_url)?;
        let branches = self.release_branch_names()?;

        let mut urls = Vec::with_capacity(targets.repositories.len() * branches.len());
        for repository in &targets.repositories {
            for branch in &branches {
                urls.push(compute_url(
                    &self.settings.repo_base_url,
                    &self.settings.edition,
                    *repository,
                    &targets.arch_name,
                    branch,
                    &filename,
                ));
            }
        }
        Ok(urls)
    }

    /// Submit `variant` to every repository that carries it.
    ///
    /// Submission stops at the first repository that fails; the error names
    /// that repository and architecture and nothing is computed for the
    /// repositories after it. Variants without repositories are a no-op.
    pub async fn distribute(
        &self,
        variant: PackageVariant,
        artifact_url: &str,
    ) -> Result<Vec<String>> {
        let targets = resolve(variant);
        if targets.repositories.is_empty() {
            log::debug!("{} is not distributed through barque", variant);
            return Ok(Vec::new());
        }

        let filename = artifact_file_name(artifact_url)?;
        let branch_names = self.release_branch_names()?;
        let branches = self
            .settings
            .release_branches
            .iter()
            .map(|version| BranchSubmission::resolve(version, &self.env))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        log::info!(
            "Distributing {} ({}) to {} repositories",
            variant,
            artifact_url,
            targets.repositories.len()
        );

        let mut published = Vec::with_capacity(targets.repositories.len() * branches.len());
        for repository in targets.repositories {
            let request = SubmissionRequest {
                artifact_url: artifact_url.to_string(),
                config_path: self.settings.repo_config_path.clone(),
                repository,
                arch: targets.arch_name.clone(),
                edition: self.settings.edition.clone(),
                branches: branches.clone(),
            };

            if let Err(cause) = self.submitter.submit(&request).await {
                log::error!(
                    "Submission of {} to {} ({}) failed: {:#}",
                    artifact_url,
                    repository,
                    targets.arch_name,
                    cause
                );
                return Err(DistributionError {
                    artifact_url: artifact_url.to_string(),
                    repository,
                    arch: targets.arch_name,
                    cause,
                }
                .into());
            }

            for branch in &branch_names {
                let url = compute_url(
                    &self.settings.repo_base_url,
                    &self.settings.edition,
                    repository,
                    &targets.arch_name,
                    branch,
                    &filename,
                );
                log::info!(" -> {}", url);
                published.push(url);
            }
        }

        Ok(published)
    }

    fn release_branch_names(&self) -> Result<Vec<String>> {
        Ok(self
            .settings
            .release_branches
            .iter()
            .map(String::as_str)
            .map(release_branch)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

/// Last path segment of an artifact URL
pub fn artifact_file_name(artifact_url: &str) -> Result<String> {
    let invalid = |reason: &str| ConfigError::InvalidArtifactUrl {
        url: artifact_url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = ::url::Url::parse(artifact_url).map_err(|e| invalid(&e.to_string()))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| invalid("URL has no file name"))?;
    Ok(name.to_string())
}
