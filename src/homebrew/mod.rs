//! Homebrew formula publication.
//!
//! The formula is updated on a branch of a fork of the core tap and proposed
//! to the core tap through a pull request.

mod formula;

pub use formula::generate_updated_formula;

use crate::error::{PublishError, Result};
use crate::github::GitHubRepo;
use async_trait::async_trait;

/// Publishes the release to a package manager
#[async_trait]
pub trait PackageManagerPublisher: Send + Sync {
    /// Reference `version`, mentioning the public release at `release_link`
    async fn publish(&self, version: &str, release_link: &str, dry_run: bool) -> Result<()>;
}

/// Homebrew tap settings
#[derive(Debug, Clone)]
pub struct HomebrewSettings {
    /// Formula name, stored as `Formula/{first letter}/{name}.rb`
    pub formula: String,
    /// Registry tarball URL, `{version}` is substituted
    pub tarball_url_template: String,
    /// Branch pull requests target and fork branches start from
    pub base_branch: String,
}

impl Default for HomebrewSettings {
    fn default() -> Self {
        Self {
            formula: "mongosh".to_string(),
            tarball_url_template:
                "https://registry.npmjs.org/@mongosh/cli-repl/-/cli-repl-{version}.tgz".to_string(),
            base_branch: "master".to_string(),
        }
    }
}

impl HomebrewSettings {
    /// Registry tarball for `version`
    pub fn tarball_url(&self, version: &str) -> String {
        self.tarball_url_template.replace("{version}", version)
    }

    /// Path of the formula inside the tap, sharded by first letter
    pub fn formula_path(&self) -> String {
        let shard: String = self.formula.chars().take(1).flat_map(char::to_lowercase).collect();
        format!("Formula/{}/{}.rb", shard, self.formula)
    }
}

/// Opens formula bump pull requests against the core tap
pub struct HomebrewPublisher {
    core: GitHubRepo,
    fork: GitHubRepo,
    settings: HomebrewSettings,
    http: reqwest::Client,
}

impl HomebrewPublisher {
    /// Create a publisher for `core`, committing through `fork`
    pub fn new(core: GitHubRepo, fork: GitHubRepo, settings: HomebrewSettings) -> Self {
        Self {
            core,
            fork,
            settings,
            http: reqwest::Client::new(),
        }
    }

    async fn tarball_sha(&self, version: &str, dry_run: bool) -> Result<String> {
        if dry_run {
            return Ok(format!(
                "dryRun-fakesha256-{}",
                chrono::Utc::now().timestamp_millis()
            ));
        }
        let tarball = crate::http::download(&self.http, &self.settings.tarball_url(version)).await?;
        crate::http::sha256_hex(tarball).await
    }

    /// Commit the formula to a new fork branch.
    ///
    /// Returns `None` when the fork already has this exact formula.
    async fn update_fork(
        &self,
        version: &str,
        sha: &str,
        formula: &str,
    ) -> Result<Option<String>> {
        let branch = format!("{}-{}-{}", self.settings.formula, version, sha);
        let base = self.fork.branch_head(&self.settings.base_branch).await?;
        self.fork.create_branch(&branch, &base).await?;

        let path = self.settings.formula_path();
        let existing = self.fork.get_file_content(&path, &branch).await?;
        if existing.content == formula {
            return Ok(None);
        }

        self.fork
            .update_file(
                &path,
                &branch,
                formula,
                &existing.sha,
                &format!("{} {}", self.settings.formula, version),
            )
            .await?;
        Ok(Some(branch))
    }
}

#[async_trait]
impl PackageManagerPublisher for HomebrewPublisher {
    async fn publish(&self, version: &str, release_link: &str, dry_run: bool) -> Result<()> {
        let sha = self.tarball_sha(version, dry_run).await?;
        let url = self.settings.tarball_url(version);

        let current = self
            .core
            .get_file_content(&self.settings.formula_path(), &self.settings.base_branch)
            .await?;
        let Some(formula) = generate_updated_formula(&current.content, version, &url, &sha, dry_run)?
        else {
            log::warn!("There are no changes to the homebrew formula");
            return Ok(());
        };

        let Some(branch) = self.update_fork(version, &sha, &formula).await? else {
            log::warn!("There are no changes to the homebrew formula on the fork");
            return Ok(());
        };

        if dry_run {
            self.fork.delete_branch(&branch).await?;
            log::warn!("Dry run, deleted fork branch {} instead of opening a pull request", branch);
            return Ok(());
        }

        let description = format!(
            "This PR was created automatically and bumps `{}` to the latest published version `{}`.\n\nFor additional details see {}.",
            self.settings.formula, version, release_link
        );
        let pr_url = self
            .core
            .create_pull_request(
                &format!("{} {}", self.settings.formula, version),
                &description,
                &format!("{}:{}", self.fork.owner(), branch),
                &self.settings.base_branch,
            )
            .await
            .map_err(|e| PublishError::Homebrew {
                reason: format!("Failed to open pull request: {}", e),
            })?;

        log::info!(
            "Created homebrew PR in {}/{}: {}",
            self.core.owner(),
            self.core.repo(),
            pr_url
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tarball_url() {
        assert_eq!(
            HomebrewSettings::default().tarball_url("1.2.3"),
            "https://registry.npmjs.org/@mongosh/cli-repl/-/cli-repl-1.2.3.tgz"
        );
    }

    #[test]
    fn test_formula_path_is_sharded() {
        assert_eq!(HomebrewSettings::default().formula_path(), "Formula/m/mongosh.rb");

        let settings = HomebrewSettings {
            formula: "Node".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.formula_path(), "Formula/n/Node.rb");
    }
}
