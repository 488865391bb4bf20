//! GitHub client scoped to one repository.

use super::SourceHost;
use crate::config::ReleaseConfig;
use crate::env_config::EnvConfig;
use crate::error::{GitHubError, Result};
use crate::version::{DraftTag, select_most_recent_draft_tag};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use octocrab::params::repos::Reference;
use octocrab::{Octocrab, Page};
use serde::Deserialize;
use serde_json::json;

/// Public GitHub API
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const PAGE_SIZE: u8 = 100;

/// Release as returned by the GitHub API
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    /// Release ID
    pub id: u64,
    /// Tag the release is attached to
    pub tag_name: String,
    /// Whether the release is still a draft
    pub draft: bool,
    /// Release page
    #[serde(default)]
    pub html_url: String,
}

/// Decoded repository file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// UTF-8 content
    pub content: String,
    /// Blob sha, needed to update the file
    pub sha: String,
}

#[derive(Deserialize)]
struct RefEntry {
    object: RefObject,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Deserialize)]
struct PullRequest {
    html_url: String,
}

fn api_error(operation: &'static str) -> impl FnOnce(octocrab::Error) -> GitHubError {
    move |source| GitHubError::Api {
        operation: operation.to_string(),
        source,
    }
}

/// A GitHub repository and the authenticated client used to talk to it
#[derive(Clone)]
pub struct GitHubRepo {
    owner: String,
    repo: String,
    client: Octocrab,
}

impl std::fmt::Debug for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRepo")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

impl GitHubRepo {
    /// Create a client for `owner/repo` on the public API
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_api_base(owner, repo, token, DEFAULT_API_BASE)
    }

    /// Create a client for `owner/repo` on the API at `api_base`
    pub fn with_api_base(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
        api_base: &str,
    ) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .base_uri(api_base.trim_end_matches('/'))
            .and_then(|builder| builder.build())
            .map_err(api_error("configure client"))?;
        Ok(Self {
            owner: owner.into(),
            repo: repo.into(),
            client,
        })
    }

    /// Create a client for an `owner/repo` slug with the token from `GITHUB_TOKEN` or `GH_TOKEN`
    pub fn from_env(slug: &str, env: &EnvConfig) -> Result<Self> {
        let token = env
            .first_of(&["GITHUB_TOKEN", "GH_TOKEN"])
            .ok_or(GitHubError::MissingToken)?;
        let (owner, repo) = parse_slug(slug)?;
        Self::new(owner, repo, token)
    }

    /// Repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner, self.repo, path.trim_start_matches('/'))
    }

    /// All tags with the commits they point at
    pub async fn list_tags(&self) -> Result<Vec<DraftTag>> {
        let first = self
            .client
            .repos(&self.owner, &self.repo)
            .list_tags()
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(api_error("list tags"))?;
        let tags = self
            .client
            .all_pages(first)
            .await
            .map_err(api_error("list tags"))?;

        Ok(tags
            .into_iter()
            .map(|tag| DraftTag::new(tag.name, tag.commit.sha))
            .collect())
    }

    /// All releases, drafts included
    pub async fn list_releases(&self) -> Result<Vec<GitHubRelease>> {
        let first: Page<GitHubRelease> = self
            .client
            .get(self.route("releases"), Some(&[("per_page", PAGE_SIZE)]))
            .await
            .map_err(api_error("list releases"))?;
        let releases = self
            .client
            .all_pages(first)
            .await
            .map_err(api_error("list releases"))?;
        Ok(releases)
    }

    /// Release attached to `tag`, drafts included
    pub async fn release_by_tag(&self, tag: &str) -> Result<Option<GitHubRelease>> {
        Ok(self
            .list_releases()
            .await?
            .into_iter()
            .find(|release| release.tag_name == tag))
    }

    /// Content of `path` on `branch`
    pub async fn get_file_content(&self, path: &str, branch: &str) -> Result<FileContent> {
        let mut items = self
            .client
            .repos(&self.owner, &self.repo)
            .get_content()
            .path(path)
            .r#ref(branch)
            .send()
            .await
            .map_err(api_error("get file content"))?;

        let invalid = |reason: &str| GitHubError::InvalidContent {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        let file = items
            .take_items()
            .into_iter()
            .find(|item| item.path == path)
            .ok_or_else(|| invalid("not a file"))?;
        let content = file
            .decoded_content()
            .ok_or_else(|| invalid("content is not base64 encoded UTF-8"))?;

        Ok(FileContent {
            content,
            sha: file.sha,
        })
    }

    /// Commit `branch` currently points at
    pub async fn branch_head(&self, branch: &str) -> Result<String> {
        let entry: RefEntry = self
            .client
            .get(self.route(&format!("git/ref/heads/{}", branch)), None::<&()>)
            .await
            .map_err(api_error("get branch"))?;
        Ok(entry.object.sha)
    }

    /// Create `branch` at `sha`
    pub async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .post(
                self.route("git/refs"),
                Some(&json!({
                    "ref": format!("refs/heads/{}", branch),
                    "sha": sha,
                })),
            )
            .await
            .map_err(api_error("create branch"))?;
        Ok(())
    }

    /// Delete `branch`
    pub async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.client
            .repos(&self.owner, &self.repo)
            .delete_ref(&Reference::Branch(branch.to_string()))
            .await
            .map_err(api_error("delete branch"))?;
        Ok(())
    }

    /// Commit new content for an existing file
    pub async fn update_file(
        &self,
        path: &str,
        branch: &str,
        content: &str,
        previous_sha: &str,
        message: &str,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .put(
                self.route(&format!("contents/{}", path)),
                Some(&json!({
                    "message": message,
                    "content": STANDARD.encode(content),
                    "sha": previous_sha,
                    "branch": branch,
                })),
            )
            .await
            .map_err(api_error("update file"))?;
        Ok(())
    }

    /// Open a pull request and return its URL
    pub async fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<String> {
        let pr: PullRequest = self
            .client
            .post(
                self.route("pulls"),
                Some(&json!({
                    "title": title,
                    "body": body,
                    "head": head,
                    "base": base,
                })),
            )
            .await
            .map_err(api_error("create pull request"))?;
        Ok(pr.html_url)
    }
}

#[async_trait]
impl SourceHost for GitHubRepo {
    async fn most_recent_draft_tag(&self, version: &str) -> Result<Option<DraftTag>> {
        let tags = self.list_tags().await?;
        Ok(select_most_recent_draft_tag(&tags, version))
    }

    async fn promote_release(&self, config: &ReleaseConfig) -> Result<()> {
        let tag = format!("v{}", config.version);
        let release = self
            .release_by_tag(&tag)
            .await?
            .ok_or_else(|| GitHubError::ReleaseNotFound { tag: tag.clone() })?;

        if !release.draft {
            log::info!("Release {} is already public", tag);
            return Ok(());
        }

        if config.dry_run {
            log::info!("Dry run, not promoting release {}", tag);
            return Ok(());
        }

        let _: serde_json::Value = self
            .client
            .patch(
                self.route(&format!("releases/{}", release.id)),
                Some(&json!({ "draft": false })),
            )
            .await
            .map_err(api_error("promote release"))?;
        log::info!("Promoted release {} ({})", tag, release.html_url);
        Ok(())
    }
}

/// Split an `owner/repo` slug
pub fn parse_slug(slug: &str) -> Result<(String, String)> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(crate::error::CliError::InvalidArguments {
            reason: format!("Expected owner/repo, got '{}'", slug),
        }
        .into()),
    }
}
