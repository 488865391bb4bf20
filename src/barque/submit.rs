//! Submission seam between the distribution client and barque.

use super::repository::TargetRepository;
use super::url::release_branch;
use crate::env_config::EnvConfig;
use crate::error::MappingError;
use async_trait::async_trait;
use std::path::PathBuf;

/// One release branch a submission targets, with its signing material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSubmission {
    /// Full server version of the branch, e.g. `4.4.0`
    pub version: String,
    /// Notary key name, `server-{major.minor}`
    pub notary_key_name: String,
    /// Branch signing token; empty when not configured
    pub notary_token: String,
}

impl BranchSubmission {
    /// Resolve signing material for `version` from `SIGNING_AUTH_TOKEN_{X}{Y}`.
    pub fn resolve(version: &str, env: &EnvConfig) -> Result<Self, MappingError> {
        let branch = release_branch(version)?;
        Ok(Self {
            version: version.to_string(),
            notary_key_name: format!("server-{}", branch),
            notary_token: env.get_or_empty(&signing_token_var(&branch)),
        })
    }
}

/// Environment variable holding the signing token for a `major.minor` branch
pub fn signing_token_var(branch: &str) -> String {
    format!("SIGNING_AUTH_TOKEN_{}", branch.replace('.', ""))
}

/// Everything the submission service needs for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Where the package is downloaded from
    pub artifact_url: String,
    /// Submission service repository config
    pub config_path: PathBuf,
    /// Target repository
    pub repository: TargetRepository,
    /// Repository-specific architecture name
    pub arch: String,
    /// Edition label
    pub edition: String,
    /// Release branches the package is added to
    pub branches: Vec<BranchSubmission>,
}

/// Submits one package to one repository.
///
/// Implementations are expected to be idempotent on the service side; a
/// submission may be repeated when a release is re-run.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submit the package, failing with the underlying cause
    async fn submit(&self, request: &SubmissionRequest) -> anyhow::Result<()>;
}
