//! Error types for release publication.
//!
//! Every stage of the pipeline reports through [`ReleaseError`], which carries
//! actionable recovery suggestions for the operator re-running the release.

use crate::barque::TargetRepository;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for barque_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all barque_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration validation errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Draft tag / revision consistency gate failures
    #[error("Consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    /// Static mapping table errors
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Submission to a package repository failed
    #[error("Distribution error: {0}")]
    Distribution(#[from] DistributionError),

    /// Published packages did not become reachable in time
    #[error("Availability error: {0}")]
    Availability(#[from] AvailabilityError),

    /// GitHub operation errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Downstream publisher errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Pipeline progress bookkeeping errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Configuration errors, raised before any network call
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required field missing
    #[error("Missing required config field: {field}")]
    MissingField {
        /// Field name
        field: String,
    },

    /// Version does not parse as semver
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Artifact URL cannot be used to derive a package file name
    #[error("Invalid artifact URL '{url}': {reason}")]
    InvalidArtifactUrl {
        /// Offending URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Submission-service config file missing
    #[error("Submission config file not found at {path}")]
    MissingSubmissionConfig {
        /// Expected path
        path: PathBuf,
    },
}

/// Consistency gate failures
#[derive(Error, Debug)]
pub enum ConsistencyError {
    /// No draft tag exists for the release version
    #[error("Could not find prior draft tag for release version: {version}")]
    MissingDraftTag {
        /// Release version, or "unknown" when the tag did not yield one
        version: String,
    },

    /// Draft tag points at a different commit than the current revision
    #[error(
        "Version mismatch - latest draft tag {tag} was for revision {draft_sha}, current revision is {revision}"
    )]
    RevisionMismatch {
        /// Draft tag name
        tag: String,
        /// Commit the draft tag points at
        draft_sha: String,
        /// Revision of this pipeline run
        revision: String,
    },
}

/// Errors from the static variant/repository/URL tables
#[derive(Error, Debug)]
pub enum MappingError {
    /// Variant is not part of the closed enumeration
    #[error("Unknown package variant '{variant}'")]
    UnknownVariant {
        /// Variant string
        variant: String,
    },

    /// Repository id is not known to the URL computer
    #[error("Unsupported repository '{repository}'")]
    UnsupportedRepository {
        /// Repository id
        repository: String,
    },

    /// CPU architecture is not known
    #[error("Unknown architecture '{arch}'")]
    UnknownArchitecture {
        /// Architecture string
        arch: String,
    },

    /// Version cannot be truncated to a release branch
    #[error("Cannot derive release branch from version '{version}'")]
    InvalidReleaseBranch {
        /// Version string
        version: String,
    },
}

/// Submission of one artifact to one repository failed
#[derive(Error, Debug)]
#[error("Curator is unable to upload {artifact_url} to barque for {repository} ({arch}): {cause:#}")]
pub struct DistributionError {
    /// Source artifact URL
    pub artifact_url: String,
    /// Repository that rejected the submission
    pub repository: TargetRepository,
    /// Repository-specific architecture name
    pub arch: String,
    /// Underlying failure
    #[source]
    pub cause: anyhow::Error,
}

/// Availability polling errors
#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// Some URLs were still unreachable when the budget ran out
    #[error("Some packages are still not available after {timeout_secs}s:\n - {}", .remaining.join("\n - "))]
    Timeout {
        /// Timeout budget in seconds
        timeout_secs: u64,
        /// URLs still outstanding
        remaining: Vec<String>,
    },
}

/// GitHub API errors
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Token not configured
    #[error("GitHub token not provided. Set GITHUB_TOKEN or GH_TOKEN")]
    MissingToken,

    /// API request failed
    #[error("GitHub API request {operation} failed: {source}")]
    Api {
        /// Operation description
        operation: String,
        /// Client error, including the status GitHub answered with
        #[source]
        source: octocrab::Error,
    },

    /// Release for a tag could not be found
    #[error("No GitHub release found for tag {tag}")]
    ReleaseNotFound {
        /// Tag name
        tag: String,
    },

    /// File content could not be decoded
    #[error("Could not decode {path}: {reason}")]
    InvalidContent {
        /// Repository file path
        path: String,
        /// Reason for the error
        reason: String,
    },
}

/// Downstream publisher errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Download center descriptor could not be published
    #[error("Download center publish failed: {reason}")]
    DownloadCenter {
        /// Reason for the error
        reason: String,
    },

    /// Registry publish failed
    #[error("Registry publish failed: {reason}")]
    Registry {
        /// Reason for the error
        reason: String,
    },

    /// Homebrew formula could not be updated
    #[error("Homebrew publish failed: {reason}")]
    Homebrew {
        /// Reason for the error
        reason: String,
    },
}

/// Pipeline progress errors
#[derive(Error, Debug)]
pub enum StateError {
    /// A stage was entered before its predecessor completed
    #[error("Cannot enter stage {found}, expected {expected}")]
    OutOfOrder {
        /// Stage that should come next
        expected: String,
        /// Stage that was attempted
        found: String,
    },

    /// Progress report could not be saved
    #[error("Failed to save progress report to {path}: {reason}")]
    SaveFailed {
        /// Report path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::MissingField { field }) => vec![
                format!("Provide '{}' via its command line flag or environment variable", field),
            ],
            ReleaseError::Consistency(ConsistencyError::MissingDraftTag { version }) => vec![
                format!("Create a draft release first: git tag v{}-draft.0 && git push --tags", version),
                "Check that the triggering tag matches the version being released".to_string(),
            ],
            ReleaseError::Consistency(ConsistencyError::RevisionMismatch { tag, .. }) => vec![
                format!("Tag the release from the same commit as {}", tag),
                "Cut a new draft tag from the current revision and let its artifacts build".to_string(),
            ],
            ReleaseError::Mapping(_) => vec![
                "The repository map and URL templates are out of sync with the submission config".to_string(),
                "Update barque::repository, barque::url and config/repo-config.yml together".to_string(),
            ],
            ReleaseError::Distribution(err) => vec![
                format!("Check the curator output for {} ({})", err.repository, err.arch),
                "Verify BARQUE_API_KEY, BARQUE_USERNAME and SIGNING_AUTH_TOKEN_* are set".to_string(),
                "Re-run the publish once the submission service is healthy".to_string(),
            ],
            ReleaseError::Availability(AvailabilityError::Timeout { .. }) => vec![
                "Packages were submitted; propagation may just be slow".to_string(),
                "Re-run the publish or raise BARQUE_POLL_TIMEOUT_SECS".to_string(),
            ],
            ReleaseError::GitHub(GitHubError::MissingToken) => vec![
                "Export GITHUB_TOKEN with repo scope".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if re-running the pipeline could succeed without code changes
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Consistency(_)
                | ReleaseError::Mapping(_)
                | ReleaseError::Config(_)
                | ReleaseError::State(StateError::OutOfOrder { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_lists_every_remaining_url() {
        let err = AvailabilityError::Timeout {
            timeout_secs: 5,
            remaining: vec![
                "https://repo.example.com/a.deb".to_string(),
                "https://repo.example.com/b.rpm".to_string(),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("a.deb"));
        assert!(message.contains("b.rpm"));
    }

    #[test]
    fn test_consistency_errors_are_not_recoverable() {
        let err: ReleaseError = ConsistencyError::MissingDraftTag {
            version: "1.0.0".to_string(),
        }
        .into();
        assert!(!err.is_recoverable());

        let err: ReleaseError = AvailabilityError::Timeout {
            timeout_secs: 1,
            remaining: vec![],
        }
        .into();
        assert!(err.is_recoverable());
    }
}
