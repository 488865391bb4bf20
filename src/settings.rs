//! Injected settings for distribution and polling.
//!
//! Defaults match the production barque deployment; every value can be
//! overridden from the environment.

use crate::env_config::EnvConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default barque submission service
pub const DEFAULT_BARQUE_SERVICE_URL: &str = "https://barque.corp.mongodb.com";

/// Default public package repository host
pub const DEFAULT_REPO_BASE_URL: &str = "https://repo.mongodb.org";

/// Latest curator build
pub const DEFAULT_CURATOR_URL: &str =
    "https://s3.amazonaws.com/boxes.10gen.com/build/curator/curator-dist-ubuntu1604-latest.tar.gz";

/// CI artifact store
pub const DEFAULT_ARTIFACT_STORE_URL: &str = "https://s3.amazonaws.com/mciuploads";

/// Settings consumed by the distribution client and the curator submitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionSettings {
    /// Full server versions whose release branches each repository serves
    pub release_branches: Vec<String>,

    /// Barque service endpoint passed to curator
    pub service_url: String,

    /// Base URL packages are served from after propagation
    pub repo_base_url: String,

    /// Edition label (`org`)
    pub edition: String,

    /// Curator repository config (`--config`)
    pub repo_config_path: PathBuf,

    /// Use a local curator binary instead of downloading one
    pub curator_path: Option<PathBuf>,

    /// Curator tarball to download when no local binary is configured
    pub curator_url: String,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            release_branches: vec!["4.4.0".to_string(), "5.0.0".to_string()],
            service_url: DEFAULT_BARQUE_SERVICE_URL.to_string(),
            repo_base_url: DEFAULT_REPO_BASE_URL.to_string(),
            edition: "org".to_string(),
            repo_config_path: PathBuf::from("config/repo-config.yml"),
            curator_path: None,
            curator_url: DEFAULT_CURATOR_URL.to_string(),
        }
    }
}

impl DistributionSettings {
    /// Defaults overridden by `BARQUE_*` environment variables
    pub fn from_env(env: &EnvConfig) -> Self {
        let defaults = Self::default();

        let release_branches = env
            .get("BARQUE_RELEASE_BRANCHES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|branches| !branches.is_empty())
            .unwrap_or(defaults.release_branches);

        Self {
            release_branches,
            service_url: env.get("BARQUE_SERVICE_URL").unwrap_or(defaults.service_url),
            repo_base_url: env
                .get("BARQUE_REPO_BASE_URL")
                .unwrap_or(defaults.repo_base_url),
            edition: defaults.edition,
            repo_config_path: env
                .get("BARQUE_REPO_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.repo_config_path),
            curator_path: env.get("BARQUE_CURATOR_PATH").map(PathBuf::from),
            curator_url: defaults.curator_url,
        }
    }

    /// Replace the release branch set
    pub fn with_release_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.release_branches = branches.into_iter().map(Into::into).collect();
        self
    }
}

/// Availability polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Give up once this much time has elapsed after a round
    pub timeout: Duration,

    /// Constant sleep before each round
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(10),
        }
    }
}

impl PollSettings {
    /// Parse seconds from an environment variable with clamping to maximum
    ///
    /// # Arguments
    /// * `env` - Environment snapshot
    /// * `var_name` - Environment variable name (e.g., "BARQUE_POLL_TIMEOUT_SECS")
    /// * `default` - Default value if variable is not set or invalid
    /// * `max` - Maximum allowed value (values above this are clamped)
    fn parse_secs_env(env: &EnvConfig, var_name: &str, default: u64, max: u64) -> u64 {
        env.get(var_name)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|v| v.min(max))
            .unwrap_or(default)
    }

    /// Create settings from environment variables with fallback to defaults
    pub fn from_env(env: &EnvConfig) -> Self {
        Self {
            timeout: Duration::from_secs(Self::parse_secs_env(
                env,
                "BARQUE_POLL_TIMEOUT_SECS",
                300,
                3600,
            )),
            interval: Duration::from_secs(Self::parse_secs_env(
                env,
                "BARQUE_POLL_INTERVAL_SECS",
                10,
                300,
            )),
        }
    }
}

/// CI artifact store that draft-tag builds are uploaded to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    /// Store base URL
    pub base_url: String,
    /// Project directory inside the store
    pub project: String,
}

impl ArtifactStore {
    /// Store for `project` at the default location
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_ARTIFACT_STORE_URL.to_string(),
            project: project.into(),
        }
    }

    /// URL of `filename` uploaded for `revision_or_tag`.
    ///
    /// Only the file's base name is used.
    pub fn artifact_url(&self, revision_or_tag: &str, filename: &str) -> String {
        let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
        format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.project,
            revision_or_tag,
            basename
        )
    }
}
