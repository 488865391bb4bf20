//! Command line argument parsing and validation.
//!
//! Every publish argument can also come from the environment, so CI can
//! drive the tool without a long command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release publication for packaged builds
#[derive(Parser, Debug)]
#[command(
    name = "barque_release",
    version,
    about = "Publish packaged builds to Linux repositories, the download center, GitHub, npm and Homebrew",
    long_about = "Promote the artifacts of a draft release to a public release.

Usage:
  barque_release publish --release-version 1.0.0 --tag v1.0.0 --revision <sha>
  barque_release plan debian-x64 https://s3.amazonaws.com/mciuploads/mongosh/v1.0.0-draft.2/mongodb-mongosh_1.0.0_amd64.deb
  barque_release wait <url>..."
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print extra detail
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full release pipeline
    Publish(PublishArgs),

    /// Print where a variant's package will be published, without submitting it
    Plan(PlanArgs),

    /// Wait until URLs are reachable
    Wait(WaitArgs),
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Publish(_) => "publish",
            Command::Plan(_) => "plan",
            Command::Wait(_) => "wait",
        }
    }
}

/// Arguments of `publish`
#[derive(clap::Args, Debug, Clone)]
pub struct PublishArgs {
    /// Product version being released
    #[arg(long, env = "RELEASE_VERSION")]
    pub release_version: String,

    /// Git tag that triggered this run
    #[arg(long, env = "TRIGGERING_GIT_TAG")]
    pub tag: Option<String>,

    /// Commit the run was built from
    #[arg(long, env = "REVISION")]
    pub revision: String,

    /// Branch the run was built from
    #[arg(long, env = "BRANCH_NAME", default_value = "main")]
    pub branch: String,

    /// CI patch build
    #[arg(long, env = "IS_PATCH")]
    pub is_patch: bool,

    /// Artifact store project
    #[arg(long, env = "EVERGREEN_PROJECT", default_value = "mongosh")]
    pub project: String,

    /// Base name of tarball, zip and msi artifacts
    #[arg(long, default_value = "mongosh")]
    pub package_name: String,

    /// Base name of .deb and .rpm artifacts
    #[arg(long, default_value = "mongodb-mongosh")]
    pub system_package_name: String,

    /// Directory for generated files
    #[arg(long, env = "OUTPUT_DIR", default_value = "dist")]
    pub output_dir: PathBuf,

    /// GitHub repository holding draft tags and releases (owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "mongodb-js/mongosh")]
    pub repository: String,

    /// Homebrew core tap (owner/repo)
    #[arg(long, default_value = "Homebrew/homebrew-core")]
    pub homebrew_core: String,

    /// Fork of the Homebrew core tap that branches are pushed to (owner/repo)
    #[arg(long, default_value = "mongodb-js/homebrew-core")]
    pub homebrew_fork: String,

    /// Download center descriptor endpoint
    #[arg(
        long,
        env = "DOWNLOAD_CENTER_URL",
        default_value = "https://info-mongodb-com.s3.amazonaws.com/com-download-center/mongosh.json"
    )]
    pub download_center_url: String,

    /// Download center access key
    #[arg(long, env = "DOWNLOAD_CENTER_AWS_KEY", hide_env_values = true, default_value = "")]
    pub download_center_key: String,

    /// Download center secret
    #[arg(long, env = "DOWNLOAD_CENTER_AWS_SECRET", hide_env_values = true, default_value = "")]
    pub download_center_secret: String,

    /// Directory of the npm package to publish
    #[arg(long, env = "NPM_PACKAGE_DIR", default_value = "packages/cli-repl")]
    pub npm_package_dir: PathBuf,

    /// Log side effects instead of performing them
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Write the pipeline progress report as JSON
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Arguments of `plan`
#[derive(clap::Args, Debug, Clone)]
pub struct PlanArgs {
    /// Package variant, e.g. debian-x64
    #[arg(index = 1, value_name = "VARIANT")]
    pub variant: String,

    /// URL the package is downloaded from
    #[arg(index = 2, value_name = "ARTIFACT_URL")]
    pub artifact_url: String,

    /// Print as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `wait`
#[derive(clap::Args, Debug, Clone)]
pub struct WaitArgs {
    /// URLs that must become reachable
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Give up after this many seconds (default from BARQUE_POLL_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Seconds between rounds (default from BARQUE_POLL_INTERVAL_SECS)
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.quiet && self.verbose {
            return Err("--quiet and --verbose cannot be used together".to_string());
        }

        match &self.command {
            Command::Publish(publish) => {
                for (name, slug) in [
                    ("--repository", &publish.repository),
                    ("--homebrew-core", &publish.homebrew_core),
                    ("--homebrew-fork", &publish.homebrew_fork),
                ] {
                    if crate::github::parse_slug(slug).is_err() {
                        return Err(format!("{} must be owner/repo, got '{}'", name, slug));
                    }
                }
            }
            Command::Plan(_) => {}
            Command::Wait(wait) => {
                if wait.interval_secs == Some(0) {
                    return Err("--interval-secs must be greater than zero".to_string());
                }
            }
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print message only in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Print a list item
    pub fn bullet(&self, message: &str) {
        let _ = self.output.bullet(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}
