//! Source-control host integration.

mod repo;

pub use repo::{DEFAULT_API_BASE, FileContent, GitHubRelease, GitHubRepo, parse_slug};

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::version::DraftTag;
use async_trait::async_trait;

/// Operations the release pipeline needs from the source-control host
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Latest `v{version}-draft.N` tag, if any
    async fn most_recent_draft_tag(&self, version: &str) -> Result<Option<DraftTag>>;

    /// Flip the draft release for `config.version` to public
    async fn promote_release(&self, config: &ReleaseConfig) -> Result<()>;
}
