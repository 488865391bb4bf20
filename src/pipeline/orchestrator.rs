//! Release pipeline execution.
//!
//! Stages run strictly in sequence; the first failure aborts the run and
//! nothing already done is rolled back. Re-running after remediation is the
//! recovery path.

use super::progress::{PipelineProgress, PipelineStage};
use crate::barque::{AvailabilityPoller, DistributionClient};
use crate::config::ReleaseConfig;
use crate::download_center::DownloadCenterPublisher;
use crate::error::{ConfigError, ConsistencyError, Result};
use crate::github::SourceHost;
use crate::homebrew::PackageManagerPublisher;
use crate::registry::RegistryPublisher;
use crate::settings::{ArtifactStore, PollSettings};
use crate::variant::ALL_PACKAGE_VARIANTS;
use crate::version::{DraftTag, release_version_from_tag, should_do_public_release};
use serde_json::json;
use std::sync::Arc;

/// Decides whether a run is a public release
pub type PublicReleaseGate = Box<dyn Fn(&ReleaseConfig) -> bool + Send + Sync>;

/// External systems the pipeline talks to
#[derive(Clone)]
pub struct PipelineCollaborators {
    /// Source-control host holding draft tags and releases
    pub source_host: Arc<dyn SourceHost>,
    /// Linux repository distribution
    pub distribution: DistributionClient,
    /// Propagation polling
    pub poller: AvailabilityPoller,
    /// Download center metadata
    pub download_center: Arc<dyn DownloadCenterPublisher>,
    /// Language package registry
    pub registry: Arc<dyn RegistryPublisher>,
    /// Package manager formula
    pub package_manager: Arc<dyn PackageManagerPublisher>,
}

/// Pipeline-level settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Where draft-tag artifacts were uploaded
    pub artifact_store: ArtifactStore,
    /// Availability polling budget
    pub poll: PollSettings,
    /// Release page prefix, `v{version}` is appended
    pub release_page_base: String,
}

impl PipelineSettings {
    /// Settings for the GitHub repository `owner/repo`
    pub fn for_repository(artifact_store: ArtifactStore, poll: PollSettings, slug: &str) -> Self {
        Self {
            artifact_store,
            poll,
            release_page_base: format!("https://github.com/{}/releases/tag", slug),
        }
    }

    /// Public release page for `version`
    pub fn release_link(&self, version: &str) -> String {
        format!("{}/v{}", self.release_page_base.trim_end_matches('/'), version)
    }
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Not a public release; nothing was done
    Skipped,
    /// Every stage completed
    Completed {
        /// Draft tag whose artifacts were released
        draft_tag: DraftTag,
        /// Every URL packages were published at
        published_urls: Vec<String>,
    },
}

/// Runs the release pipeline for one config
pub struct ReleaseOrchestrator {
    gate: PublicReleaseGate,
    collaborators: PipelineCollaborators,
    settings: PipelineSettings,
}

impl ReleaseOrchestrator {
    /// Create an orchestrator using the default public-release gate
    pub fn new(collaborators: PipelineCollaborators, settings: PipelineSettings) -> Self {
        Self {
            gate: Box::new(should_do_public_release),
            collaborators,
            settings,
        }
    }

    /// Replace the public-release gate
    pub fn with_gate<F>(mut self, gate: F) -> Self
    where
        F: Fn(&ReleaseConfig) -> bool + Send + Sync + 'static,
    {
        self.gate = Box::new(gate);
        self
    }

    /// Run the pipeline with a fresh progress record
    pub async fn run(&self, config: &ReleaseConfig) -> Result<PipelineOutcome> {
        let mut progress = PipelineProgress::new(config.summary());
        self.run_tracked(config, &mut progress).await
    }

    /// Run the pipeline, recording stages and any failure in `progress`
    pub async fn run_tracked(
        &self,
        config: &ReleaseConfig,
        progress: &mut PipelineProgress,
    ) -> Result<PipelineOutcome> {
        match self.execute(config, progress).await {
            Err(e) => {
                log::error!("Release pipeline aborted: {}", e);
                progress.record_failure(&e);
                Err(e)
            }
            outcome => outcome,
        }
    }

    async fn execute(
        &self,
        config: &ReleaseConfig,
        progress: &mut PipelineProgress,
    ) -> Result<PipelineOutcome> {
        if !(self.gate)(config) {
            log::info!("Not a public release, nothing to publish");
            progress.mark_skipped();
            return Ok(PipelineOutcome::Skipped);
        }

        if config.dry_run {
            log::warn!("Performing dry-run publish only");
        }

        // ===== VALIDATED =====
        config.validate()?;
        let release_version = config
            .triggering_git_tag
            .as_deref()
            .and_then(release_version_from_tag)
            .ok_or_else(|| ConfigError::MissingField {
                field: "triggering_git_tag".to_string(),
            })?;
        let draft_tag = self.validate_draft_tag(config, &release_version).await?;
        progress.advance(
            PipelineStage::Validated,
            Some(json!({ "release_version": release_version, "draft_tag": draft_tag.name })),
        )?;

        // ===== ARTIFACTS DISTRIBUTED =====
        let published_urls = self
            .distribute_all(config, &release_version, &draft_tag)
            .await?;
        progress.advance(
            PipelineStage::ArtifactsDistributed,
            Some(json!({ "published_urls": published_urls.len() })),
        )?;

        // ===== AVAILABILITY CONFIRMED =====
        if config.dry_run {
            log::warn!("Not waiting for package availability in dry run");
        } else {
            self.collaborators
                .poller
                .wait_until_available(
                    &published_urls,
                    self.settings.poll.timeout,
                    self.settings.poll.interval,
                )
                .await?;
        }
        progress.advance(
            PipelineStage::AvailabilityConfirmed,
            Some(json!({ "polled": !config.dry_run })),
        )?;

        // ===== METADATA PUBLISHED =====
        self.collaborators.download_center.publish(config).await?;
        progress.advance(PipelineStage::MetadataPublished, None)?;

        // ===== PROMOTED =====
        self.collaborators.source_host.promote_release(config).await?;
        progress.advance(PipelineStage::Promoted, None)?;

        // ===== REGISTRY PUBLISHED =====
        // Only after promotion: the registry must never serve a version whose release is not public
        self.collaborators.registry.publish().await?;
        progress.advance(PipelineStage::RegistryPublished, None)?;

        // ===== PACKAGE MANAGER PUBLISHED =====
        let release_link = self.settings.release_link(&release_version);
        self.collaborators
            .package_manager
            .publish(&release_version, &release_link, config.dry_run)
            .await?;
        progress.advance(
            PipelineStage::PackageManagerPublished,
            Some(json!({ "release_link": release_link })),
        )?;

        log::info!("Release {} published", release_version);
        Ok(PipelineOutcome::Completed {
            draft_tag,
            published_urls,
        })
    }

    /// Find the draft tag to promote and make sure it was cut from this revision
    async fn validate_draft_tag(
        &self,
        config: &ReleaseConfig,
        release_version: &str,
    ) -> Result<DraftTag> {
        let draft_tag = self
            .collaborators
            .source_host
            .most_recent_draft_tag(release_version)
            .await?
            .ok_or_else(|| ConsistencyError::MissingDraftTag {
                version: release_version.to_string(),
            })?;

        if draft_tag.sha != config.revision {
            return Err(ConsistencyError::RevisionMismatch {
                tag: draft_tag.name,
                draft_sha: draft_tag.sha,
                revision: config.revision.clone(),
            }
            .into());
        }

        log::info!(
            "Releasing artifacts of draft tag {} ({})",
            draft_tag.name,
            draft_tag.sha
        );
        Ok(draft_tag)
    }

    /// Submit every variant built for the draft tag, one after another
    async fn distribute_all(
        &self,
        config: &ReleaseConfig,
        release_version: &str,
        draft_tag: &DraftTag,
    ) -> Result<Vec<String>> {
        let mut published_urls = Vec::new();
        for variant in ALL_PACKAGE_VARIANTS {
            let filename = config.artifact_file_name(variant, release_version);
            let artifact_url = self
                .settings
                .artifact_store
                .artifact_url(&draft_tag.name, &filename);
            log::info!("Considering {} at {}", variant, artifact_url);

            let urls = self
                .collaborators
                .distribution
                .distribute(variant, &artifact_url)
                .await?;
            published_urls.extend(urls);
        }
        Ok(published_urls)
    }
}
