//! Pipeline progress tracking and serialization.

use crate::config::ReleaseSummary;
use crate::error::{ReleaseError, StateError};
use serde::Serialize;
use std::path::Path;

/// Stage of the release pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PipelineStage {
    /// Public release confirmed and draft tag matches the revision
    Validated,
    /// Every variant submitted to its repositories
    ArtifactsDistributed,
    /// Every published URL answers, or polling skipped in a dry run
    AvailabilityConfirmed,
    /// Download center descriptor published
    MetadataPublished,
    /// Draft release made public
    Promoted,
    /// Package published to the registry
    RegistryPublished,
    /// Package manager formula updated
    PackageManagerPublished,
}

impl PipelineStage {
    /// Stages in order
    pub const ALL: [PipelineStage; 7] = [
        PipelineStage::Validated,
        PipelineStage::ArtifactsDistributed,
        PipelineStage::AvailabilityConfirmed,
        PipelineStage::MetadataPublished,
        PipelineStage::Promoted,
        PipelineStage::RegistryPublished,
        PipelineStage::PackageManagerPublished,
    ];

    /// Stage following this one
    pub fn next(self) -> Option<PipelineStage> {
        let index = Self::ALL.iter().position(|stage| *stage == self)?;
        Self::ALL.get(index + 1).copied()
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Validated => write!(f, "Validated"),
            PipelineStage::ArtifactsDistributed => write!(f, "Artifacts Distributed"),
            PipelineStage::AvailabilityConfirmed => write!(f, "Availability Confirmed"),
            PipelineStage::MetadataPublished => write!(f, "Metadata Published"),
            PipelineStage::Promoted => write!(f, "Promoted"),
            PipelineStage::RegistryPublished => write!(f, "Registry Published"),
            PipelineStage::PackageManagerPublished => write!(f, "Package Manager Published"),
        }
    }
}

/// Checkpoint reached during a run
#[derive(Debug, Clone, Serialize)]
pub struct StageCheckpoint {
    /// Stage reached
    pub stage: PipelineStage,
    /// When it was reached
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Stage-specific details
    pub data: Option<serde_json::Value>,
}

/// Failure that aborted a run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineFailure {
    /// Stage that was being attempted
    pub stage: Option<PipelineStage>,
    /// Error message
    pub message: String,
    /// Whether a re-run can succeed without code changes
    pub recoverable: bool,
    /// When the run aborted
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Ordered record of one pipeline run.
///
/// Stages only move forward; there is no rollback of completed stages.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineProgress {
    /// Run being tracked
    pub release: ReleaseSummary,
    /// Timestamp when the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Timestamp of the last change
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Last completed stage, `None` before validation
    pub current: Option<PipelineStage>,
    /// Checkpoints in the order they were reached
    pub checkpoints: Vec<StageCheckpoint>,
    /// Set when the run aborted
    pub failure: Option<PipelineFailure>,
    /// Set when the public-release gate declined the run
    pub skipped: bool,
}

impl PipelineProgress {
    /// Start tracking a run
    pub fn new(release: ReleaseSummary) -> Self {
        let now = chrono::Utc::now();
        Self {
            release,
            started_at: now,
            updated_at: now,
            current: None,
            checkpoints: Vec::new(),
            failure: None,
            skipped: false,
        }
    }

    /// Stage the run has to reach next
    pub fn next_stage(&self) -> Option<PipelineStage> {
        match self.current {
            None => Some(PipelineStage::Validated),
            Some(stage) => stage.next(),
        }
    }

    /// Record reaching `stage`, which must be the next one
    pub fn advance(
        &mut self,
        stage: PipelineStage,
        data: Option<serde_json::Value>,
    ) -> Result<(), StateError> {
        let expected = self.next_stage();
        if expected != Some(stage) {
            return Err(StateError::OutOfOrder {
                expected: expected.map_or_else(|| "none".to_string(), |s| s.to_string()),
                found: stage.to_string(),
            });
        }

        let now = chrono::Utc::now();
        self.checkpoints.push(StageCheckpoint {
            stage,
            timestamp: now,
            data,
        });
        self.current = Some(stage);
        self.updated_at = now;
        log::info!("Pipeline stage reached: {}", stage);
        Ok(())
    }

    /// Record that the gate declined the run
    pub fn mark_skipped(&mut self) {
        self.skipped = true;
        self.updated_at = chrono::Utc::now();
    }

    /// Record the error that aborted the run
    pub fn record_failure(&mut self, error: &ReleaseError) {
        let now = chrono::Utc::now();
        self.failure = Some(PipelineFailure {
            stage: self.next_stage(),
            message: error.to_string(),
            recoverable: error.is_recoverable(),
            timestamp: now,
        });
        self.updated_at = now;
    }

    /// Check if a specific stage has been completed
    pub fn has_completed(&self, stage: PipelineStage) -> bool {
        self.current.is_some_and(|current| current >= stage)
    }

    /// Whether every stage completed
    pub fn is_complete(&self) -> bool {
        self.has_completed(PipelineStage::PackageManagerPublished)
    }

    /// Get elapsed time
    pub fn elapsed_time(&self) -> chrono::Duration {
        self.updated_at - self.started_at
    }

    /// One line description of where the run is
    pub fn summary(&self) -> String {
        let position = if self.skipped {
            "skipped (not a public release)".to_string()
        } else if let Some(failure) = &self.failure {
            match failure.stage {
                Some(stage) => format!("failed before {}", stage),
                None => "failed".to_string(),
            }
        } else {
            match self.current {
                Some(stage) => format!("at {}", stage),
                None => "not started".to_string(),
            }
        };

        format!(
            "Release {} {} - {} of {} stages - {} elapsed",
            self.release.version,
            position,
            self.checkpoints.len(),
            PipelineStage::ALL.len(),
            format_duration(self.elapsed_time())
        )
    }

    /// Write the progress as pretty JSON
    pub async fn save(&self, path: &Path) -> Result<(), StateError> {
        let save_failed = |reason: String| StateError::SaveFailed {
            path: path.to_path_buf(),
            reason,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| save_failed(e.to_string()))?;
        }
        tokio::fs::write(path, json)
            .await
            .map_err(|e| save_failed(e.to_string()))
    }
}

fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsistencyError;

    fn progress() -> PipelineProgress {
        PipelineProgress::new(ReleaseSummary {
            version: "1.0.0".to_string(),
            tag: Some("v1.0.0".to_string()),
            revision: "abc".to_string(),
            dry_run: false,
        })
    }

    #[test]
    fn test_stages_advance_in_order() {
        let mut p = progress();
        for stage in PipelineStage::ALL {
            assert!(p.advance(stage, None).is_ok());
        }
        assert!(p.is_complete());
        assert_eq!(p.next_stage(), None);
    }

    #[test]
    fn test_out_of_order_advance_is_rejected() {
        let mut p = progress();
        assert!(matches!(
            p.advance(PipelineStage::Promoted, None),
            Err(StateError::OutOfOrder { .. })
        ));
        assert!(p.advance(PipelineStage::Validated, None).is_ok());
        assert!(p.advance(PipelineStage::Validated, None).is_err());
        assert!(p.has_completed(PipelineStage::Validated));
        assert!(!p.has_completed(PipelineStage::ArtifactsDistributed));
    }

    #[test]
    fn test_failure_records_attempted_stage() {
        let mut p = progress();
        let err: ReleaseError = ConsistencyError::MissingDraftTag {
            version: "1.0.0".to_string(),
        }
        .into();
        p.record_failure(&err);
        let failure = p.failure.clone().unwrap();
        assert_eq!(failure.stage, Some(PipelineStage::Validated));
        assert!(!failure.recoverable);
        assert!(p.summary().contains("failed before Validated"));
    }

    #[tokio::test]
    async fn test_save_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("progress.json");
        let mut p = progress();
        p.advance(PipelineStage::Validated, Some(serde_json::json!({"draft_tag": "v1.0.0-draft.1"})))
            .unwrap();
        p.save(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["current"], "Validated");
        assert_eq!(written["checkpoints"][0]["data"]["draft_tag"], "v1.0.0-draft.1");
    }
}
