//! The release pipeline and its progress record.

mod orchestrator;
mod progress;

pub use orchestrator::{
    PipelineCollaborators, PipelineOutcome, PipelineSettings, PublicReleaseGate,
    ReleaseOrchestrator,
};
pub use progress::{PipelineFailure, PipelineProgress, PipelineStage, StageCheckpoint};
