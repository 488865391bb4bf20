//! Distribution to Linux package repositories through barque.
//!
//! [`repository`] maps variants to repositories, [`url`] derives where
//! packages show up, [`client`] submits them and [`poller`] waits for them.

pub mod client;
pub mod curator;
pub mod poller;
pub mod repository;
pub mod submit;
pub mod url;

pub use client::{DistributionClient, artifact_file_name};
pub use curator::CuratorSubmitter;
pub use poller::{AvailabilityPoller, ExistenceCheck, HttpExistenceCheck};
pub use repository::{ALL_TARGET_REPOSITORIES, RepositoryTargets, TargetRepository, resolve};
pub use submit::{BranchSubmission, SubmissionRequest, Submitter};
pub use url::{compute_url, release_branch};
