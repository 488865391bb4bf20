//! # Barque Release
//!
//! Release publication for packaged builds.
//!
//! A release run promotes the artifacts of a draft tag to a public release:
//! packages are submitted to the Linux package repositories, their public
//! URLs are polled until they answer, then the download center metadata,
//! the GitHub release, the npm package and the Homebrew formula are
//! published in that order.
//!
//! ## Usage
//!
//! ```bash
//! barque_release publish --release-version 1.0.0 --tag v1.0.0 --revision <sha>
//! barque_release plan rhel-x64 <artifact-url>
//! barque_release wait <url>...
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod barque;
pub mod cli;
pub mod config;
pub mod download_center;
pub mod env_config;
pub mod error;
pub mod github;
pub mod homebrew;
pub mod http;
pub mod pipeline;
pub mod registry;
pub mod settings;
pub mod variant;
pub mod version;

// Re-export main types for public API
pub use barque::{AvailabilityPoller, DistributionClient, TargetRepository};
pub use cli::Args;
pub use config::ReleaseConfig;
pub use env_config::EnvConfig;
pub use error::{ReleaseError, Result};
pub use pipeline::{PipelineOutcome, PipelineProgress, PipelineStage, ReleaseOrchestrator};
pub use variant::{ALL_PACKAGE_VARIANTS, PackageVariant};
