//! Plan command implementation.
//!
//! Prints the URLs a package will be published at without submitting it.

use crate::barque::{DistributionClient, Submitter, SubmissionRequest, resolve};
use crate::cli::RuntimeConfig;
use crate::cli::args::PlanArgs;
use crate::env_config::EnvConfig;
use crate::error::Result;
use crate::settings::DistributionSettings;
use crate::variant::PackageVariant;
use async_trait::async_trait;
use std::sync::Arc;

/// Planning never submits
struct NoSubmit;

#[async_trait]
impl Submitter for NoSubmit {
    async fn submit(&self, _request: &SubmissionRequest) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Execute plan command
pub(super) async fn execute_plan(args: &PlanArgs, config: &RuntimeConfig) -> Result<i32> {
    let variant: PackageVariant = args.variant.parse()?;
    let env = EnvConfig::from_process();
    let client = DistributionClient::new(
        Arc::new(NoSubmit),
        DistributionSettings::from_env(&env),
        env,
    );

    let urls = client.expected_urls(variant, &args.artifact_url)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&urls)?);
        return Ok(0);
    }

    let targets = resolve(variant);
    if targets.repositories.is_empty() {
        config.println(&format!("{} is not distributed to any package repository", variant));
        return Ok(0);
    }

    config.section(&format!("{} ({})", variant, targets.arch_name));
    config.verbose_println(&format!(
        "Repositories: {}",
        targets
            .repositories
            .iter()
            .map(|r| r.id())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    for url in &urls {
        config.bullet(url);
    }
    config.success_println(&format!("{} published URL(s)", urls.len()));
    Ok(0)
}
