//! Publish command implementation.
//!
//! Wires the concrete collaborators from arguments and environment, then
//! hands the run to the release orchestrator.

use crate::barque::{AvailabilityPoller, CuratorSubmitter, DistributionClient, HttpExistenceCheck};
use crate::cli::RuntimeConfig;
use crate::cli::args::PublishArgs;
use crate::config::{DownloadCenterCredentials, ReleaseConfig};
use crate::download_center::HttpDownloadCenter;
use crate::env_config::EnvConfig;
use crate::error::Result;
use crate::github::GitHubRepo;
use crate::homebrew::{HomebrewPublisher, HomebrewSettings};
use crate::pipeline::{
    PipelineCollaborators, PipelineOutcome, PipelineProgress, PipelineSettings,
    ReleaseOrchestrator,
};
use crate::registry::NpmPublisher;
use crate::settings::{ArtifactStore, DistributionSettings, PollSettings};
use crate::version::should_do_public_release;
use std::sync::Arc;

/// Build the run configuration from arguments
fn release_config(args: &PublishArgs) -> ReleaseConfig {
    ReleaseConfig {
        version: args.release_version.clone(),
        triggering_git_tag: args.tag.clone().filter(|tag| !tag.is_empty()),
        revision: args.revision.clone(),
        branch: args.branch.clone(),
        is_patch: args.is_patch,
        project: args.project.clone(),
        package_name: args.package_name.clone(),
        system_package_name: args.system_package_name.clone(),
        output_dir: args.output_dir.clone(),
        download_center: DownloadCenterCredentials {
            access_key_id: args.download_center_key.clone(),
            secret_access_key: args.download_center_secret.clone(),
        },
        dry_run: args.dry_run,
    }
}

/// Build collaborators from arguments and environment
fn collaborators(
    args: &PublishArgs,
    env: &EnvConfig,
    settings: &PipelineSettings,
) -> Result<PipelineCollaborators> {
    let distribution_settings = DistributionSettings::from_env(env);
    let submitter = CuratorSubmitter::new(distribution_settings.clone(), env.clone(), args.dry_run);
    let distribution =
        DistributionClient::new(Arc::new(submitter), distribution_settings, env.clone());

    let source_host = GitHubRepo::from_env(&args.repository, env)?;
    let homebrew = HomebrewPublisher::new(
        GitHubRepo::from_env(&args.homebrew_core, env)?,
        GitHubRepo::from_env(&args.homebrew_fork, env)?,
        HomebrewSettings::default(),
    );

    Ok(PipelineCollaborators {
        source_host: Arc::new(source_host),
        distribution,
        poller: AvailabilityPoller::new(Arc::new(HttpExistenceCheck::default())),
        download_center: Arc::new(
            HttpDownloadCenter::new(&args.download_center_url)
                .with_release_page_base(&settings.release_page_base),
        ),
        registry: Arc::new(NpmPublisher::new(&args.npm_package_dir, args.dry_run)),
        package_manager: Arc::new(homebrew),
    })
}

async fn save_report(args: &PublishArgs, config: &RuntimeConfig, progress: &PipelineProgress) {
    if let Some(report) = &args.report {
        match progress.save(report).await {
            Ok(()) => config.verbose_println(&format!("Report written to {}", report.display())),
            Err(e) => config.warning_println(&e.to_string()),
        }
    }
}

/// Execute publish command
pub(super) async fn execute_publish(args: &PublishArgs, config: &RuntimeConfig) -> Result<i32> {
    let env = EnvConfig::from_process();
    let release = release_config(args);

    config.section(&format!("Publishing {}", release.version));
    config.verbose_println(&format!(
        "Tag: {}, revision: {}, branch: {}",
        release.triggering_git_tag.as_deref().unwrap_or("<none>"),
        release.revision,
        release.branch
    ));
    if release.dry_run {
        config.warning_println("Dry run: side effects are logged, not performed");
    }

    let mut progress = PipelineProgress::new(release.summary());

    // Skipped runs must not require a GitHub token
    if !should_do_public_release(&release) {
        progress.mark_skipped();
        save_report(args, config, &progress).await;
        config.println("Not a public release, nothing published");
        return Ok(0);
    }

    let settings = PipelineSettings::for_repository(
        ArtifactStore::new(&release.project),
        PollSettings::from_env(&env),
        &args.repository,
    );
    let collaborators = collaborators(args, &env, &settings)?;
    let orchestrator = ReleaseOrchestrator::new(collaborators, settings);

    let result = orchestrator.run_tracked(&release, &mut progress).await;

    save_report(args, config, &progress).await;
    config.indent(&progress.summary());

    match result? {
        PipelineOutcome::Skipped => {
            config.println("Not a public release, nothing published");
        }
        PipelineOutcome::Completed {
            draft_tag,
            published_urls,
        } => {
            config.success_println(&format!(
                "Released {} from draft tag {}",
                release.version, draft_tag.name
            ));
            if config.is_verbose() {
                for url in &published_urls {
                    config.bullet(url);
                }
            }
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};
    use clap::Parser;

    #[test]
    fn test_release_config_from_args() {
        let args = Args::try_parse_from([
            "barque_release",
            "publish",
            "--release-version",
            "1.2.3",
            "--tag",
            "",
            "--revision",
            "abc",
            "--is-patch",
        ])
        .unwrap();
        let Command::Publish(publish) = args.command else {
            panic!("expected publish");
        };
        let config = release_config(&publish);
        assert_eq!(config.version, "1.2.3");
        assert_eq!(config.triggering_git_tag, None);
        assert!(config.is_patch);
        assert_eq!(config.package_name, "mongosh");
        assert!(config.validate().is_ok());
    }
}
