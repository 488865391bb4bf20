//! Wait command implementation.

use crate::barque::{AvailabilityPoller, HttpExistenceCheck};
use crate::cli::RuntimeConfig;
use crate::cli::args::WaitArgs;
use crate::env_config::EnvConfig;
use crate::error::Result;
use crate::settings::PollSettings;
use std::sync::Arc;
use std::time::Duration;

/// Execute wait command
pub(super) async fn execute_wait(args: &WaitArgs, config: &RuntimeConfig) -> Result<i32> {
    let defaults = PollSettings::from_env(&EnvConfig::from_process());
    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout);
    let interval = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(defaults.interval);

    config.println(&format!(
        "⏳ Waiting for {} URL(s), timeout {}s, interval {}s",
        args.urls.len(),
        timeout.as_secs(),
        interval.as_secs()
    ));

    let poller = AvailabilityPoller::new(Arc::new(HttpExistenceCheck::default()));
    poller
        .wait_until_available(&args.urls, timeout, interval)
        .await?;

    config.success_println("All URLs are available");
    Ok(0)
}
