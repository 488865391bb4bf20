//! Propagation polling for published package URLs.

use crate::error::AvailabilityError;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Answers whether a URL is reachable yet.
///
/// Never fails: transport errors simply mean "not yet".
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    /// `true` once the URL is served
    async fn exists(&self, url: &str) -> bool;
}

/// HEAD request; only status 200 counts as available
#[derive(Debug, Clone, Default)]
pub struct HttpExistenceCheck {
    client: reqwest::Client,
}

impl HttpExistenceCheck {
    /// Create a check using `client`
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExistenceCheck for HttpExistenceCheck {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                log::debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Waits until a set of URLs is reachable
#[derive(Clone)]
pub struct AvailabilityPoller {
    check: Arc<dyn ExistenceCheck>,
}

impl AvailabilityPoller {
    /// Create a poller around an existence check
    pub fn new(check: Arc<dyn ExistenceCheck>) -> Self {
        Self { check }
    }

    /// Poll until every URL answers, or fail once `timeout` has elapsed.
    ///
    /// Each round sleeps `interval`, then checks all outstanding URLs
    /// concurrently. The deadline is only compared after a round, so at least
    /// one round always runs, even when `timeout` is shorter than `interval`.
    pub async fn wait_until_available(
        &self,
        urls: &[String],
        timeout: Duration,
        interval: Duration,
    ) -> Result<(), AvailabilityError> {
        let mut remaining: Vec<String> = urls.to_vec();
        let started = Instant::now();

        while !remaining.is_empty() {
            log::info!(
                "Waiting for {} package(s) to become available:\n - {}",
                remaining.len(),
                remaining.join("\n - ")
            );
            sleep(interval).await;

            let checks = remaining.iter().map(|url| self.check.exists(url));
            let available = join_all(checks).await;
            remaining = remaining
                .into_iter()
                .zip(available)
                .filter_map(|(url, ok)| (!ok).then_some(url))
                .collect();

            if !remaining.is_empty() && started.elapsed() > timeout {
                return Err(AvailabilityError::Timeout {
                    timeout_secs: timeout.as_secs(),
                    remaining,
                });
            }
        }

        log::info!("All {} package(s) are available", urls.len());
        Ok(())
    }
}
