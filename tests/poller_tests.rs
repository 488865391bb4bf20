use async_trait::async_trait;
use barque_release::barque::{AvailabilityPoller, ExistenceCheck, HttpExistenceCheck};
use barque_release::error::AvailabilityError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Each URL answers `false` for a fixed number of checks, then `true`
struct ScriptedCheck {
    misses: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCheck {
    fn new(misses: &[(&str, usize)]) -> Self {
        Self {
            misses: Mutex::new(
                misses
                    .iter()
                    .map(|(url, n)| (url.to_string(), *n))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExistenceCheck for ScriptedCheck {
    async fn exists(&self, url: &str) -> bool {
        self.calls.lock().unwrap().push(url.to_string());
        let mut misses = self.misses.lock().unwrap();
        match misses.get_mut(url) {
            Some(0) | None => true,
            Some(n) => {
                *n -= 1;
                false
            }
        }
    }
}

fn urls(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_available_urls_are_not_checked_again() {
    let check = Arc::new(ScriptedCheck::new(&[("package1", 0), ("package2", 1), ("package3", 2)]));
    let poller = AvailabilityPoller::new(check.clone());

    poller
        .wait_until_available(
            &urls(&["package1", "package2", "package3"]),
            Duration::from_secs(300),
            Duration::from_secs(10),
        )
        .await
        .unwrap();

    assert_eq!(
        check.calls(),
        urls(&[
            "package1", "package2", "package3", // round 1
            "package2", "package3", // round 2
            "package3", // round 3
        ])
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_lists_remaining_packages() {
    let check = Arc::new(ScriptedCheck::new(&[("https://repo/package1.deb", usize::MAX)]));
    let poller = AvailabilityPoller::new(check.clone());

    let err = poller
        .wait_until_available(
            &urls(&["https://repo/package1.deb"]),
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

    let AvailabilityError::Timeout { remaining, .. } = &err;
    assert_eq!(remaining, &urls(&["https://repo/package1.deb"]));
    assert!(err.to_string().contains("package1.deb"));
    assert!(check.calls().len() >= 5);
}

#[tokio::test(start_paused = true)]
async fn test_at_least_one_round_runs() {
    let check = Arc::new(ScriptedCheck::new(&[]));
    let poller = AvailabilityPoller::new(check.clone());

    poller
        .wait_until_available(&urls(&["package1"]), Duration::ZERO, Duration::from_secs(10))
        .await
        .unwrap();

    assert_eq!(check.calls(), urls(&["package1"]));
}

#[tokio::test]
async fn test_empty_url_set_returns_immediately() {
    let check = Arc::new(ScriptedCheck::new(&[]));
    AvailabilityPoller::new(check.clone())
        .wait_until_available(&[], Duration::ZERO, Duration::from_secs(3600))
        .await
        .unwrap();
    assert!(check.calls().is_empty());
}

#[tokio::test]
async fn test_http_check_counts_only_200() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/present.deb"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/moved.deb"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let check = HttpExistenceCheck::default();
    assert!(check.exists(&format!("{}/present.deb", server.uri())).await);
    assert!(!check.exists(&format!("{}/moved.deb", server.uri())).await);
    assert!(!check.exists(&format!("{}/missing.deb", server.uri())).await);
    assert!(!check.exists("http://127.0.0.1:1/unreachable.deb").await);
}
