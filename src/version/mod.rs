//! Release tags and the public-release decision.
//!
//! Release tags look like `v1.2.3`. Draft tags (`v1.2.3-draft.N`) pin the
//! artifacts that a later release tag promotes, see [`draft`].

mod draft;

pub use draft::{DraftTag, select_most_recent_draft_tag};

use crate::config::ReleaseConfig;
use regex::Regex;
use std::sync::LazyLock;

static RELEASE_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^v(\d+\.\d+\.\d+)$").ok());

/// Version of a plain release tag (`v1.2.3` -> `1.2.3`).
///
/// Returns `None` for draft tags and anything else.
pub fn release_version_from_tag(tag: &str) -> Option<String> {
    RELEASE_TAG
        .as_ref()?
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether this run should publish a public release.
///
/// A refusal is not an error; the pipeline then exits without side effects.
pub fn should_do_public_release(config: &ReleaseConfig) -> bool {
    if config.is_patch {
        log::info!("Skipping public release: this is a patch build");
        return false;
    }

    let Some(tag) = config.triggering_git_tag.as_deref() else {
        log::info!("Skipping public release: no triggering git tag");
        return false;
    };

    let Some(tag_version) = release_version_from_tag(tag) else {
        log::info!("Skipping public release: {} is not a release tag", tag);
        return false;
    };

    if tag_version != config.version {
        log::info!(
            "Skipping public release: tag {} does not match package version {}",
            tag,
            config.version
        );
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_config(tag: Option<&str>) -> ReleaseConfig {
        ReleaseConfig {
            version: "0.7.0".to_string(),
            triggering_git_tag: tag.map(String::from),
            revision: "sha".to_string(),
            ..ReleaseConfig::default()
        }
    }

    #[test]
    fn test_release_version_from_tag() {
        assert_eq!(release_version_from_tag("v0.7.0").as_deref(), Some("0.7.0"));
        assert_eq!(release_version_from_tag("v10.20.30").as_deref(), Some("10.20.30"));
        assert_eq!(release_version_from_tag("v0.7.0-draft.1"), None);
        assert_eq!(release_version_from_tag("0.7.0"), None);
        assert_eq!(release_version_from_tag(""), None);
    }

    #[test]
    fn test_public_release_for_matching_tag() {
        assert!(should_do_public_release(&release_config(Some("v0.7.0"))));
    }

    #[test]
    fn test_no_public_release_for_patch() {
        let config = ReleaseConfig {
            is_patch: true,
            ..release_config(Some("v0.7.0"))
        };
        assert!(!should_do_public_release(&config));
    }

    #[test]
    fn test_no_public_release_without_release_tag() {
        assert!(!should_do_public_release(&release_config(None)));
        assert!(!should_do_public_release(&release_config(Some("v0.7.0-draft.2"))));
        assert!(!should_do_public_release(&release_config(Some("v0.6.9"))));
    }
}
