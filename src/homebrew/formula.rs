//! Formula rewriting.

use crate::error::{PublishError, Result};
use regex::Regex;
use std::sync::LazyLock;

static URL_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#"url "([^"]+)""#).ok());
static SHA_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"sha256 "([^"]+)""#).ok());
static TARBALL_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"-(\d+\.\d+\.\d+)\.tgz$").ok());

fn homebrew_error(reason: impl Into<String>) -> PublishError {
    PublishError::Homebrew {
        reason: reason.into(),
    }
}

fn capture<'a>(pattern: &LazyLock<Option<Regex>>, text: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    let caps = pattern
        .as_ref()
        .and_then(|re| re.captures(text))
        .ok_or_else(|| homebrew_error(format!("Formula has no {} line", what)))?;
    match (caps.get(0), caps.get(1)) {
        (Some(whole), Some(value)) => Ok((whole.as_str(), value.as_str())),
        _ => Err(homebrew_error(format!("Formula has no {} line", what)).into()),
    }
}

fn tarball_version(url: &str) -> Option<semver::Version> {
    let caps = TARBALL_VERSION.as_ref()?.captures(url)?;
    semver::Version::parse(caps.get(1)?.as_str()).ok()
}

/// Point the formula at a new tarball.
///
/// Returns `None` when the formula already references `url` and `sha`.
/// Outside dry runs, moving to a version that is not newer than the current
/// one is an error.
pub fn generate_updated_formula(
    current: &str,
    version: &str,
    url: &str,
    sha: &str,
    dry_run: bool,
) -> Result<Option<String>> {
    let (url_line, current_url) = capture(&URL_LINE, current, "url")?;
    let (sha_line, current_sha) = capture(&SHA_LINE, current, "sha256")?;

    if current_url == url && current_sha == sha {
        return Ok(None);
    }

    if !dry_run {
        let new_version = semver::Version::parse(version).map_err(|e| {
            homebrew_error(format!("Invalid version {}: {}", version, e))
        })?;
        if let Some(current_version) = tarball_version(current_url)
            && new_version <= current_version
        {
            return Err(homebrew_error(format!(
                "Formula is already at {}, refusing to move to {}",
                current_version, new_version
            ))
            .into());
        }
    }

    Ok(Some(
        current
            .replacen(url_line, &format!("url \"{}\"", url), 1)
            .replacen(sha_line, &format!("sha256 \"{}\"", sha), 1),
    ))
}
