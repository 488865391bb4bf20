//! Download center JSON descriptor.

use crate::config::ReleaseConfig;
use crate::variant::{ALL_PACKAGE_VARIANTS, PackageFamily, PackageVariant};
use serde::{Deserialize, Serialize};

/// The whole descriptor served by the metadata endpoint.
///
/// Fields other than `versions` and `release_notes_link` are carried through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadCenterConfig {
    /// Published versions, newest first, at most one per major version
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
    /// Release notes of the latest release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes_link: Option<String>,
    /// Links and anything else the descriptor holds
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One version and its downloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Identifier, same as the version
    #[serde(rename = "_id")]
    pub id: String,
    /// Product version
    pub version: String,
    /// Downloads per platform
    pub platform: Vec<PlatformEntry>,
}

/// One download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// CPU architecture
    pub arch: String,
    /// Operating system / packaging family
    pub os: String,
    /// Display name
    pub name: String,
    /// Public download URL
    pub download_link: String,
}

fn os_name(variant: PackageVariant) -> &'static str {
    match variant.family() {
        PackageFamily::Debian => "debian",
        PackageFamily::Rhel => "rhel",
        PackageFamily::Linux => "linux",
        PackageFamily::Darwin => "darwin",
        PackageFamily::Windows => "win32",
        PackageFamily::WindowsMsi => "win32msi",
    }
}

/// Entry advertising every variant of `config.version` under `download_base`
pub fn build_version_entry(download_base: &str, config: &ReleaseConfig) -> VersionEntry {
    let base = download_base.trim_end_matches('/');
    let version = &config.version;
    let platform = ALL_PACKAGE_VARIANTS
        .iter()
        .map(|variant| PlatformEntry {
            arch: variant.arch().canonical_name().to_string(),
            os: os_name(*variant).to_string(),
            name: variant.description().to_string(),
            download_link: format!("{}/{}", base, config.artifact_file_name(*variant, version)),
        })
        .collect();

    VersionEntry {
        id: version.to_string(),
        version: version.to_string(),
        platform,
    }
}

/// Descriptor used when the endpoint has none yet
pub fn initial_config() -> DownloadCenterConfig {
    let mut extra = serde_json::Map::new();
    extra.insert(
        "manual_link".to_string(),
        "https://docs.mongodb.org/manual/products/mongosh".into(),
    );
    for link in [
        "previous_releases_link",
        "development_releases_link",
        "supported_browsers_link",
    ] {
        extra.insert(link.to_string(), "".into());
    }
    DownloadCenterConfig {
        versions: Vec::new(),
        release_notes_link: None,
        extra,
    }
}

fn major(version: &str) -> Option<u64> {
    semver::Version::parse(version).ok().map(|v| v.major)
}

/// Insert `entry` in place of the entry sharing its major version, newest
/// first, and point the release notes at `release_notes_link`.
///
/// Entries whose version does not parse never match and sort last.
pub fn merge_version(
    mut config: DownloadCenterConfig,
    entry: VersionEntry,
    release_notes_link: impl Into<String>,
) -> DownloadCenterConfig {
    let entry_major = major(&entry.version);
    let same_major = config
        .versions
        .iter()
        .position(|existing| entry_major.is_some() && major(&existing.version) == entry_major);
    match same_major {
        Some(index) => config.versions[index] = entry,
        None => config.versions.push(entry),
    }

    config.versions.sort_by(|a, b| {
        let a = semver::Version::parse(&a.version).ok();
        let b = semver::Version::parse(&b.version).ok();
        match (a, b) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
    config.release_notes_link = Some(release_notes_link.into());
    config
}
