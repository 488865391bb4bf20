//! Published package URL derivation.
//!
//! Pure string templating: no network access. Each repository has its own
//! path shape under the repository base URL.

use super::repository::TargetRepository;
use crate::error::MappingError;

/// Truncate a full product version to its release branch (`5.0.1` -> `5.0`).
pub fn release_branch(version: &str) -> Result<String, MappingError> {
    let mut parts = version.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) if is_number(major) && is_number(minor) => {
            Ok(format!("{}.{}", major, minor))
        }
        _ => Err(MappingError::InvalidReleaseBranch {
            version: version.to_string(),
        }),
    }
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Path segment between the base URL and the edition
fn distribution_path(repository: TargetRepository) -> &'static str {
    match repository {
        TargetRepository::Ubuntu1804 => "apt/ubuntu/dists/bionic",
        TargetRepository::Ubuntu2004 => "apt/ubuntu/dists/focal",
        TargetRepository::Debian10 => "apt/debian/dists/buster",
        TargetRepository::Debian11 => "apt/debian/dists/bullseye",
        TargetRepository::Rhel70 => "yum/redhat/7",
        TargetRepository::Rhel80 => "yum/redhat/8",
        TargetRepository::Amazon2 => "yum/amazon/2",
    }
}

/// Compute the URL an artifact is served at once barque has propagated it.
///
/// `release_branch` is the `major.minor` line, see [`release_branch`].
pub fn compute_url(
    base_url: &str,
    edition: &str,
    repository: TargetRepository,
    arch_name: &str,
    release_branch: &str,
    filename: &str,
) -> String {
    let base = base_url.trim_end_matches('/');
    let root = distribution_path(repository);
    match repository {
        TargetRepository::Ubuntu1804 | TargetRepository::Ubuntu2004 => format!(
            "{base}/{root}/mongodb-{edition}/{release_branch}/multiverse/binary-{arch_name}/{filename}"
        ),
        TargetRepository::Debian10 | TargetRepository::Debian11 => format!(
            "{base}/{root}/mongodb-{edition}/{release_branch}/main/binary-{arch_name}/{filename}"
        ),
        TargetRepository::Rhel70 | TargetRepository::Rhel80 | TargetRepository::Amazon2 => {
            format!("{base}/{root}/mongodb-{edition}/{release_branch}/{arch_name}/RPMS/{filename}")
        }
    }
}

/// [`compute_url`] keyed by a repository id string.
///
/// Fails with [`MappingError::UnsupportedRepository`] for ids the template
/// table does not know.
pub fn compute_url_for_id(
    base_url: &str,
    edition: &str,
    repository_id: &str,
    arch_name: &str,
    release_branch: &str,
    filename: &str,
) -> Result<String, MappingError> {
    let repository: TargetRepository = repository_id.parse()?;
    Ok(compute_url(
        base_url,
        edition,
        repository,
        arch_name,
        release_branch,
        filename,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barque::repository::ALL_TARGET_REPOSITORIES;
    use std::collections::HashSet;

    const BASE: &str = "https://repo.mongodb.org";

    #[test]
    fn test_release_branch_truncates_to_major_minor() {
        assert_eq!(release_branch("5.0.1").ok().as_deref(), Some("5.0"));
        assert_eq!(release_branch("4.4.0").ok().as_deref(), Some("4.4"));
        assert_eq!(release_branch("10.12").ok().as_deref(), Some("10.12"));
        assert!(release_branch("5").is_err());
        assert!(release_branch("v5.0.1").is_err());
    }

    #[test]
    fn test_ubuntu_url() {
        assert_eq!(
            compute_url(
                BASE,
                "org",
                TargetRepository::Ubuntu2004,
                "arm64",
                "5.0",
                "mongodb-mongosh_1.0.0_arm64.deb"
            ),
            "https://repo.mongodb.org/apt/ubuntu/dists/focal/mongodb-org/5.0/multiverse/binary-arm64/mongodb-mongosh_1.0.0_arm64.deb"
        );
    }

    #[test]
    fn test_debian_url() {
        assert_eq!(
            compute_url(
                BASE,
                "org",
                TargetRepository::Debian10,
                "amd64",
                "4.4",
                "mongodb-mongosh_1.0.0_amd64.deb"
            ),
            "https://repo.mongodb.org/apt/debian/dists/buster/mongodb-org/4.4/main/binary-amd64/mongodb-mongosh_1.0.0_amd64.deb"
        );
    }

    #[test]
    fn test_yum_urls() {
        assert_eq!(
            compute_url(
                BASE,
                "org",
                TargetRepository::Rhel80,
                "x86_64",
                "4.4",
                "mongodb-mongosh-1.0.0.x86_64.rpm"
            ),
            "https://repo.mongodb.org/yum/redhat/8/mongodb-org/4.4/x86_64/RPMS/mongodb-mongosh-1.0.0.x86_64.rpm"
        );
        assert_eq!(
            compute_url(
                "https://repo.mongodb.org/",
                "org",
                TargetRepository::Amazon2,
                "aarch64",
                "5.0",
                "mongodb-mongosh-1.0.0.aarch64.rpm"
            ),
            "https://repo.mongodb.org/yum/amazon/2/mongodb-org/5.0/aarch64/RPMS/mongodb-mongosh-1.0.0.aarch64.rpm"
        );
    }

    #[test]
    fn test_repositories_never_collapse_to_same_url() {
        let urls: HashSet<String> = ALL_TARGET_REPOSITORIES
            .iter()
            .map(|repo| compute_url(BASE, "org", *repo, "x", "5.0", "pkg"))
            .collect();
        assert_eq!(urls.len(), ALL_TARGET_REPOSITORIES.len());
    }

    #[test]
    fn test_compute_url_is_deterministic() {
        let a = compute_url(BASE, "org", TargetRepository::Rhel70, "x86_64", "4.4", "a.rpm");
        let b = compute_url(BASE, "org", TargetRepository::Rhel70, "x86_64", "4.4", "a.rpm");
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_repository_id_is_rejected() {
        let err = compute_url_for_id(BASE, "org", "sles15", "x86_64", "4.4", "a.rpm");
        assert!(matches!(
            err,
            Err(MappingError::UnsupportedRepository { ref repository }) if repository == "sles15"
        ));
        assert!(compute_url_for_id(BASE, "org", "rhel70", "x86_64", "4.4", "a.rpm").is_ok());
    }
}
