//! Variant to package repository mapping.
//!
//! The repository list here must match `config/repo-config.yml`, which the
//! curator reads on the barque side. Nothing checks that at runtime; the
//! `repo_config_lists_every_repository` test does.

use crate::error::MappingError;
use crate::variant::{Arch, PackageFamily, PackageVariant};
use std::fmt;
use std::str::FromStr;

/// Package manager family a repository is served through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// apt (`.deb`)
    Apt,
    /// yum (`.rpm`)
    Yum,
}

/// A downstream Linux package repository (a "PPA") barque publishes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetRepository {
    /// Ubuntu 18.04 (bionic)
    Ubuntu1804,
    /// Ubuntu 20.04 (focal)
    Ubuntu2004,
    /// Debian 10 (buster)
    Debian10,
    /// Debian 11 (bullseye)
    Debian11,
    /// RHEL / CentOS 7
    Rhel70,
    /// RHEL / CentOS 8
    Rhel80,
    /// Amazon Linux 2
    Amazon2,
}

/// Every repository, in the order the curator config lists them
pub const ALL_TARGET_REPOSITORIES: [TargetRepository; 7] = [
    TargetRepository::Ubuntu1804,
    TargetRepository::Ubuntu2004,
    TargetRepository::Debian10,
    TargetRepository::Debian11,
    TargetRepository::Rhel70,
    TargetRepository::Rhel80,
    TargetRepository::Amazon2,
];

impl TargetRepository {
    /// Identifier barque and the curator config use
    pub fn id(self) -> &'static str {
        match self {
            TargetRepository::Ubuntu1804 => "ubuntu1804",
            TargetRepository::Ubuntu2004 => "ubuntu2004",
            TargetRepository::Debian10 => "debian10",
            TargetRepository::Debian11 => "debian11",
            TargetRepository::Rhel70 => "rhel70",
            TargetRepository::Rhel80 => "rhel80",
            TargetRepository::Amazon2 => "amazon2",
        }
    }

    /// Package manager family
    pub fn kind(self) -> RepositoryKind {
        match self {
            TargetRepository::Ubuntu1804
            | TargetRepository::Ubuntu2004
            | TargetRepository::Debian10
            | TargetRepository::Debian11 => RepositoryKind::Apt,
            TargetRepository::Rhel70 | TargetRepository::Rhel80 | TargetRepository::Amazon2 => {
                RepositoryKind::Yum
            }
        }
    }

    /// CPU architectures the repository carries packages for.
    pub fn supported_archs(self) -> &'static [Arch] {
        match self {
            TargetRepository::Ubuntu1804
            | TargetRepository::Ubuntu2004
            | TargetRepository::Debian11 => &[Arch::X64, Arch::Arm64],
            TargetRepository::Debian10 => &[Arch::X64],
            TargetRepository::Rhel70 => &[Arch::X64],
            TargetRepository::Rhel80 => &[Arch::X64, Arch::Arm64, Arch::Ppc64le, Arch::S390x],
            TargetRepository::Amazon2 => &[Arch::X64, Arch::Arm64],
        }
    }

    /// Architecture token this repository expects
    pub fn arch_name(self, arch: Arch) -> &'static str {
        match self.kind() {
            RepositoryKind::Apt => arch.debian_name(),
            RepositoryKind::Yum => arch.rpm_name(),
        }
    }

    fn serves(self, arch: Arch) -> bool {
        self.supported_archs().contains(&arch)
    }
}

impl fmt::Display for TargetRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TargetRepository {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TARGET_REPOSITORIES
            .iter()
            .copied()
            .find(|repo| repo.id() == s)
            .ok_or_else(|| MappingError::UnsupportedRepository {
                repository: s.to_string(),
            })
    }
}

/// Repositories a variant is distributed to, plus the arch token they expect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTargets {
    /// Target repositories, possibly empty
    pub repositories: Vec<TargetRepository>,
    /// Repository-specific architecture name, empty when there are no repositories
    pub arch_name: String,
}

impl RepositoryTargets {
    fn none() -> Self {
        Self {
            repositories: Vec::new(),
            arch_name: String::new(),
        }
    }
}

/// Resolve the repositories a variant is published to.
///
/// Tarballs, macOS and Windows builds are not distributed through barque and
/// resolve to an empty list. Repositories that do not carry the variant's
/// CPU architecture are left out.
pub fn resolve(variant: PackageVariant) -> RepositoryTargets {
    let kind = match variant.family() {
        PackageFamily::Debian => RepositoryKind::Apt,
        PackageFamily::Rhel => RepositoryKind::Yum,
        PackageFamily::Linux
        | PackageFamily::Darwin
        | PackageFamily::Windows
        | PackageFamily::WindowsMsi => return RepositoryTargets::none(),
    };

    let arch = variant.arch();
    let repositories: Vec<TargetRepository> = ALL_TARGET_REPOSITORIES
        .iter()
        .copied()
        .filter(|repo| repo.kind() == kind && repo.serves(arch))
        .collect();

    if repositories.is_empty() {
        return RepositoryTargets::none();
    }

    let arch_name = match kind {
        RepositoryKind::Apt => arch.debian_name(),
        RepositoryKind::Yum => arch.rpm_name(),
    };

    RepositoryTargets {
        repositories,
        arch_name: arch_name.to_string(),
    }
}

/// Resolve by variant name, failing for names outside the enumeration
pub fn resolve_by_name(variant: &str) -> Result<RepositoryTargets, MappingError> {
    Ok(resolve(variant.parse()?))
}
