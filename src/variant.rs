//! Build variants produced by the packaging step.
//!
//! A [`PackageVariant`] names one artifact: an OS/packaging family combined
//! with a CPU architecture. The set is closed; [`ALL_PACKAGE_VARIANTS`] lists
//! them in the order the release pipeline distributes them.

use crate::error::MappingError;
use std::fmt;
use std::str::FromStr;

/// Canonical CPU architecture of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86
    X64,
    /// 64-bit ARM
    Arm64,
    /// Little-endian POWER
    Ppc64le,
    /// IBM Z
    S390x,
}

impl Arch {
    /// Name used in generic tarball and zip file names
    pub fn canonical_name(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
            Arch::Ppc64le => "ppc64le",
            Arch::S390x => "s390x",
        }
    }

    /// Name Debian-style repositories and `.deb` files use
    pub fn debian_name(self) -> &'static str {
        match self {
            Arch::X64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::Ppc64le => "ppc64el",
            Arch::S390x => "s390x",
        }
    }

    /// Name RPM-style repositories and `.rpm` files use
    pub fn rpm_name(self) -> &'static str {
        match self {
            Arch::X64 => "x86_64",
            Arch::Arm64 => "aarch64",
            Arch::Ppc64le => "ppc64le",
            Arch::S390x => "s390x",
        }
    }
}

impl FromStr for Arch {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            "ppc64le" | "ppc64el" => Ok(Arch::Ppc64le),
            "s390x" => Ok(Arch::S390x),
            other => Err(MappingError::UnknownArchitecture {
                arch: other.to_string(),
            }),
        }
    }
}

/// Packaging family of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageFamily {
    /// `.deb` packages for Debian and Ubuntu
    Debian,
    /// `.rpm` packages for RHEL, Amazon Linux and friends
    Rhel,
    /// Plain `.tgz` for any Linux
    Linux,
    /// macOS `.zip`
    Darwin,
    /// Windows `.zip`
    Windows,
    /// Windows installer
    WindowsMsi,
}

/// One packaged build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageVariant {
    /// Debian/Ubuntu `.deb`, x64
    DebianX64,
    /// Debian/Ubuntu `.deb`, arm64
    DebianArm64,
    /// RPM, x64
    RhelX64,
    /// RPM, arm64
    RhelArm64,
    /// RPM, ppc64le
    RhelPpc64le,
    /// RPM, s390x
    RhelS390x,
    /// Generic Linux tarball, x64
    LinuxX64,
    /// Generic Linux tarball, arm64
    LinuxArm64,
    /// macOS, Intel
    DarwinX64,
    /// macOS, Apple silicon
    DarwinArm64,
    /// Windows zip
    Win32X64,
    /// Windows MSI installer
    Win32MsiX64,
}

/// Every variant, in distribution order
pub const ALL_PACKAGE_VARIANTS: [PackageVariant; 12] = [
    PackageVariant::LinuxX64,
    PackageVariant::LinuxArm64,
    PackageVariant::DebianX64,
    PackageVariant::DebianArm64,
    PackageVariant::RhelX64,
    PackageVariant::RhelArm64,
    PackageVariant::RhelPpc64le,
    PackageVariant::RhelS390x,
    PackageVariant::DarwinX64,
    PackageVariant::DarwinArm64,
    PackageVariant::Win32X64,
    PackageVariant::Win32MsiX64,
];

impl PackageVariant {
    /// Packaging family
    pub fn family(self) -> PackageFamily {
        match self {
            PackageVariant::DebianX64 | PackageVariant::DebianArm64 => PackageFamily::Debian,
            PackageVariant::RhelX64
            | PackageVariant::RhelArm64
            | PackageVariant::RhelPpc64le
            | PackageVariant::RhelS390x => PackageFamily::Rhel,
            PackageVariant::LinuxX64 | PackageVariant::LinuxArm64 => PackageFamily::Linux,
            PackageVariant::DarwinX64 | PackageVariant::DarwinArm64 => PackageFamily::Darwin,
            PackageVariant::Win32X64 => PackageFamily::Windows,
            PackageVariant::Win32MsiX64 => PackageFamily::WindowsMsi,
        }
    }

    /// CPU architecture
    pub fn arch(self) -> Arch {
        match self {
            PackageVariant::DebianX64
            | PackageVariant::RhelX64
            | PackageVariant::LinuxX64
            | PackageVariant::DarwinX64
            | PackageVariant::Win32X64
            | PackageVariant::Win32MsiX64 => Arch::X64,
            PackageVariant::DebianArm64
            | PackageVariant::RhelArm64
            | PackageVariant::LinuxArm64
            | PackageVariant::DarwinArm64 => Arch::Arm64,
            PackageVariant::RhelPpc64le => Arch::Ppc64le,
            PackageVariant::RhelS390x => Arch::S390x,
        }
    }

    /// Stable identifier, e.g. `debian-x64`
    pub fn as_str(self) -> &'static str {
        match self {
            PackageVariant::DebianX64 => "debian-x64",
            PackageVariant::DebianArm64 => "debian-arm64",
            PackageVariant::RhelX64 => "rhel-x64",
            PackageVariant::RhelArm64 => "rhel-arm64",
            PackageVariant::RhelPpc64le => "rhel-ppc64le",
            PackageVariant::RhelS390x => "rhel-s390x",
            PackageVariant::LinuxX64 => "linux-x64",
            PackageVariant::LinuxArm64 => "linux-arm64",
            PackageVariant::DarwinX64 => "darwin-x64",
            PackageVariant::DarwinArm64 => "darwin-arm64",
            PackageVariant::Win32X64 => "win32-x64",
            PackageVariant::Win32MsiX64 => "win32msi-x64",
        }
    }

    /// Human readable description for the download center
    pub fn description(self) -> &'static str {
        match self {
            PackageVariant::DebianX64 => "Debian (10+) / Ubuntu (18.04+) x64",
            PackageVariant::DebianArm64 => "Debian (10+) / Ubuntu (18.04+) arm64",
            PackageVariant::RhelX64 => "RHEL / CentOS (7+) x64",
            PackageVariant::RhelArm64 => "RHEL / CentOS (8+) arm64",
            PackageVariant::RhelPpc64le => "RHEL / CentOS (8+) ppc64le",
            PackageVariant::RhelS390x => "RHEL / CentOS (8+) s390x",
            PackageVariant::LinuxX64 => "Linux x64",
            PackageVariant::LinuxArm64 => "Linux arm64",
            PackageVariant::DarwinX64 => "MacOS x64 (11.0+)",
            PackageVariant::DarwinArm64 => "MacOS M1 (11.0+)",
            PackageVariant::Win32X64 => "Windows x64 (10+)",
            PackageVariant::Win32MsiX64 => "Windows x64 (10+) installer",
        }
    }

    /// File name of this variant's package for a given product version.
    pub fn package_file_name(self, package_name: &str, version: &str) -> String {
        let arch = self.arch();
        match self.family() {
            PackageFamily::Debian => {
                format!("{}_{}_{}.deb", package_name, version, arch.debian_name())
            }
            PackageFamily::Rhel => {
                format!("{}-{}.{}.rpm", package_name, version, arch.rpm_name())
            }
            PackageFamily::Linux => format!(
                "{}-{}-linux-{}.tgz",
                package_name,
                version,
                arch.canonical_name()
            ),
            PackageFamily::Darwin => format!(
                "{}-{}-darwin-{}.zip",
                package_name,
                version,
                arch.canonical_name()
            ),
            PackageFamily::Windows => format!("{}-{}-win32-x64.zip", package_name, version),
            PackageFamily::WindowsMsi => format!("{}-{}-x64.msi", package_name, version),
        }
    }
}

impl fmt::Display for PackageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageVariant {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PACKAGE_VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| MappingError::UnknownVariant {
                variant: s.to_string(),
            })
    }
}
