//! Host platform identification.
//!
//! The platform probe never fails: hosts we cannot classify resolve to
//! tagged `Unknown` variants with a warning, so downstream components can
//! still report "no compiler found for unknown platform" cleanly.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// Microsoft Windows
    Windows,
    /// Linux
    Linux,
    /// Apple macOS
    Macos,
    /// WebAssembly (cross target only)
    Wasm,
    /// Unrecognized host OS
    Unknown,
}

impl OsFamily {
    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::Linux => "linux",
            OsFamily::Macos => "macos",
            OsFamily::Wasm => "wasm",
            OsFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit x86
    X86,
    /// 64-bit x86
    X64,
    /// 64-bit ARM
    Arm64,
    /// Unrecognized architecture
    Unknown,
}

impl Arch {
    /// Get the architecture name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
            Arch::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a build platform (host or cross target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Operating system family
    pub os_family: OsFamily,
    /// CPU architecture
    pub arch: Arch,
    /// Whether this describes a cross-compilation target rather than the host
    pub is_cross_target: bool,
}

static HOST: LazyLock<PlatformInfo> = LazyLock::new(probe_host);

impl PlatformInfo {
    /// Detect the host platform.
    ///
    /// Probed once per process and cached for the process lifetime.
    pub fn host() -> PlatformInfo {
        *HOST
    }

    /// Describe a cross-compilation target.
    pub fn cross_target(os_family: OsFamily, arch: Arch) -> PlatformInfo {
        PlatformInfo {
            os_family,
            arch,
            is_cross_target: true,
        }
    }

    /// Parse a `<os>-<arch>` target spec (e.g. `linux-arm64`, `wasm`).
    pub fn parse_target(s: &str) -> Option<PlatformInfo> {
        let (os_str, arch_str) = match s.split_once('-') {
            Some((os, arch)) => (os, Some(arch)),
            None => (s, None),
        };

        let os_family = match os_str {
            "windows" => OsFamily::Windows,
            "linux" => OsFamily::Linux,
            "macos" | "osx" | "darwin" => OsFamily::Macos,
            "wasm" | "wasm32" | "emscripten" => OsFamily::Wasm,
            _ => return None,
        };

        let arch = match arch_str {
            Some("x86") | Some("i686") => Arch::X86,
            Some("x64") | Some("x86_64") | Some("amd64") => Arch::X64,
            Some("arm64") | Some("aarch64") => Arch::Arm64,
            // wasm targets carry no meaningful CPU arch
            None if os_family == OsFamily::Wasm => Arch::X86,
            _ => return None,
        };

        Some(PlatformInfo::cross_target(os_family, arch))
    }

    /// Whether two platforms describe the same OS/architecture pair.
    pub fn same_target(&self, other: &PlatformInfo) -> bool {
        self.os_family == other.os_family && self.arch == other.arch
    }
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os_family, self.arch)
    }
}

fn probe_host() -> PlatformInfo {
    let os_family = match std::env::consts::OS {
        "windows" => OsFamily::Windows,
        "linux" => OsFamily::Linux,
        "macos" => OsFamily::Macos,
        other => {
            tracing::warn!("unrecognized host OS `{}`, detection will be limited", other);
            OsFamily::Unknown
        }
    };

    let arch = match std::env::consts::ARCH {
        "x86" => Arch::X86,
        "x86_64" => Arch::X64,
        "aarch64" => Arch::Arm64,
        other => {
            tracing::warn!(
                "unrecognized host architecture `{}`, detection will be limited",
                other
            );
            Arch::Unknown
        }
    };

    PlatformInfo {
        os_family,
        arch,
        is_cross_target: false,
    }
}
