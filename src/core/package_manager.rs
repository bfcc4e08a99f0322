//! Package-manager backend identities and candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dependency-management backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    /// Conan (conanfile.py / conanfile.txt)
    Conan,
    /// vcpkg (vcpkg.json manifest mode)
    Vcpkg,
    /// CPM.cmake (CMake-script package management)
    Cpm,
}

impl PackageManagerKind {
    /// Get the backend name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManagerKind::Conan => "conan",
            PackageManagerKind::Vcpkg => "vcpkg",
            PackageManagerKind::Cpm => "cpm",
        }
    }

    /// Parse a backend name.
    pub fn parse(s: &str) -> Option<PackageManagerKind> {
        match s {
            "conan" => Some(PackageManagerKind::Conan),
            "vcpkg" => Some(PackageManagerKind::Vcpkg),
            "cpm" => Some(PackageManagerKind::Cpm),
            _ => None,
        }
    }

    /// Fixed default priority order for resolution (first wins).
    pub fn default_order() -> [PackageManagerKind; 3] {
        [
            PackageManagerKind::Conan,
            PackageManagerKind::Vcpkg,
            PackageManagerKind::Cpm,
        ]
    }

    /// Priority rank within the default order (lower wins).
    pub fn priority_rank(&self) -> i32 {
        match self {
            PackageManagerKind::Conan => 0,
            PackageManagerKind::Vcpkg => 1,
            PackageManagerKind::Cpm => 2,
        }
    }

    /// Hint on how this backend is normally installed, for diagnostics.
    pub fn install_hint(&self) -> &'static str {
        match self {
            PackageManagerKind::Conan => "Install conan with `pip install conan`",
            PackageManagerKind::Vcpkg => {
                "Run `git clone https://github.com/microsoft/vcpkg` and bootstrap-vcpkg, then set VCPKG_ROOT"
            }
            PackageManagerKind::Cpm => {
                "Vendor CPM.cmake into cmake/CPM.cmake (https://github.com/cpm-cmake/CPM.cmake)"
            }
        }
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A probed package-manager backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManagerCandidate {
    /// Which backend this is
    pub kind: PackageManagerKind,
    /// Whether the backend's entry point and project manifest were found
    pub available: bool,
    /// Resolution priority (lower wins)
    pub priority_rank: i32,
    /// Whether the security verification gate passed
    pub verified_secure: bool,
}

impl PackageManagerCandidate {
    /// An available, verified candidate of the given kind.
    pub fn verified(kind: PackageManagerKind) -> Self {
        PackageManagerCandidate {
            kind,
            available: true,
            priority_rank: kind.priority_rank(),
            verified_secure: true,
        }
    }
}
