//! The assembled build environment, the sole artifact handed to the
//! external build executor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::compiler::CompilerCandidate;
use super::package_manager::PackageManagerCandidate;
use super::platform::PlatformInfo;
use super::toolchain::ToolchainDescriptor;

/// One consistent, immutable description of how to build on this host.
///
/// Invariants (checked by [`BuildEnvironment::validate`]):
/// - exactly one compiler is selected
/// - a toolchain descriptor is present iff the target differs from the host
/// - the package manager passed the security verification gate
/// - the activated variable map is complete, never partially populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironment {
    /// The host platform
    pub platform: PlatformInfo,
    /// The selected compiler
    pub compiler: CompilerCandidate,
    /// Cross-compilation descriptor, present only when target != host
    pub toolchain: Option<ToolchainDescriptor>,
    /// The resolved package-manager backend
    pub package_manager: PackageManagerCandidate,
    /// Environment variables required to invoke the compiler.
    ///
    /// A `BTreeMap` so identical inputs serialize byte-identically.
    pub activated_env_vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Check the aggregate invariants, returning the first violation.
    pub fn validate(&self) -> Result<(), String> {
        match &self.toolchain {
            Some(tc) if tc.target_platform.same_target(&self.platform) => {
                return Err("toolchain descriptor present for a native build".to_string());
            }
            Some(tc) if !tc.target_platform.is_cross_target => {
                return Err("toolchain target is not flagged as a cross target".to_string());
            }
            _ => {}
        }

        if !self.package_manager.verified_secure {
            return Err(format!(
                "package manager `{}` was not security-verified",
                self.package_manager.kind
            ));
        }

        if !self.package_manager.available {
            return Err(format!(
                "package manager `{}` is not available",
                self.package_manager.kind
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compiler::{CompilerCandidate, CompilerId, CppStandard};
    use crate::core::package_manager::{PackageManagerCandidate, PackageManagerKind};
    use crate::core::platform::{Arch, OsFamily, PlatformInfo};
    use crate::core::toolchain::ToolchainDescriptor;
    use semver::Version;
    use std::path::PathBuf;

    fn sample_env(toolchain: Option<ToolchainDescriptor>) -> BuildEnvironment {
        let platform = PlatformInfo {
            os_family: OsFamily::Linux,
            arch: Arch::X64,
            is_cross_target: false,
        };
        BuildEnvironment {
            platform,
            compiler: CompilerCandidate::new(
                CompilerId::Gcc,
                PathBuf::from("/usr/bin/gcc"),
                Version::new(13, 2, 0),
                CppStandard::Cpp20,
            ),
            toolchain,
            package_manager: PackageManagerCandidate::verified(PackageManagerKind::Conan),
            activated_env_vars: BTreeMap::new(),
        }
    }

    #[test]
    fn test_native_env_validates() {
        assert!(sample_env(None).validate().is_ok());
    }

    #[test]
    fn test_toolchain_for_native_target_is_rejected() {
        let mut env = sample_env(None);
        let same = PlatformInfo::cross_target(OsFamily::Linux, Arch::X64);
        env.toolchain = Some(ToolchainDescriptor {
            target_platform: same,
            sysroot: None,
            toolchain_file: PathBuf::from("cmake/toolchains/linux-x64.cmake"),
            cross_compiler: env.compiler.clone(),
        });
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_unverified_package_manager_is_rejected() {
        let mut env = sample_env(None);
        env.package_manager.verified_secure = false;
        assert!(env.validate().is_err());
    }
}
