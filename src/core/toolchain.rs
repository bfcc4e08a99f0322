//! Cross-compilation toolchain descriptors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::compiler::CompilerCandidate;
use super::platform::PlatformInfo;

/// Everything the build executor needs to cross-compile for a target.
///
/// Present in a [`crate::BuildEnvironment`] iff the target platform
/// differs from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainDescriptor {
    /// The platform being targeted
    pub target_platform: PlatformInfo,
    /// Target sysroot, when one is configured
    pub sysroot: Option<PathBuf>,
    /// CMake toolchain file identity for this target
    pub toolchain_file: PathBuf,
    /// The validated cross compiler
    pub cross_compiler: CompilerCandidate,
}

impl ToolchainDescriptor {
    /// Conventional toolchain-file name for a target (e.g. `linux-arm64`).
    pub fn file_identity(target: &PlatformInfo) -> String {
        use crate::core::platform::OsFamily;
        match target.os_family {
            // wasm toolchain files do not vary by architecture
            OsFamily::Wasm => "wasm".to_string(),
            _ => format!("{}-{}", target.os_family, target.arch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{Arch, OsFamily, PlatformInfo};

    #[test]
    fn test_file_identity() {
        let arm = PlatformInfo::cross_target(OsFamily::Linux, Arch::Arm64);
        assert_eq!(ToolchainDescriptor::file_identity(&arm), "linux-arm64");

        let wasm = PlatformInfo::cross_target(OsFamily::Wasm, Arch::X86);
        assert_eq!(ToolchainDescriptor::file_identity(&wasm), "wasm");
    }
}
