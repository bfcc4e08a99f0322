//! Cross-compilation toolchain selection.
//!
//! For a target platform that differs from the host, pick the cross
//! compiler the target requires, validate it, and describe the
//! toolchain (sysroot, toolchain-file identity) the build executor
//! needs. Native builds need none of this and get `None`.

use std::path::PathBuf;
use std::time::Duration;

use semver::Version;

use crate::core::compiler::{CompilerCandidate, CompilerId, CppStandard};
use crate::core::platform::{Arch, OsFamily, PlatformInfo};
use crate::core::toolchain::ToolchainDescriptor;
use crate::detect::CompilerDetector;
use crate::errors::{OrchestrateError, ToolchainError};
use crate::util::config::OrchestratorConfig;
use crate::util::process::{find_executable, DEFAULT_PROBE_TIMEOUT};

/// Target-triple prefix for Linux arm64 cross drivers.
const LINUX_ARM64_PREFIX: &str = "aarch64-linux-gnu-";

/// Picks and validates the cross toolchain for a target platform.
pub struct ToolchainSelector<'a> {
    detector: &'a CompilerDetector<'a>,
    config: &'a OrchestratorConfig,
    timeout: Duration,
}

impl<'a> ToolchainSelector<'a> {
    pub fn new(detector: &'a CompilerDetector<'a>, config: &'a OrchestratorConfig) -> Self {
        ToolchainSelector {
            detector,
            config,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Select the toolchain for a target.
    ///
    /// Returns `Ok(None)` when the target matches the host (native
    /// build). Unsupported targets and missing cross compilers are
    /// fatal with their own failure class.
    pub fn select(
        &self,
        host: &PlatformInfo,
        target: &PlatformInfo,
        standard: CppStandard,
    ) -> Result<Option<ToolchainDescriptor>, OrchestrateError> {
        if host.same_target(target) {
            return Ok(None);
        }

        let cross_compiler = match (target.os_family, target.arch) {
            (OsFamily::Wasm, _) => self.select_emscripten(host, target, standard)?,
            (OsFamily::Linux, Arch::Arm64) => self.select_linux_arm64(target, standard)?,
            (OsFamily::Windows, Arch::Arm64) if host.os_family == OsFamily::Windows => {
                self.select_windows_arm64(host, target, standard)?
            }
            _ => {
                return Err(ToolchainError::UnsupportedTarget {
                    target: target.to_string(),
                }
                .into());
            }
        };

        tracing::info!("cross toolchain for {}: {}", target, cross_compiler);

        Ok(Some(ToolchainDescriptor {
            target_platform: *target,
            sysroot: self.config.roots.sysroot.clone(),
            toolchain_file: toolchain_file_path(target),
            cross_compiler,
        }))
    }

    /// wasm builds use emcc regardless of the host.
    fn select_emscripten(
        &self,
        host: &PlatformInfo,
        target: &PlatformInfo,
        standard: CppStandard,
    ) -> Result<CompilerCandidate, OrchestrateError> {
        let outcome = self
            .detector
            .detect_one(host, CompilerId::Emscripten, standard);

        outcome.candidates.into_iter().next().ok_or_else(|| {
            ToolchainError::CrossCompilerMissing {
                target: *target,
                id: CompilerId::Emscripten,
            }
            .into()
        })
    }

    /// Linux arm64 uses prefixed GNU cross drivers, GCC preferred.
    fn select_linux_arm64(
        &self,
        target: &PlatformInfo,
        standard: CppStandard,
    ) -> Result<CompilerCandidate, OrchestrateError> {
        for (id, base) in [(CompilerId::Gcc, "gcc"), (CompilerId::Clang, "clang")] {
            let driver = format!("{LINUX_ARM64_PREFIX}{base}");
            let Some(path) = find_executable(&driver) else {
                continue;
            };
            match crate::detect::version::query_version(&path, self.timeout) {
                Ok((version, _)) => {
                    let candidate = validated_candidate(id, path, version, standard)?;
                    return Ok(candidate);
                }
                Err(e) => {
                    tracing::warn!("cross driver {} failed validation: {}", driver, e);
                }
            }
        }

        Err(ToolchainError::CrossCompilerMissing {
            target: *target,
            id: CompilerId::Gcc,
        }
        .into())
    }

    /// Windows arm64 cross-compiles with the host MSVC toolset.
    fn select_windows_arm64(
        &self,
        host: &PlatformInfo,
        target: &PlatformInfo,
        standard: CppStandard,
    ) -> Result<CompilerCandidate, OrchestrateError> {
        let outcome = self.detector.detect_one(host, CompilerId::Msvc, standard);

        outcome.candidates.into_iter().next().ok_or_else(|| {
            ToolchainError::CrossCompilerMissing {
                target: *target,
                id: CompilerId::Msvc,
            }
            .into()
        })
    }
}

/// A cross compiler below the standard's minimum is fatal; there is no
/// fallback pool of cross drivers to substitute from.
fn validated_candidate(
    id: CompilerId,
    path: PathBuf,
    version: Version,
    standard: CppStandard,
) -> Result<CompilerCandidate, OrchestrateError> {
    let candidate = CompilerCandidate::new(id, path, version.clone(), standard);
    if !candidate.supports_required_standard {
        return Err(ToolchainError::StandardNotSupported {
            id,
            version,
            standard,
        }
        .into());
    }
    Ok(candidate)
}

/// Conventional location of the CMake toolchain file for a target.
pub fn toolchain_file_path(target: &PlatformInfo) -> PathBuf {
    PathBuf::from("cmake")
        .join("toolchains")
        .join(format!("{}.cmake", ToolchainDescriptor::file_identity(target)))
}
