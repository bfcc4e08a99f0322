//! The orchestration pipeline.
//!
//! Probe the platform, detect and select a compiler, pick the cross
//! toolchain when a foreign target is requested, activate the terminal
//! environment, resolve the package manager, and assemble the result
//! into one validated [`BuildEnvironment`]. Each stage either succeeds
//! or fails with its own failure class; nothing is silently skipped.

use std::path::PathBuf;

use crate::activate::TerminalActivator;
use crate::core::build_env::BuildEnvironment;
use crate::core::compiler::{CompilerCandidate, CompilerId, CppStandard};
use crate::core::package_manager::PackageManagerKind;
use crate::core::platform::PlatformInfo;
use crate::cross::ToolchainSelector;
use crate::detect::{CompilerDetector, DetectionCache, Rejection};
use crate::errors::{OrchestrateError, ToolchainError};
use crate::resolver::PackageManagerResolver;
use crate::util::config::OrchestratorConfig;

/// What the caller wants orchestrated.
#[derive(Debug, Clone)]
pub struct OrchestrationRequest {
    /// Explicit compiler request; never substituted when it fails
    pub requested_compiler: Option<CompilerId>,
    /// Cross-compilation target, `None` for a native build
    pub target: Option<PlatformInfo>,
    /// Required C++ standard
    pub standard: CppStandard,
    /// Package-manager preference order from the command line
    pub package_manager_preferences: Vec<PackageManagerKind>,
    /// Project directory holding manifests and project config
    pub project_dir: PathBuf,
}

impl OrchestrationRequest {
    /// A native-build request for a project directory.
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        OrchestrationRequest {
            requested_compiler: None,
            target: None,
            standard: CppStandard::Cpp17,
            package_manager_preferences: Vec::new(),
            project_dir: project_dir.into(),
        }
    }
}

/// A successful orchestration: the environment plus everything that was
/// considered and rejected along the way.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrchestrationReport {
    /// The validated build environment
    pub environment: BuildEnvironment,
    /// Compiler installs that were located but not selected viable
    pub rejected_compilers: Vec<Rejection>,
    /// Package-manager backends that were probed and rejected
    pub rejected_package_managers: Vec<(PackageManagerKind, String)>,
}

/// Run the full pipeline for one request.
pub fn orchestrate(
    request: &OrchestrationRequest,
    config: &OrchestratorConfig,
) -> Result<OrchestrationReport, OrchestrateError> {
    let host = PlatformInfo::host();
    let target = request.target.unwrap_or(host);
    let targets_wasm = target.os_family == crate::core::platform::OsFamily::Wasm;
    tracing::info!("orchestrating for host {} (target {})", host, target);

    // One cache per run: probes within the run are deduplicated, state
    // never leaks across runs.
    let cache = DetectionCache::new();
    let detector = CompilerDetector::new(&cache, config);

    let requested = requested_compiler(request, config);
    let detection = detector.detect_all(&host, request.standard, targets_wasm);
    tracing::debug!(
        "detected {} candidate(s), {} rejection(s)",
        detection.candidates.len(),
        detection.rejections.len()
    );

    let selector = ToolchainSelector::new(&detector, config);
    let toolchain = selector.select(&host, &target, request.standard)?;

    let compiler: CompilerCandidate = match &toolchain {
        Some(descriptor) => {
            // The target dictates the cross compiler; a conflicting
            // explicit request is an error, not a substitution.
            if let Some(id) = requested {
                if id != descriptor.cross_compiler.id {
                    return Err(ToolchainError::RequestedCompilerRejected {
                        id,
                        reason: format!(
                            "target {} requires `{}`",
                            target, descriptor.cross_compiler.id
                        ),
                    }
                    .into());
                }
            }
            descriptor.cross_compiler.clone()
        }
        None => detector.select(&host, &detection, requested)?,
    };

    let activator = TerminalActivator::new(config);
    let activated_env_vars = activator.activate(&compiler, target.arch)?;

    let resolver = PackageManagerResolver::new(config);
    let resolution = resolver.resolve(&request.project_dir, &request.package_manager_preferences)?;

    let environment = BuildEnvironment {
        platform: host,
        compiler,
        toolchain,
        package_manager: resolution.selected,
        activated_env_vars,
    };
    environment.validate().map_err(OrchestrateError::Invariant)?;

    Ok(OrchestrationReport {
        environment,
        rejected_compilers: detection.rejections,
        rejected_package_managers: resolution.rejected,
    })
}

/// The explicit compiler request, CLI over config.
fn requested_compiler(
    request: &OrchestrationRequest,
    config: &OrchestratorConfig,
) -> Option<CompilerId> {
    if request.requested_compiler.is_some() {
        return request.requested_compiler;
    }
    config.overrides.compiler.as_deref().and_then(|name| {
        let parsed = CompilerId::parse(name);
        if parsed.is_none() {
            tracing::warn!("ignoring unknown compiler id `{}` in config", name);
        }
        parsed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{Arch, OsFamily};
    use crate::errors::EXIT_CROSS_TARGET;

    #[test]
    fn test_unsupported_cross_target_fails_with_cross_class() {
        let project = tempfile::tempdir().unwrap();
        let mut request = OrchestrationRequest::for_project(project.path());
        request.target = Some(PlatformInfo::cross_target(OsFamily::Macos, Arch::X86));

        let config = OrchestratorConfig::default();
        let err = orchestrate(&request, &config).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CROSS_TARGET);
    }

    #[test]
    fn test_wasm_target_failure_is_cross_class() {
        let project = tempfile::tempdir().unwrap();
        let mut request = OrchestrationRequest::for_project(project.path());
        request.target = PlatformInfo::parse_target("wasm");
        assert!(request.target.is_some());

        let config = OrchestratorConfig::default();
        // with no SDK installed the failure class is cross-target; a
        // host with emsdk proceeds further down the pipeline instead
        if let Err(e) = orchestrate(&request, &config) {
            if matches!(
                e,
                OrchestrateError::Toolchain(ToolchainError::CrossCompilerMissing { .. })
            ) {
                assert_eq!(e.exit_code(), EXIT_CROSS_TARGET);
            }
        }
    }

    #[test]
    fn test_cli_request_beats_config_request() {
        let project = tempfile::tempdir().unwrap();
        let mut request = OrchestrationRequest::for_project(project.path());
        request.requested_compiler = Some(CompilerId::Clang);

        let mut config = OrchestratorConfig::default();
        config.overrides.compiler = Some("gcc".to_string());

        assert_eq!(
            requested_compiler(&request, &config),
            Some(CompilerId::Clang)
        );
    }

    #[test]
    fn test_unknown_config_compiler_name_is_ignored() {
        let project = tempfile::tempdir().unwrap();
        let request = OrchestrationRequest::for_project(project.path());

        let mut config = OrchestratorConfig::default();
        config.overrides.compiler = Some("turbo-c".to_string());

        assert_eq!(requested_compiler(&request, &config), None);
    }
}
