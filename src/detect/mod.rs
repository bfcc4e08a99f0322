//! Compiler detection.
//!
//! For each compiler id applicable to the platform, a locator strategy
//! specific to that id finds installations, a bounded-timeout version
//! query validates each one, and the results are merged into an outcome
//! holding both accepted candidates and per-candidate rejections.
//! Detection of one id never aborts detection of others: failures are
//! collected, not raised. Independent ids are probed in parallel;
//! only the merge is sequential.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::compiler::{CompilerCandidate, CompilerId, CppStandard};
use crate::core::platform::{OsFamily, PlatformInfo};
use crate::errors::{DetectionError, OrchestrateError, ToolchainError};
use crate::util::config::OrchestratorConfig;
use crate::util::process::DEFAULT_PROBE_TIMEOUT;

pub mod cache;
mod emscripten;
mod gcc;
mod mingw;
mod msvc;
pub mod version;

pub use cache::{DetectionCache, ProbeResult};

/// Why a located or expected compiler was not accepted.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    /// Which compiler id was being probed
    pub id: CompilerId,
    /// The install that was rejected, when one was located
    pub location: Option<PathBuf>,
    /// Human-readable rejection reason
    pub reason: String,
}

/// The result of one detection pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionOutcome {
    /// Accepted candidates, platform-default id order then version
    /// descending within an id
    pub candidates: Vec<CompilerCandidate>,
    /// Everything that was tried and rejected, with reasons
    pub rejections: Vec<Rejection>,
}

/// Enumerates and validates installed compiler toolchains.
pub struct CompilerDetector<'a> {
    cache: &'a DetectionCache,
    config: &'a OrchestratorConfig,
    timeout: Duration,
}

impl<'a> CompilerDetector<'a> {
    /// Create a detector over an injected per-run cache.
    pub fn new(cache: &'a DetectionCache, config: &'a OrchestratorConfig) -> Self {
        CompilerDetector {
            cache,
            config,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Override the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Detect every compiler applicable to the platform.
    ///
    /// Never fails: a host with nothing installed yields an empty
    /// candidate list with one recorded rejection per attempt. When a
    /// compiler-path override is configured, the search is skipped and
    /// the override is validated instead.
    pub fn detect_all(
        &self,
        platform: &PlatformInfo,
        standard: CppStandard,
        targets_wasm: bool,
    ) -> DetectionOutcome {
        if let Some(cc) = &self.config.overrides.cc {
            return self.probe_override(cc, platform, standard);
        }

        let ids = CompilerId::applicable(platform, targets_wasm);

        // Probes are read-only and side-effect-free on shared state, so
        // ids run in parallel; the merge below is sequential.
        let probes: Vec<(CompilerId, ProbeResult)> = ids
            .par_iter()
            .map(|&id| (id, self.probe_id(platform, id)))
            .collect();

        let mut outcome = DetectionOutcome::default();
        for (id, probe) in probes {
            merge_probe(&mut outcome, id, probe, standard);
        }
        outcome
    }

    /// Detect installations of a single compiler id.
    pub fn detect_one(
        &self,
        platform: &PlatformInfo,
        id: CompilerId,
        standard: CppStandard,
    ) -> DetectionOutcome {
        let probe = self.probe_id(platform, id);
        let mut outcome = DetectionOutcome::default();
        merge_probe(&mut outcome, id, probe, standard);
        outcome
    }

    /// Pick the compiler to use from a detection outcome.
    ///
    /// An explicit request that cannot be satisfied is fatal, never
    /// substituted; auto-selection falls back through the platform
    /// default ordering.
    pub fn select(
        &self,
        platform: &PlatformInfo,
        outcome: &DetectionOutcome,
        requested: Option<CompilerId>,
    ) -> Result<CompilerCandidate, OrchestrateError> {
        match requested {
            Some(id) => {
                if let Some(candidate) = outcome.candidates.iter().find(|c| c.id == id) {
                    tracing::info!("using requested compiler {}", candidate);
                    return Ok(candidate.clone());
                }
                match outcome.rejections.iter().find(|r| r.id == id) {
                    Some(rejection) => Err(ToolchainError::RequestedCompilerRejected {
                        id,
                        reason: rejection.reason.clone(),
                    }
                    .into()),
                    None => Err(ToolchainError::RequestedCompilerMissing { id }.into()),
                }
            }
            None => match outcome.candidates.first() {
                Some(candidate) => {
                    tracing::info!("auto-selected compiler {}", candidate);
                    Ok(candidate.clone())
                }
                None => Err(DetectionError::NoViableCompiler {
                    platform: *platform,
                    attempted: outcome
                        .rejections
                        .iter()
                        .map(|r| (r.id, r.reason.clone()))
                        .collect(),
                }
                .into()),
            },
        }
    }

    /// Probe one id, consulting the per-run cache first.
    fn probe_id(&self, platform: &PlatformInfo, id: CompilerId) -> ProbeResult {
        let key = (platform.os_family, platform.arch, id);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("detection cache hit for {}", id);
            return hit;
        }
        let result = self.locate(id);
        self.cache.insert_if_absent(key, result)
    }

    /// Dispatch to the locator strategy for one compiler id.
    fn locate(&self, id: CompilerId) -> ProbeResult {
        match id {
            CompilerId::Msvc => msvc::locate_msvc(self.timeout),
            CompilerId::MsvcClang => msvc::locate_clang_cl(self.timeout),
            CompilerId::MingwGcc => mingw::locate(self.config, "gcc", self.timeout),
            CompilerId::MingwClang => mingw::locate(self.config, "clang", self.timeout),
            CompilerId::Gcc => gcc::locate("gcc", self.timeout),
            CompilerId::Clang => gcc::locate("clang", self.timeout),
            CompilerId::Emscripten => emscripten::locate(self.config, self.timeout),
        }
    }

    /// Validate an explicit compiler-path override instead of searching.
    fn probe_override(
        &self,
        cc: &Path,
        platform: &PlatformInfo,
        standard: CppStandard,
    ) -> DetectionOutcome {
        let id = guess_id(cc, platform);
        let mut outcome = DetectionOutcome::default();

        if !cc.exists() {
            outcome.rejections.push(Rejection {
                id,
                location: Some(cc.to_path_buf()),
                reason: format!("configured compiler `{}` does not exist", cc.display()),
            });
            return outcome;
        }

        match version::query_version(cc, self.timeout) {
            Ok((version, _)) => {
                let probe = ProbeResult {
                    installs: vec![(cc.to_path_buf(), version)],
                    failures: Vec::new(),
                };
                merge_probe(&mut outcome, id, probe, standard);
            }
            Err(e) => outcome.rejections.push(Rejection {
                id,
                location: Some(cc.to_path_buf()),
                reason: e.to_string(),
            }),
        }

        outcome
    }
}

/// Fold one id's probe result into the outcome, applying the
/// language-standard gate and version-descending ranking.
fn merge_probe(
    outcome: &mut DetectionOutcome,
    id: CompilerId,
    mut probe: ProbeResult,
    standard: CppStandard,
) {
    probe.installs.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, version) in probe.installs {
        if id.supports(&version, standard) {
            outcome
                .candidates
                .push(CompilerCandidate::new(id, path, version, standard));
        } else {
            outcome.rejections.push(Rejection {
                id,
                location: Some(path),
                reason: format!(
                    "version {} does not support {} (needs >= {})",
                    version,
                    standard,
                    id.minimum_version(standard)
                ),
            });
        }
    }

    for reason in probe.failures {
        outcome.rejections.push(Rejection {
            id,
            location: None,
            reason,
        });
    }
}

/// Guess the compiler id of an explicitly configured driver path.
fn guess_id(cc: &Path, platform: &PlatformInfo) -> CompilerId {
    let name = cc
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();
    let on_windows = platform.os_family == OsFamily::Windows;

    if name.contains("clang-cl") {
        CompilerId::MsvcClang
    } else if name == "cl" {
        CompilerId::Msvc
    } else if name.contains("emcc") {
        CompilerId::Emscripten
    } else if name.contains("clang") {
        if on_windows {
            CompilerId::MingwClang
        } else {
            CompilerId::Clang
        }
    } else if on_windows {
        CompilerId::MingwGcc
    } else {
        CompilerId::Gcc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn linux_x64() -> PlatformInfo {
        PlatformInfo {
            os_family: OsFamily::Linux,
            arch: crate::core::platform::Arch::X64,
            is_cross_target: false,
        }
    }

    fn outcome_with(installs: Vec<(CompilerId, &str, Version)>) -> DetectionOutcome {
        let mut outcome = DetectionOutcome::default();
        for (id, path, version) in installs {
            merge_probe(
                &mut outcome,
                id,
                ProbeResult {
                    installs: vec![(PathBuf::from(path), version)],
                    failures: vec![],
                },
                CppStandard::Cpp20,
            );
        }
        outcome
    }

    #[test]
    fn test_merge_ranks_versions_descending() {
        let mut outcome = DetectionOutcome::default();
        merge_probe(
            &mut outcome,
            CompilerId::Gcc,
            ProbeResult {
                installs: vec![
                    (PathBuf::from("/usr/bin/gcc-11"), Version::new(11, 4, 0)),
                    (PathBuf::from("/usr/bin/gcc-13"), Version::new(13, 2, 0)),
                ],
                failures: vec![],
            },
            CppStandard::Cpp20,
        );
        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.candidates[0].version, Version::new(13, 2, 0));
    }

    #[test]
    fn test_merge_rejects_below_minimum() {
        let mut outcome = DetectionOutcome::default();
        merge_probe(
            &mut outcome,
            CompilerId::Clang,
            ProbeResult {
                installs: vec![(PathBuf::from("/usr/bin/clang"), Version::new(14, 0, 6))],
                failures: vec![],
            },
            CppStandard::Cpp23,
        );
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.rejections.len(), 1);
        assert!(outcome.rejections[0].reason.contains("does not support C++23"));
    }

    #[test]
    fn test_explicit_request_for_rejected_compiler_is_fatal() {
        // Clang 14 installed, standard requires Clang >= 15: surfaced as
        // a version-mismatch error, no silent fallback to GCC.
        let cache = DetectionCache::new();
        let config = OrchestratorConfig::default();
        let detector = CompilerDetector::new(&cache, &config);

        let mut outcome = DetectionOutcome::default();
        merge_probe(
            &mut outcome,
            CompilerId::Clang,
            ProbeResult {
                installs: vec![(PathBuf::from("/usr/bin/clang"), Version::new(14, 0, 0))],
                failures: vec![],
            },
            CppStandard::Cpp23,
        );
        merge_probe(
            &mut outcome,
            CompilerId::Gcc,
            ProbeResult {
                installs: vec![(PathBuf::from("/usr/bin/gcc"), Version::new(13, 2, 0))],
                failures: vec![],
            },
            CppStandard::Cpp23,
        );

        let err = detector
            .select(&linux_x64(), &outcome, Some(CompilerId::Clang))
            .unwrap_err();
        match err {
            OrchestrateError::Toolchain(ToolchainError::RequestedCompilerRejected {
                id, ..
            }) => assert_eq!(id, CompilerId::Clang),
            other => panic!("expected RequestedCompilerRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_request_for_absent_compiler_is_fatal() {
        let cache = DetectionCache::new();
        let config = OrchestratorConfig::default();
        let detector = CompilerDetector::new(&cache, &config);
        let outcome = outcome_with(vec![(
            CompilerId::Gcc,
            "/usr/bin/gcc",
            Version::new(13, 2, 0),
        )]);

        let err = detector
            .select(&linux_x64(), &outcome, Some(CompilerId::Clang))
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestrateError::Toolchain(ToolchainError::RequestedCompilerMissing { .. })
        ));
    }

    #[test]
    fn test_auto_select_prefers_platform_default() {
        // Windows host with both MSVC 19.38 and MinGW-GCC 13.2: the
        // platform default (MSVC) wins.
        let cache = DetectionCache::new();
        let config = OrchestratorConfig::default();
        let detector = CompilerDetector::new(&cache, &config);

        let outcome = outcome_with(vec![
            (
                CompilerId::Msvc,
                "C:/VS/cl.exe",
                Version::new(19, 38, 33130),
            ),
            (
                CompilerId::MingwGcc,
                "C:/msys64/ucrt64/bin/gcc.exe",
                Version::new(13, 2, 0),
            ),
        ]);

        let windows = PlatformInfo {
            os_family: OsFamily::Windows,
            arch: crate::core::platform::Arch::X64,
            is_cross_target: false,
        };
        let selected = detector.select(&windows, &outcome, None).unwrap();
        assert_eq!(selected.id, CompilerId::Msvc);
        assert_eq!(selected.version, Version::new(19, 38, 33130));
    }

    #[test]
    fn test_auto_select_with_nothing_installed() {
        let cache = DetectionCache::new();
        let config = OrchestratorConfig::default();
        let detector = CompilerDetector::new(&cache, &config);
        let outcome = DetectionOutcome::default();

        let err = detector.select(&linux_x64(), &outcome, None).unwrap_err();
        assert!(matches!(
            err,
            OrchestrateError::Detection(DetectionError::NoViableCompiler { .. })
        ));
    }

    #[test]
    fn test_detect_all_is_idempotent_via_cache() {
        let cache = DetectionCache::new();
        let config = OrchestratorConfig::default();
        let detector = CompilerDetector::new(&cache, &config);
        let platform = linux_x64();

        let first = detector.detect_all(&platform, CppStandard::Cpp17, false);
        let second = detector.detect_all(&platform, CppStandard::Cpp17, false);
        assert_eq!(first.candidates, second.candidates);
        assert_eq!(first.rejections.len(), second.rejections.len());
    }

    #[test]
    fn test_override_skips_search_and_validates() {
        let cache = DetectionCache::new();
        let mut config = OrchestratorConfig::default();
        config.overrides.cc = Some(PathBuf::from("/nonexistent/custom-gcc"));
        let detector = CompilerDetector::new(&cache, &config);

        let outcome = detector.detect_all(&linux_x64(), CppStandard::Cpp17, false);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.rejections.len(), 1);
        assert!(outcome.rejections[0].reason.contains("does not exist"));
        // the override bypassed the locator search entirely
        assert!(cache.is_empty());
    }

    #[test]
    fn test_guess_id() {
        let linux = linux_x64();
        assert_eq!(guess_id(Path::new("/usr/bin/gcc-13"), &linux), CompilerId::Gcc);
        assert_eq!(guess_id(Path::new("/usr/bin/clang"), &linux), CompilerId::Clang);
        assert_eq!(guess_id(Path::new("/opt/emsdk/emcc"), &linux), CompilerId::Emscripten);

        let windows = PlatformInfo {
            os_family: OsFamily::Windows,
            arch: crate::core::platform::Arch::X64,
            is_cross_target: false,
        };
        assert_eq!(
            guess_id(Path::new("C:/VS/bin/cl.exe"), &windows),
            CompilerId::Msvc
        );
        assert_eq!(
            guess_id(Path::new("C:/VS/bin/clang-cl.exe"), &windows),
            CompilerId::MsvcClang
        );
    }
}
