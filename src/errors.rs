//! Error taxonomy and the exit-code contract surfaced to the CLI layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::compiler::{CompilerId, CppStandard, TerminalStrategy};
use crate::core::package_manager::PackageManagerKind;
use crate::core::platform::PlatformInfo;
use crate::util::diagnostic::Diagnostic;

/// Exit code for unclassified failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when no viable compiler/toolchain exists.
pub const EXIT_COMPILER_NOT_FOUND: i32 = 2;
/// Exit code when package-manager resolution fails.
pub const EXIT_PACKAGE_MANAGER: i32 = 3;
/// Exit code for cross-compilation target failures.
pub const EXIT_CROSS_TARGET: i32 = 4;
/// Exit code when terminal environment activation fails.
pub const EXIT_ACTIVATION: i32 = 5;

/// Top-level orchestration error.
#[derive(Debug, Error)]
pub enum OrchestrateError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Activation(#[from] EnvironmentActivationError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    PackageManager(#[from] PackageManagerError),

    #[error("assembled environment is inconsistent: {0}")]
    Invariant(String),
}

impl OrchestrateError {
    /// Map this error to the documented exit-code contract, so callers
    /// can branch on failure class without parsing text.
    pub fn exit_code(&self) -> i32 {
        match self {
            OrchestrateError::Detection(_) => EXIT_COMPILER_NOT_FOUND,
            OrchestrateError::Activation(_) => EXIT_ACTIVATION,
            OrchestrateError::Toolchain(e) => e.exit_code(),
            OrchestrateError::PackageManager(_) => EXIT_PACKAGE_MANAGER,
            OrchestrateError::Invariant(_) => EXIT_FAILURE,
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            OrchestrateError::Detection(e) => e.to_diagnostic(),
            OrchestrateError::Activation(e) => e.to_diagnostic(),
            OrchestrateError::Toolchain(e) => e.to_diagnostic(),
            OrchestrateError::PackageManager(e) => e.to_diagnostic(),
            OrchestrateError::Invariant(reason) => {
                Diagnostic::error(format!("assembled environment is inconsistent: {reason}"))
            }
        }
    }
}

/// A compiler or tool could not be located.
///
/// Per-candidate detection failures are collected as rejections, never
/// raised; this error only surfaces when no viable candidate remains
/// for a required role.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("no viable compiler found for {platform}")]
    NoViableCompiler {
        platform: PlatformInfo,
        /// (compiler id, rejection reason) per attempted candidate
        attempted: Vec<(CompilerId, String)>,
    },
}

impl DetectionError {
    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DetectionError::NoViableCompiler {
                platform,
                attempted,
            } => {
                let mut diag =
                    Diagnostic::error(format!("no viable compiler found for {}", platform));
                for (id, reason) in attempted {
                    diag = diag.with_context(format!("{}: {}", id, reason));
                }
                let mut hinted: Vec<CompilerId> = Vec::new();
                for (id, _) in attempted {
                    if !hinted.contains(id) {
                        diag = diag.with_suggestion(id.install_hint());
                        hinted.push(*id);
                    }
                }
                if attempted.is_empty() {
                    diag = diag.with_context("no compiler ids are applicable to this platform");
                }
                diag
            }
        }
    }
}

/// A terminal activation script failed or could not be located.
#[derive(Debug, Error)]
pub enum EnvironmentActivationError {
    #[error("{strategy} activation failed: {what} not found")]
    ScriptNotFound {
        strategy: TerminalStrategy,
        what: String,
        hint: String,
    },

    #[error("{strategy} activation script `{script}` failed: {reason}")]
    ScriptFailed {
        strategy: TerminalStrategy,
        script: PathBuf,
        reason: String,
    },

    #[error("{strategy} activation is not supported on this host")]
    UnsupportedHost { strategy: TerminalStrategy },
}

impl EnvironmentActivationError {
    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EnvironmentActivationError::ScriptNotFound {
                strategy,
                what,
                hint,
            } => Diagnostic::error(format!("{} activation failed", strategy))
                .with_context(format!("{} not found", what))
                .with_suggestion(hint.clone()),
            EnvironmentActivationError::ScriptFailed {
                strategy,
                script,
                reason,
            } => Diagnostic::error(format!("{} activation failed", strategy))
                .with_context(format!("`{}`: {}", script.display(), reason)),
            EnvironmentActivationError::UnsupportedHost { strategy } => Diagnostic::error(format!(
                "{} activation is not supported on this host",
                strategy
            )),
        }
    }
}

/// An explicit request is incompatible with the host or target.
///
/// Fatal and never silently downgraded: substituting a different
/// compiler than the one explicitly requested would violate user intent.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("requested compiler `{id}` was not found")]
    RequestedCompilerMissing { id: CompilerId },

    #[error("requested compiler `{id}` was rejected: {reason}")]
    RequestedCompilerRejected { id: CompilerId, reason: String },

    #[error("requested compiler `{id}` {version} does not support {standard}")]
    StandardNotSupported {
        id: CompilerId,
        version: semver::Version,
        standard: CppStandard,
    },

    #[error("cross-compilation target {target} is not supported")]
    UnsupportedTarget { target: String },

    #[error("no cross compiler for target {target} (expected {id})")]
    CrossCompilerMissing { target: PlatformInfo, id: CompilerId },
}

impl ToolchainError {
    fn exit_code(&self) -> i32 {
        match self {
            // Cross-target failures get their own class, distinct from
            // plain compiler-not-found.
            ToolchainError::UnsupportedTarget { .. }
            | ToolchainError::CrossCompilerMissing { .. } => EXIT_CROSS_TARGET,
            _ => EXIT_COMPILER_NOT_FOUND,
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::RequestedCompilerMissing { id } => {
                Diagnostic::error(format!("requested compiler `{}` was not found", id))
                    .with_context("explicit compiler requests are never substituted")
                    .with_suggestion(id.install_hint())
            }
            ToolchainError::RequestedCompilerRejected { id, reason } => {
                Diagnostic::error(format!("requested compiler `{}` was rejected", id))
                    .with_context(reason.clone())
                    .with_context("explicit compiler requests are never substituted")
            }
            ToolchainError::StandardNotSupported {
                id,
                version,
                standard,
            } => Diagnostic::error(format!(
                "requested compiler `{}` {} does not support {}",
                id, version, standard
            ))
            .with_context(format!(
                "{} requires {} >= {}",
                standard,
                id,
                id.minimum_version(*standard)
            ))
            .with_suggestion(format!("Upgrade {} or lower the required standard", id)),
            ToolchainError::UnsupportedTarget { target } => Diagnostic::error(format!(
                "cross-compilation target {} is not supported",
                target
            ))
            .with_context("supported targets: linux-arm64, windows-arm64, wasm"),
            ToolchainError::CrossCompilerMissing { target, id } => {
                Diagnostic::error(format!("no cross compiler for target {}", target))
                    .with_context(format!("expected `{}`", id))
                    .with_suggestion(id.install_hint())
            }
        }
    }
}

/// No package-manager backend is both available and security-verified.
///
/// A build without dependency resolution is not a safe default, so this
/// is fatal rather than a silent disable.
#[derive(Debug, Error)]
pub enum PackageManagerError {
    #[error("no package manager is both available and verified")]
    NoneViable {
        /// (backend, rejection reason) per attempted backend
        attempted: Vec<(PackageManagerKind, String)>,
    },
}

impl PackageManagerError {
    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PackageManagerError::NoneViable { attempted } => {
                let mut diag =
                    Diagnostic::error("no package manager is both available and verified");
                for (kind, reason) in attempted {
                    diag = diag.with_context(format!("{}: {}", kind, reason));
                }
                for kind in PackageManagerKind::default_order() {
                    diag = diag.with_suggestion(kind.install_hint());
                }
                diag
            }
        }
    }
}
