//! Bosun - a build environment orchestration engine for C/C++
//!
//! This crate discovers what compiler/platform/package-manager environment
//! is available on a host, resolves conflicting options via deterministic
//! priority rules, and produces a single consistent [`BuildEnvironment`]
//! descriptor for downstream build invocation (CMake generation, actual
//! compilation).

pub mod activate;
pub mod core;
pub mod cross;
pub mod detect;
pub mod errors;
pub mod ops;
pub mod resolver;
pub mod util;

pub use crate::core::{
    build_env::BuildEnvironment,
    compiler::{CompilerCandidate, CompilerId, CppStandard, TerminalStrategy},
    package_manager::{PackageManagerCandidate, PackageManagerKind},
    platform::{Arch, OsFamily, PlatformInfo},
    toolchain::ToolchainDescriptor,
};

pub use errors::OrchestrateError;
pub use ops::assemble::{orchestrate, OrchestrationReport, OrchestrationRequest};
