//! MSYS2 subsystem activation.
//!
//! MinGW toolchains live under an MSYS2 subsystem prefix (ucrt64,
//! mingw64, clang64, mingw32, clangarm64). Activation does not source a
//! script; it sets MSYSTEM for the subsystem and prepends the subsystem
//! and POSIX bin directories to PATH.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::compiler::{CompilerCandidate, TerminalStrategy};
use crate::core::platform::Arch;
use crate::errors::EnvironmentActivationError;
use crate::util::config::OrchestratorConfig;

use super::capture::baseline_env;
use super::prepend_path;

/// Subsystem directory names recognized under an MSYS2 root.
const SUBSYSTEMS: [&str; 5] = ["ucrt64", "mingw64", "clang64", "mingw32", "clangarm64"];

/// Conventional MSYS2 install roots, checked when nothing else matches.
const DEFAULT_ROOTS: [&str; 2] = [r"C:\msys64", r"C:\msys32"];

/// Activate the MSYS2 subsystem environment for a MinGW candidate.
pub fn activate(
    candidate: &CompilerCandidate,
    target_arch: Arch,
    config: &OrchestratorConfig,
) -> Result<BTreeMap<String, String>, EnvironmentActivationError> {
    let Some(root) = msys2_root(config, &candidate.executable_path) else {
        return Err(EnvironmentActivationError::ScriptNotFound {
            strategy: TerminalStrategy::Msys2,
            what: "MSYS2 installation root".to_string(),
            hint: "Set MSYS2_ROOT or [roots].msys2 to your MSYS2 install directory".to_string(),
        });
    };

    let subsystem = subsystem_for(&candidate.executable_path, target_arch);
    tracing::debug!(
        "activating MSYS2 subsystem {} under {}",
        subsystem,
        root.display()
    );

    let mut env = baseline_env();
    env.insert("MSYSTEM".to_string(), subsystem.to_uppercase());
    env.insert("MSYSTEM_PREFIX".to_string(), format!("/{subsystem}"));

    let existing = env.get("PATH").cloned().unwrap_or_default();
    let prepended = prepend_path(
        &existing,
        &[root.join(&subsystem).join("bin"), root.join("usr").join("bin")],
    );
    env.insert("PATH".to_string(), prepended);

    if let Some(sysroot) = &config.roots.sysroot {
        env.insert(
            "SYSROOT".to_string(),
            to_msys_path(&sysroot.display().to_string()),
        );
    }

    Ok(env)
}

/// Determine the MSYS2 root: configuration wins, then the candidate's
/// own location (root/<subsystem>/bin/driver), then conventional roots.
pub fn msys2_root(config: &OrchestratorConfig, compiler_path: &Path) -> Option<PathBuf> {
    if let Some(root) = &config.roots.msys2 {
        if root.is_dir() {
            return Some(root.clone());
        }
    }

    // root/<subsystem>/bin/gcc.exe
    if let Some(root) = compiler_path
        .parent()
        .and_then(Path::parent)
        .and_then(Path::parent)
    {
        if root.join("usr").is_dir() {
            return Some(root.to_path_buf());
        }
    }

    DEFAULT_ROOTS
        .iter()
        .map(PathBuf::from)
        .find(|root| root.is_dir())
}

/// Pick the subsystem for a candidate: the one its path sits inside, or
/// the conventional default for the target architecture.
///
/// Splits on both separators rather than `Path::components`, so
/// backslash paths from config parse the same on every host.
pub fn subsystem_for(compiler_path: &Path, target_arch: Arch) -> String {
    let lossy = compiler_path.to_string_lossy().to_lowercase();
    for part in lossy.split(['/', '\\']) {
        if SUBSYSTEMS.contains(&part) {
            return part.to_string();
        }
    }
    match target_arch {
        Arch::X86 => "mingw32".to_string(),
        Arch::Arm64 => "clangarm64".to_string(),
        _ => "ucrt64".to_string(),
    }
}

/// Translate a Windows-style path into the MSYS2 POSIX convention
/// (`C:\foo\bar` becomes `/c/foo/bar`).
pub fn to_msys_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut chars = forward.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            format!("/{}{}", drive.to_ascii_lowercase(), chars.as_str())
        }
        _ => forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_subsystem_from_path_component() {
        // backslash paths must parse on any host, not just Windows
        let path = Path::new(r"C:\msys64\clang64\bin\clang.exe");
        assert_eq!(subsystem_for(path, Arch::X64), "clang64");

        let path = Path::new("C:/msys64/mingw64/bin/gcc.exe");
        assert_eq!(subsystem_for(path, Arch::X64), "mingw64");
    }

    #[test]
    fn test_subsystem_defaults_by_arch() {
        let path = Path::new(r"C:\tools\gcc.exe");
        assert_eq!(subsystem_for(path, Arch::X64), "ucrt64");
        assert_eq!(subsystem_for(path, Arch::X86), "mingw32");
        assert_eq!(subsystem_for(path, Arch::Arm64), "clangarm64");
    }

    #[test]
    fn test_to_msys_path() {
        assert_eq!(to_msys_path(r"C:\msys64\ucrt64"), "/c/msys64/ucrt64");
        assert_eq!(to_msys_path(r"D:\dev kits\sdk"), "/d/dev kits/sdk");
        assert_eq!(to_msys_path("/already/posix"), "/already/posix");
    }

    #[test]
    fn test_msys2_root_from_compiler_location() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("ucrt64").join("bin")).unwrap();
        fs::create_dir_all(root.path().join("usr").join("bin")).unwrap();
        let gcc = root.path().join("ucrt64").join("bin").join("gcc.exe");

        let config = OrchestratorConfig::default();
        assert_eq!(msys2_root(&config, &gcc), Some(root.path().to_path_buf()));
    }

    #[test]
    fn test_msys2_root_prefers_config() {
        let configured = tempfile::tempdir().unwrap();
        let mut config = OrchestratorConfig::default();
        config.roots.msys2 = Some(configured.path().to_path_buf());

        let found = msys2_root(&config, Path::new(r"C:\other\bin\gcc.exe"));
        assert_eq!(found, Some(configured.path().to_path_buf()));
    }
}
