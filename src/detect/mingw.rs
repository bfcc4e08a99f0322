//! MinGW locator for MSYS2 install-root conventions.
//!
//! MSYS2 installs each compiler subsystem (ucrt64, mingw64, clang64,
//! mingw32, clangarm64) as a top-level directory under its root, each
//! with its own `bin/` holding the toolchain. We scan the configured or
//! conventional roots for subsystem directories and probe the requested
//! driver inside each.

use std::path::{Path, PathBuf};
use std::time::Duration;

use walkdir::WalkDir;

use super::cache::ProbeResult;
use super::version::query_version;
use crate::util::config::OrchestratorConfig;

/// Conventional MSYS2 install roots, checked when no root is configured.
const DEFAULT_ROOTS: [&str; 2] = [r"C:\msys64", r"C:\msys32"];

/// Locate MinGW installations of a driver (`gcc` or `clang`).
pub fn locate(config: &OrchestratorConfig, base: &str, timeout: Duration) -> ProbeResult {
    let roots: Vec<PathBuf> = match &config.roots.msys2 {
        Some(root) => vec![root.clone()],
        None => DEFAULT_ROOTS.iter().map(PathBuf::from).collect(),
    };

    let exe = format!("{base}.exe");
    let mut result = ProbeResult::default();
    let mut any_root = false;

    for root in &roots {
        if !root.is_dir() {
            continue;
        }
        any_root = true;

        for bin_dir in scan_subsystems(root) {
            let driver = bin_dir.join(&exe);
            if !driver.is_file() {
                continue;
            }
            match query_version(&driver, timeout) {
                Ok((version, _)) => {
                    tracing::debug!("located mingw {}: {} ({})", base, driver.display(), version);
                    result.installs.push((driver, version));
                }
                Err(e) => result.failures.push(e.to_string()),
            }
        }
    }

    if !any_root {
        return ProbeResult::not_found(format!(
            "no MSYS2 root found (looked in {}); set MSYS2_ROOT or [roots].msys2",
            roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if result.installs.is_empty() && result.failures.is_empty() {
        result
            .failures
            .push(format!("no subsystem under the MSYS2 root provides `{exe}`"));
    }

    result
}

/// Enumerate subsystem `bin/` directories under an MSYS2 root.
pub fn scan_subsystems(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().join("bin"))
        .filter(|bin| bin.is_dir())
        .collect();
    // the usr/ tree holds the POSIX toolchain, not a MinGW subsystem
    dirs.retain(|d| d.parent().and_then(|p| p.file_name()) != Some("usr".as_ref()));
    dirs.sort();
    dirs
}
