//! GCC/Clang locator for Unix-like systems.
//!
//! Searches PATH for the base driver name plus the distro-style
//! versioned names (gcc-13, clang-15, ...). Multiple matching
//! installations yield multiple installs, each probed independently.

use std::path::PathBuf;
use std::time::Duration;

use super::cache::ProbeResult;
use super::version::query_version;
use crate::util::process::{find_all_executables, find_executable};

/// Versioned-binary suffixes worth probing, newest first.
const VERSION_SUFFIXES: [u32; 10] = [19, 18, 17, 16, 15, 14, 13, 12, 11, 10];

/// Locate installations of a PATH-resolved driver (`gcc` or `clang`).
pub fn locate(base: &str, timeout: Duration) -> ProbeResult {
    let mut paths: Vec<PathBuf> = find_all_executables(base);

    for suffix in VERSION_SUFFIXES {
        if let Some(path) = find_executable(&format!("{base}-{suffix}")) {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if paths.is_empty() {
        return ProbeResult::not_found(format!("`{base}` not found in PATH"));
    }

    let mut result = ProbeResult::default();
    for path in paths {
        match query_version(&path, timeout) {
            Ok((version, banner)) => {
                // macOS aliases gcc to clang; a gcc probe must not claim
                // a clang install.
                if base == "gcc" && banner.to_lowercase().contains("clang") {
                    result.failures.push(format!(
                        "`{}` is clang masquerading as gcc",
                        path.display()
                    ));
                    continue;
                }
                tracing::debug!("located {}: {} ({})", base, path.display(), version);
                result.installs.push((path, version));
            }
            Err(e) => result.failures.push(e.to_string()),
        }
    }

    result
}
