//! CPM.cmake backend probe.
//!
//! CPM is a vendored CMake script, not an installed tool: availability
//! means cmake is installed and the project carries `cmake/CPM.cmake`.
//! The vendored script is the injection point for dependency fetching,
//! so a declared pin that no longer matches it fails the gate.

use std::path::Path;

use crate::core::package_manager::PackageManagerKind;
use crate::util::process::find_executable;

use super::verify::{check_pin, PinStatus};
use super::BackendProbe;

/// Probe CPM.cmake.
pub fn probe(project_dir: &Path) -> BackendProbe {
    let kind = PackageManagerKind::Cpm;

    if find_executable("cmake").is_none() {
        return BackendProbe::unavailable(kind, "cmake executable not found in PATH");
    }

    let script = project_dir.join("cmake").join("CPM.cmake");
    if !script.is_file() {
        return BackendProbe::unavailable(kind, "project has no cmake/CPM.cmake");
    }

    match check_pin(project_dir, "cpm", &script) {
        Ok(status) if !status.passes() => {
            BackendProbe::unverified(kind, "cmake/CPM.cmake does not match its pin")
        }
        Ok(PinStatus::Verified) => {
            tracing::debug!("cmake/CPM.cmake matches its pin");
            BackendProbe::viable(kind)
        }
        Ok(_) => BackendProbe::viable(kind),
        Err(e) => BackendProbe::unverified(kind, format!("pin check failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::verify::file_sha256;
    use std::fs;

    fn project_with_script() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cmake")).unwrap();
        fs::write(dir.path().join("cmake").join("CPM.cmake"), "include_guard()").unwrap();
        dir
    }

    #[test]
    fn test_missing_script_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = probe(dir.path());
        assert!(!result.available);
    }

    #[test]
    fn test_tampered_script_fails_gate() {
        let dir = project_with_script();
        let pins = dir.path().join(".bosun");
        fs::create_dir_all(&pins).unwrap();
        fs::write(pins.join("cpm.sha256"), format!("{}\n", "f".repeat(64))).unwrap();

        let result = probe(dir.path());
        if result.available {
            assert!(!result.verified);
        }
    }

    #[test]
    fn test_pinned_script_verifies() {
        let dir = project_with_script();
        let script = dir.path().join("cmake").join("CPM.cmake");
        let digest = file_sha256(&script).unwrap();
        let pins = dir.path().join(".bosun");
        fs::create_dir_all(&pins).unwrap();
        fs::write(pins.join("cpm.sha256"), digest).unwrap();

        let result = probe(dir.path());
        if result.available {
            assert!(result.verified);
        }
    }
}
