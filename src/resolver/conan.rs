//! Conan backend probe.

use std::path::Path;

use crate::core::package_manager::PackageManagerKind;
use crate::util::process::find_executable;

use super::verify::{check_pin, PinStatus};
use super::BackendProbe;

/// Probe conan: the executable must be installed and the project must
/// carry a conanfile. A lock file, when present, must be valid JSON and
/// match its pin (if one is declared).
pub fn probe(project_dir: &Path) -> BackendProbe {
    let kind = PackageManagerKind::Conan;

    if find_executable("conan").is_none() {
        return BackendProbe::unavailable(kind, "conan executable not found in PATH");
    }

    let Some(manifest) = manifest_path(project_dir) else {
        return BackendProbe::unavailable(kind, "project has no conanfile.py or conanfile.txt");
    };
    tracing::debug!("conan manifest: {}", manifest.display());

    let lockfile = project_dir.join("conan.lock");
    if lockfile.is_file() {
        let Ok(contents) = std::fs::read_to_string(&lockfile) else {
            return BackendProbe::unverified(kind, "conan.lock exists but is unreadable");
        };
        if serde_json::from_str::<serde_json::Value>(&contents).is_err() {
            return BackendProbe::unverified(kind, "conan.lock is not valid JSON");
        }
        match check_pin(project_dir, "conan.lock", &lockfile) {
            Ok(status) if !status.passes() => {
                return BackendProbe::unverified(kind, "conan.lock does not match its pin");
            }
            Ok(PinStatus::Verified) => {
                tracing::debug!("conan.lock matches its pin");
            }
            Ok(_) => {}
            Err(e) => {
                return BackendProbe::unverified(kind, format!("pin check failed: {e}"));
            }
        }
    }

    BackendProbe::viable(kind)
}

fn manifest_path(project_dir: &Path) -> Option<std::path::PathBuf> {
    ["conanfile.py", "conanfile.txt"]
        .iter()
        .map(|name| project_dir.join(name))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_no_manifest_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = probe(dir.path());
        assert!(!result.available);
    }

    #[test]
    fn test_manifest_detection() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("conanfile.txt"), "[requires]\n").unwrap();
        assert!(manifest_path(dir.path()).is_some());
    }

    #[test]
    fn test_invalid_lockfile_demotes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("conanfile.py"), "").unwrap();
        fs::write(dir.path().join("conan.lock"), "{not json").unwrap();

        let result = probe(dir.path());
        // unverified whenever conan itself is installed; unavailable otherwise
        if result.available {
            assert!(!result.verified);
            assert!(result.detail.contains("not valid JSON"));
        }
    }
}
