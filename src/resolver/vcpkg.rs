//! vcpkg backend probe.
//!
//! vcpkg roots are found through `VCPKG_ROOT`/config, the vcpkg
//! executable's own location, or a project-local checkout. A directory
//! qualifies as a root when it carries the `.vcpkg-root` marker file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::package_manager::PackageManagerKind;
use crate::util::config::OrchestratorConfig;
use crate::util::process::find_executable;

use super::verify::is_hex_digest;
use super::BackendProbe;

#[derive(Debug, Deserialize)]
struct VcpkgManifest {
    #[serde(rename = "builtin-baseline")]
    builtin_baseline: Option<String>,
}

/// Probe vcpkg: a root must be locatable and the project must carry a
/// `vcpkg.json` manifest. A manifest that fails to parse, or declares a
/// malformed baseline commit, fails the verification gate.
pub fn probe(config: &OrchestratorConfig, project_dir: &Path) -> BackendProbe {
    let kind = PackageManagerKind::Vcpkg;

    let Some(root) = find_root(config, project_dir) else {
        return BackendProbe::unavailable(
            kind,
            "no vcpkg root found (VCPKG_ROOT unset, vcpkg not in PATH)",
        );
    };
    tracing::debug!("vcpkg root: {}", root.display());

    let manifest_path = project_dir.join("vcpkg.json");
    if !manifest_path.is_file() {
        return BackendProbe::unavailable(kind, "project has no vcpkg.json manifest");
    }

    let manifest: VcpkgManifest = match std::fs::read_to_string(&manifest_path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
    {
        Ok(manifest) => manifest,
        Err(e) => {
            return BackendProbe::unverified(kind, format!("vcpkg.json is invalid: {e}"));
        }
    };

    if let Some(baseline) = &manifest.builtin_baseline {
        if !is_hex_digest(baseline, 40) {
            return BackendProbe::unverified(
                kind,
                format!("builtin-baseline `{baseline}` is not a full commit hash"),
            );
        }
    }

    BackendProbe::viable(kind)
}

/// Locate a vcpkg root, configuration first.
pub fn find_root(config: &OrchestratorConfig, project_dir: &Path) -> Option<PathBuf> {
    if let Some(root) = &config.roots.vcpkg {
        if is_root(root) {
            return Some(root.clone());
        }
        tracing::warn!(
            "configured vcpkg root {} lacks the .vcpkg-root marker",
            root.display()
        );
    }

    if let Some(root) = integration_root() {
        tracing::debug!("vcpkg root via integrate install: {}", root.display());
        return Some(root);
    }

    if let Some(exe) = find_executable("vcpkg") {
        if let Some(dir) = exe.parent() {
            if is_root(dir) {
                return Some(dir.to_path_buf());
            }
        }
    }

    let local = project_dir.join("vcpkg");
    if is_root(&local) {
        return Some(local);
    }

    None
}

fn is_root(dir: &Path) -> bool {
    dir.join(".vcpkg-root").is_file()
}

/// `vcpkg integrate install` records the root in a user-level MSBuild
/// targets file under LOCALAPPDATA.
fn integration_root() -> Option<PathBuf> {
    let local_app_data = std::env::var_os("LOCALAPPDATA")?;
    let targets = PathBuf::from(local_app_data)
        .join("vcpkg")
        .join("vcpkg.user.targets");
    let content = std::fs::read_to_string(targets).ok()?;
    root_from_targets(&content)
}

/// Extract the vcpkg root from a targets file. Its Import line points
/// at `<root>/scripts/buildsystems/msbuild/vcpkg.targets`.
fn root_from_targets(content: &str) -> Option<PathBuf> {
    for line in content.lines() {
        let Some(start) = line.find("Project=\"") else {
            continue;
        };
        let rest = &line[start + 9..];
        let Some(end) = rest.find('"') else {
            continue;
        };
        let import = PathBuf::from(&rest[..end]);
        let Some(root) = import.ancestors().nth(4) else {
            continue;
        };
        if is_root(root) {
            return Some(root.to_path_buf());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn root_with_marker() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".vcpkg-root"), "").unwrap();
        dir
    }

    #[test]
    fn test_configured_root_with_marker_wins() {
        let root = root_with_marker();
        let mut config = OrchestratorConfig::default();
        config.roots.vcpkg = Some(root.path().to_path_buf());

        let project = tempfile::tempdir().unwrap();
        assert_eq!(
            find_root(&config, project.path()),
            Some(root.path().to_path_buf())
        );
    }

    #[test]
    fn test_project_local_checkout_is_a_root() {
        let project = tempfile::tempdir().unwrap();
        let local = project.path().join("vcpkg");
        fs::create_dir_all(&local).unwrap();
        fs::write(local.join(".vcpkg-root"), "").unwrap();

        let config = OrchestratorConfig::default();
        assert_eq!(find_root(&config, project.path()), Some(local));
    }

    #[test]
    fn test_root_from_integration_targets_file() {
        let root = root_with_marker();
        let import = root
            .path()
            .join("scripts")
            .join("buildsystems")
            .join("msbuild")
            .join("vcpkg.targets");
        let content = format!(
            "<Project>\n  <Import Project=\"{}\" Condition=\"1\" />\n</Project>\n",
            import.display()
        );

        assert_eq!(
            root_from_targets(&content),
            Some(root.path().to_path_buf())
        );
    }

    #[test]
    fn test_targets_file_without_valid_root_yields_none() {
        let content =
            "<Import Project=\"/nonexistent/scripts/buildsystems/msbuild/vcpkg.targets\" />";
        assert_eq!(root_from_targets(content), None);
    }

    #[test]
    fn test_configured_root_without_marker_is_ignored() {
        let bogus = tempfile::tempdir().unwrap();
        let mut config = OrchestratorConfig::default();
        config.roots.vcpkg = Some(bogus.path().to_path_buf());

        let project = tempfile::tempdir().unwrap();
        assert_eq!(find_root(&config, project.path()), None);
    }

    #[test]
    fn test_short_baseline_fails_verification() {
        let root = root_with_marker();
        let mut config = OrchestratorConfig::default();
        config.roots.vcpkg = Some(root.path().to_path_buf());

        let project = tempfile::tempdir().unwrap();
        fs::write(
            project.path().join("vcpkg.json"),
            r#"{"dependencies": ["fmt"], "builtin-baseline": "abc123"}"#,
        )
        .unwrap();

        let result = probe(&config, project.path());
        assert!(result.available);
        assert!(!result.verified);
        assert!(result.detail.contains("builtin-baseline"));
    }

    #[test]
    fn test_valid_manifest_is_viable() {
        let root = root_with_marker();
        let mut config = OrchestratorConfig::default();
        config.roots.vcpkg = Some(root.path().to_path_buf());

        let project = tempfile::tempdir().unwrap();
        fs::write(
            project.path().join("vcpkg.json"),
            format!(
                r#"{{"dependencies": ["fmt"], "builtin-baseline": "{}"}}"#,
                "a".repeat(40)
            ),
        )
        .unwrap();

        let result = probe(&config, project.path());
        assert!(result.available);
        assert!(result.verified);
    }
}
