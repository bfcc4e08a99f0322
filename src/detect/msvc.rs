//! MSVC locator via Visual Studio installation enumeration.
//!
//! Uses vswhere.exe to enumerate Visual Studio instances with the C++
//! toolset, then walks each instance's `VC/Tools/MSVC/<toolset>` tree.
//! Every installed toolset yields its own install, so side-by-side
//! toolsets become independent candidates.

use std::path::PathBuf;
use std::time::Duration;

use semver::Version;
use serde::Deserialize;

use super::cache::ProbeResult;
use super::version::query_version;
use crate::util::process::ProcessBuilder;

#[derive(Debug, Deserialize)]
struct VsInstance {
    #[serde(rename = "installationPath")]
    installation_path: PathBuf,
}

/// Locate cl.exe installations.
pub fn locate_msvc(timeout: Duration) -> ProbeResult {
    let instances = match enumerate_instances(timeout) {
        Ok(instances) => instances,
        Err(reason) => return ProbeResult::not_found(reason),
    };

    let mut result = ProbeResult::default();
    for instance in &instances {
        let toolset_root = instance.installation_path.join("VC").join("Tools").join("MSVC");
        let Ok(entries) = std::fs::read_dir(&toolset_root) else {
            result.failures.push(format!(
                "no VC toolsets under {}",
                toolset_root.display()
            ));
            continue;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let toolset_dir = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(version) = toolset_to_cl_version(&name) else {
                continue;
            };
            let cl = toolset_dir
                .join("bin")
                .join(host_bin_dir())
                .join("x64")
                .join("cl.exe");
            if cl.is_file() {
                tracing::debug!("located msvc toolset {}: {}", name, cl.display());
                result.installs.push((cl, version));
            } else {
                result
                    .failures
                    .push(format!("toolset {} has no cl.exe at {}", name, cl.display()));
            }
        }
    }

    if result.installs.is_empty() && result.failures.is_empty() {
        result
            .failures
            .push("no Visual Studio instance has the C++ toolset installed".to_string());
    }

    result
}

/// Locate clang-cl shipped with Visual Studio.
pub fn locate_clang_cl(timeout: Duration) -> ProbeResult {
    let instances = match enumerate_instances(timeout) {
        Ok(instances) => instances,
        Err(reason) => return ProbeResult::not_found(reason),
    };

    let mut result = ProbeResult::default();
    for instance in &instances {
        let clang_cl = instance
            .installation_path
            .join("VC")
            .join("Tools")
            .join("Llvm")
            .join("x64")
            .join("bin")
            .join("clang-cl.exe");
        if !clang_cl.is_file() {
            result.failures.push(format!(
                "no clang-cl under {} (LLVM component not installed?)",
                instance.installation_path.display()
            ));
            continue;
        }
        match query_version(&clang_cl, timeout) {
            Ok((version, _)) => result.installs.push((clang_cl, version)),
            Err(e) => result.failures.push(e.to_string()),
        }
    }

    result
}

fn enumerate_instances(timeout: Duration) -> Result<Vec<VsInstance>, String> {
    let Some(vswhere) = find_vswhere() else {
        return Err(
            "vswhere.exe not found; is Visual Studio or Build Tools installed?".to_string(),
        );
    };

    let output = ProcessBuilder::new(&vswhere)
        .args([
            "-all",
            "-products",
            "*",
            "-requires",
            "Microsoft.VisualStudio.Component.VC.Tools.x86.x64",
            "-format",
            "json",
            "-utf8",
        ])
        .timeout(timeout)
        .exec()
        .map_err(|e| format!("failed to run vswhere: {e}"))?;

    if !output.status.success() {
        return Err(format!(
            "vswhere failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let instances: Vec<VsInstance> = serde_json::from_slice(&output.stdout)
        .map_err(|e| format!("unparseable vswhere output: {e}"))?;

    if instances.is_empty() {
        return Err("vswhere found no Visual Studio instance with the C++ toolset".to_string());
    }

    Ok(instances)
}

/// Find vswhere.exe in its fixed install location or PATH.
fn find_vswhere() -> Option<PathBuf> {
    let program_files_x86 = std::env::var("ProgramFiles(x86)")
        .unwrap_or_else(|_| r"C:\Program Files (x86)".to_string());

    let standard_path = PathBuf::from(&program_files_x86)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");

    if standard_path.exists() {
        return Some(standard_path);
    }

    which::which("vswhere").ok()
}

/// Host directory component under a toolset's `bin/`.
fn host_bin_dir() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "Hostx86",
        "aarch64" => "Hostarm64",
        _ => "Hostx64",
    }
}

/// Map a VC toolset directory name (14.38.33130) to the cl.exe version
/// it ships (19.38.33130). The cl major is the toolset major plus five.
pub fn toolset_to_cl_version(name: &str) -> Option<Version> {
    let mut parts = name.split('.');
    let major: u64 = parts.next()?.parse().ok()?;
    let minor: u64 = parts.next()?.parse().ok()?;
    let patch: u64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    if major < 14 {
        return None;
    }
    Some(Version::new(major + 5, minor, patch))
}
